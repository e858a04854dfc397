//! Design problem instances
//!
//! A design problem is the immutable input of a run: the attributes and
//! methods to be partitioned, the number of classes to partition them into,
//! and the use matrix recording which methods use which attributes.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{AcoError, AcoResult};

/// Benchmark family of a design problem
///
/// The family selects the scale constants used to normalise the NAC and
/// ATMR elegance values during pheromone deposit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemKind {
    /// Randomised test problem
    Test,
    /// Cinema booking system
    Cbs,
    /// Graduate development program
    Gdp,
    /// Select cruises
    Sc,
}

impl ProblemKind {
    /// Numeric identifier used by external problem controllers
    pub fn id(&self) -> u8 {
        match self {
            Self::Test => 0,
            Self::Cbs => 1,
            Self::Gdp => 2,
            Self::Sc => 3,
        }
    }

    /// Cap applied to raw NAC before normalisation
    pub fn nac_scale(&self) -> f64 {
        match self {
            Self::Cbs => 6.0,
            Self::Test | Self::Gdp => 10.0,
            Self::Sc => 11.0,
        }
    }

    /// Cap applied to raw ATMR before normalisation
    pub fn atmr_scale(&self) -> f64 {
        match self {
            Self::Cbs => 4.0,
            Self::Test | Self::Gdp => 5.5,
            Self::Sc => 7.0,
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Test => "test",
            Self::Cbs => "cbs",
            Self::Gdp => "gdp",
            Self::Sc => "sc",
        };
        f.write_str(name)
    }
}

impl TryFrom<u8> for ProblemKind {
    type Error = AcoError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Self::Test),
            1 => Ok(Self::Cbs),
            2 => Ok(Self::Gdp),
            3 => Ok(Self::Sc),
            other => Err(AcoError::UnknownProblem(other.to_string())),
        }
    }
}

impl FromStr for ProblemKind {
    type Err = AcoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" | "0" => Ok(Self::Test),
            "cbs" | "1" => Ok(Self::Cbs),
            "gdp" | "2" => Ok(Self::Gdp),
            "sc" | "3" => Ok(Self::Sc),
            _ => Err(AcoError::UnknownProblem(s.to_string())),
        }
    }
}

/// Serialized form of a design problem, validated on conversion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProblemDefinition {
    /// Benchmark family
    pub kind: ProblemKind,
    /// Number of classes in the target design
    pub number_of_classes: usize,
    /// Unique attribute names
    pub attributes: Vec<String>,
    /// Unique method names
    pub methods: Vec<String>,
    /// `use_matrix[method][attribute]`
    pub use_matrix: Vec<Vec<bool>>,
}

/// Immutable design problem instance
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "ProblemDefinition", into = "ProblemDefinition")]
pub struct DesignProblem {
    kind: ProblemKind,
    number_of_classes: usize,
    attributes: Vec<String>,
    methods: Vec<String>,
    use_matrix: Vec<Vec<bool>>,
    number_of_uses: usize,
}

impl DesignProblem {
    /// Create a validated design problem
    pub fn new(
        kind: ProblemKind,
        number_of_classes: usize,
        attributes: Vec<String>,
        methods: Vec<String>,
        use_matrix: Vec<Vec<bool>>,
    ) -> AcoResult<Self> {
        if number_of_classes == 0 {
            return Err(AcoError::Configuration(
                "a design needs at least one class".into(),
            ));
        }
        check_unique("attribute", &attributes)?;
        check_unique("method", &methods)?;

        let elements = attributes.len() + methods.len();
        if elements < number_of_classes {
            return Err(AcoError::Configuration(format!(
                "{} elements cannot fill {} classes",
                elements, number_of_classes
            )));
        }

        if use_matrix.len() != methods.len() {
            return Err(AcoError::Configuration(format!(
                "use matrix has {} rows, expected one per method ({})",
                use_matrix.len(),
                methods.len()
            )));
        }
        if let Some(row) = use_matrix.iter().find(|r| r.len() != attributes.len()) {
            return Err(AcoError::Configuration(format!(
                "use matrix row has {} columns, expected one per attribute ({})",
                row.len(),
                attributes.len()
            )));
        }

        let number_of_uses = use_matrix.iter().flatten().filter(|&&u| u).count();
        if number_of_uses == 0 {
            return Err(AcoError::Configuration(
                "use matrix has no uses, coupling is undefined".into(),
            ));
        }

        Ok(Self {
            kind,
            number_of_classes,
            attributes,
            methods,
            use_matrix,
            number_of_uses,
        })
    }

    /// Build a problem whose uses are exactly "every method uses every
    /// attribute of its own class"
    ///
    /// `classes` lists `(attributes, methods)` per class. Attribute and method
    /// numbering follows class order, so the ideal partition is known.
    pub fn from_partition(kind: ProblemKind, classes: &[(usize, usize)]) -> AcoResult<Self> {
        let mut attributes = Vec::new();
        let mut methods = Vec::new();
        let mut attribute_owner = Vec::new();
        let mut method_owner = Vec::new();

        for (c, &(a, m)) in classes.iter().enumerate() {
            for i in 0..a {
                attributes.push(format!("c{}_attr{}", c, i));
                attribute_owner.push(c);
            }
            for j in 0..m {
                methods.push(format!("c{}_method{}", c, j));
                method_owner.push(c);
            }
        }

        let use_matrix = method_owner
            .iter()
            .map(|&mc| attribute_owner.iter().map(|&ac| ac == mc).collect())
            .collect();

        Self::new(kind, classes.len(), attributes, methods, use_matrix)
    }

    /// Generate a randomised problem
    ///
    /// Each method uses each attribute with probability `density`; every
    /// method is guaranteed at least one use.
    pub fn random<R: Rng>(
        kind: ProblemKind,
        number_of_classes: usize,
        number_of_attributes: usize,
        number_of_methods: usize,
        density: f64,
        rng: &mut R,
    ) -> AcoResult<Self> {
        if !(0.0..=1.0).contains(&density) {
            return Err(AcoError::Configuration(format!(
                "use density {} outside [0, 1]",
                density
            )));
        }
        if number_of_attributes == 0 {
            return Err(AcoError::Configuration(
                "a random problem needs at least one attribute".into(),
            ));
        }

        let attributes = (0..number_of_attributes)
            .map(|i| format!("attribute{}", i))
            .collect();
        let methods = (0..number_of_methods)
            .map(|j| format!("method{}", j))
            .collect();

        let use_matrix = (0..number_of_methods)
            .map(|_| {
                let mut row: Vec<bool> = (0..number_of_attributes)
                    .map(|_| rng.gen_bool(density))
                    .collect();
                if !row.iter().any(|&u| u) {
                    row[rng.gen_range(0..number_of_attributes)] = true;
                }
                row
            })
            .collect();

        Self::new(kind, number_of_classes, attributes, methods, use_matrix)
    }

    /// Benchmark family of this problem
    pub fn kind(&self) -> ProblemKind {
        self.kind
    }

    /// Number of classes in the target design
    pub fn number_of_classes(&self) -> usize {
        self.number_of_classes
    }

    /// Ordered attribute names
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Ordered method names
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Number of attributes
    pub fn number_of_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Number of methods
    pub fn number_of_methods(&self) -> usize {
        self.methods.len()
    }

    /// Total number of attributes and methods
    pub fn number_of_elements(&self) -> usize {
        self.attributes.len() + self.methods.len()
    }

    /// Total number of positive entries in the use matrix
    pub fn number_of_uses(&self) -> usize {
        self.number_of_uses
    }

    /// Does `method` use `attribute`? Both are zero-based local indices.
    pub fn uses(&self, method: usize, attribute: usize) -> bool {
        self.use_matrix[method][attribute]
    }

    /// The raw use matrix, `[method][attribute]`
    pub fn use_matrix(&self) -> &[Vec<bool>] {
        &self.use_matrix
    }

    /// Number of methods using the given attribute
    pub fn attribute_degree(&self, attribute: usize) -> usize {
        self.use_matrix.iter().filter(|row| row[attribute]).count()
    }

    /// Number of attributes used by the given method
    pub fn method_degree(&self, method: usize) -> usize {
        self.use_matrix[method].iter().filter(|&&u| u).count()
    }

    /// Use table keyed by method name, listing the attributes each uses
    pub fn use_table(&self) -> BTreeMap<String, Vec<String>> {
        self.methods
            .iter()
            .zip(self.use_matrix.iter())
            .map(|(method, row)| {
                let used = row
                    .iter()
                    .zip(self.attributes.iter())
                    .filter(|(&u, _)| u)
                    .map(|(_, a)| a.clone())
                    .collect();
                (method.clone(), used)
            })
            .collect()
    }
}

impl TryFrom<ProblemDefinition> for DesignProblem {
    type Error = AcoError;

    fn try_from(def: ProblemDefinition) -> Result<Self, Self::Error> {
        Self::new(
            def.kind,
            def.number_of_classes,
            def.attributes,
            def.methods,
            def.use_matrix,
        )
    }
}

impl From<DesignProblem> for ProblemDefinition {
    fn from(problem: DesignProblem) -> Self {
        Self {
            kind: problem.kind,
            number_of_classes: problem.number_of_classes,
            attributes: problem.attributes,
            methods: problem.methods,
            use_matrix: problem.use_matrix,
        }
    }
}

fn check_unique(what: &str, names: &[String]) -> AcoResult<()> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(AcoError::Configuration(format!(
                "duplicate {} name '{}'",
                what, name
            )));
        }
    }
    Ok(())
}

pub mod prelude {
    pub use super::{DesignProblem, ProblemDefinition, ProblemKind};
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_problem_kind_scales() {
        assert_eq!(ProblemKind::Cbs.nac_scale(), 6.0);
        assert_eq!(ProblemKind::Cbs.atmr_scale(), 4.0);
        assert_eq!(ProblemKind::Gdp.nac_scale(), 10.0);
        assert_eq!(ProblemKind::Test.atmr_scale(), 5.5);
        assert_eq!(ProblemKind::Sc.nac_scale(), 11.0);
        assert_eq!(ProblemKind::Sc.atmr_scale(), 7.0);
    }

    #[test]
    fn test_problem_kind_parsing() {
        assert_eq!("GDP".parse::<ProblemKind>().unwrap(), ProblemKind::Gdp);
        assert_eq!("3".parse::<ProblemKind>().unwrap(), ProblemKind::Sc);
        assert_eq!(ProblemKind::try_from(1u8).unwrap(), ProblemKind::Cbs);
        assert!(matches!(
            "library".parse::<ProblemKind>(),
            Err(AcoError::UnknownProblem(_))
        ));
        assert!(matches!(
            ProblemKind::try_from(9u8),
            Err(AcoError::UnknownProblem(_))
        ));
    }

    #[test]
    fn test_from_partition() {
        let problem = DesignProblem::from_partition(ProblemKind::Test, &[(2, 1), (1, 2)]).unwrap();
        assert_eq!(problem.number_of_classes(), 2);
        assert_eq!(problem.number_of_elements(), 6);
        // method0 of class 0 uses both class-0 attributes only
        assert!(problem.uses(0, 0));
        assert!(problem.uses(0, 1));
        assert!(!problem.uses(0, 2));
        // class-1 methods use the single class-1 attribute
        assert!(problem.uses(1, 2) && problem.uses(2, 2));
        assert_eq!(problem.number_of_uses(), 4);
        assert_eq!(problem.attribute_degree(2), 2);
        assert_eq!(problem.method_degree(0), 2);
    }

    #[test]
    fn test_use_table() {
        let problem = DesignProblem::from_partition(ProblemKind::Test, &[(1, 1), (1, 1)]).unwrap();
        let table = problem.use_table();
        assert_eq!(table.len(), 2);
        assert_eq!(table["c0_method0"], vec!["c0_attr0".to_string()]);
        assert_eq!(table["c1_method0"], vec!["c1_attr0".to_string()]);
    }

    #[test]
    fn test_validation() {
        let names = |p: &str, n: usize| (0..n).map(|i| format!("{}{}", p, i)).collect::<Vec<_>>();

        // too few elements for the classes
        let err = DesignProblem::new(
            ProblemKind::Test,
            5,
            names("a", 1),
            names("m", 1),
            vec![vec![true]],
        );
        assert!(matches!(err, Err(AcoError::Configuration(_))));

        // no uses at all
        let err = DesignProblem::new(
            ProblemKind::Test,
            1,
            names("a", 1),
            names("m", 1),
            vec![vec![false]],
        );
        assert!(matches!(err, Err(AcoError::Configuration(_))));

        // duplicate names
        let err = DesignProblem::new(
            ProblemKind::Test,
            1,
            vec!["x".into(), "x".into()],
            names("m", 1),
            vec![vec![true, false]],
        );
        assert!(matches!(err, Err(AcoError::Configuration(_))));

        // ragged matrix
        let err = DesignProblem::new(
            ProblemKind::Test,
            1,
            names("a", 2),
            names("m", 1),
            vec![vec![true]],
        );
        assert!(matches!(err, Err(AcoError::Configuration(_))));
    }

    #[test]
    fn test_random_problem_every_method_uses_something() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let problem = DesignProblem::random(ProblemKind::Test, 4, 10, 12, 0.05, &mut rng).unwrap();
        for m in 0..problem.number_of_methods() {
            assert!(problem.method_degree(m) >= 1);
        }
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let problem = DesignProblem::from_partition(ProblemKind::Cbs, &[(2, 2), (1, 1)]).unwrap();
        let json = serde_json::to_string(&problem).unwrap();
        let back: DesignProblem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.number_of_uses(), problem.number_of_uses());
        assert_eq!(back.kind(), ProblemKind::Cbs);

        let broken = json.replace("\"number_of_classes\":2", "\"number_of_classes\":0");
        assert!(serde_json::from_str::<DesignProblem>(&broken).is_err());
    }
}
