//! Paths: candidate designs built by ants

use serde::{Deserialize, Serialize};

use super::vertex::{ElementId, Vertex};

/// Whether a path is a whole design or a single class of one
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathRole {
    Design,
    /// Partial path holding one class; scored by cohesion only
    Class,
}

/// Scores the daemon attaches to a path
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathFitness {
    /// External coupling, minimised, in [0, 1]
    pub cbo: f64,
    /// Standard deviation of class sizes, minimised
    pub elegance_nac: f64,
    /// Standard deviation of attribute/method ratios, minimised
    pub elegance_atmr: f64,
    /// Mean class use density, maximised, in [0, 1]
    pub cohesion: f64,
    /// Newman modularity of the partition, maximised
    pub elegance_modularity: f64,
}

impl PathFitness {
    /// The three running objectives `[cbo, nac, atmr]`
    pub fn objectives(&self) -> [f64; 3] {
        [self.cbo, self.elegance_nac, self.elegance_atmr]
    }
}

/// One class of a design, split by element kind
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DesignClass {
    pub attributes: Vec<ElementId>,
    pub methods: Vec<ElementId>,
}

impl DesignClass {
    pub fn len(&self) -> usize {
        self.attributes.len() + self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// At least one attribute and one method
    pub fn has_both(&self) -> bool {
        !self.attributes.is_empty() && !self.methods.is_empty()
    }

    /// Attributes per method, `None` unless the class has both kinds
    pub fn ratio(&self) -> Option<f64> {
        self.has_both()
            .then(|| self.attributes.len() as f64 / self.methods.len() as f64)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.attributes.contains(&id) || self.methods.contains(&id)
    }

    /// Sorted copy, for order-insensitive comparison
    pub fn normalised(&self) -> Self {
        let mut class = self.clone();
        class.attributes.sort_unstable();
        class.methods.sort_unstable();
        class
    }
}

/// Ordered vertex sequence: the nest, then each class closed by a marker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    vertices: Vec<Vertex>,
    role: PathRole,
    fitness: PathFitness,
    domination_count: usize,
}

impl Path {
    /// An empty path holding only the nest
    pub fn new(role: PathRole) -> Self {
        Self {
            vertices: vec![Vertex::Nest],
            role,
            fitness: PathFitness::default(),
            domination_count: 0,
        }
    }

    /// Build a design path from explicit classes of element vertices
    pub fn from_classes<I, C>(classes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = Vertex>,
    {
        let mut path = Self::new(PathRole::Design);
        for class in classes {
            for vertex in class {
                path.push(vertex);
            }
            path.end_class();
        }
        path
    }

    pub fn push(&mut self, vertex: Vertex) {
        self.vertices.push(vertex);
    }

    /// Close the current class
    pub fn end_class(&mut self) {
        self.vertices.push(Vertex::EndOfClass);
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn role(&self) -> PathRole {
        self.role
    }

    pub fn fitness(&self) -> &PathFitness {
        &self.fitness
    }

    pub fn set_fitness(&mut self, fitness: PathFitness) {
        self.fitness = fitness;
    }

    pub fn cbo(&self) -> f64 {
        self.fitness.cbo
    }

    pub fn nac(&self) -> f64 {
        self.fitness.elegance_nac
    }

    pub fn atmr(&self) -> f64 {
        self.fitness.elegance_atmr
    }

    pub fn objectives(&self) -> [f64; 3] {
        self.fitness.objectives()
    }

    pub fn domination_count(&self) -> usize {
        self.domination_count
    }

    pub fn set_domination_count(&mut self, count: usize) {
        self.domination_count = count;
    }

    /// Element identities in path order
    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.vertices.iter().filter_map(Vertex::element)
    }

    pub fn number_of_elements(&self) -> usize {
        self.elements().count()
    }

    /// Number of closed classes
    pub fn number_of_classes(&self) -> usize {
        self.vertices
            .iter()
            .filter(|v| matches!(v, Vertex::EndOfClass))
            .count()
    }

    /// Element vertices grouped by class, in emission order
    pub fn class_segments(&self) -> Vec<&[Vertex]> {
        self.vertices[1..]
            .split(|v| matches!(v, Vertex::EndOfClass))
            .take(self.number_of_classes())
            .collect()
    }

    /// The design's classes
    pub fn classes(&self) -> Vec<DesignClass> {
        self.class_segments()
            .into_iter()
            .map(|segment| {
                let mut class = DesignClass::default();
                for vertex in segment {
                    match vertex {
                        Vertex::Attribute(id) => class.attributes.push(*id),
                        Vertex::Method(id) => class.methods.push(*id),
                        Vertex::Nest | Vertex::EndOfClass => {}
                    }
                }
                class
            })
            .collect()
    }

    /// Consecutive element pairs within each class
    ///
    /// These are the pheromone entries a deposit along this path touches.
    pub fn edges(&self) -> Vec<(ElementId, ElementId)> {
        self.class_segments()
            .into_iter()
            .flat_map(|segment| {
                segment
                    .windows(2)
                    .filter_map(|pair| Some((pair[0].element()?, pair[1].element()?)))
            })
            .collect()
    }

    /// Each class as its own partial path
    pub fn class_paths(&self) -> Vec<Path> {
        self.class_segments()
            .into_iter()
            .map(|segment| {
                let mut path = Path::new(PathRole::Class);
                for vertex in segment {
                    path.push(*vertex);
                }
                path.end_class();
                path
            })
            .collect()
    }

    /// Does every identity in `0..number_of_elements` appear exactly once?
    pub fn is_permutation_of(&self, number_of_elements: usize) -> bool {
        let mut seen = vec![false; number_of_elements];
        for id in self.elements() {
            match seen.get_mut(id) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        seen.into_iter().all(|s| s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_path() -> Path {
        Path::from_classes(vec![
            vec![Vertex::Attribute(0), Vertex::Method(3), Vertex::Attribute(1)],
            vec![Vertex::Method(4)],
            vec![Vertex::Attribute(2), Vertex::Method(5)],
        ])
    }

    #[test]
    fn test_classes_split_on_markers() {
        let path = sample_path();
        assert_eq!(path.number_of_classes(), 3);
        assert_eq!(path.number_of_elements(), 6);

        let classes = path.classes();
        assert_eq!(classes[0].attributes, vec![0, 1]);
        assert_eq!(classes[0].methods, vec![3]);
        assert!(!classes[1].has_both());
        assert_eq!(classes[1].ratio(), None);
        assert_eq!(classes[2].ratio(), Some(1.0));
    }

    #[test]
    fn test_edges_stay_inside_classes() {
        let path = sample_path();
        assert_eq!(path.edges(), vec![(0, 3), (3, 1), (2, 5)]);
    }

    #[test]
    fn test_class_paths() {
        let path = sample_path();
        let parts = path.class_paths();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.role() == PathRole::Class));
        assert_eq!(parts[2].classes()[0].attributes, vec![2]);
        assert_eq!(parts[0].number_of_classes(), 1);
    }

    #[test]
    fn test_permutation_check() {
        let path = sample_path();
        assert!(path.is_permutation_of(6));
        assert!(!path.is_permutation_of(7));

        let duplicate = Path::from_classes(vec![vec![Vertex::Attribute(0), Vertex::Attribute(0)]]);
        assert!(!duplicate.is_permutation_of(2));
    }

    #[test]
    fn test_empty_class_is_kept() {
        let path = Path::from_classes(vec![vec![Vertex::Attribute(0)], vec![]]);
        assert_eq!(path.number_of_classes(), 2);
        assert!(path.classes()[1].is_empty());
    }
}
