//! Search configuration
//!
//! A single immutable [`AcoConfig`] is built once per run and shared by
//! reference with every component of the search.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AcoError, AcoResult};
use crate::interactive::weights::Weights;

/// Lower pheromone bound enforced by MAX-MIN Ant System deposits
pub const MMAS_PHEROMONE_MINIMUM: f64 = 0.5;
/// Upper pheromone bound enforced by MAX-MIN Ant System deposits
pub const MMAS_PHEROMONE_MAXIMUM: f64 = 3.5;
/// Evaporation rate of the Simple-ACO preset
pub const SIMPLE_ACO_RHO: f64 = 0.1;
/// Evaporation rate of the MMAS preset
pub const MMAS_RHO: f64 = 0.035;
/// Default pheromone exponent
pub const DEFAULT_ALPHA: f64 = 1.5;
/// Default deposit exponent
pub const DEFAULT_MU: f64 = 3.0;
/// Default colony size
pub const DEFAULT_NUMBER_OF_ANTS: usize = 100;
/// Default run length
pub const DEFAULT_NUMBER_OF_ITERATIONS: usize = 1000;
/// Default number of independent batch runs
pub const DEFAULT_NUMBER_OF_RUNS: usize = 50;
/// Scales the squared best CBO into an interaction interval
pub const INTERACTIVE_INTERVAL_CONSTANT: f64 = 200.0;
/// Construction attempts per ant when constraint handling is on
pub const MAX_CONSTRUCTION_ATTEMPTS: usize = 50;
/// Strength of fitness-proportionate evaporation
pub const ELITIST_FACTOR: f64 = 0.02;
/// Pheromone forced onto pairs inside a frozen class
pub const FREEZE_PHEROMONE: f64 = 1_000_000.0;

/// ACO algorithm variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Every ant deposits, no pheromone bounds
    SimpleAco,
    /// One representative deposits, pheromone clamped to [0.5, 3.5]
    Mmas,
}

impl Algorithm {
    /// Evaporation rate preset for this variant
    pub fn default_rho(&self) -> f64 {
        match self {
            Self::SimpleAco => SIMPLE_ACO_RHO,
            Self::Mmas => MMAS_RHO,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SimpleAco => f.write_str("simple-aco"),
            Self::Mmas => f.write_str("mmas"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = AcoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "simpleaco" | "saco" => Ok(Self::SimpleAco),
            "mmas" | "maxmin" => Ok(Self::Mmas),
            _ => Err(AcoError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Objective pinned by the single-objective MMAS update
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoObjective {
    Cbo,
    Nac,
}

impl FromStr for SoObjective {
    type Err = AcoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "cbo" => Ok(Self::Cbo),
            "nac" => Ok(Self::Nac),
            _ => Err(AcoError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// How the MMAS representative path is chosen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PheromoneUpdate {
    /// Uniform pick from the first non-empty Pareto front
    ParetoBased,
    /// Best path of the colony for one objective
    SingleObjective(SoObjective),
}

impl FromStr for PheromoneUpdate {
    type Err = AcoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "paretobased" | "pareto" => Ok(Self::ParetoBased),
            "so" | "socbo" | "cbo" => Ok(Self::SingleObjective(SoObjective::Cbo)),
            "sonac" | "nac" => Ok(Self::SingleObjective(SoObjective::Nac)),
            _ => Err(AcoError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Which objectives contribute to deposits and elitism
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveSet {
    pub cbo: bool,
    pub nac: bool,
    pub atmr: bool,
}

impl ObjectiveSet {
    /// All three objectives enabled
    pub fn all() -> Self {
        Self {
            cbo: true,
            nac: true,
            atmr: true,
        }
    }

    /// Coupling only
    pub fn cbo_only() -> Self {
        Self {
            cbo: true,
            nac: false,
            atmr: false,
        }
    }

    /// True when no objective is enabled
    pub fn is_empty(&self) -> bool {
        !(self.cbo || self.nac || self.atmr)
    }
}

impl Default for ObjectiveSet {
    fn default() -> Self {
        Self::all()
    }
}

/// Run mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Periodic human evaluation adapts the weights
    Interactive,
    /// Unattended runs with fixed weights
    Batch,
}

impl FromStr for Mode {
    type Err = AcoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "interactive" => Ok(Self::Interactive),
            "batch" => Ok(Self::Batch),
            _ => Err(AcoError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// What happens when a reviewer does not answer in time
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutAction {
    /// Halt the search after the current iteration
    Stop,
    /// Continue without adapting the weights
    Skip,
}

/// Timeout contract of the interaction checkpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionPolicy {
    /// `None` waits indefinitely
    pub timeout: Option<Duration>,
    pub on_timeout: TimeoutAction,
}

impl Default for InteractionPolicy {
    fn default() -> Self {
        Self {
            timeout: None,
            on_timeout: TimeoutAction::Stop,
        }
    }
}

/// Complete configuration of one search run
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AcoConfig {
    pub algorithm: Algorithm,
    pub pheromone_update: PheromoneUpdate,
    pub objectives: ObjectiveSet,
    /// Fitness-proportionate evaporation instead of a uniform multiply
    pub evaporation_elitism: bool,
    /// Re-insert last iteration's best paths into the colony
    pub replacement_elitism: bool,
    /// Regenerate structurally invalid paths up to the attempt cap
    pub constraint_handling: bool,
    /// Exponent applied to pheromone when building the alpha table
    pub alpha: f64,
    /// Exponent applied to the weighted deposit amount
    pub mu: f64,
    /// Evaporation rate in [0, 1)
    pub rho: f64,
    pub number_of_ants: usize,
    pub number_of_iterations: usize,
    pub max_construction_attempts: usize,
    /// Value every pheromone entry starts at
    pub initial_pheromone: f64,
    pub interactive_interval_constant: f64,
    /// Weights an interactive run starts with, and falls back to
    pub initial_weights: Weights,
    /// Fixed weights of batch runs
    pub batch_weights: Weights,
    /// Also deposit class cohesion along per-class partial paths
    pub partial_solutions: bool,
    /// Label shown to the reviewer next to each design
    pub design_label: String,
    pub mode: Mode,
    pub interaction: InteractionPolicy,
}

impl Default for AcoConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Mmas,
            pheromone_update: PheromoneUpdate::SingleObjective(SoObjective::Cbo),
            objectives: ObjectiveSet::all(),
            evaporation_elitism: true,
            replacement_elitism: true,
            constraint_handling: true,
            alpha: DEFAULT_ALPHA,
            mu: DEFAULT_MU,
            rho: MMAS_RHO,
            number_of_ants: DEFAULT_NUMBER_OF_ANTS,
            number_of_iterations: DEFAULT_NUMBER_OF_ITERATIONS,
            max_construction_attempts: MAX_CONSTRUCTION_ATTEMPTS,
            initial_pheromone: 1.0,
            interactive_interval_constant: INTERACTIVE_INTERVAL_CONSTANT,
            initial_weights: Weights::cbo_only(),
            batch_weights: Weights::cbo_only(),
            partial_solutions: false,
            design_label: "design".to_string(),
            mode: Mode::Batch,
            interaction: InteractionPolicy::default(),
        }
    }
}

impl AcoConfig {
    /// MAX-MIN Ant System preset
    pub fn mmas() -> Self {
        Self::default()
    }

    /// Simple-ACO preset
    pub fn simple_aco() -> Self {
        Self {
            algorithm: Algorithm::SimpleAco,
            rho: SIMPLE_ACO_RHO,
            ..Self::default()
        }
    }

    /// Weights the run starts with
    pub fn starting_weights(&self) -> Weights {
        match self.mode {
            Mode::Interactive => self.initial_weights,
            Mode::Batch => self.batch_weights,
        }
    }

    /// Check every parameter; called before any iteration runs
    pub fn validate(&self) -> AcoResult<()> {
        let finite = [
            ("alpha", self.alpha),
            ("mu", self.mu),
            ("rho", self.rho),
            ("initial_pheromone", self.initial_pheromone),
            (
                "interactive_interval_constant",
                self.interactive_interval_constant,
            ),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AcoError::Configuration(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }

        if !(0.0..1.0).contains(&self.rho) {
            return Err(AcoError::Configuration(format!(
                "rho must lie in [0, 1), got {}",
                self.rho
            )));
        }
        if self.alpha <= 0.0 {
            return Err(AcoError::Configuration("alpha must be positive".into()));
        }
        if self.mu <= 0.0 {
            return Err(AcoError::Configuration("mu must be positive".into()));
        }
        if self.initial_pheromone <= 0.0 {
            return Err(AcoError::Configuration(
                "initial pheromone must be positive".into(),
            ));
        }
        if self.interactive_interval_constant < 0.0 {
            return Err(AcoError::Configuration(
                "interactive interval constant must not be negative".into(),
            ));
        }
        if self.number_of_ants == 0 {
            return Err(AcoError::Configuration(
                "number of ants must be positive".into(),
            ));
        }
        if self.number_of_iterations == 0 {
            return Err(AcoError::Configuration(
                "number of iterations must be positive".into(),
            ));
        }
        if self.max_construction_attempts == 0 {
            return Err(AcoError::Configuration(
                "at least one construction attempt is required".into(),
            ));
        }
        if self.objectives.is_empty() {
            return Err(AcoError::Configuration(
                "at least one objective must be enabled".into(),
            ));
        }

        // Single-objective MMAS uses its own local weights
        let weights_consumed = !matches!(
            (self.algorithm, self.pheromone_update),
            (Algorithm::Mmas, PheromoneUpdate::SingleObjective(_))
        ) || self.mode == Mode::Interactive;
        if weights_consumed {
            let weights = self.starting_weights();
            if !weights.is_normalised() {
                return Err(AcoError::Configuration(format!(
                    "starting weights {} must be non-negative and sum to 1",
                    weights
                )));
            }
        }

        Ok(())
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> AcoResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize this configuration to pretty-printed JSON
    pub fn to_json(&self) -> AcoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn normalise(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub mod prelude {
    pub use super::{
        AcoConfig, Algorithm, InteractionPolicy, Mode, ObjectiveSet, PheromoneUpdate, SoObjective,
        TimeoutAction,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_mmas_preset() {
        let config = AcoConfig::default();
        assert_eq!(config.algorithm, Algorithm::Mmas);
        assert_eq!(config.rho, MMAS_RHO);
        assert_eq!(config.alpha, 1.5);
        assert_eq!(config.mu, 3.0);
        assert_eq!(config.number_of_ants, 100);
        assert_eq!(config.number_of_iterations, 1000);
        assert_eq!(config.max_construction_attempts, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_simple_aco_preset() {
        let config = AcoConfig::simple_aco();
        assert_eq!(config.algorithm, Algorithm::SimpleAco);
        assert_eq!(config.rho, Algorithm::SimpleAco.default_rho());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AcoConfig::default();
        config.rho = 1.0;
        assert!(matches!(config.validate(), Err(AcoError::Configuration(_))));

        let mut config = AcoConfig::default();
        config.alpha = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = AcoConfig::default();
        config.number_of_ants = 0;
        assert!(config.validate().is_err());

        let mut config = AcoConfig::default();
        config.objectives = ObjectiveSet {
            cbo: false,
            nac: false,
            atmr: false,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_checks_consumed_weights() {
        let mut config = AcoConfig::simple_aco();
        config.batch_weights = Weights::new(0.5, 0.2, 0.2);
        assert!(config.validate().is_err());

        // single-objective MMAS in batch mode never reads the weights
        let mut config = AcoConfig::mmas();
        config.batch_weights = Weights::new(0.5, 0.2, 0.2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("MMAS".parse::<Algorithm>().unwrap(), Algorithm::Mmas);
        assert_eq!(
            "simple_aco".parse::<Algorithm>().unwrap(),
            Algorithm::SimpleAco
        );
        assert_eq!(
            "pareto-based".parse::<PheromoneUpdate>().unwrap(),
            PheromoneUpdate::ParetoBased
        );
        assert_eq!(
            "SO-NAC".parse::<PheromoneUpdate>().unwrap(),
            PheromoneUpdate::SingleObjective(SoObjective::Nac)
        );
        assert_eq!("Interactive".parse::<Mode>().unwrap(), Mode::Interactive);
        assert!(matches!(
            "genetic".parse::<Algorithm>(),
            Err(AcoError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_and_partial_documents() {
        let mut config = AcoConfig::simple_aco();
        config.pheromone_update = PheromoneUpdate::ParetoBased;
        config.interaction.timeout = Some(Duration::from_secs(30));
        let json = config.to_json().unwrap();
        let back = AcoConfig::from_json(&json).unwrap();
        assert_eq!(back.algorithm, Algorithm::SimpleAco);
        assert_eq!(back.pheromone_update, PheromoneUpdate::ParetoBased);
        assert_eq!(back.interaction.timeout, Some(Duration::from_secs(30)));

        let partial = AcoConfig::from_json(r#"{ "number_of_ants": 7 }"#).unwrap();
        assert_eq!(partial.number_of_ants, 7);
        assert_eq!(partial.algorithm, Algorithm::Mmas);

        assert!(matches!(
            AcoConfig::from_json(r#"{ "algorithm": "genetic" }"#),
            Err(AcoError::Serialization(_))
        ));
    }
}
