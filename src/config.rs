//! Analysis configuration, read from an optional TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) reproduces the classic run:
//! 5% and 10% of the vertices removed by degree, Katz and eigenvector centrality.
//!
//! ```toml
//! [analysis]
//! fractions = [0.01, 0.05, 0.10]
//! strategies = ["degree", "betweenness"]
//! top = 5
//!
//! [katz]
//! alpha = 0.05
//! ```

use std::{fs, path::Path, thread};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    centrality::{EigenvectorParams, KatzParams},
    error::{Error, Result},
    histogram::DEFAULT_BINS,
    sabotage::{Removal, ScoreParams, Strategy},
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub eigenvector: EigenvectorParams,
    pub katz: KatzParams,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Shares of the vertices to remove, one attack per fraction and strategy.
    pub fractions: Vec<f64>,
    pub strategies: Vec<Strategy>,
    /// Worker threads for betweenness and closeness.
    pub threads: usize,
    pub histogram_bins: usize,
    /// How many of the highest ranked vertices to list per strategy.
    pub top: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fractions: vec![0.05, 0.10],
            strategies: vec![Strategy::Degree, Strategy::Katz, Strategy::Eigenvector],
            threads: thread::available_parallelism().map_or(1, |n| n.get()),
            histogram_bins: DEFAULT_BINS,
            top: 10,
        }
    }
}

impl Config {
    /// Reads a configuration file, filling in defaults for anything it leaves out.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Checks the values make sense together.
    pub fn validate(&self) -> Result<()> {
        for &fraction in &self.analysis.fractions {
            if !(fraction > 0.0 && fraction < 1.0) {
                return Err(Error::InvalidFraction(fraction));
            }
        }

        if self.analysis.strategies.is_empty() {
            return Err(Error::Config("at least one strategy is required".into()));
        }

        if self.katz.alpha <= 0.0 {
            return Err(Error::Config(format!(
                "katz alpha must be positive, got {}",
                self.katz.alpha
            )));
        }

        if self.eigenvector.tolerance <= 0.0 || self.katz.tolerance <= 0.0 {
            return Err(Error::Config("tolerances must be positive".into()));
        }

        Ok(())
    }

    /// One removal per distinct fraction, in the order given.
    pub fn removals(&self) -> impl Iterator<Item = Removal> + '_ {
        self.analysis
            .fractions
            .iter()
            .unique_by(|f| f.to_bits())
            .map(|&f| Removal::Fraction(f))
    }

    pub fn score_params(&self) -> ScoreParams {
        ScoreParams {
            eigenvector: self.eigenvector,
            katz: self.katz,
            threads: self.analysis.threads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.analysis.fractions, vec![0.05, 0.10]);
        assert_eq!(
            config.analysis.strategies,
            vec![Strategy::Degree, Strategy::Katz, Strategy::Eigenvector]
        );
        assert_eq!(config.katz.alpha, 0.1);
        assert_eq!(config.eigenvector.max_iter, 100);
        assert!(config.analysis.threads >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            fractions = [0.01]
            strategies = ["betweenness", "closeness"]

            [katz]
            alpha = 0.05
            "#,
        )
        .unwrap();

        assert_eq!(config.analysis.fractions, vec![0.01]);
        assert_eq!(
            config.analysis.strategies,
            vec![Strategy::Betweenness, Strategy::Closeness]
        );
        assert_eq!(config.analysis.histogram_bins, DEFAULT_BINS);
        assert_eq!(config.katz.alpha, 0.05);
        assert_eq!(config.katz.beta, 1.0);
        assert_eq!(config.eigenvector, EigenvectorParams::default());
    }

    #[test]
    fn empty_file() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.analysis.fractions, Config::default().analysis.fractions);
    }

    #[test]
    fn unknown_strategy() {
        assert!(toml::from_str::<Config>("[analysis]\nstrategies = [\"pagerank\"]").is_err());
    }

    #[test]
    fn validation() {
        let mut config = Config::default();
        config.analysis.fractions = vec![0.05, 1.0];
        assert!(matches!(config.validate(), Err(Error::InvalidFraction(_))));

        let mut config = Config::default();
        config.analysis.strategies.clear();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.katz.alpha = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn repeated_fractions_run_once() {
        let mut config = Config::default();
        config.analysis.fractions = vec![0.1, 0.05, 0.1, 0.05];

        let removals: Vec<Removal> = config.removals().collect();
        assert_eq!(
            removals,
            vec![Removal::Fraction(0.1), Removal::Fraction(0.05)]
        );
    }

    #[test]
    fn load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blackout.toml");
        fs::write(&path, "[analysis]\ntop = 3\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.analysis.top, 3);

        fs::write(&path, "[analysis\n").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::ConfigFile(_))));
    }
}
