use anyhow::Error;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DatasetConfig {
    pub name: String,
    pub ratings: PathBuf,
    pub movies: PathBuf,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EngineConfig {
    pub min_common: usize,
    pub top_k_similar: usize,
    pub max_users: Option<usize>,
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HybridConfig {
    pub cf_weight: f64,
    pub cb_weight: f64,
    pub method: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EvaluationConfig {
    pub test_ratio: f64,
    pub min_ratings_per_user: usize,
    pub rating_threshold: f64,
    pub chunk_size: usize,
    pub seed: u64,
    pub sample_users: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    pub datasets: Vec<DatasetConfig>,
    pub engine: EngineConfig,
    pub hybrid: HybridConfig,
    pub evaluation: EvaluationConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let parsed: Self = toml::from_str(&contents)?;
        Ok(parsed)
    }

    pub fn dataset(&self, name: &str) -> Option<&DatasetConfig> {
        self.datasets.iter().find(|dataset| dataset.name == name)
    }
}
