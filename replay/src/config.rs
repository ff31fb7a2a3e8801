use anyhow::{Context, Result};
use confluence_scoring::ScoringConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub instruments: Vec<InstrumentConfig>,
    /// Print reports as JSON instead of text
    #[serde(default)]
    pub json_output: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentConfig {
    pub symbol: String,
    /// JSON array of samples, oldest first
    pub data_file: PathBuf,
    /// Scoring profile; built-in defaults when absent
    #[serde(default)]
    pub profile: Option<PathBuf>,
    /// Timeframe windows overriding the profile's
    #[serde(default)]
    pub windows: Option<Vec<usize>>,
}

impl Config {
    /// Load the replay config; relative paths resolve against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading replay config {}", path.display()))?;
        let mut config: Config = serde_yaml::from_str(&contents)?;

        if config.instruments.is_empty() {
            anyhow::bail!("replay config lists no instruments");
        }

        let root = path.parent().unwrap_or_else(|| Path::new("."));
        for instrument in &mut config.instruments {
            instrument.data_file = root.join(&instrument.data_file);
            if let Some(profile) = instrument.profile.take() {
                instrument.profile = Some(root.join(profile));
            }
        }
        Ok(config)
    }
}

impl InstrumentConfig {
    /// Scoring configuration for this instrument
    pub fn scoring_config(&self) -> Result<ScoringConfig> {
        match &self.profile {
            Some(path) => ScoringConfig::load(path)
                .with_context(|| format!("loading profile {} for {}", path.display(), self.symbol)),
            None => Ok(ScoringConfig::default()),
        }
    }
}
