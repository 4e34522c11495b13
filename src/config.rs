use std::{fs, path::Path, str::FromStr, time::Duration};

use anyhow::{Context, Result, anyhow, ensure};
use serde::Deserialize;

use crate::{application::ticker::DEFAULT_TICK_INTERVAL, core::Target};

/// Optional YAML configuration for a countdown.
///
/// ```yaml
/// title: "Chakravyuha"
/// target: "2025-10-10T00:00:00"
/// tick_interval_ms: 1000
/// ```
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct CountdownConfig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub tick_interval_ms: Option<u64>,
}

impl CountdownConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let raw = fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read config file at {}", path_ref.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("Invalid configuration in {}", path_ref.display()))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml).context("Unable to parse config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            ensure!(!title.trim().is_empty(), "title must not be blank");
        }
        if let Some(raw) = &self.target {
            Target::parse(raw).context("target is not a valid instant")?;
        }
        if let Some(ms) = self.tick_interval_ms {
            ensure!(ms > 0, "tick_interval_ms must be > 0");
        }
        Ok(())
    }

    /// Merges command-line overrides on top of the file values.
    pub fn resolve(
        &self,
        cli_target: Option<&str>,
        cli_tick_ms: Option<u64>,
    ) -> Result<CountdownSettings> {
        let raw_target = cli_target.or(self.target.as_deref()).ok_or_else(|| {
            anyhow!("No target configured: pass --target or set `target` in the config file")
        })?;
        let target = Target::parse(raw_target)
            .with_context(|| format!("Could not resolve target '{raw_target}'"))?;

        let tick_ms = cli_tick_ms
            .or(self.tick_interval_ms)
            .unwrap_or(DEFAULT_TICK_INTERVAL.as_millis() as u64);
        ensure!(tick_ms > 0, "tick interval must be > 0 ms");

        Ok(CountdownSettings {
            target,
            title: self.title.clone(),
            tick_interval: Duration::from_millis(tick_ms),
        })
    }
}

impl FromStr for CountdownConfig {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_yaml_str(s)
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownSettings {
    pub target: Target,
    pub title: Option<String>,
    pub tick_interval: Duration,
}
