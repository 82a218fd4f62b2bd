use anyhow::{Context, Result, bail};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::navdata::Airport;
use crate::registration::validate_icao;
use crate::sequencer::{FixedSeparation, SeparationPolicy, WakeSeparation};

/// Top-level planner configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfigFile {
    /// Minimum time between two arrivals on the same runway
    #[serde(default = "default_separation_sec")]
    pub separation_sec: i64,
    #[serde(default = "default_minimum_spacing_nm")]
    pub minimum_spacing_nm: f64,
    /// Use wake turbulence distances instead of a fixed time
    #[serde(default)]
    pub wake_separation: bool,
    #[serde(default = "default_advisory_horizon_min")]
    pub advisory_horizon_min: i64,
    #[serde(default = "default_recompute_interval_ms")]
    pub recompute_interval_ms: u64,
    #[serde(default = "default_stale_after_sec")]
    pub stale_after_sec: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_file: Option<PathBuf>,
    #[serde(default)]
    pub airports: Vec<Airport>,
}

// Upper bounds that keep every derived duration and timestamp in range
const MAX_SEPARATION_SEC: i64 = 3_600;
const MAX_MINIMUM_SPACING_NM: f64 = 50.0;
const MAX_ADVISORY_HORIZON_MIN: i64 = 24 * 60;
const MAX_STALE_AFTER_SEC: i64 = 24 * 3_600;

fn default_separation_sec() -> i64 {
    90
}

fn default_minimum_spacing_nm() -> f64 {
    3.0
}

fn default_advisory_horizon_min() -> i64 {
    30
}

fn default_recompute_interval_ms() -> u64 {
    1000
}

fn default_stale_after_sec() -> i64 {
    5
}

impl Default for PlannerConfigFile {
    fn default() -> Self {
        Self {
            separation_sec: default_separation_sec(),
            minimum_spacing_nm: default_minimum_spacing_nm(),
            wake_separation: false,
            advisory_horizon_min: default_advisory_horizon_min(),
            recompute_interval_ms: default_recompute_interval_ms(),
            stale_after_sec: default_stale_after_sec(),
            performance_file: None,
            airports: Vec::new(),
        }
    }
}

impl PlannerConfigFile {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: PlannerConfigFile =
            toml::from_str(&contents).with_context(|| format!("Failed to parse {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid planner config {:?}", path))?;
        info!(
            "Loaded planner config from {:?} ({} airports)",
            path,
            config.airports.len()
        );
        Ok(config)
    }

    /// Save config to a TOML file (atomic: write to .tmp then rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        let tmp_path = path.with_extension("toml.tmp");
        std::fs::write(&tmp_path, &contents)
            .with_context(|| format!("Failed to write {:?}", tmp_path))?;
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to rename {:?} to {:?}", tmp_path, path))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SEPARATION_SEC).contains(&self.separation_sec) {
            bail!(
                "separation_sec must be between 1 and {}, got {}",
                MAX_SEPARATION_SEC,
                self.separation_sec
            );
        }
        if !(0.0..=MAX_MINIMUM_SPACING_NM).contains(&self.minimum_spacing_nm) {
            bail!(
                "minimum_spacing_nm must be between 0 and {}, got {}",
                MAX_MINIMUM_SPACING_NM,
                self.minimum_spacing_nm
            );
        }
        if !(0..=MAX_ADVISORY_HORIZON_MIN).contains(&self.advisory_horizon_min) {
            bail!(
                "advisory_horizon_min must be between 0 and {}, got {}",
                MAX_ADVISORY_HORIZON_MIN,
                self.advisory_horizon_min
            );
        }
        if !(0..=MAX_STALE_AFTER_SEC).contains(&self.stale_after_sec) {
            bail!(
                "stale_after_sec must be between 0 and {}, got {}",
                MAX_STALE_AFTER_SEC,
                self.stale_after_sec
            );
        }
        if self.recompute_interval_ms == 0 {
            bail!("recompute_interval_ms must be positive");
        }
        for airport in &self.airports {
            validate_icao(&airport.icao)?;
            for star in &airport.stars {
                if airport.runway(&star.runway).is_none() {
                    bail!(
                        "STAR {} at {} refers to unknown runway {}",
                        star.id,
                        airport.icao,
                        star.runway
                    );
                }
            }
        }
        Ok(())
    }

    pub fn separation_policy(&self) -> Arc<dyn SeparationPolicy> {
        if self.wake_separation {
            Arc::new(WakeSeparation {
                separation_sec: self.separation_sec,
                minimum_spacing_nm: self.minimum_spacing_nm,
            })
        } else {
            Arc::new(FixedSeparation {
                separation_sec: self.separation_sec,
            })
        }
    }

    pub fn advisory_horizon(&self) -> Duration {
        Duration::minutes(self.advisory_horizon_min)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::seconds(self.stale_after_sec)
    }

    pub fn recompute_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.recompute_interval_ms)
    }

    /// Airports keyed by ICAO code
    pub fn airports_by_icao(&self) -> HashMap<String, Airport> {
        self.airports
            .iter()
            .map(|airport| (airport.icao.clone(), airport.clone()))
            .collect()
    }
}

/// Resolve the planner config file path.
///
/// Priority:
/// 1. `AMAN_CONFIG` env var
/// 2. `/etc/amandman/planner.toml` (production/staging)
/// 3. `./planner.toml` (development)
pub fn planner_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("AMAN_CONFIG") {
        return PathBuf::from(path);
    }

    match std::env::var("AMAN_ENV").as_deref() {
        Ok("production") | Ok("staging") => PathBuf::from("/etc/amandman/planner.toml"),
        _ => PathBuf::from("./planner.toml"),
    }
}
