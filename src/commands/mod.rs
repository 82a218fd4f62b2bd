pub mod check_config;
pub mod replay;
pub mod serve;

pub use check_config::handle_check_config;
pub use replay::handle_replay;
pub use serve::handle_serve;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use amandman::performance::PerformanceTable;
use amandman::{PlannerConfigFile, planner_config_path};

/// Load the planner config and the performance data it points to
pub fn load_setup(config: Option<&Path>) -> Result<(PlannerConfigFile, Arc<PerformanceTable>)> {
    let path: PathBuf = config.map(Path::to_path_buf).unwrap_or_else(planner_config_path);
    let config = PlannerConfigFile::load(&path)?;

    let performance = match &config.performance_file {
        Some(file) => PerformanceTable::load_csv(file)?,
        None => {
            warn!("No performance_file configured, every arrival will lack performance data");
            PerformanceTable::default()
        }
    };
    info!(
        "Planner setup: {} airports, {} aircraft types",
        config.airports.len(),
        performance.len()
    );
    Ok((config, Arc::new(performance)))
}
