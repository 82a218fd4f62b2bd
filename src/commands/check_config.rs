use anyhow::Result;
use std::path::Path;

use super::load_setup;

pub fn handle_check_config(config: Option<&Path>) -> Result<()> {
    let (config, performance) = load_setup(config)?;

    println!(
        "separation: {} {} s{}",
        config.separation_policy().name(),
        config.separation_sec,
        if config.wake_separation {
            format!(" (wake, minimum {} NM)", config.minimum_spacing_nm)
        } else {
            String::new()
        }
    );
    println!("advisory horizon: {} min", config.advisory_horizon_min);
    println!(
        "recompute every {} ms, stale after {} s",
        config.recompute_interval_ms, config.stale_after_sec
    );
    println!("aircraft types: {}", performance.len());
    for airport in &config.airports {
        let runways: Vec<&str> = airport.runways.iter().map(|r| r.id.as_str()).collect();
        println!(
            "{}: runways [{}], {} STARs",
            airport.icao,
            runways.join(", "),
            airport.stars.len()
        );
    }
    Ok(())
}
