use anyhow::{Context, Result};
use csv::Reader;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

use crate::airspeed::{mach_to_ias, standard_temperature_c, tas_to_ias};

/// Fallback rate of descent when the performance sheet has no figures at all
const DEFAULT_DESCENT_RATE_FPM: f64 = 1000.0;
/// IAS ceiling applied below FL100
const LOW_ALTITUDE_IAS_CAP_KT: f64 = 240.0;

/// ICAO wake turbulence category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WakeCategory {
    #[serde(rename = "L")]
    Light,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "H")]
    Heavy,
    #[serde(rename = "J")]
    Super,
}

impl fmt::Display for WakeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            WakeCategory::Light => "L",
            WakeCategory::Medium => "M",
            WakeCategory::Heavy => "H",
            WakeCategory::Super => "J",
        };
        write!(f, "{}", code)
    }
}

/// Descent performance for one aircraft type.
///
/// Rates of descent are in feet per minute and speeds in knots IAS. Missing
/// rates fall back to the neighbouring altitude band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftPerformance {
    pub icao_type: String,
    pub wake_category: WakeCategory,
    pub initial_descent_mach: Option<f64>,
    pub initial_descent_rod_fpm: Option<f64>,
    pub descent_rod_fpm: Option<f64>,
    pub approach_rod_fpm: Option<f64>,
    pub descent_ias_kt: f64,
    pub approach_ias_kt: f64,
    pub landing_vat_kt: f64,
}

impl AircraftPerformance {
    fn rod_above_fl240(&self) -> f64 {
        self.initial_descent_rod_fpm
            .or(self.descent_rod_fpm)
            .or(self.approach_rod_fpm)
            .unwrap_or(DEFAULT_DESCENT_RATE_FPM)
    }

    fn rod_fl100_to_fl240(&self) -> f64 {
        self.descent_rod_fpm
            .or(self.approach_rod_fpm)
            .or(self.initial_descent_rod_fpm)
            .unwrap_or(DEFAULT_DESCENT_RATE_FPM)
    }

    fn rod_below_fl100(&self) -> f64 {
        self.approach_rod_fpm
            .or(self.descent_rod_fpm)
            .or(self.initial_descent_rod_fpm)
            .unwrap_or(DEFAULT_DESCENT_RATE_FPM)
    }

    /// Expected rate of descent at the given altitude in feet per minute
    ///
    /// # Arguments
    /// * `altitude_ft` - Current altitude in feet
    ///
    /// # Returns
    /// Approach rate below 10 000 ft, a blend towards the descent rate up to
    /// 24 000 ft, and a blend towards the initial descent rate over the next
    /// 10 000 ft.
    pub fn descent_rate_fpm(&self, altitude_ft: f64) -> f64 {
        let low = self.rod_below_fl100();
        let mid = self.rod_fl100_to_fl240();
        let high = self.rod_above_fl240();

        if altitude_ft < 10_000.0 {
            low
        } else if altitude_ft < 24_000.0 {
            let ratio = (altitude_ft - 10_000.0) / 14_000.0;
            (1.0 - ratio) * low + ratio * mid
        } else {
            let ratio = ((altitude_ft - 24_000.0).min(10_000.0)) / 10_000.0;
            (1.0 - ratio) * mid + ratio * high
        }
    }

    /// IAS the aircraft would normally fly at the given altitude
    ///
    /// # Arguments
    /// * `altitude_ft` - Altitude in feet
    /// * `temperature_c` - Outside air temperature, ISA when unknown
    /// * `flight_plan_tas` - Filed cruise true airspeed, used for the Mach-hold segment
    pub fn preferred_ias(
        &self,
        altitude_ft: f64,
        temperature_c: Option<f64>,
        flight_plan_tas: Option<f64>,
    ) -> f64 {
        let temperature = temperature_c.unwrap_or_else(|| standard_temperature_c(altitude_ft));

        let mach_ias = flight_plan_tas
            .and_then(|tas| tas_to_ias(tas, altitude_ft, temperature).ok())
            .or_else(|| {
                self.initial_descent_mach
                    .and_then(|mach| mach_to_ias(mach, altitude_ft).ok())
            })
            .unwrap_or(self.descent_ias_kt);

        if altitude_ft > 30_000.0 {
            mach_ias
        } else if altitude_ft >= 28_000.0 {
            let ratio = (30_000.0 - altitude_ft) / 2_000.0;
            mach_ias * (1.0 - ratio) + self.descent_ias_kt * ratio
        } else if altitude_ft >= 10_000.0 {
            self.descent_ias_kt
        } else if altitude_ft >= 5_000.0 {
            let ratio = (altitude_ft - 5_000.0) / 5_000.0;
            ((1.0 - ratio) * self.approach_ias_kt + ratio * self.descent_ias_kt)
                .min(LOW_ALTITUDE_IAS_CAP_KT)
        } else {
            let ratio = (altitude_ft / 5_000.0).max(0.0);
            ((1.0 - ratio) * self.landing_vat_kt + ratio * self.approach_ias_kt)
                .min(LOW_ALTITUDE_IAS_CAP_KT)
        }
    }
}

/// Source of aircraft performance data, keyed by ICAO type designator
pub trait PerformanceLookup: Send + Sync {
    fn performance(&self, icao_type: &str) -> Option<&AircraftPerformance>;
}

/// One row of the performance CSV
#[derive(Debug, Deserialize)]
struct PerformanceRecord {
    icao_type: String,
    wake_category: WakeCategory,
    initial_descent_mach: Option<f64>,
    initial_descent_rod_fpm: Option<f64>,
    descent_rod_fpm: Option<f64>,
    approach_rod_fpm: Option<f64>,
    descent_ias_kt: f64,
    approach_ias_kt: f64,
    landing_vat_kt: f64,
}

impl From<PerformanceRecord> for AircraftPerformance {
    fn from(record: PerformanceRecord) -> Self {
        AircraftPerformance {
            icao_type: record.icao_type.trim().to_uppercase(),
            wake_category: record.wake_category,
            initial_descent_mach: record.initial_descent_mach,
            initial_descent_rod_fpm: record.initial_descent_rod_fpm,
            descent_rod_fpm: record.descent_rod_fpm,
            approach_rod_fpm: record.approach_rod_fpm,
            descent_ias_kt: record.descent_ias_kt,
            approach_ias_kt: record.approach_ias_kt,
            landing_vat_kt: record.landing_vat_kt,
        }
    }
}

/// In-memory performance table
#[derive(Debug, Clone, Default)]
pub struct PerformanceTable {
    by_type: HashMap<String, AircraftPerformance>,
}

impl PerformanceTable {
    pub fn new(entries: impl IntoIterator<Item = AircraftPerformance>) -> Self {
        let by_type = entries
            .into_iter()
            .map(|entry| (entry.icao_type.to_uppercase(), entry))
            .collect();
        Self { by_type }
    }

    /// Load the table from a CSV file with a header row
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open performance file: {}", path.display()))?;
        let table = Self::from_csv_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse performance file: {}", path.display()))?;
        info!(
            "Loaded performance data for {} aircraft types from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = Reader::from_reader(reader);
        let mut entries = Vec::new();
        for (index, result) in csv_reader.deserialize().enumerate() {
            let record: PerformanceRecord = result
                .with_context(|| format!("Invalid performance record at row {}", index + 1))?;
            if record.icao_type.trim().is_empty() {
                warn!("Skipping performance record {} without a type", index + 1);
                continue;
            }
            entries.push(AircraftPerformance::from(record));
        }
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl PerformanceLookup for PerformanceTable {
    fn performance(&self, icao_type: &str) -> Option<&AircraftPerformance> {
        self.by_type.get(&icao_type.trim().to_uppercase())
    }
}
