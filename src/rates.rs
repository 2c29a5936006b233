//! Borrowing-rate lookup tables.
//!
//! Four tables grade the vehicle (energy, kilometers, vehicle type, assembly
//! year); the summed grade picks a base rate, and the passenger count adds a
//! final adjustment. Threshold tables are sorted numerically when loaded,
//! so the order of keys in the JSON files does not matter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

pub const ENERGY_TABLE: &str = "energy_grades.json";
pub const KILOMETER_TABLE: &str = "kilometer_grades.json";
pub const VEHICLE_TABLE: &str = "vehicle_grades.json";
pub const YEAR_TABLE: &str = "year_grades.json";
pub const BASE_RATE_TABLE: &str = "base_borrowing_rates.json";
pub const PASSENGER_TABLE: &str = "passenger_borrowing_rates.json";

#[derive(Error, Debug)]
pub enum RateError {
    #[error("no entry for {key:?} in {table}")]
    LookupMiss { table: &'static str, key: String },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {table}: {source}")]
    Parse {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("threshold {key:?} in {table} is not a number")]
    BadThreshold { table: &'static str, key: String },
}

/// Validated form values handed to the calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleProfile {
    pub energy: String,
    pub kilometers: u32,
    pub car_type: String,
    pub year: i32,
    pub passenger_count: u8,
}

pub trait RateCalculator {
    /// Borrowing rate, in percent.
    fn borrowing_rate(&self, profile: &VehicleProfile) -> Result<f64, RateError>;
}

// ============================================================================
// Tables
// ============================================================================

#[derive(Debug, Clone)]
struct KeyedTable<V> {
    name: &'static str,
    entries: HashMap<String, V>,
}

impl<V: Copy> KeyedTable<V> {
    fn get(&self, key: &str) -> Result<V, RateError> {
        self.entries
            .get(key)
            .copied()
            .ok_or_else(|| RateError::LookupMiss {
                table: self.name,
                key: key.to_string(),
            })
    }
}

/// Entries sorted by ascending threshold.
#[derive(Debug, Clone)]
struct ThresholdTable<V> {
    name: &'static str,
    entries: Vec<(f64, V)>,
}

impl<V: Copy> ThresholdTable<V> {
    fn miss(&self, probe: f64) -> RateError {
        RateError::LookupMiss {
            table: self.name,
            key: probe.to_string(),
        }
    }

    /// Value of the first threshold accepted by `accept`.
    fn first(&self, probe: f64, accept: impl Fn(f64, f64) -> bool) -> Result<V, RateError> {
        self.entries
            .iter()
            .find(|(threshold, _)| accept(probe, *threshold))
            .map(|(_, v)| *v)
            .ok_or_else(|| self.miss(probe))
    }

    /// Like `first`, but a probe past every threshold falls into the last
    /// band. Only an empty table misses.
    fn first_or_last(&self, probe: f64, accept: impl Fn(f64, f64) -> bool) -> Result<V, RateError> {
        self.entries
            .iter()
            .find(|(threshold, _)| accept(probe, *threshold))
            .or_else(|| self.entries.last())
            .map(|(_, v)| *v)
            .ok_or_else(|| self.miss(probe))
    }
}

fn parse_keyed<V: DeserializeOwned>(
    name: &'static str,
    json: &str,
) -> Result<KeyedTable<V>, RateError> {
    let entries = serde_json::from_str(json).map_err(|source| RateError::Parse {
        table: name,
        source,
    })?;
    Ok(KeyedTable { name, entries })
}

fn parse_thresholds<V: DeserializeOwned>(
    name: &'static str,
    json: &str,
) -> Result<ThresholdTable<V>, RateError> {
    let raw: HashMap<String, V> = serde_json::from_str(json).map_err(|source| RateError::Parse {
        table: name,
        source,
    })?;
    let mut entries = raw
        .into_iter()
        .map(|(key, value)| match key.trim().parse::<f64>() {
            Ok(t) if t.is_finite() => Ok((t, value)),
            _ => Err(RateError::BadThreshold { table: name, key }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(ThresholdTable { name, entries })
}

#[derive(Debug, Clone)]
pub struct RateTables {
    energy: KeyedTable<i64>,
    kilometers: ThresholdTable<i64>,
    vehicle: KeyedTable<i64>,
    year: ThresholdTable<i64>,
    base_rates: ThresholdTable<f64>,
    passengers: KeyedTable<f64>,
}

impl RateTables {
    /// Build from a source that returns the JSON text of a table by file name.
    pub fn from_source(
        mut read: impl FnMut(&'static str) -> Result<String, RateError>,
    ) -> Result<Self, RateError> {
        Ok(Self {
            energy: parse_keyed(ENERGY_TABLE, &read(ENERGY_TABLE)?)?,
            kilometers: parse_thresholds(KILOMETER_TABLE, &read(KILOMETER_TABLE)?)?,
            vehicle: parse_keyed(VEHICLE_TABLE, &read(VEHICLE_TABLE)?)?,
            year: parse_thresholds(YEAR_TABLE, &read(YEAR_TABLE)?)?,
            base_rates: parse_thresholds(BASE_RATE_TABLE, &read(BASE_RATE_TABLE)?)?,
            passengers: parse_keyed(PASSENGER_TABLE, &read(PASSENGER_TABLE)?)?,
        })
    }

    /// Tables shipped inside the binary.
    pub fn embedded() -> Result<Self, RateError> {
        Self::from_source(|name| {
            let json = match name {
                ENERGY_TABLE => include_str!("../data/energy_grades.json"),
                KILOMETER_TABLE => include_str!("../data/kilometer_grades.json"),
                VEHICLE_TABLE => include_str!("../data/vehicle_grades.json"),
                YEAR_TABLE => include_str!("../data/year_grades.json"),
                BASE_RATE_TABLE => include_str!("../data/base_borrowing_rates.json"),
                PASSENGER_TABLE => include_str!("../data/passenger_borrowing_rates.json"),
                _ => "{}",
            };
            Ok(json.to_string())
        })
    }

    /// Tables read from `dir`, one JSON file per table.
    pub fn load_dir(dir: &Path) -> Result<Self, RateError> {
        log::info!("loading rate tables from {}", dir.display());
        Self::from_source(|name| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| RateError::Io { path, source })
        })
    }

    /// Sum of the four grades. The top year band is open-ended, since
    /// assembly years are only bounded below.
    pub fn grade(&self, profile: &VehicleProfile) -> Result<i64, RateError> {
        let energy = self.energy.get(&profile.energy)?;
        let kilometers = self
            .kilometers
            .first(profile.kilometers as f64 / 1000.0, |km, t| km < t)?;
        let vehicle = self.vehicle.get(&profile.car_type)?;
        let year = self
            .year
            .first_or_last(profile.year as f64, |year, t| year < t)?;
        Ok(energy + kilometers + vehicle + year)
    }

    pub fn base_borrowing_rate(&self, profile: &VehicleProfile) -> Result<f64, RateError> {
        let grade = self.grade(profile)?;
        self.base_rates.first(grade as f64, |g, t| g <= t)
    }
}

impl RateCalculator for RateTables {
    fn borrowing_rate(&self, profile: &VehicleProfile) -> Result<f64, RateError> {
        let base = self.base_borrowing_rate(profile)?;
        let addition = self.passengers.get(&profile.passenger_count.to_string())?;
        Ok(base + addition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{CAR_TYPE_OPTIONS, ENERGY_OPTIONS};

    fn profile() -> VehicleProfile {
        VehicleProfile {
            energy: "Diesel".to_string(),
            kilometers: 12000,
            car_type: "Berline".to_string(),
            year: 2015,
            passenger_count: 2,
        }
    }

    #[test]
    fn test_embedded_tables_compute_rate() {
        let tables = RateTables::embedded().unwrap();
        let p = profile();
        // Diesel 4 + 12 000 km 7 + Berline 6 + 2015 7.
        assert_eq!(tables.grade(&p).unwrap(), 24);
        assert!((tables.base_borrowing_rate(&p).unwrap() - 2.52).abs() < 1e-9);
        assert!((tables.borrowing_rate(&p).unwrap() - 2.69).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_boundaries_are_strict_for_grades() {
        let tables = RateTables::embedded().unwrap();
        let mut p = profile();
        // 10 000 km is not below the "10" threshold.
        p.kilometers = 10000;
        let at = tables.grade(&p).unwrap();
        p.kilometers = 9999;
        let below = tables.grade(&p).unwrap();
        assert_eq!(below - at, 2);

        p.kilometers = 30000;
        assert!(tables.grade(&p).is_ok());
    }

    #[test]
    fn test_thresholds_sorted_numerically() {
        // Lexicographic order would put "100" before "20".
        let table: ThresholdTable<i64> =
            parse_thresholds("t", r#"{"100": 3, "20": 2, "5": 1}"#).unwrap();
        let keys: Vec<f64> = table.entries.iter().map(|(t, _)| *t).collect();
        assert_eq!(keys, vec![5.0, 20.0, 100.0]);
        assert_eq!(table.first(30.0, |v, t| v < t).unwrap(), 3);
    }

    #[test]
    fn test_year_past_last_threshold_takes_top_band() {
        let tables = RateTables::embedded().unwrap();
        let mut p = profile();
        p.year = 9999;
        let below = tables.grade(&p).unwrap();
        for year in [10000, 12345, i32::MAX] {
            p.year = year;
            assert_eq!(tables.grade(&p).unwrap(), below, "year {year}");
            assert!(tables.borrowing_rate(&p).is_ok(), "year {year}");
        }

        let empty: ThresholdTable<i64> = parse_thresholds("t", "{}").unwrap();
        assert!(matches!(
            empty.first_or_last(1.0, |v, t| v < t),
            Err(RateError::LookupMiss { table: "t", .. })
        ));
    }

    #[test]
    fn test_every_accepted_profile_has_a_rate() {
        let tables = RateTables::embedded().unwrap();
        for energy in ENERGY_OPTIONS {
            for car_type in CAR_TYPE_OPTIONS {
                for kilometers in [5000, 9999, 10000, 29999, 30000] {
                    for year in [1960, 1969, 1970, 2019, 2020, 10000, i32::MAX] {
                        for passenger_count in 1..=4 {
                            let p = VehicleProfile {
                                energy: energy.to_string(),
                                kilometers,
                                car_type: car_type.to_string(),
                                year,
                                passenger_count,
                            };
                            if let Err(e) = tables.borrowing_rate(&p) {
                                panic!("{p:?}: {e}");
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_lookup_miss_is_reported() {
        let tables = RateTables::embedded().unwrap();
        let mut p = profile();
        p.energy = "Charbon".to_string();
        match tables.borrowing_rate(&p) {
            Err(RateError::LookupMiss { table, key }) => {
                assert_eq!(table, ENERGY_TABLE);
                assert_eq!(key, "Charbon");
            }
            other => panic!("expected LookupMiss, got {other:?}"),
        }

        let mut p = profile();
        p.passenger_count = 9;
        assert!(matches!(
            tables.borrowing_rate(&p),
            Err(RateError::LookupMiss {
                table: PASSENGER_TABLE,
                ..
            })
        ));
    }

    #[test]
    fn test_bad_threshold_and_bad_json() {
        assert!(matches!(
            parse_thresholds::<i64>("t", r#"{"abc": 1}"#),
            Err(RateError::BadThreshold { .. })
        ));
        assert!(matches!(
            parse_keyed::<i64>("t", "not json"),
            Err(RateError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_dir_reads_every_table() {
        let dir = tempfile::tempdir().unwrap();
        let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        for name in [
            ENERGY_TABLE,
            KILOMETER_TABLE,
            VEHICLE_TABLE,
            YEAR_TABLE,
            BASE_RATE_TABLE,
            PASSENGER_TABLE,
        ] {
            std::fs::copy(src.join(name), dir.path().join(name)).unwrap();
        }
        // Override one table to prove the directory copy is used.
        std::fs::write(dir.path().join(PASSENGER_TABLE), r#"{"2": 1.0}"#).unwrap();

        let tables = RateTables::load_dir(dir.path()).unwrap();
        assert!((tables.borrowing_rate(&profile()).unwrap() - 3.52).abs() < 1e-9);
    }

    #[test]
    fn test_load_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        match RateTables::load_dir(dir.path()) {
            Err(RateError::Io { path, .. }) => assert!(path.ends_with(ENERGY_TABLE)),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
