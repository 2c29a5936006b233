//! Runtime configuration read from the environment.
//!
//! | Variable              | Meaning                                     |
//! |-----------------------|---------------------------------------------|
//! | `GREENBANK_DATA_DIR`  | directory holding the six rate tables       |
//! | `GREENBANK_LOG_FILE`  | enables logging to this file                |
//! | `GREENBANK_POLL_MS`   | input poll timeout, default 50              |
//! | `GREENBANK_HEADLESS`  | `1`/`true`: run without a real terminal     |

use std::path::PathBuf;

pub const DEFAULT_POLL_TIMEOUT_MS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub poll_timeout_ms: u32,
    pub headless: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_file: None,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            headless: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let poll_timeout_ms = match get("GREENBANK_POLL_MS") {
            Some(raw) => raw.trim().parse::<u32>().unwrap_or_else(|_| {
                log::warn!("GREENBANK_POLL_MS={raw:?} is not a number, using {DEFAULT_POLL_TIMEOUT_MS}");
                DEFAULT_POLL_TIMEOUT_MS
            }),
            None => DEFAULT_POLL_TIMEOUT_MS,
        };

        Self {
            data_dir: get("GREENBANK_DATA_DIR").map(PathBuf::from),
            log_file: get("GREENBANK_LOG_FILE").map(PathBuf::from),
            poll_timeout_ms,
            headless: get("GREENBANK_HEADLESS")
                .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
    }

    #[test]
    fn test_reads_every_variable() {
        let cfg = Config::from_lookup(lookup(&[
            ("GREENBANK_DATA_DIR", "/srv/tables"),
            ("GREENBANK_LOG_FILE", "/tmp/gb.log"),
            ("GREENBANK_POLL_MS", " 20 "),
            ("GREENBANK_HEADLESS", "TRUE"),
        ]));
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/srv/tables")));
        assert_eq!(cfg.log_file, Some(PathBuf::from("/tmp/gb.log")));
        assert_eq!(cfg.poll_timeout_ms, 20);
        assert!(cfg.headless);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let cfg = Config::from_lookup(lookup(&[
            ("GREENBANK_POLL_MS", "soon"),
            ("GREENBANK_HEADLESS", "yes please"),
            ("GREENBANK_DATA_DIR", "  "),
        ]));
        assert_eq!(cfg.poll_timeout_ms, DEFAULT_POLL_TIMEOUT_MS);
        assert!(!cfg.headless);
        assert_eq!(cfg.data_dir, None);
    }
}
