use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const DATA_DIR_NAME: &str = ".timetable";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve the data directory (`~/.timetable` unless overridden) and make
/// sure it exists.
pub fn data_dir(base_dir: Option<PathBuf>) -> Result<PathBuf> {
    let path = match base_dir {
        Some(dir) => dir,
        None => {
            let home_dir = dirs::home_dir()
                .ok_or_else(|| anyhow!("Could not determine home directory"))?;
            home_dir.join(DATA_DIR_NAME)
        }
    };
    fs::create_dir_all(&path)?;
    Ok(path)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PeriodTime {
    pub start: String,
    pub end: String,
}

impl PeriodTime {
    fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

/// User settings, stored as `config.toml` in the data directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Shown under the title, e.g. "Fall 2025".
    pub term: String,
    /// Time range of periods 1..=6, in order.
    pub periods: Vec<PeriodTime>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            term: "Fall 2025".to_string(),
            periods: vec![
                PeriodTime::new("09:25", "10:55"),
                PeriodTime::new("10:55", "13:00"),
                PeriodTime::new("13:00", "14:30"),
                PeriodTime::new("14:45", "16:15"),
                PeriodTime::new("16:30", "18:00"),
                PeriodTime::new("18:10", "19:40"),
            ],
        }
    }
}

impl Config {
    /// Read the config from `dir`, writing the defaults out first if the file
    /// does not exist yet.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let cfg = toml::from_str(&contents)
                .with_context(|| format!("Invalid config file {}", path.display()))?;
            Ok(cfg)
        } else {
            debug!(path = %path.display(), "writing default config");
            let cfg = Self::default();
            cfg.save(dir)?;
            Ok(cfg)
        }
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::create_dir_all(dir)?;
        fs::write(dir.join(CONFIG_FILE_NAME), contents)?;
        Ok(())
    }

    /// "09:25-10:55" style label for a period, empty when not configured.
    pub fn period_label(&self, period: u8) -> String {
        (period as usize)
            .checked_sub(1)
            .and_then(|i| self.periods.get(i))
            .map(|p| format!("{}-{}", p.start, p.end))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "term = \"Spring 2026\"\n").unwrap();

        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.term, "Spring 2026");
        assert_eq!(cfg.periods.len(), 6);
    }

    #[test]
    fn test_period_label() {
        let cfg = Config::default();
        assert_eq!(cfg.period_label(1), "09:25-10:55");
        assert_eq!(cfg.period_label(6), "18:10-19:40");
        assert_eq!(cfg.period_label(0), "");
        assert_eq!(cfg.period_label(7), "");
    }
}
