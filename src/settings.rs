use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SicoError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_base_dir")]
    pub base_dir: String,
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: String,
    /// Source-locale month abbreviations that differ from the English ones.
    #[serde(default = "default_month_aliases")]
    pub month_aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub strict_months: bool,
}

fn default_base_dir() -> String {
    home().join("git").join("covid-19-pt-data").to_string_lossy().to_string()
}

fn default_downloads_dir() -> String {
    home().join("Downloads").to_string_lossy().to_string()
}

pub fn default_month_aliases() -> BTreeMap<String, String> {
    [
        ("Fev", "Feb"),
        ("Abr", "Apr"),
        ("Mai", "May"),
        ("Ago", "Aug"),
        ("Set", "Sep"),
        ("Out", "Oct"),
        ("Dez", "Dec"),
    ]
    .into_iter()
    .map(|(pt, en)| (pt.to_string(), en.to_string()))
    .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            downloads_dir: default_downloads_dir(),
            month_aliases: default_month_aliases(),
            strict_months: false,
        }
    }
}

impl Settings {
    pub fn base_path(&self) -> PathBuf {
        PathBuf::from(&self.base_dir)
    }

    pub fn downloads_path(&self) -> PathBuf {
        PathBuf::from(&self.downloads_dir)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.base_path().join("archive")
    }
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn config_dir() -> PathBuf {
    home().join(".config").join("sico")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SicoError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_path() -> PathBuf {
    settings_path()
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            base_dir: "/tmp/data".to_string(),
            downloads_dir: "/tmp/downloads".to_string(),
            month_aliases: default_month_aliases(),
            strict_months: true,
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.base_dir, "/tmp/data");
        assert_eq!(loaded.downloads_dir, "/tmp/downloads");
        assert!(loaded.strict_months);
        assert_eq!(loaded.month_aliases.get("Dez").map(String::as_str), Some("Dec"));
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.base_dir.ends_with("covid-19-pt-data"));
        assert!(s.downloads_dir.ends_with("Downloads"));
        assert_eq!(s.month_aliases.len(), 7);
        assert!(!s.strict_months);
        assert_eq!(s.archive_path(), s.base_path().join("archive"));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"base_dir": "/srv/data"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.base_dir, "/srv/data");
        assert_eq!(s.month_aliases, default_month_aliases());
        assert!(!s.strict_months);
    }

    #[test]
    fn test_shellexpand_tilde() {
        let expanded = shellexpand_path("~/Downloads");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("Downloads"));
    }
}
