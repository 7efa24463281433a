use anyhow::{Context, Result};
use kakeibo_core::{CategoryDictionary, CategoryEntry};
use kakeibo_finance::ReplyFormatter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_kakeibo_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub reply: ReplyFormatter,
    #[serde(default)]
    pub ocr: OcrSection,
    #[serde(default)]
    pub line: LineSection,
    #[serde(default)]
    pub logging: LoggingSection,

    /// Replaces the built-in category table when non-empty; order matters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub webhook_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSection {
    /// Vision API base URL
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineSection {
    pub api_base: String,
    /// Message content (images) is served from a separate host
    pub data_api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Used when RUST_LOG is unset
    pub level: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            webhook_path: "/webhook".to_string(),
        }
    }
}

impl Default for OcrSection {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for LineSection {
    fn default() -> Self {
        Self {
            api_base: "https://api.line.me".to_string(),
            data_api_base: "https://api-data.line.me".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Category table: configured entries, else the built-in one
    pub fn dictionary(&self) -> Result<CategoryDictionary> {
        if self.categories.is_empty() {
            return Ok(CategoryDictionary::default());
        }
        CategoryDictionary::new(self.categories.clone()).context("invalid [[categories]] in config")
    }

    /// `PORT` (set by most PaaS hosts) wins over the file
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port: {port:?}"))?;
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_kakeibo_home()?.join("config.toml"))
}

/// Load from `path` (or the default location); defaults when the file is absent.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: Option<&Path>) -> Result<()> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let mut cfg = Config::default();
    cfg.categories = CategoryDictionary::default().entries().to_vec();
    save_config(&cfg, &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.webhook_path, "/webhook");
        assert!(!cfg.reply.include_raw_text);
        assert_eq!(cfg.dictionary().unwrap(), CategoryDictionary::default());
    }

    #[test]
    fn test_partial_sections() {
        let cfg = parse_config(
            r#"
[server]
port = 8080

[reply]
include_raw_text = true
"#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert!(cfg.reply.include_raw_text);
        assert!(!cfg.reply.list_items);
        assert_eq!(cfg.ocr.timeout_secs, 30);
    }

    #[test]
    fn test_custom_categories_keep_order() {
        let cfg = parse_config(
            r#"
[[categories]]
label = "外食"
keywords = ["ランチ", "定食"]

[[categories]]
label = "食費"
keywords = ["パン"]
"#,
        )
        .unwrap();
        let dict = cfg.dictionary().unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.entries()[0].label, "外食");
    }

    #[test]
    fn test_invalid_categories_rejected() {
        let cfg = parse_config(
            r#"
[[categories]]
label = "食費"
keywords = [""]
"#,
        )
        .unwrap();
        assert!(cfg.dictionary().is_err());
    }

    #[test]
    fn test_roundtrip_with_default_table() {
        let mut cfg = Config::default();
        cfg.categories = CategoryDictionary::default().entries().to_vec();
        let s = toml::to_string_pretty(&cfg).unwrap();
        let back = parse_config(&s).unwrap();
        assert_eq!(back.dictionary().unwrap(), CategoryDictionary::default());
    }
}
