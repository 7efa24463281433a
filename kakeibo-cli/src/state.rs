use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `~/.kakeibo`; holds config.toml only (no spending history is kept)
pub fn kakeibo_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("KAKEIBO_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".kakeibo"))
}

pub fn ensure_kakeibo_home() -> Result<PathBuf> {
    let dir = kakeibo_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Secrets come from the environment only, never from config.toml
#[derive(Clone)]
pub struct Credentials {
    pub line_channel_secret: String,
    pub line_channel_access_token: String,
    pub google_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            line_channel_secret: require_env("LINE_CHANNEL_SECRET")?,
            line_channel_access_token: require_env("LINE_CHANNEL_ACCESS_TOKEN")?,
            google_api_key: require_env("GOOGLE_API_KEY")?,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    let v = std::env::var(name).with_context(|| format!("{name} is not set"))?;
    if v.trim().is_empty() {
        anyhow::bail!("{name} is empty");
    }
    Ok(v)
}
