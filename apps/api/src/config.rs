use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Where uploaded pictures are stored and served from under `/uploads`.
    pub upload_dir: PathBuf,
    /// Static front-end assets served at `/`.
    pub public_dir: PathBuf,
    /// Theme border banners (`<theme>-border.png`).
    pub theme_assets_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3002".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            upload_dir: env_path("UPLOAD_DIR", "uploads"),
            public_dir: env_path("PUBLIC_DIR", "public"),
            theme_assets_dir: env_path("THEME_ASSETS_DIR", "public/theme-assets"),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(value) => value
                    .parse::<usize>()
                    .with_context(|| format!("MAX_UPLOAD_BYTES must be a byte count, got '{value}'"))?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }

    /// Creates the upload and theme asset directories if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.upload_dir, &self.theme_assets_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory '{}'", dir.display()))?;
        }
        Ok(())
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dirs_creates_nested_paths() {
        let root = tempfile::tempdir().unwrap();
        let config = Config {
            port: 3002,
            rust_log: "info".to_string(),
            upload_dir: root.path().join("uploads"),
            public_dir: root.path().join("public"),
            theme_assets_dir: root.path().join("public/theme-assets"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        };
        config.ensure_dirs().unwrap();
        config.ensure_dirs().unwrap();
        assert!(config.upload_dir.is_dir());
        assert!(config.theme_assets_dir.is_dir());
    }
}
