// src/config.rs
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

const ENV_PATH: &str = "RECEPTION_CONFIG";
const DEFAULT_PATH: &str = "config/pipeline.toml";
const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}
fn default_refetch_window_secs() -> u64 {
    86_400
}
fn default_english_only() -> bool {
    true
}
fn default_shuffle_seed() -> u64 {
    42
}
fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("data/checkpoints")
}
fn default_store_capacity() -> usize {
    4096
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Stored predictions older than this are refetched on request.
    #[serde(default = "default_refetch_window_secs")]
    pub refetch_window_secs: u64,
    /// Drop rows the lexicon never touches when building training frames.
    #[serde(default = "default_english_only")]
    pub english_only_training: bool,
    #[serde(default = "default_shuffle_seed")]
    pub shuffle_seed: u64,
    /// Trained model artifact. The server falls back to sentiment
    /// thresholds when unset; the trainer writes its output here.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,
    #[serde(default = "default_store_capacity")]
    pub store_capacity: usize,
    /// "ENV" (or unset) means: read YOUTUBE_API_KEY at startup.
    #[serde(default)]
    pub youtube_api_key: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            refetch_window_secs: default_refetch_window_secs(),
            english_only_training: default_english_only(),
            shuffle_seed: default_shuffle_seed(),
            model_path: None,
            checkpoint_dir: default_checkpoint_dir(),
            store_capacity: default_store_capacity(),
            youtube_api_key: None,
        }
    }
}

impl PipelineConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: PipelineConfig = toml::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Load using env var + fallbacks:
    /// 1) $RECEPTION_CONFIG
    /// 2) config/pipeline.toml
    /// 3) built-in defaults
    pub fn load() -> Result<Self> {
        if let Ok(p) = env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from_file(&pb);
            }
            bail!("RECEPTION_CONFIG points to non-existent path");
        }
        let default_p = PathBuf::from(DEFAULT_PATH);
        if default_p.exists() {
            return Self::load_from_file(&default_p);
        }
        Ok(Self::default())
    }

    fn sanitized(mut self) -> Self {
        // A zero window would refetch on every request.
        if self.refetch_window_secs == 0 {
            self.refetch_window_secs = default_refetch_window_secs();
        }
        self
    }

    /// Resolve the API key: an explicit config value wins, "ENV" or absence
    /// defers to the environment. `None` means no live source is available.
    pub fn api_key(&self) -> Option<String> {
        match self.youtube_api_key.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() && !value.eq_ignore_ascii_case("env") => {
                Some(value.to_string())
            }
            _ => env::var(API_KEY_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}
