use crate::error::{ArtworkMatchError, Result};
use artwork_match_common::DEFAULT_TAG_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_image_size: u32,
    pub jpeg_quality: u8,
    pub describe_max_tokens: u32,
    pub choice_max_tokens: u32,
    pub classify_max_tokens: u32,
    pub tags_max_tokens: u32,
    pub tag_threshold: usize,
    pub timeout_seconds: u64,
    pub camera_index: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o".into(),
            base_url: "https://api.openai.com/v1".into(),
            max_image_size: 512,
            jpeg_quality: 85,
            describe_max_tokens: 300,
            choice_max_tokens: 20,
            classify_max_tokens: 20,
            tags_max_tokens: 300,
            tag_threshold: DEFAULT_TAG_THRESHOLD,
            timeout_seconds: 60,
            camera_index: 0,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ArtworkMatchError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("artwork-match").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_image_size == 0 {
            return Err(ArtworkMatchError::Config("max_image_size は1以上にしてください".into()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ArtworkMatchError::Config("jpeg_quality は1〜100で指定してください".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(ArtworkMatchError::Config("timeout_seconds は1以上にしてください".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// APIキーを取得（環境変数を優先）
    pub fn get_api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ArtworkMatchError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }
}

/// タグ一致閾値（明示指定 > 設定ファイル > 既定値）
///
/// オフライン判定用。明示指定があれば設定ファイルは読まず、読めなければ既定値で続行する
pub fn resolve_tag_threshold<F>(explicit: Option<usize>, load: F) -> usize
where
    F: FnOnce() -> Result<Config>,
{
    if let Some(threshold) = explicit {
        return threshold;
    }

    match load() {
        Ok(config) => config.tag_threshold,
        Err(e) => {
            tracing::warn!("設定ファイルを読めないため既定の閾値を使います: {}", e);
            DEFAULT_TAG_THRESHOLD
        }
    }
}
