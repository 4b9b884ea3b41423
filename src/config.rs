use crate::error::{CompatError, Result};
use camera_compat_common::{RecommendOptions, MAX_RETENTION_DAYS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CATALOG_ENV: &str = "CAMERA_COMPAT_CATALOG";
const SPECS_ENV: &str = "CAMERA_COMPAT_SPECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 対応カメラ互換性リスト（CSV/Excel）
    pub catalog_path: Option<PathBuf>,
    /// スペック表（MP・チャンネル数）
    pub specs_path: Option<PathBuf>,
    /// 前処理で削除する英単語リスト（1行1語）
    pub word_list_path: Option<PathBuf>,
    pub retention_days: u32,
    /// カタログ先頭の読み飛ばし行数
    pub catalog_skip_rows: usize,
    pub max_iterations: usize,
    /// 結果キャッシュの保存先（省略時は ~/.cache/camera-compat）
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: None,
            specs_path: None,
            word_list_path: None,
            retention_days: 30,
            catalog_skip_rows: 5,
            max_iterations: RecommendOptions::default().max_iterations,
            cache_dir: None,
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
        self.validate()?;
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
            .ok_or_else(|| CompatError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("camera-compat").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.retention_days > MAX_RETENTION_DAYS {
            return Err(CompatError::Config(format!(
                "保存期間は{}日以下で指定してください: {}",
                MAX_RETENTION_DAYS, self.retention_days
            )));
        }
        if self.max_iterations == 0 {
            return Err(CompatError::Config("max_iterations は1以上で指定してください".into()));
        }
        Ok(())
    }

    /// カタログのパス（環境変数を優先）
    pub fn catalog_path(&self) -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CATALOG_ENV) {
            return Ok(PathBuf::from(path));
        }

        self.catalog_path.clone().ok_or(CompatError::MissingCatalog)
    }

    /// スペック表のパス（環境変数を優先）
    pub fn specs_path(&self) -> Option<PathBuf> {
        std::env::var(SPECS_ENV)
            .ok()
            .map(PathBuf::from)
            .or_else(|| self.specs_path.clone())
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        let base = dirs::cache_dir()
            .ok_or_else(|| CompatError::Config("キャッシュディレクトリが見つかりません".into()))?;
        Ok(base.join("camera-compat"))
    }

    pub fn recommend_options(&self) -> RecommendOptions {
        RecommendOptions {
            max_iterations: self.max_iterations,
        }
    }

    pub fn set_retention(&mut self, days: u32) -> Result<()> {
        self.retention_days = days;
        self.save()
    }

    pub fn set_catalog(&mut self, path: PathBuf) -> Result<()> {
        self.catalog_path = Some(path);
        self.save()
    }

    pub fn set_specs(&mut self, path: PathBuf) -> Result<()> {
        self.specs_path = Some(path);
        self.save()
    }
}
