//! 照合結果キャッシュモジュール
//!
//! サイト名をキーにして照合結果と推奨結果を保存し、
//! 入力ファイルとチェック条件が同じなら再計算をスキップする。

use crate::error::Result;
use crate::pipeline::CheckOptions;
use camera_compat_common::{ColumnSelector, MatchResult};
use chrono::{DateTime, Local};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const CACHE_FILE_NAME: &str = "results-cache.json";

/// キャッシュファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultCache {
    /// バージョン（互換性チェック用）
    version: u32,
    /// サイト名 → 結果
    entries: BTreeMap<String, CacheEntry>,
}

/// キャッシュエントリ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub file_name: String,
    /// 入力ファイルのSHA-256
    pub file_hash: String,
    pub retention_days: u32,
    /// 型番列の明示指定（自動判定なら None）
    #[serde(default)]
    pub column: Option<ColumnSelector>,
    /// 前処理の有無
    #[serde(default)]
    pub sanitize: bool,
    pub matches: Vec<MatchResult>,
    /// 推奨機種名（推奨できなかった場合は空）
    pub connectors: Vec<String>,
    pub excess_channels: Option<i64>,
    pub updated_at: DateTime<Local>,
}

impl CacheEntry {
    /// 同じ入力・同じチェック条件の結果か
    pub fn is_fresh(&self, file_hash: &str, options: &CheckOptions) -> bool {
        self.file_hash == file_hash
            && self.retention_days == options.retention_days
            && self.column == options.column
            && self.sanitize == options.sanitize
    }
}

impl ResultCache {
    const CURRENT_VERSION: u32 = 2;

    pub fn cache_path(dir: &Path) -> PathBuf {
        dir.join(CACHE_FILE_NAME)
    }

    /// キャッシュファイルを読み込み（壊れていれば空で開始）
    pub fn load(dir: &Path) -> Self {
        let cache_path = Self::cache_path(dir);
        if !cache_path.exists() {
            return Self::default();
        }

        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(path = %cache_path.display(), error = %e, "failed to open cache");
                return Self::default();
            }
        };

        match serde_json::from_reader::<_, ResultCache>(BufReader::new(file)) {
            Ok(cache) if cache.version == Self::CURRENT_VERSION => cache,
            Ok(_) => {
                tracing::warn!("cache version mismatch, starting fresh");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %cache_path.display(), error = %e, "failed to parse cache");
                Self::default()
            }
        }
    }

    /// キャッシュファイルを保存
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let file = File::create(Self::cache_path(dir))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// キャッシュファイルを削除（存在しなければ false）
    pub fn delete(dir: &Path) -> Result<bool> {
        let cache_path = Self::cache_path(dir);
        if !cache_path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(cache_path)?;
        Ok(true)
    }

    pub fn get(&self, site: &str) -> Option<&CacheEntry> {
        self.entries.get(&site_key(site))
    }

    /// 入力ファイルとチェック条件が一致する場合のみ返す
    pub fn get_fresh(&self, site: &str, file_hash: &str, options: &CheckOptions) -> Option<&CacheEntry> {
        self.get(site).filter(|e| e.is_fresh(file_hash, options))
    }

    pub fn set(&mut self, site: &str, entry: CacheEntry) {
        self.entries.insert(site_key(site), entry);
    }

    pub fn remove(&mut self, site: &str) -> Option<CacheEntry> {
        self.entries.remove(&site_key(site))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn sites(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// サイト名を正規化（前後空白除去・連続空白を1つに・小文字化）
pub fn site_key(site: &str) -> String {
    lazy_static::lazy_static! {
        static ref SPACES: Regex = Regex::new(r"\s+").unwrap();
    }
    SPACES.replace_all(site.trim(), " ").to_lowercase()
}

/// ファイル内容のSHA-256（16進）
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_key() {
        assert_eq!(site_key("  Main   Campus "), "main campus");
        assert_eq!(site_key("HQ"), site_key("hq"));
    }
}
