//! 照合エンジンの型定義
//!
//! CLIとエンジンで共有される型:
//! - Table: 顧客シート（全セル文字列）
//! - ReferenceModel: 対応カメラカタログの1行
//! - MatchResult: 照合結果（名前ごとに1件）

use serde::{Deserialize, Serialize};
use std::fmt;

/// 顧客シート
///
/// 列の意味は実行時に判定するため、全セルを文字列として保持する。
/// 空セルは空文字列。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// 列数（ヘッダーと最長行の大きい方）
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(self.headers.len())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.width() == 0
    }

    pub fn header(&self, index: usize) -> &str {
        self.headers.get(index).map(String::as_str).unwrap_or("")
    }

    /// 指定列のセルを行順に返す（短い行は空文字列で補完）
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }
}

/// 対応カメラカタログのモデル
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceModel {
    /// 小文字化したモデル名（カタログ内で一意）
    pub model_name: String,
    pub manufacturer: String,
    pub minimum_firmware_version: String,
    #[serde(default)]
    pub notes: String,
    /// スペック表からの累積値
    #[serde(default)]
    pub megapixels: f64,
    #[serde(default)]
    pub channels: f64,
}

impl ReferenceModel {
    /// 5MP以下は低解像度チャンネル扱い
    pub fn is_high_resolution(&self) -> bool {
        self.megapixels > 5.0
    }
}

/// 顧客シート上の1カメラ名と台数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRow {
    pub raw_name: String,
    pub count: u32,
}

/// 照合の確度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Identified,
    Potential,
    Unsupported,
    Empty,
}

impl MatchType {
    /// カタログモデルが紐付く区分か
    pub fn has_model(&self) -> bool {
        matches!(self, Self::Exact | Self::Identified | Self::Potential)
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Identified => write!(f, "identified"),
            Self::Potential => write!(f, "potential"),
            Self::Unsupported => write!(f, "unsupported"),
            Self::Empty => write!(f, "empty"),
        }
    }
}

/// 照合結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub name: Option<String>,
    pub match_type: MatchType,
    pub matched_model: Option<ReferenceModel>,
    #[serde(default)]
    pub count: u32,
}

impl MatchResult {
    pub fn empty() -> Self {
        Self {
            name: None,
            match_type: MatchType::Empty,
            matched_model: None,
            count: 0,
        }
    }

    pub fn unsupported(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            match_type: MatchType::Unsupported,
            matched_model: None,
            count: 0,
        }
    }

    pub fn matched(name: &str, match_type: MatchType, model: ReferenceModel) -> Self {
        Self {
            name: Some(name.to_string()),
            match_type,
            matched_model: Some(model),
            count: 0,
        }
    }

    /// 紐付いたカタログモデル名（なければ空文字列）
    pub fn model_name(&self) -> &str {
        self.matched_model
            .as_ref()
            .map(|m| m.model_name.as_str())
            .unwrap_or("")
    }

    pub fn customer_row(&self) -> Option<CustomerRow> {
        self.name.as_ref().map(|name| CustomerRow {
            raw_name: name.clone(),
            count: self.count,
        })
    }
}
