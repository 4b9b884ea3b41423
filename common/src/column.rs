//! 列判定モジュール
//!
//! 列順が不定の顧客シートから、カメラ型番の列と台数の列を探す。

use crate::error::{Error, Result};
use crate::similarity::{extract_one, Metric};
use crate::types::Table;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// 型番列の明示指定（列番号またはヘッダー名）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSelector {
    Index(usize),
    Name(String),
}

impl FromStr for ColumnSelector {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("column must not be empty".to_string());
        }
        match s.parse::<usize>() {
            Ok(index) => Ok(ColumnSelector::Index(index)),
            Err(_) => Ok(ColumnSelector::Name(s.to_string())),
        }
    }
}

/// 列スコアを計算する
///
/// 重複を除いた空でないセルごとに、カタログ名とのトークン整列類似度の
/// 最大値を合計する。全セルが数値の列は0点。
pub fn column_score<S: AsRef<str>>(table: &Table, index: usize, catalog_names: &[S]) -> u64 {
    let values: Vec<&str> = table
        .column(index)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();

    if values.is_empty() {
        return 0;
    }

    if values.iter().all(|v| is_numeric(v)) {
        tracing::info!(column = %table.header(index), "numeric column detected, forcing score 0");
        return 0;
    }

    let mut seen = HashSet::new();
    let mut score = 0u64;
    for value in values {
        if !seen.insert(value) {
            continue;
        }
        if let Some(best) = extract_one(value, catalog_names, Metric::TokenSort) {
            score += u64::from(best.score);
        }
    }
    score
}

/// カメラ型番の列を判定する
///
/// 最高スコアが0より大きい最初の列を返す。見つからなければ None。
pub fn identify_model_column<S: AsRef<str>>(table: &Table, catalog_names: &[S]) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;

    for index in 0..table.width() {
        let score = column_score(table, index, catalog_names);
        tracing::debug!(column = index, header = %table.header(index), score, "column score");
        if score > 0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((index, score));
        }
    }

    match best {
        Some((index, score)) => {
            tracing::info!(column = index, header = %table.header(index), score, "highest scoring camera column");
            Some(index)
        }
        None => {
            tracing::warn!("no valid column scores found, check the input data");
            None
        }
    }
}

/// 台数の列をヘッダー名から判定する
pub fn identify_count_column(table: &Table) -> Option<usize> {
    lazy_static::lazy_static! {
        static ref COUNT_RE: Regex = Regex::new(r"(?i)\bcount\b|#|\bquantity\b").unwrap();
    }

    table.headers.iter().position(|h| COUNT_RE.is_match(h))
}

/// 型番列を決定する（明示指定があれば優先）
pub fn resolve_model_column<S: AsRef<str>>(
    table: &Table,
    selector: Option<&ColumnSelector>,
    catalog_names: &[S],
) -> Result<usize> {
    let width = table.width();
    if width == 0 {
        return Err(Error::NoColumns);
    }

    match selector {
        Some(ColumnSelector::Index(index)) if *index < width => Ok(*index),
        Some(ColumnSelector::Index(index)) => Err(Error::ColumnOutOfBounds {
            index: *index,
            width,
        }),
        Some(ColumnSelector::Name(name)) => table
            .headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| Error::UnknownColumn(name.clone())),
        None => identify_model_column(table, catalog_names).ok_or(Error::ModelColumnNotFound),
    }
}

fn is_numeric(value: &str) -> bool {
    value.parse::<f64>().map(|n| n.is_finite()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["p3245-lve".into(), "m3106-l mk ii".into(), "q6135-le".into()]
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_identify_model_column() {
        let t = table(
            &["Location", "Camera Model", "Qty"],
            &[
                &["Lobby", "P3245-LVE", "2"],
                &["Dock", "Q6135-LE", "1"],
                &["Office", "M3106-L Mk II", "4"],
            ],
        );
        assert_eq!(identify_model_column(&t, &names()), Some(1));
    }

    #[test]
    fn test_numeric_column_scores_zero() {
        let t = table(&["ID"], &[&["3245"], &["6135"], &[" "]]);
        assert_eq!(column_score(&t, 0, &names()), 0);
    }

    #[test]
    fn test_duplicates_scored_once() {
        let once = table(&["Model"], &[&["p3245-lve"]]);
        let twice = table(&["Model"], &[&["p3245-lve"], &["p3245-lve"]]);
        assert_eq!(column_score(&once, 0, &names()), column_score(&twice, 0, &names()));
    }

    #[test]
    fn test_no_model_column() {
        let t = table(&["A", "B"], &[&["1", ""], &["2", ""]]);
        assert_eq!(identify_model_column(&t, &names()), None);
        assert_eq!(identify_model_column(&Table::default(), &names()), None);
    }

    #[test]
    fn test_tie_prefers_first_column() {
        let t = table(&["A", "B"], &[&["p3245-lve", "p3245-lve"]]);
        assert_eq!(identify_model_column(&t, &names()), Some(0));
    }

    #[test]
    fn test_identify_count_column() {
        assert_eq!(identify_count_column(&table(&["Model", "Camera Count"], &[])), Some(1));
        assert_eq!(identify_count_column(&table(&["# of units", "Model"], &[])), Some(0));
        assert_eq!(identify_count_column(&table(&["Model", "QUANTITY"], &[])), Some(1));
        assert_eq!(identify_count_column(&table(&["Model", "Counter"], &[])), None);
        assert_eq!(identify_count_column(&table(&["Model", "Notes"], &[])), None);
    }

    #[test]
    fn test_column_selector_from_str() {
        assert_eq!("2".parse::<ColumnSelector>(), Ok(ColumnSelector::Index(2)));
        assert_eq!(
            "Camera Model".parse::<ColumnSelector>(),
            Ok(ColumnSelector::Name("Camera Model".into()))
        );
        assert!("  ".parse::<ColumnSelector>().is_err());
    }

    #[test]
    fn test_resolve_model_column() {
        let t = table(&["Location", "Model"], &[&["Lobby", "p3245-lve"]]);
        assert_eq!(resolve_model_column(&t, None, &names()), Ok(1));
        assert_eq!(
            resolve_model_column(&t, Some(&ColumnSelector::Index(0)), &names()),
            Ok(0)
        );
        assert_eq!(
            resolve_model_column(&t, Some(&ColumnSelector::Name("model".into())), &names()),
            Ok(1)
        );
        assert_eq!(
            resolve_model_column(&t, Some(&ColumnSelector::Index(5)), &names()),
            Err(Error::ColumnOutOfBounds { index: 5, width: 2 })
        );
        assert_eq!(
            resolve_model_column(&t, Some(&ColumnSelector::Name("Serial".into())), &names()),
            Err(Error::UnknownColumn("Serial".into()))
        );
        assert_eq!(
            resolve_model_column(&Table::default(), None, &names()),
            Err(Error::NoColumns)
        );
    }
}
