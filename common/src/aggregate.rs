//! 台数集計モジュール
//!
//! 行ごとの照合結果をカメラ名ごとに1件へまとめ、台数を合計する。

use crate::types::{MatchResult, MatchType};
use std::collections::HashMap;

/// 台数セルを整数に変換する
///
/// 数値でないセル・空セルは0、負数は0、小数は四捨五入。
pub fn coerce_count(value: &str) -> u32 {
    let cleaned = value.trim().replace(',', "");
    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => n.round().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

/// 行ごとの照合結果を名前ごとに集計する
///
/// - 台数列がある場合: 同名の行の台数セルを合計する
/// - 台数列がない場合: 同名の行数を台数とする（空セルの行は0）
///
/// 同名の最初の行の判定結果を採用する。空セルの行は1件の Empty に
/// まとめ、台数が0なら捨てる。結果は確度順の安定ソート。
pub fn aggregate_counts<S: AsRef<str>>(
    rows: &[MatchResult],
    count_values: Option<&[S]>,
) -> Vec<MatchResult> {
    let mut order: Vec<MatchResult> = Vec::new();
    let mut index_by_name: HashMap<Option<String>, usize> = HashMap::new();

    for (row, result) in rows.iter().enumerate() {
        let key = result
            .name
            .as_ref()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        // 名前のない行は Empty 以外なら不整合として捨てる
        if key.is_none() && result.match_type != MatchType::Empty {
            tracing::warn!(row, match_type = %result.match_type, "dropping nameless row");
            continue;
        }

        let count = match count_values {
            Some(values) => values.get(row).map_or(0, |v| coerce_count(v.as_ref())),
            None if key.is_some() => 1,
            None => 0,
        };

        match index_by_name.get(&key) {
            Some(&index) => {
                let entry = &mut order[index];
                entry.count = entry.count.saturating_add(count);
            }
            None => {
                let mut entry = result.clone();
                entry.name = key.clone();
                entry.count = count;
                index_by_name.insert(key, order.len());
                order.push(entry);
            }
        }
    }

    order.retain(|r| r.match_type != MatchType::Empty || r.count > 0);
    order.sort_by_key(|r| r.match_type);
    order
}

/// 台数の合計
pub fn total_count(results: &[MatchResult]) -> u64 {
    results.iter().map(|r| u64::from(r.count)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReferenceModel;

    fn model(name: &str) -> ReferenceModel {
        ReferenceModel {
            model_name: name.into(),
            ..Default::default()
        }
    }

    fn rows() -> Vec<MatchResult> {
        vec![
            MatchResult::unsupported("mystery cam"),
            MatchResult::matched("CC1", MatchType::Exact, model("cc1")),
            MatchResult::empty(),
            MatchResult::matched("CC1", MatchType::Exact, model("cc1")),
            MatchResult::matched("cc", MatchType::Potential, model("cc1")),
        ]
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count("3"), 3);
        assert_eq!(coerce_count(" 2.6 "), 3);
        assert_eq!(coerce_count("1,200"), 1200);
        assert_eq!(coerce_count("-4"), 0);
        assert_eq!(coerce_count("n/a"), 0);
        assert_eq!(coerce_count(""), 0);
        assert_eq!(coerce_count("NaN"), 0);
    }

    #[test]
    fn test_frequency_counts_without_count_column() {
        let result = aggregate_counts::<&str>(&rows(), None);
        let names: Vec<_> = result.iter().map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec![Some("CC1"), Some("cc"), Some("mystery cam")]);
        assert_eq!(result[0].count, 2);
        assert_eq!(total_count(&result), 4);
    }

    #[test]
    fn test_sums_count_column() {
        let counts = vec!["1", "3", "5", "x", "2"];
        let result = aggregate_counts(&rows(), Some(counts.as_slice()));

        let cc1 = result.iter().find(|r| r.name.as_deref() == Some("CC1")).unwrap();
        assert_eq!(cc1.count, 3);

        // 名前のない行の台数は Empty としてまとめる
        let empty = result.last().unwrap();
        assert_eq!(empty.match_type, MatchType::Empty);
        assert_eq!(empty.count, 5);
        assert_eq!(total_count(&result), 11);
    }

    #[test]
    fn test_drops_nameless_non_empty_rows() {
        let mut broken = MatchResult::unsupported("x");
        broken.name = None;
        let result = aggregate_counts::<&str>(&[broken], None);
        assert!(result.is_empty());
    }

    #[test]
    fn test_first_occurrence_classification_wins() {
        let input = vec![
            MatchResult::matched("cc1", MatchType::Potential, model("cc1")),
            MatchResult::matched("cc1", MatchType::Exact, model("cc1")),
        ];
        let result = aggregate_counts::<&str>(&input, None);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].match_type, MatchType::Potential);
        assert_eq!(result[0].count, 2);
    }

    #[test]
    fn test_stable_sort_by_tier() {
        let input = vec![
            MatchResult::unsupported("b"),
            MatchResult::matched("x", MatchType::Identified, model("x")),
            MatchResult::unsupported("a"),
            MatchResult::matched("y", MatchType::Exact, model("y")),
        ];
        let result = aggregate_counts::<&str>(&input, None);
        let names: Vec<_> = result.iter().map(|r| r.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["y", "x", "b", "a"]);
    }
}
