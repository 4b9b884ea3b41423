//! 文字列類似度モジュール
//!
//! 0〜100の整数スコアを返す3種類の指標:
//! - Raw: 文字単位の類似度（挿入・削除の編集距離ベース）
//! - TokenSort: 空白区切りトークンを整列してから比較（語順を無視）
//! - TokenSet: トークン集合で比較（語順と重複を無視）
//!
//! どの指標も比較前に `default_process` で正規化する。

use std::collections::BTreeSet;

/// 類似度の指標
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Raw,
    TokenSort,
    TokenSet,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Raw, Metric::TokenSort, Metric::TokenSet];
}

/// 最良候補
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestMatch<'a> {
    pub index: usize,
    pub name: &'a str,
    pub score: u8,
}

/// 比較用の正規化: 英数字以外を空白に置換し、小文字化・前後空白除去
pub fn default_process(value: &str) -> String {
    let replaced: String = value
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    replaced.trim().to_lowercase()
}

/// 2つの文字列の類似度（0〜100）
pub fn similarity(a: &str, b: &str, metric: Metric) -> u8 {
    let a = default_process(a);
    let b = default_process(b);
    score_processed(&a, &b, metric)
}

/// 候補の中から最も類似度の高いものを返す（同点は先勝ち）
pub fn extract_one<'a, S: AsRef<str>>(
    query: &str,
    choices: &'a [S],
    metric: Metric,
) -> Option<BestMatch<'a>> {
    let query = default_process(query);
    let mut best: Option<BestMatch<'a>> = None;

    for (index, choice) in choices.iter().enumerate() {
        let name = choice.as_ref();
        let score = score_processed(&query, &default_process(name), metric);
        if best.map_or(true, |b| score > b.score) {
            best = Some(BestMatch { index, name, score });
            if score == 100 {
                break;
            }
        }
    }

    best
}

fn score_processed(a: &str, b: &str, metric: Metric) -> u8 {
    let raw = match metric {
        Metric::Raw => ratio(a, b),
        Metric::TokenSort => ratio(&sort_tokens(a), &sort_tokens(b)),
        Metric::TokenSet => token_set_ratio(a, b),
    };
    raw.round_ties_even().clamp(0.0, 100.0) as u8
}

/// 丸め前の類似度（Indel距離の正規化類似度 × 100）
fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    rapidfuzz::fuzz::ratio(a.chars(), b.chars()) * 100.0
}

fn sort_tokens(value: &str) -> String {
    let mut tokens: Vec<&str> = value.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    // 一方のトークン集合がもう一方に含まれる
    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let sorted_sect = intersection.join(" ");
    let combined_ab = format!("{} {}", sorted_sect, diff_ab.join(" "));
    let combined_ba = format!("{} {}", sorted_sect, diff_ba.join(" "));
    let combined_ab = combined_ab.trim();
    let combined_ba = combined_ba.trim();

    ratio(&sorted_sect, combined_ab)
        .max(ratio(&sorted_sect, combined_ba))
        .max(ratio(combined_ab, combined_ba))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_process() {
        assert_eq!(default_process("  Axis P3245-LVE "), "axis p3245 lve");
        assert_eq!(default_process("--"), "");
    }

    #[test]
    fn test_ratio_unrounded() {
        assert!((ratio("kitten", "sitting") - 61.538_461).abs() < 1e-4);
        assert!((ratio("axis p3245 lve", "p3245 lve") - 78.260_869).abs() < 1e-4);
        assert_eq!(ratio("", "abc"), 0.0);
    }

    #[test]
    fn test_raw_ratio() {
        assert_eq!(similarity("CC1", "cc1", Metric::Raw), 100);
        assert_eq!(similarity("kitten", "sitting", Metric::Raw), 62);
        assert_eq!(similarity("abcd", "abcdxy", Metric::Raw), 80);
        assert_eq!(similarity("", "abc", Metric::Raw), 0);
    }

    #[test]
    fn test_token_sort_ignores_order() {
        assert_eq!(similarity("axis p3245", "P3245 Axis", Metric::TokenSort), 100);
        assert!(similarity("axis p3245", "P3245 Axis", Metric::Raw) < 100);
    }

    #[test]
    fn test_token_set_ignores_duplicates_and_subsets() {
        assert_eq!(similarity("axis axis p3245", "p3245 axis", Metric::TokenSet), 100);
        assert_eq!(similarity("axis p3245", "p3245", Metric::TokenSet), 100);
        assert!(similarity("axis p3245", "axis m3106", Metric::TokenSet) < 100);
    }

    #[test]
    fn test_token_set_partial_overlap() {
        // 共通部分 "axis" と残りの組み合わせのうち最大: "axis p3245" 対 "axis m3106" = 60
        assert_eq!(similarity("axis p3245", "axis m3106", Metric::TokenSet), 60);
        assert_eq!(similarity("Axis P3245", "M3106 axis", Metric::TokenSet), 60);
    }

    #[test]
    fn test_token_set_disjoint() {
        assert_eq!(similarity("abcd", "abcdxy", Metric::TokenSet), 80);
        assert_eq!(similarity("foo", "", Metric::TokenSet), 0);
    }

    #[test]
    fn test_extract_one_prefers_first_on_tie() {
        let choices = vec!["ab".to_string(), "ab".to_string(), "xyz".to_string()];
        let best = extract_one("ab", &choices, Metric::Raw).unwrap();
        assert_eq!(best.index, 0);
        assert_eq!(best.score, 100);
    }

    #[test]
    fn test_extract_one_empty_choices() {
        let choices: Vec<String> = Vec::new();
        assert!(extract_one("ab", &choices, Metric::Raw).is_none());
    }
}
