//! 顧客シートの前処理モジュール
//!
//! 照合の前に、型番と無関係な列・語を取り除く。
//!
//! 列の削除: 行番号列（ヘッダーが `#`）、シリアル番号列、IP/MACアドレスを含む列
//! 語の削除: IP/MACアドレス、記号のみの語、ローマ数字（I〜IV）、カタログにない英単語、
//! 複数語セル内の整数、セル内で重複する語
//!
//! 最後に空行・空列を落とす。ヘッダーは残す。

use crate::types::Table;
use regex::Regex;
use std::collections::HashSet;

lazy_static::lazy_static! {
    static ref IP_RE: Regex = Regex::new(
        r"^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$"
    ).unwrap();
    static ref MAC_RE: Regex = Regex::new(
        r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$|^([0-9A-Fa-f]{4}[:.-]){2}[0-9A-Fa-f]{4}$"
    ).unwrap();
    static ref INTEGER_RE: Regex = Regex::new(r"^[-+]?\d+$").unwrap();
    static ref ROMAN_RE: Regex = Regex::new(r"^(I|II|III|IV)$").unwrap();
    static ref SERIAL_HEADER_RE: Regex = Regex::new(r"(?i)serial|s/n|\bsn\b").unwrap();
}

/// 組み込みの英単語リスト（設定の単語リストに追加される）
pub const BUILTIN_ENGLISH_WORDS: &[&str] = &[
    "a", "an", "and", "at", "by", "camera", "cameras", "ceiling", "door", "east", "entrance",
    "for", "front", "hallway", "in", "lobby", "main", "north", "of", "office", "on", "or",
    "outside", "parking", "rear", "room", "side", "south", "the", "to", "wall", "west", "with",
];

pub fn is_ip_address(value: &str) -> bool {
    IP_RE.is_match(value)
}

pub fn is_mac_address(value: &str) -> bool {
    MAC_RE.is_match(value)
}

pub fn is_integer(value: &str) -> bool {
    INTEGER_RE.is_match(value)
}

/// 英数字を含まない語
pub fn is_punctuation(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(char::is_alphanumeric)
}

pub fn is_roman_numeral(value: &str) -> bool {
    ROMAN_RE.is_match(value)
}

/// 組み込みリストと追加の単語から英単語集合を作る（小文字）
pub fn english_words<I, S>(extra: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    BUILTIN_ENGLISH_WORDS
        .iter()
        .map(|w| w.to_string())
        .chain(
            extra
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        )
        .collect()
}

/// 前処理の設定
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    /// 英単語でも残す語（カタログのトークン）
    keep_tokens: HashSet<String>,
    english_words: HashSet<String>,
}

impl Sanitizer {
    pub fn new(keep_tokens: HashSet<String>, english_words: HashSet<String>) -> Self {
        Self {
            keep_tokens,
            english_words,
        }
    }

    /// 1セルを整理する
    pub fn clean_cell(&self, value: &str) -> String {
        let words: Vec<&str> = value.split_whitespace().collect();
        let multi_word = words.len() > 1;
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(words.len());

        for word in words {
            let lower = word.to_lowercase();
            if is_ip_address(word)
                || is_mac_address(word)
                || is_punctuation(word)
                || is_roman_numeral(word)
                || (multi_word && is_integer(word))
                || (self.english_words.contains(&lower) && !self.keep_tokens.contains(&lower))
            {
                continue;
            }
            if seen.insert(lower) {
                kept.push(word);
            }
        }

        kept.join(" ")
    }

    /// 削除対象の列か
    fn is_dropped_column(&self, table: &Table, index: usize) -> bool {
        let header = table.header(index).trim();
        if header == "#" || SERIAL_HEADER_RE.is_match(header) {
            return true;
        }
        table
            .column(index)
            .map(str::trim)
            .any(|v| is_ip_address(v) || is_mac_address(v))
    }

    /// 表全体を整理する
    pub fn sanitize(&self, table: &Table) -> Table {
        let keep: Vec<usize> = (0..table.width())
            .filter(|&index| {
                let dropped = self.is_dropped_column(table, index);
                if dropped {
                    tracing::debug!(column = index, header = %table.header(index), "dropping column");
                }
                !dropped
            })
            .collect();

        let mut rows: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| {
                keep.iter()
                    .map(|&i| row.get(i).map_or_else(String::new, |v| self.clean_cell(v)))
                    .collect()
            })
            .filter(|row: &Vec<String>| row.iter().any(|v| !v.is_empty()))
            .collect();

        let mut headers: Vec<String> = keep
            .iter()
            .map(|&i| table.header(i).trim().to_string())
            .collect();

        // 空列を落とす
        let non_blank: Vec<bool> = (0..headers.len())
            .map(|i| rows.iter().any(|row| !row[i].is_empty()))
            .collect();
        let mut flags = non_blank.iter();
        headers.retain(|_| *flags.next().unwrap_or(&false));
        for row in &mut rows {
            let mut flags = non_blank.iter();
            row.retain(|_| *flags.next().unwrap_or(&false));
        }

        tracing::info!(
            columns = headers.len(),
            rows = rows.len(),
            dropped_columns = table.width() - keep.len(),
            "sanitized table"
        );
        Table::new(headers, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitizer() -> Sanitizer {
        let keep: HashSet<String> = ["dome".to_string()].into_iter().collect();
        Sanitizer::new(keep, english_words(["dome", "hello"]))
    }

    #[test]
    fn test_token_predicates() {
        assert!(is_ip_address("192.168.1.20"));
        assert!(!is_ip_address("192.168.1.256"));
        assert!(is_mac_address("00:1A:2b:3C:4d:5E"));
        assert!(is_mac_address("001a.2b3c.4d5e"));
        assert!(!is_mac_address("P3245-LVE"));
        assert!(is_integer("-12"));
        assert!(!is_integer("12a"));
        assert!(is_punctuation("--"));
        assert!(!is_punctuation("a-"));
        assert!(is_roman_numeral("III"));
        assert!(!is_roman_numeral("V"));
    }

    #[test]
    fn test_clean_cell() {
        let s = sanitizer();
        assert_eq!(s.clean_cell("  Axis  P3245-LVE  "), "Axis P3245-LVE");
        assert_eq!(s.clean_cell("M3106 Mk II - lobby 2"), "M3106 Mk");
        assert_eq!(s.clean_cell("Hello dome camera"), "dome");
        assert_eq!(s.clean_cell("p3245 P3245 10.0.0.1"), "p3245");
        // 単独の整数は台数列のために残す
        assert_eq!(s.clean_cell("12"), "12");
    }

    #[test]
    fn test_sanitize_drops_columns_and_blank_rows() {
        let table = Table::new(
            vec!["#".into(), "Model".into(), "IP".into(), "Serial No".into(), "Qty".into(), "Notes".into()],
            vec![
                vec!["1".into(), "P3245-LVE".into(), "10.0.0.2".into(), "ACCC8E".into(), "2".into(), "".into()],
                vec!["2".into(), "".into(), "".into(), "".into(), "".into(), "the".into()],
                vec!["3".into(), "Q6135-LE".into(), "10.0.0.3".into(), "ACCC8F".into(), "1".into(), "".into()],
            ],
        );

        let cleaned = sanitizer().sanitize(&table);
        assert_eq!(cleaned.headers, vec!["Model".to_string(), "Qty".to_string()]);
        assert_eq!(
            cleaned.rows,
            vec![
                vec!["P3245-LVE".to_string(), "2".to_string()],
                vec!["Q6135-LE".to_string(), "1".to_string()],
            ]
        );
    }

    #[test]
    fn test_mac_column_dropped() {
        let table = Table::new(
            vec!["Device".into(), "Addr".into()],
            vec![vec!["p3245".into(), "00:1a:2b:3c:4d:5e".into()]],
        );
        let cleaned = sanitizer().sanitize(&table);
        assert_eq!(cleaned.headers, vec!["Device".to_string()]);
    }
}
