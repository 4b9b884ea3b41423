//! 照合エンジン
//!
//! 型番列の各セルをカタログと照合し、確度を判定する。
//!
//! 判定順（最初に成立したもの）:
//! 1. Raw または TokenSort が100 → Exact
//! 2. TokenSet が100 → Identified
//! 3. Raw が80以上 → Potential
//! 4. それ以外 → Unsupported
//!
//! 空セルは Empty。

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::similarity::{extract_one, BestMatch, Metric};
use crate::types::{MatchResult, MatchType};
use std::collections::HashMap;

/// Potential と判定する Raw スコアの下限
pub const POTENTIAL_THRESHOLD: u8 = 80;

/// 1セル分の3指標のスコア
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scores<'a> {
    pub raw: BestMatch<'a>,
    pub token_sort: BestMatch<'a>,
    pub token_set: BestMatch<'a>,
}

impl<'a> Scores<'a> {
    /// 値とカタログ名を3指標で比較する（カタログは空でないこと）
    pub fn compute(value: &str, catalog: &'a Catalog) -> Option<Self> {
        let names = catalog.names();
        Some(Self {
            raw: extract_one(value, names, Metric::Raw)?,
            token_sort: extract_one(value, names, Metric::TokenSort)?,
            token_set: extract_one(value, names, Metric::TokenSet)?,
        })
    }

    /// 確度と採用する候補を決定する
    pub fn classify(&self) -> (MatchType, Option<BestMatch<'a>>) {
        if self.raw.score == 100 {
            (MatchType::Exact, Some(self.raw))
        } else if self.token_sort.score == 100 {
            (MatchType::Exact, Some(self.token_sort))
        } else if self.token_set.score == 100 {
            (MatchType::Identified, Some(self.token_set))
        } else if self.raw.score >= POTENTIAL_THRESHOLD {
            (MatchType::Potential, Some(self.raw))
        } else {
            (MatchType::Unsupported, None)
        }
    }
}

/// 1つの値を照合する
pub fn match_value(value: &str, catalog: &Catalog) -> Result<MatchResult> {
    if catalog.is_empty() {
        return Err(Error::EmptyCatalog);
    }

    let name = value.trim();
    if is_blank(name) {
        return Ok(MatchResult::empty());
    }

    let scores = Scores::compute(name, catalog).ok_or(Error::EmptyCatalog)?;
    let (match_type, best) = scores.classify();
    tracing::debug!(
        value = name,
        raw = scores.raw.score,
        token_sort = scores.token_sort.score,
        token_set = scores.token_set.score,
        %match_type,
        "classified"
    );

    Ok(match best.and_then(|b| catalog.get(b.index)) {
        Some(model) => MatchResult::matched(name, match_type, model.clone()),
        None => MatchResult::unsupported(name),
    })
}

/// 型番列のセルを行順に照合する
///
/// 同じ値は一度だけスコア計算する。結果は入力と同じ長さ・同じ順序。
pub fn match_cameras<S: AsRef<str>>(values: &[S], catalog: &Catalog) -> Result<Vec<MatchResult>> {
    if catalog.is_empty() {
        return Err(Error::EmptyCatalog);
    }

    let mut memo: HashMap<&str, MatchResult> = HashMap::new();
    let mut results = Vec::with_capacity(values.len());

    for value in values {
        let key = value.as_ref().trim();
        let result = match memo.get(key) {
            Some(cached) => cached.clone(),
            None => {
                let result = match_value(key, catalog)?;
                memo.insert(key, result.clone());
                result
            }
        };
        results.push(result);
    }

    tracing::info!(rows = results.len(), distinct = memo.len(), "matching complete");
    Ok(results)
}

/// 空セル判定（スプレッドシート由来の NaN 表記を含む）
fn is_blank(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("nan")
}
