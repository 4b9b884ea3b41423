//! コンソール表示モジュール

use crate::pipeline::SiteReport;
use camera_compat_common::{MatchResult, MatchType, Recommendation};
use std::collections::BTreeMap;

/// 確度ごとの台数
pub fn tier_totals(matches: &[MatchResult]) -> BTreeMap<MatchType, u64> {
    let mut totals = BTreeMap::new();
    for m in matches {
        *totals.entry(m.match_type).or_insert(0) += u64::from(m.count);
    }
    totals
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let cut: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

pub fn print_matches(matches: &[MatchResult]) {
    println!("| {:<30} | {:<11} | {:<24} | {:>5} |", "Camera", "Match", "Model", "Count");
    println!("|{:-<32}|{:-<13}|{:-<26}|{:->7}|", "", "", "", "");
    for m in matches {
        println!(
            "| {:<30} | {:<11} | {:<24} | {:>5} |",
            truncate(m.name.as_deref().unwrap_or("(空欄)"), 30),
            m.match_type.to_string(),
            truncate(m.model_name(), 24),
            m.count
        );
    }
}

pub fn print_recommendation(recommendation: &Recommendation) {
    println!("  必要チャンネル数: {}", recommendation.required_channels);
    println!("  必要容量: {:.2} TB", recommendation.required_storage_tb);
    println!();
    println!("  {:<12} {:>5}", "Connector", "Count");
    for (name, count) in recommendation.summary() {
        println!("  {:<12} {:>5}", name, count);
    }
    println!();
    if recommendation.is_under_provisioned() {
        println!("⚠ チャンネルが不足しています: {}", recommendation.excess_channels);
    } else {
        println!("  余剰チャンネル: {}", recommendation.excess_channels);
    }
}

pub fn print_report(report: &SiteReport) {
    println!("📋 {} ({}){}", report.site, report.file_name, if report.from_cache { " [キャッシュ]" } else { "" });
    if !report.from_cache {
        match &report.count_column {
            Some(count) => println!("  型番列: {} / 台数列: {}", report.model_column, count),
            None => println!("  型番列: {} / 台数列: なし（行数で集計）", report.model_column),
        }
    }
    println!();
    print_matches(&report.matches);
    println!();

    let totals = tier_totals(&report.matches);
    let summary: Vec<String> = totals.iter().map(|(tier, count)| format!("{}: {}", tier, count)).collect();
    println!("  合計 {}台 ({})", report.total_cameras(), summary.join(", "));
    println!(
        "  低解像度チャンネル: {} / 高解像度チャンネル: {} / 保存期間: {}日",
        report.demand.low, report.demand.high, report.retention_days
    );
    println!();

    match &report.recommendation {
        Ok(rec) => print_recommendation(rec),
        Err(e) => println!("⚠ 推奨できません: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_totals() {
        let mut a = MatchResult::unsupported("x");
        a.count = 2;
        let mut b = MatchResult::unsupported("y");
        b.count = 3;
        let mut c = MatchResult::empty();
        c.count = 1;

        let totals = tier_totals(&[a, b, c]);
        assert_eq!(totals.get(&MatchType::Unsupported), Some(&5));
        assert_eq!(totals.get(&MatchType::Empty), Some(&1));
        assert_eq!(totals.get(&MatchType::Exact), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
