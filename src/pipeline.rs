//! チェック処理パイプライン
//!
//! 顧客シート1件について
//! 読み込み → 前処理 → 列判定 → 照合 → 台数集計 → コネクター推奨
//! を実行する。

use crate::cache::{compute_file_hash, CacheEntry, ResultCache};
use crate::config::Config;
use crate::error::{CompatError, Result};
use crate::{loader, prompt};
use camera_compat_common::{
    aggregate_counts, count_channels, identify_count_column, match_cameras, recommend,
    resolve_model_column, sanitize, Catalog, ChannelDemand, ColumnSelector, Error as EngineError,
    MatchResult, Recommendation, RecommendOptions, Sanitizer, Table,
};
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// 照合に必要な読み込み済みデータ
#[derive(Debug, Clone)]
pub struct Engine {
    pub catalog: Catalog,
    pub sanitizer: Sanitizer,
}

impl Engine {
    /// カタログと前処理の語彙から構築
    pub fn new(catalog: Catalog, extra_words: impl IntoIterator<Item = String>) -> Self {
        let sanitizer = Sanitizer::new(catalog.tokens(), sanitize::english_words(extra_words));
        Self { catalog, sanitizer }
    }

    /// 設定に従ってカタログ・スペック表・単語リストを読み込む
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut catalog = loader::load_catalog(&config.catalog_path()?, config.catalog_skip_rows)?;

        match config.specs_path() {
            Some(path) => {
                let specs = loader::load_specs(&path)?;
                catalog.enrich(&specs);
            }
            None => tracing::warn!("no specs table configured, all models count as low-resolution"),
        }

        let words = match &config.word_list_path {
            Some(path) => loader::load_word_list(path)?,
            None => Default::default(),
        };

        Ok(Self::new(catalog, words))
    }
}

/// チェックのオプション
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// 型番列の明示指定（自動判定を省略）
    pub column: Option<ColumnSelector>,
    /// 照合前に前処理を行う
    pub sanitize: bool,
    /// 判定できないとき列を対話で選ぶ
    pub interactive: bool,
    pub retention_days: u32,
    pub recommend: RecommendOptions,
}

impl CheckOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            column: None,
            sanitize: false,
            interactive: false,
            retention_days: config.retention_days,
            recommend: config.recommend_options(),
        }
    }
}

/// サイト1件分の結果
#[derive(Debug, Clone)]
pub struct SiteReport {
    pub site: String,
    pub file_name: String,
    pub model_column: String,
    pub count_column: Option<String>,
    pub matches: Vec<MatchResult>,
    pub demand: ChannelDemand,
    pub retention_days: u32,
    /// 推奨結果（反復上限超過などのエンジンエラーを含む）
    pub recommendation: std::result::Result<Recommendation, EngineError>,
    pub from_cache: bool,
}

impl SiteReport {
    pub fn total_cameras(&self) -> u64 {
        camera_compat_common::total_count(&self.matches)
    }
}

/// 照合済みの結果から推奨を計算する
pub fn recommend_for(
    matches: &[MatchResult],
    retention_days: u32,
    options: &RecommendOptions,
) -> (ChannelDemand, std::result::Result<Recommendation, EngineError>) {
    let demand = count_channels(matches);
    let recommendation = recommend(demand.low, demand.high, retention_days, options);
    (demand, recommendation)
}

/// 表1件をチェックする
pub fn check_table(engine: &Engine, site: &str, table: &Table, options: &CheckOptions) -> Result<SiteReport> {
    let sanitized;
    let table = if options.sanitize {
        sanitized = engine.sanitizer.sanitize(table);
        &sanitized
    } else {
        table
    };

    let model_index = match resolve_model_column(table, options.column.as_ref(), engine.catalog.names()) {
        Ok(index) => index,
        Err(EngineError::ModelColumnNotFound) if options.interactive => {
            prompt::select_model_column(table, site)?.ok_or(EngineError::ModelColumnNotFound)?
        }
        Err(e) => return Err(e.into()),
    };

    let count_index = identify_count_column(table).filter(|&index| index != model_index);

    let values: Vec<&str> = table.column(model_index).collect();
    let per_row = match_cameras(&values, &engine.catalog)?;
    let counts: Option<Vec<&str>> = count_index.map(|index| table.column(index).collect());
    let matches = aggregate_counts(&per_row, counts.as_deref());

    let (demand, recommendation) = recommend_for(&matches, options.retention_days, &options.recommend);
    if let Err(e) = &recommendation {
        tracing::warn!(site, error = %e, "no recommendation");
    }

    Ok(SiteReport {
        site: site.to_string(),
        file_name: site.to_string(),
        model_column: table.header(model_index).to_string(),
        count_column: count_index.map(|index| table.header(index).to_string()),
        matches,
        demand,
        retention_days: options.retention_days,
        recommendation,
        from_cache: false,
    })
}

/// サイト名（ファイル名から拡張子を除いたもの）
pub fn site_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// ファイル1件をチェックする
pub fn check_file(engine: &Engine, path: &Path, options: &CheckOptions) -> Result<SiteReport> {
    let table = loader::read_table(path)?;
    let mut report = check_table(engine, &site_name(path), &table, options)?;
    report.file_name = file_name(path);
    Ok(report)
}

/// キャッシュを使ってファイル1件をチェックする
///
/// 入力ファイルとチェック条件（保存期間・型番列指定・前処理）が同じなら
/// 照合をスキップし、推奨のみ再計算する。
pub fn check_file_cached(
    engine: &Engine,
    path: &Path,
    options: &CheckOptions,
    cache: &mut ResultCache,
) -> Result<SiteReport> {
    let site = site_name(path);
    let hash = compute_file_hash(path)?;

    if let Some(entry) = cache.get_fresh(&site, &hash, options) {
        tracing::info!(site = %site, "cache hit");
        let matches = entry.matches.clone();
        let (demand, recommendation) = recommend_for(&matches, options.retention_days, &options.recommend);
        return Ok(SiteReport {
            site,
            file_name: entry.file_name.clone(),
            model_column: String::new(),
            count_column: None,
            matches,
            demand,
            retention_days: options.retention_days,
            recommendation,
            from_cache: true,
        });
    }

    let report = check_file(engine, path, options)?;
    cache.set(&report.site, cache_entry(&report, hash, options));
    Ok(report)
}

/// 結果をキャッシュエントリに変換
pub fn cache_entry(report: &SiteReport, file_hash: String, options: &CheckOptions) -> CacheEntry {
    let (connectors, excess_channels) = match &report.recommendation {
        Ok(rec) => (rec.names(), Some(rec.excess_channels)),
        Err(_) => (Vec::new(), None),
    };
    CacheEntry {
        file_name: report.file_name.clone(),
        file_hash,
        retention_days: report.retention_days,
        column: options.column.clone(),
        sanitize: options.sanitize,
        matches: report.matches.clone(),
        connectors,
        excess_channels,
        updated_at: Local::now(),
    }
}

/// フォルダ内のシートを並列にチェックする
///
/// 型番列を判定できないファイルは結果にエラーとして残し、処理を続ける。
pub fn run_batch(
    engine: &Engine,
    files: &[PathBuf],
    options: &CheckOptions,
) -> Vec<(PathBuf, Result<SiteReport>)> {
    let options = CheckOptions {
        interactive: false,
        ..options.clone()
    };

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let results: Vec<(PathBuf, Result<SiteReport>)> = files
        .par_iter()
        .map(|path| {
            let result = check_file(engine, path, &options);
            if let Err(e) = &result {
                tracing::warn!(path = %path.display(), error = %e, "skipping file");
            }
            pb.set_message(file_name(path));
            pb.inc(1);
            (path.clone(), result)
        })
        .collect();

    pb.finish_and_clear();
    results
}

/// 一括処理の振り分け結果
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub checked: Vec<(PathBuf, SiteReport)>,
    /// 型番列を判定できなかったファイル
    pub skipped: Vec<(PathBuf, CompatError)>,
    /// 読み込みなどに失敗したファイル
    pub failed: Vec<(PathBuf, CompatError)>,
}

/// 一括処理の結果を成功・スキップ・失敗に分ける
///
/// 1件の失敗で全体を止めず、残りのファイルは出力対象に残す。
pub fn partition_batch(results: Vec<(PathBuf, Result<SiteReport>)>) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for (path, result) in results {
        match result {
            Ok(report) => outcome.checked.push((path, report)),
            Err(e) if is_skippable(&e) => outcome.skipped.push((path, e)),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "check failed");
                outcome.failed.push((path, e));
            }
        }
    }
    outcome
}

/// 判定できなかったファイルか
pub fn is_skippable(error: &CompatError) -> bool {
    matches!(
        error,
        CompatError::Engine(EngineError::ModelColumnNotFound | EngineError::NoColumns) | CompatError::EmptySheet(_)
    )
}
