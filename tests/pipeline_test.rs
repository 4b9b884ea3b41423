//! チェック処理の統合テスト
//!
//! 読み込みから推奨までの一連の流れを検証

use camera_compat::cache::ResultCache;
use camera_compat::cli::ExportFormat;
use camera_compat::error::CompatError;
use camera_compat::export;
use camera_compat::pipeline::{self, CheckOptions, Engine};
use camera_compat_common::{
    Catalog, ColumnSelector, Error as EngineError, MatchType, RecommendOptions, ReferenceModel,
    SpecRow, Table,
};
use std::path::Path;
use tempfile::tempdir;

fn model(name: &str) -> ReferenceModel {
    ReferenceModel {
        model_name: name.to_string(),
        manufacturer: "Axis".to_string(),
        minimum_firmware_version: "10.12".to_string(),
        ..Default::default()
    }
}

fn create_engine() -> Engine {
    let mut catalog = Catalog::new(vec![model("CC1"), model("P3245-LVE"), model("Q6135-LE")]);
    catalog.enrich(&[
        SpecRow {
            model_name: "cc1".to_string(),
            megapixels: 2.0,
            channels: 4.0,
            ..Default::default()
        },
        SpecRow {
            model_name: "q6135-le".to_string(),
            megapixels: 8.0,
            channels: 1.0,
            ..Default::default()
        },
    ]);
    Engine::new(catalog, Vec::<String>::new())
}

fn options() -> CheckOptions {
    CheckOptions {
        column: None,
        sanitize: false,
        interactive: false,
        retention_days: 30,
        recommend: RecommendOptions::default(),
    }
}

fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
    Table::new(
        headers.iter().map(|s| s.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect(),
    )
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("書き込み失敗");
    path
}

/// 1モデル×3台の一連の流れ
#[test]
fn test_round_trip_single_model() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = write(dir.path(), "site-a.csv", "Model\nCC1\nCC1\nCC1\n");

    let report = pipeline::check_file(&create_engine(), &path, &options()).unwrap();

    assert_eq!(report.site, "site-a");
    assert_eq!(report.file_name, "site-a.csv");
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].match_type, MatchType::Exact);
    assert_eq!(report.matches[0].count, 3);
    // チャンネル数ではなく台数で数える
    assert_eq!(report.demand.low, 3);
    assert_eq!(report.demand.high, 0);

    let rec = report.recommendation.as_ref().expect("推奨が計算されていない");
    let names: Vec<&str> = rec.connectors.iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["CC300-4TB"]);
    assert_eq!(rec.required_channels, 3);
    assert_eq!(rec.excess_channels, 7);

    // 同じ入力なら同じ結果
    let again = pipeline::check_file(&create_engine(), &path, &options()).unwrap();
    assert_eq!(again.matches, report.matches);
    assert_eq!(again.recommendation, report.recommendation);
}

/// 台数列があれば合計を使う
#[test]
fn test_count_column_is_summed() {
    let t = table(
        &["Location", "Camera", "Camera Count"],
        &[
            &["Lobby", "P3245-LVE", "2"],
            &["Dock", "Q6135-LE", "1"],
            &["Office", "P3245-LVE", "3"],
            &["Yard", "", "x"],
        ],
    );

    let report = pipeline::check_table(&create_engine(), "hq", &t, &options()).unwrap();

    assert_eq!(report.model_column, "Camera");
    assert_eq!(report.count_column.as_deref(), Some("Camera Count"));
    assert_eq!(report.total_cameras(), 6);

    let p3245 = report
        .matches
        .iter()
        .find(|m| m.model_name() == "p3245-lve")
        .unwrap();
    assert_eq!(p3245.name.as_deref(), Some("P3245-LVE"));
    assert_eq!(p3245.count, 5);

    // 8MPは高解像度
    assert_eq!(report.demand.high, 1);
    assert_eq!(report.demand.low, 5);
}

/// 台数列がなければ行数で数える
#[test]
fn test_counts_by_frequency() {
    let t = table(
        &["Model"],
        &[&["CC1"], &[""], &["mystery cam"], &["CC1"], &["  "]],
    );

    let report = pipeline::check_table(&create_engine(), "site", &t, &options()).unwrap();

    // 空欄以外の行数と一致
    assert_eq!(report.total_cameras(), 3);
    assert_eq!(report.matches[0].match_type, MatchType::Exact);
    assert_eq!(report.matches.last().unwrap().match_type, MatchType::Unsupported);
    assert!(report.matches.iter().all(|m| m.match_type != MatchType::Empty));
}

/// 前処理でIP列・行番号列・英単語を除去してから照合する
#[test]
fn test_sanitized_check() {
    let t = table(
        &["#", "Camera Model", "IP Address", "Quantity"],
        &[
            &["1", "Axis P3245-LVE camera", "10.0.0.1", "2"],
            &["2", "Q6135-LE", "10.0.0.2", "1"],
        ],
    );

    let opts = CheckOptions {
        sanitize: true,
        ..options()
    };
    let report = pipeline::check_table(&create_engine(), "site", &t, &opts).unwrap();

    assert_eq!(report.model_column, "Camera Model");
    assert_eq!(report.count_column.as_deref(), Some("Quantity"));

    let first = &report.matches[0];
    assert_eq!(first.match_type, MatchType::Exact);
    assert_eq!(first.model_name(), "q6135-le");

    let second = &report.matches[1];
    assert_eq!(second.name.as_deref(), Some("Axis P3245-LVE"));
    assert_eq!(second.match_type, MatchType::Identified);
    assert_eq!(second.count, 2);
}

/// 型番列を判定できない表
#[test]
fn test_model_column_not_found() {
    let t = table(&["ID", "Qty"], &[&["1", "2"], &["2", "5"]]);

    let result = pipeline::check_table(&create_engine(), "site", &t, &options());
    let err = result.unwrap_err();
    assert!(pipeline::is_skippable(&err));
}

/// 型番列の明示指定
#[test]
fn test_forced_column() {
    let t = table(&["Notes", "Device"], &[&["CC1", "P3245-LVE"]]);

    let opts = CheckOptions {
        column: Some(ColumnSelector::Index(1)),
        ..options()
    };
    let report = pipeline::check_table(&create_engine(), "site", &t, &opts).unwrap();
    assert_eq!(report.model_column, "Device");
    assert_eq!(report.matches[0].model_name(), "p3245-lve");

    let opts = CheckOptions {
        column: Some(ColumnSelector::Index(9)),
        ..options()
    };
    let err = pipeline::check_table(&create_engine(), "site", &t, &opts).unwrap_err();
    assert!(matches!(
        err,
        CompatError::Engine(EngineError::ColumnOutOfBounds { index: 9, width: 2 })
    ));
}

/// 保存期間の上限超過は推奨エラーとして残る
#[test]
fn test_unsupported_retention_is_reported() {
    let t = table(&["Model"], &[&["CC1"]]);
    let opts = CheckOptions {
        retention_days: 120,
        ..options()
    };
    let report = pipeline::check_table(&create_engine(), "site", &t, &opts).unwrap();
    assert_eq!(report.recommendation, Err(EngineError::RetentionUnsupported(120)));
}

/// キャッシュの利用
#[test]
fn test_check_file_cached() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = write(dir.path(), "branch.csv", "Model\nCC1\nQ6135-LE\n");
    let engine = create_engine();
    let mut cache = ResultCache::default();

    let first = pipeline::check_file_cached(&engine, &path, &options(), &mut cache).unwrap();
    assert!(!first.from_cache);
    assert_eq!(cache.len(), 1);

    let second = pipeline::check_file_cached(&engine, &path, &options(), &mut cache).unwrap();
    assert!(second.from_cache);
    assert_eq!(second.matches, first.matches);
    assert_eq!(second.recommendation, first.recommendation);

    // 保存期間が変われば再計算
    let opts = CheckOptions {
        retention_days: 60,
        ..options()
    };
    let third = pipeline::check_file_cached(&engine, &path, &opts, &mut cache).unwrap();
    assert!(!third.from_cache);
    assert_eq!(cache.get("branch").unwrap().retention_days, 60);
}

/// 一括処理では判定できないファイルを残して続行する
#[test]
fn test_run_batch() {
    let dir = tempdir().expect("Failed to create temp dir");
    write(dir.path(), "a.csv", "Model\nCC1\n");
    write(dir.path(), "b.csv", "ID\n1\n2\n");
    write(dir.path(), "c.csv", "Camera,Count\nP3245-LVE,4\n");

    let files = camera_compat::loader::scan_folder(dir.path()).unwrap();
    let results = pipeline::run_batch(&create_engine(), &files, &options());

    assert_eq!(results.len(), 3);
    assert!(results[0].1.is_ok());
    assert!(results[1].1.as_ref().is_err_and(pipeline::is_skippable));
    assert_eq!(results[2].1.as_ref().unwrap().total_cameras(), 4);
}

/// 型番列の指定・前処理の有無が変わればキャッシュを使わない
#[test]
fn test_cache_respects_column_and_sanitize() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = write(dir.path(), "branch.csv", "Notes,Device\nCC1,P3245-LVE\n");
    let engine = create_engine();
    let mut cache = ResultCache::default();

    // 同点なので先頭の列が選ばれる
    let auto = pipeline::check_file_cached(&engine, &path, &options(), &mut cache).unwrap();
    assert_eq!(auto.matches[0].model_name(), "cc1");

    let forced = CheckOptions {
        column: Some(ColumnSelector::Index(1)),
        ..options()
    };
    let report = pipeline::check_file_cached(&engine, &path, &forced, &mut cache).unwrap();
    assert!(!report.from_cache);
    assert_eq!(report.matches[0].model_name(), "p3245-lve");

    let again = pipeline::check_file_cached(&engine, &path, &forced, &mut cache).unwrap();
    assert!(again.from_cache);
    assert_eq!(again.matches, report.matches);

    let sanitized = CheckOptions {
        sanitize: true,
        ..forced
    };
    let report = pipeline::check_file_cached(&engine, &path, &sanitized, &mut cache).unwrap();
    assert!(!report.from_cache);
    assert!(cache.get("branch").unwrap().sanitize);
}

/// 一括処理の出力は次回のスキャン対象にならない
#[test]
fn test_batch_output_is_not_rescanned() {
    let dir = tempdir().expect("Failed to create temp dir");
    write(dir.path(), "a.csv", "Model\nCC1\n");
    let engine = create_engine();

    let files = camera_compat::loader::scan_folder(dir.path()).unwrap();
    let outcome = pipeline::partition_batch(pipeline::run_batch(&engine, &files, &options()));
    let reports: Vec<_> = outcome.checked.into_iter().map(|(_, r)| r).collect();

    let output = export::default_batch_output(dir.path());
    let written = export::export_reports(&reports, &ExportFormat::Both, &output, "camera-compat").unwrap();
    assert_eq!(written.len(), 3);
    assert!(written.iter().all(|p| p.starts_with(&output) && p.exists()));

    let rescanned = camera_compat::loader::scan_folder(dir.path()).unwrap();
    assert_eq!(rescanned, files);
    let results = pipeline::run_batch(&engine, &rescanned, &options());
    assert_eq!(results.len(), 1);
}

/// 読み込みに失敗したファイルがあっても残りの結果は失わない
#[test]
fn test_partition_batch_keeps_going_on_failure() {
    let dir = tempdir().expect("Failed to create temp dir");
    write(dir.path(), "a.csv", "Model\nCC1\n");
    write(dir.path(), "b.csv", "ID\n1\n");
    write(dir.path(), "c.xlsx", "not a workbook");

    let files = camera_compat::loader::scan_folder(dir.path()).unwrap();
    let outcome = pipeline::partition_batch(pipeline::run_batch(&create_engine(), &files, &options()));

    assert_eq!(outcome.checked.len(), 1);
    assert_eq!(outcome.checked[0].1.site, "a");
    assert_eq!(outcome.skipped.len(), 1);
    assert!(outcome.skipped[0].0.ends_with("b.csv"));
    assert_eq!(outcome.failed.len(), 1);
    assert!(outcome.failed[0].0.ends_with("c.xlsx"));
    assert!(matches!(outcome.failed[0].1, CompatError::ExcelRead(_)));
}
