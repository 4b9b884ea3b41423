use anyhow::Context;
use camera_compat::{cache, cli, config, export, loader, pipeline, report};
use camera_compat_common::{recommend, select_connectors};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use pipeline::{CheckOptions, Engine};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut config = Config::load()?;

    match cli.command {
        Commands::Check { file, column, sanitize, interactive, retention, output, format, no_cache } => {
            println!("📷 camera-compat - 互換性チェック\n");

            if let Some(days) = retention {
                config.retention_days = days;
                config.validate()?;
            }

            println!("[1/3] カタログを読み込み中...");
            let engine = Engine::from_config(&config)?;
            println!("✔ {}モデル\n", engine.catalog.len());

            let options = CheckOptions {
                column,
                sanitize,
                interactive,
                ..CheckOptions::from_config(&config)
            };

            println!("[2/3] 照合中...");
            let site_report = if no_cache {
                pipeline::check_file(&engine, &file, &options)?
            } else {
                let cache_dir = config.cache_dir()?;
                let mut results = cache::ResultCache::load(&cache_dir);
                let site_report = pipeline::check_file_cached(&engine, &file, &options, &mut results)?;
                results.save(&cache_dir)?;
                site_report
            };
            println!("✔ 照合完了\n");

            report::print_report(&site_report);

            if let Some(output) = output {
                println!("\n[3/3] エクスポート中...");
                let title = site_report.site.clone();
                for path in export::export_reports(&[site_report], &format, &output, &title)? {
                    println!("✔ 出力: {}", path.display());
                }
            }

            println!("\n✅ 完了");
        }

        Commands::Batch { folder, sanitize, retention, output, format } => {
            println!("🚀 camera-compat - 一括チェック\n");

            if let Some(days) = retention {
                config.retention_days = days;
                config.validate()?;
            }

            println!("[1/3] シートをスキャン中...");
            let files = loader::scan_folder(&folder)?;
            println!("✔ {}件のシートを検出\n", files.len());

            let engine = Engine::from_config(&config)?;
            let options = CheckOptions {
                sanitize,
                ..CheckOptions::from_config(&config)
            };

            println!("[2/3] 照合中...");
            let outcome = pipeline::partition_batch(pipeline::run_batch(&engine, &files, &options));
            for (path, e) in &outcome.skipped {
                println!("⚠ スキップ: {} ({})", path.display(), e);
            }
            for (path, e) in &outcome.failed {
                println!("✖ 失敗: {} ({})", path.display(), e);
            }
            println!(
                "✔ {}件完了 / {}件スキップ / {}件失敗\n",
                outcome.checked.len(),
                outcome.skipped.len(),
                outcome.failed.len()
            );

            let cache_dir = config.cache_dir()?;
            let mut results = cache::ResultCache::load(&cache_dir);
            for (path, site_report) in &outcome.checked {
                let hash = cache::compute_file_hash(path)
                    .with_context(|| format!("ハッシュ計算失敗: {}", path.display()))?;
                results.set(&site_report.site, pipeline::cache_entry(site_report, hash, &options));
            }
            results.save(&cache_dir)?;

            let reports: Vec<_> = outcome.checked.into_iter().map(|(_, site_report)| site_report).collect();
            for site_report in &reports {
                report::print_report(site_report);
                println!();
            }

            println!("[3/3] エクスポート中...");
            let output_dir = output.unwrap_or_else(|| export::default_batch_output(&folder));
            for path in export::export_reports(&reports, &format, &output_dir, "camera-compat")? {
                println!("✔ 出力: {}", path.display());
            }

            println!("\n✅ 完了");
        }

        Commands::Recommend { low, high, retention, channels, storage } => {
            let options = config.recommend_options();
            let recommendation = match (channels, storage) {
                (Some(channels), Some(storage)) => select_connectors(channels, storage, &options)?,
                _ => recommend(low, high, retention.unwrap_or(config.retention_days), &options)?,
            };
            report::print_recommendation(&recommendation);
        }

        Commands::Cache { clear, remove, info } => {
            let cache_dir = config.cache_dir()?;
            let cache_path = cache::ResultCache::cache_path(&cache_dir);
            let removing = remove.is_some();

            if let Some(site) = remove {
                let mut results = cache::ResultCache::load(&cache_dir);
                match results.remove(&site) {
                    Some(_) => {
                        results.save(&cache_dir)?;
                        println!("✔ キャッシュから削除しました: {}", site);
                    }
                    None => println!("キャッシュにありません: {}", site),
                }
            }

            if clear {
                match cache::ResultCache::delete(&cache_dir) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            } else if info || !removing {
                if cache_path.exists() {
                    let results = cache::ResultCache::load(&cache_dir);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", results.len());
                    for (site, entry) in results.sites() {
                        println!(
                            "  - {} ({}, {}日, {})",
                            site,
                            entry.file_name,
                            entry.retention_days,
                            entry.updated_at.format("%Y-%m-%d %H:%M")
                        );
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }
        }

        Commands::Config { set_retention, set_catalog, set_specs, show } => {
            if let Some(days) = set_retention {
                config.set_retention(days)?;
                println!("✔ 保存期間を設定しました: {}日", days);
            }

            if let Some(path) = set_catalog {
                config.set_catalog(path)?;
                println!("✔ 互換性リストを設定しました");
            }

            if let Some(path) = set_specs {
                config.set_specs(path)?;
                println!("✔ スペック表を設定しました");
            }

            if show {
                let display = |p: &Option<PathBuf>| {
                    p.as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".to_string())
                };
                println!("設定:");
                println!("  互換性リスト: {}", display(&config.catalog_path));
                println!("  スペック表: {}", display(&config.specs_path));
                println!("  単語リスト: {}", display(&config.word_list_path));
                println!("  保存期間: {}日", config.retention_days);
                println!("  読み飛ばし行数: {}", config.catalog_skip_rows);
                println!("  反復上限: {}", config.max_iterations);
            }
        }
    }

    Ok(())
}
