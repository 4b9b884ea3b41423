//! 結果出力モジュール
//!
//! 照合結果と推奨結果をCSV・Excelへ書き出す。

pub mod csv;
pub mod excel;

use crate::cli::ExportFormat;
use crate::error::Result;
use crate::pipeline::SiteReport;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 照合結果の出力行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRow {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Camera")]
    pub camera: String,
    #[serde(rename = "Match")]
    pub match_type: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Manufacturer")]
    pub manufacturer: String,
    #[serde(rename = "Minimum Firmware")]
    pub minimum_firmware: String,
    #[serde(rename = "Notes")]
    pub notes: String,
    #[serde(rename = "Count")]
    pub count: u32,
}

/// 推奨結果の出力行（機種ごと、サイトの要件を各行に持つ）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorRow {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Connector")]
    pub connector: String,
    #[serde(rename = "Count")]
    pub count: usize,
    #[serde(rename = "Required Channels")]
    pub required_channels: i64,
    #[serde(rename = "Required Storage (TB)")]
    pub required_storage_tb: f64,
    /// 負なら不足
    #[serde(rename = "Excess Channels")]
    pub excess_channels: i64,
}

/// 一括処理の既定の出力先（スキャン対象の直下には書かない）
pub const BATCH_OUTPUT_DIR: &str = "camera-compat-output";

pub fn default_batch_output(folder: &Path) -> PathBuf {
    folder.join(BATCH_OUTPUT_DIR)
}

pub fn match_rows(reports: &[SiteReport]) -> Vec<MatchRow> {
    reports
        .iter()
        .flat_map(|report| {
            report.matches.iter().map(move |m| {
                let model = m.matched_model.as_ref();
                MatchRow {
                    site: report.site.clone(),
                    camera: m.name.clone().unwrap_or_default(),
                    match_type: m.match_type.to_string(),
                    model: m.model_name().to_string(),
                    manufacturer: model.map(|x| x.manufacturer.clone()).unwrap_or_default(),
                    minimum_firmware: model
                        .map(|x| x.minimum_firmware_version.clone())
                        .unwrap_or_default(),
                    notes: model.map(|x| x.notes.clone()).unwrap_or_default(),
                    count: m.count,
                }
            })
        })
        .collect()
}

pub fn connector_rows(reports: &[SiteReport]) -> Vec<ConnectorRow> {
    reports
        .iter()
        .filter_map(|report| report.recommendation.as_ref().ok().map(|rec| (report, rec)))
        .flat_map(|(report, rec)| {
            rec.summary()
                .into_iter()
                .map(move |(name, count)| ConnectorRow {
                    site: report.site.clone(),
                    connector: name.to_string(),
                    count,
                    required_channels: rec.required_channels,
                    required_storage_tb: rec.required_storage_tb,
                    excess_channels: rec.excess_channels,
                })
        })
        .collect()
}

fn output_path_for_format(output: &Path, title: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, extension))
    } else {
        output.with_extension(extension)
    }
}

/// 指定形式で書き出し、出力したパスを返す
pub fn export_reports(
    reports: &[SiteReport],
    format: &ExportFormat,
    output: &Path,
    title: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if output.extension().is_none() {
        std::fs::create_dir_all(output)?;
    } else if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    if matches!(format, ExportFormat::Csv | ExportFormat::Both) {
        let path = output_path_for_format(output, title, "csv");
        csv::write_matches(reports, &path)?;
        written.push(path);

        let stem = format!("{}-connectors", title);
        let path = match output.parent() {
            Some(parent) if !output.is_dir() && output.extension().is_some() => parent.join(format!(
                "{}-connectors.csv",
                output.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or(stem)
            )),
            _ => output.join(format!("{}.csv", stem)),
        };
        csv::write_connectors(reports, &path)?;
        written.push(path);
    }

    if matches!(format, ExportFormat::Excel | ExportFormat::Both) {
        let path = output_path_for_format(output, title, "xlsx");
        excel::write_workbook(reports, &path)?;
        written.push(path);
    }

    Ok(written)
}
