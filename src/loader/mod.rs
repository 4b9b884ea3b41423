//! 入力ファイル読み込みモジュール
//!
//! CSV（csv）とExcel（calamine）のシートを文字列の表として読み込み、
//! 互換性リスト・スペック表・単語リストを組み立てる。

mod excel;

use crate::error::{CompatError, Result};
use camera_compat_common::{Catalog, ReferenceModel, SpecRow, Table};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const CSV_EXTENSIONS: &[&str] = &["csv", "txt"];
const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// 読み込み可能なシートファイルか
pub fn is_sheet_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    CSV_EXTENSIONS.contains(&ext.as_str()) || EXCEL_EXTENSIONS.contains(&ext.as_str())
}

/// シートを行の配列として読み込む（ヘッダー行を含む）
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    if !path.exists() {
        return Err(CompatError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if CSV_EXTENSIONS.contains(&ext.as_str()) {
        read_csv_rows(path)
    } else if EXCEL_EXTENSIONS.contains(&ext.as_str()) {
        excel::read_first_sheet(path)
    } else {
        Err(CompatError::UnsupportedFormat(path.display().to_string()))
    }
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// 顧客シートを読み込む（1行目がヘッダー）
pub fn read_table(path: &Path) -> Result<Table> {
    let mut rows = read_rows(path)?.into_iter();
    let headers = rows
        .next()
        .ok_or_else(|| CompatError::EmptySheet(path.display().to_string()))?;
    let table = Table::new(headers, rows.collect());
    tracing::debug!(path = %path.display(), rows = table.rows.len(), columns = table.width(), "table loaded");
    Ok(table)
}

/// 互換性リストを読み込む
///
/// 先頭 `skip_rows` 行を読み飛ばし、各行の
/// `メーカー, モデル名, 最小ファームウェア, 備考` を取り出す。
pub fn load_catalog(path: &Path, skip_rows: usize) -> Result<Catalog> {
    let rows: Vec<Vec<String>> = read_rows(path)?.into_iter().skip(skip_rows).collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width < 4 {
        return Err(CompatError::InvalidCatalog(format!(
            "{}: 4列以上が必要です（{}列）",
            path.display(),
            width
        )));
    }

    let models: Vec<ReferenceModel> = rows
        .into_iter()
        .filter(|row| row.len() >= 4)
        .map(|row| ReferenceModel {
            manufacturer: row[0].clone(),
            model_name: row[1].clone(),
            minimum_firmware_version: row[2].clone(),
            notes: row[3].clone(),
            ..Default::default()
        })
        .collect();

    let catalog = Catalog::new(models);
    if catalog.is_empty() {
        return Err(CompatError::Engine(camera_compat_common::Error::EmptyCatalog));
    }
    tracing::info!(path = %path.display(), models = catalog.len(), "catalog loaded");
    Ok(catalog)
}

/// スペック表を読み込む（ヘッダー名で列を探す）
pub fn load_specs(path: &Path) -> Result<Vec<SpecRow>> {
    let table = read_table(path)?;
    let find = |name: &str| {
        table
            .headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };

    let model_col = find("Model Name")
        .ok_or_else(|| CompatError::InvalidCatalog(format!("{}: 'Model Name' 列がありません", path.display())))?;
    let manufacturer_col = find("Manufacturer");
    let mp_col = find("MP");
    let channels_col = find("Channels");

    let cell = |row: &Vec<String>, col: Option<usize>| -> String {
        col.and_then(|c| row.get(c)).cloned().unwrap_or_default()
    };
    let number = |value: String| value.trim().parse::<f64>().ok().filter(|n| n.is_finite()).unwrap_or(0.0);

    let specs = table
        .rows
        .iter()
        .map(|row| SpecRow {
            manufacturer: cell(row, manufacturer_col),
            model_name: cell(row, Some(model_col)),
            megapixels: number(cell(row, mp_col)),
            channels: number(cell(row, channels_col)),
        })
        .filter(|spec| !spec.model_name.trim().is_empty())
        .collect::<Vec<_>>();

    tracing::info!(path = %path.display(), rows = specs.len(), "specs loaded");
    Ok(specs)
}

/// 単語リストを読み込む（1行1語、`#` 始まりはコメント）
pub fn load_word_list(path: &Path) -> Result<HashSet<String>> {
    if !path.exists() {
        return Err(CompatError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_lowercase)
        .collect())
}

/// フォルダ直下のシートファイルを列挙する（ファイル名順）
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.exists() {
        return Err(CompatError::FolderNotFound(folder.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1) // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .map(|ext| is_sheet_extension(&ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
