//! Excelシート読み込み（calamine）

use crate::error::{CompatError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// 先頭シートの全セルを文字列で読み込む
pub fn read_first_sheet(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| CompatError::EmptySheet(path.display().to_string()))?;

    let range = workbook.worksheet_range(&sheet_name)?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        // 整数値のセルは "3.0" ではなく "3" にする
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
