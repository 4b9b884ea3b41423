//! 対話式の型番列選択モジュール
//!
//! 型番列を自動判定できなかったとき、列の一覧から選んでもらう。

use crate::error::{CompatError, Result};
use camera_compat_common::Table;
use dialoguer::Select;

/// 候補表示に使うサンプル値の数
const SAMPLE_VALUES: usize = 3;

/// 列ごとの表示ラベル（ヘッダーと先頭の値）
pub fn column_choices(table: &Table) -> Vec<String> {
    (0..table.width())
        .map(|index| {
            let samples: Vec<&str> = table
                .column(index)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .take(SAMPLE_VALUES)
                .collect();
            let header = match table.header(index).trim() {
                "" => format!("列{}", index + 1),
                h => h.to_string(),
            };
            if samples.is_empty() {
                header
            } else {
                format!("{} ({})", header, samples.join(", "))
            }
        })
        .collect()
}

/// 型番列を選択（Esc / q でスキップすると None）
pub fn select_model_column(table: &Table, file_name: &str) -> Result<Option<usize>> {
    let choices = column_choices(table);
    if choices.is_empty() {
        return Ok(None);
    }

    println!("⚠ {}: カメラ型番の列を判定できませんでした", file_name);

    Select::new()
        .with_prompt("型番の列を選択 (Esc:スキップ)")
        .items(&choices)
        .default(0)
        .interact_opt()
        .map_err(|e| CompatError::Prompt(e.to_string()))
}
