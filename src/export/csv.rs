//! CSV出力

use super::{connector_rows, match_rows};
use crate::error::Result;
use crate::pipeline::SiteReport;
use std::path::Path;

/// 照合結果をCSVへ書き出す
pub fn write_matches(reports: &[SiteReport], path: &Path) -> Result<()> {
    let mut writer = ::csv::Writer::from_path(path)?;
    for row in match_rows(reports) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// 推奨機種をCSVへ書き出す
pub fn write_connectors(reports: &[SiteReport], path: &Path) -> Result<()> {
    let mut writer = ::csv::Writer::from_path(path)?;
    for row in connector_rows(reports) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
