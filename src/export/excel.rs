//! Excel出力（rust_xlsxwriter）
//!
//! 1枚目に照合結果、2枚目に推奨コネクターを書き出す。

use super::{connector_rows, match_rows};
use crate::error::Result;
use crate::pipeline::SiteReport;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

const MATCH_HEADERS: [&str; 8] = [
    "Site",
    "Camera",
    "Match",
    "Model",
    "Manufacturer",
    "Minimum Firmware",
    "Notes",
    "Count",
];

const CONNECTOR_HEADERS: [&str; 6] = [
    "Site",
    "Connector",
    "Count",
    "Required Channels",
    "Required Storage (TB)",
    "Excess Channels",
];

pub fn write_workbook(reports: &[SiteReport], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet().set_name("Matches")?;
    for (col, header) in MATCH_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (i, row) in match_rows(reports).iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &row.site)?;
        sheet.write_string(r, 1, &row.camera)?;
        sheet.write_string(r, 2, &row.match_type)?;
        sheet.write_string(r, 3, &row.model)?;
        sheet.write_string(r, 4, &row.manufacturer)?;
        sheet.write_string(r, 5, &row.minimum_firmware)?;
        sheet.write_string(r, 6, &row.notes)?;
        sheet.write_number(r, 7, f64::from(row.count))?;
    }
    sheet.set_column_width(1, 28)?;
    sheet.set_column_width(3, 20)?;

    let sheet = workbook.add_worksheet().set_name("Connectors")?;
    for (col, header) in CONNECTOR_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    let rows = connector_rows(reports);
    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &row.site)?;
        sheet.write_string(r, 1, &row.connector)?;
        sheet.write_number(r, 2, row.count as f64)?;

        // サイトごとの要件は最初の行にだけ書く
        if i == 0 || rows[i - 1].site != row.site {
            sheet.write_number(r, 3, row.required_channels as f64)?;
            sheet.write_number(r, 4, row.required_storage_tb)?;
            sheet.write_number(r, 5, row.excess_channels as f64)?;
        }
    }
    sheet.set_column_width(4, 22)?;

    workbook.save(path)?;
    Ok(())
}
