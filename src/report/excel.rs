//! Excel report
//!
//! `Results` sheet: one line per sheet row. `Summary` sheet: counts, coverage
//! and the lists of unplaced names and absent directory entries.

use super::SheetReport;
use crate::error::Result;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

const RESULT_COLUMNS: &[(&str, f64)] = &[
    ("Row", 6.0),
    ("Name (sheet)", 28.0),
    ("ID (sheet)", 14.0),
    ("Method", 9.0),
    ("Matched ID", 14.0),
    ("Matched Name", 28.0),
    ("Confidence", 11.0),
    ("Status", 11.0),
];

pub fn write_excel(report: &SheetReport, path: &Path) -> Result<()> {
    let mut workbook = build_workbook(report)?;
    workbook.save(path)?;
    Ok(())
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA))
}

fn build_workbook(report: &SheetReport) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let header = header_format();
    let confidence = Format::new().set_num_format("0.000");
    let percent = Format::new().set_num_format("0.0");

    let results = workbook.add_worksheet();
    results.set_name("Results")?;
    write_results(results, report, &header, &confidence)?;

    let summary = workbook.add_worksheet();
    summary.set_name("Summary")?;
    write_summary(summary, report, &header, &percent)?;

    Ok(workbook)
}

fn write_results(
    sheet: &mut Worksheet,
    report: &SheetReport,
    header: &Format,
    confidence: &Format,
) -> Result<()> {
    for (col, (title, width)) in RESULT_COLUMNS.iter().enumerate() {
        let col = col as u16;
        sheet.set_column_width(col, *width)?;
        sheet.write_string_with_format(0, col, *title, header)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    for (i, row) in report.rows.iter().enumerate() {
        let r = i as u32 + 1;
        let result = &row.result;
        sheet.write_number(r, 0, result.row_index as f64)?;
        sheet.write_string(r, 1, &result.raw_name)?;
        sheet.write_string(r, 2, result.raw_id.as_deref().unwrap_or(""))?;
        sheet.write_string(r, 3, result.match_method.to_string())?;
        sheet.write_string(r, 4, result.matched_entity_id.as_deref().unwrap_or(""))?;
        sheet.write_string(r, 5, row.matched_name.as_deref().unwrap_or(""))?;
        sheet.write_number_with_format(r, 6, result.confidence, confidence)?;
        sheet.write_string(r, 7, row.status.to_string())?;
    }
    Ok(())
}

fn write_summary(
    sheet: &mut Worksheet,
    report: &SheetReport,
    header: &Format,
    percent: &Format,
) -> Result<()> {
    sheet.set_column_width(0, 26.0)?;
    sheet.set_column_width(1, 40.0)?;

    let summary = &report.summary;
    let stats = &report.stats;
    let text_rows = [
        ("Sheet", report.source.clone()),
        ("Sheet date", report.sheet_date.clone().unwrap_or_default()),
        ("Sheet id", report.sheet_id.clone().unwrap_or_default()),
        ("Directory", report.directory.clone()),
        ("Snapshot SHA-256", report.reference_digest.clone()),
        ("Generated", report.generated_at.clone()),
    ];
    let number_rows = [
        ("Name threshold", report.threshold),
        ("Directory entries", report.reference_size as f64),
        ("Total rows", summary.total_rows as f64),
        ("Matched rows", summary.matched_rows as f64),
        ("Valid matches", stats.valid_matches as f64),
        ("High confidence", stats.high_confidence as f64),
        ("ID matches", stats.id_matches as f64),
        ("Name matches", stats.name_matches as f64),
        ("No matches", stats.no_matches as f64),
        ("Unique entities matched", stats.unique_entities_matched as f64),
    ];

    let mut r: u32 = 0;
    for (label, value) in &text_rows {
        sheet.write_string_with_format(r, 0, *label, header)?;
        sheet.write_string(r, 1, value)?;
        r += 1;
    }
    for (label, value) in &number_rows {
        sheet.write_string_with_format(r, 0, *label, header)?;
        sheet.write_number(r, 1, *value)?;
        r += 1;
    }
    for (label, value) in [
        ("Match percentage", summary.rounded_percentage()),
        ("Directory coverage", stats.directory_coverage),
    ] {
        sheet.write_string_with_format(r, 0, label, header)?;
        sheet.write_number_with_format(r, 1, value, percent)?;
        r += 1;
    }

    r += 1;
    sheet.write_string_with_format(r, 0, "Names not in directory", header)?;
    for name in &stats.extra_names {
        sheet.write_string(r, 1, name)?;
        r += 1;
    }
    if stats.extra_names.is_empty() {
        r += 1;
    }

    r += 1;
    sheet.write_string_with_format(r, 0, "Directory entries not on sheet", header)?;
    for entity in &stats.absent_entities {
        sheet.write_string(r, 1, format!("{} {}", entity.id, entity.name))?;
        r += 1;
    }
    Ok(())
}
