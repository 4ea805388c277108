//! Console rendering

use super::SheetReport;
use std::fmt::Write;

const RULE: &str = "============================================================";

pub fn render(report: &SheetReport) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &SheetReport) -> std::fmt::Result {
    writeln!(out, "{}", RULE)?;
    write!(out, "Sheet: {}", report.source)?;
    if let Some(date) = &report.sheet_date {
        write!(out, "  date {}", date)?;
    }
    if let Some(id) = &report.sheet_id {
        write!(out, "  id {}", id)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Directory: {} ({} entries, snapshot {})",
        report.directory,
        report.reference_size,
        short_digest(&report.reference_digest)
    )?;
    writeln!(out, "{}", RULE)?;

    for row in &report.rows {
        let result = &row.result;
        writeln!(
            out,
            "Row {:>3}: '{}' (ID: {})",
            result.row_index,
            result.raw_name,
            result.raw_id.as_deref().unwrap_or("-")
        )?;
        match (&result.matched_entity_id, &row.matched_name) {
            (Some(id), name) => writeln!(
                out,
                "         {:<8} | {} -> {} ({}) | conf {:.3}",
                row.status.to_string(),
                result.match_method,
                name.as_deref().unwrap_or(""),
                id,
                result.confidence
            )?,
            (None, _) => writeln!(
                out,
                "         {:<8} | {} | best {:.3}",
                row.status.to_string(),
                result.match_method,
                result.confidence
            )?,
        }
    }

    let summary = &report.summary;
    let stats = &report.stats;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "SUMMARY (name threshold {:.2})", report.threshold)?;
    writeln!(out, "  Total rows:              {}", summary.total_rows)?;
    writeln!(out, "  Matched rows:            {}", summary.matched_rows)?;
    writeln!(out, "  Match percentage:        {:.1}%", summary.rounded_percentage())?;
    writeln!(out, "  Valid matches:           {}", stats.valid_matches)?;
    writeln!(out, "  High confidence:         {}", stats.high_confidence)?;
    writeln!(out, "  ID / NAME / NONE:        {} / {} / {}", stats.id_matches, stats.name_matches, stats.no_matches)?;
    writeln!(out, "  Unique entities matched: {}", stats.unique_entities_matched)?;
    writeln!(out, "  Directory coverage:      {:.1}%", stats.directory_coverage)?;

    if stats.extra_names.is_empty() {
        writeln!(out, "All names found in directory")?;
    } else {
        writeln!(out, "Names not in directory ({}):", stats.extra_names.len())?;
        for name in &stats.extra_names {
            writeln!(out, "  - {}", name)?;
        }
    }

    if !stats.absent_entities.is_empty() {
        writeln!(out, "Directory entries not on sheet ({}):", stats.absent_entities.len())?;
        for entity in &stats.absent_entities {
            writeln!(out, "  - {} {}", entity.id, entity.name)?;
        }
    }
    Ok(())
}

fn short_digest(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_support::sample_report;

    #[test]
    fn test_render() {
        let text = render(&sample_report());
        assert!(text.contains("Sheet: sheet.json  date 2025-03-01  id A1"));
        assert!(text.contains("Row   1: 'Jermey Dickamorc' (ID: 1042823)"));
        assert!(text.contains("ID -> Jeremy Dickamore (1042823) | conf 1.000"));
        assert!(text.contains("Match percentage:        66.7%"));
        assert!(text.contains("  - Zzyzx Qwerty"));
        assert!(text.contains("  - 6002 Bob Ray"));
    }

    #[test]
    fn test_short_digest() {
        assert_eq!(short_digest("abc"), "abc");
        assert_eq!(short_digest("0123456789abcdef"), "0123456789ab");
    }
}
