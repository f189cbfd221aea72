use anyhow::{Result, anyhow};
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::models::Job;

pub const CSV_FILENAME: &str = "jobs.csv";
pub const REPORT_FILENAME: &str = "job_applications.pdf";

const COLUMNS: [&str; 5] = ["Company", "Position", "Status", "Job Type", "Interview Date"];

fn render_date(job: &Job) -> String {
    job.interview_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// CSV rendering of the filtered set (pre-pagination), one row per job.
///
/// Fields are written verbatim with quoting disabled to keep the exact
/// `Company,Position,...` wire format. A company name containing a comma
/// corrupts its row; the format has no escaping.
pub fn to_csv(jobs: &[&Job]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::new());

    writer.write_record(COLUMNS)?;
    for job in jobs {
        let date = render_date(job);
        writer.write_record([
            job.company.as_str(),
            job.position.as_str(),
            job.status.as_str(),
            job.job_type.as_str(),
            date.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV buffer: {e}"))
}

/// One-page-or-more A4 report: a title line and the same five columns as a
/// table, in the input collection's row order.
pub fn to_pdf(jobs: &[&Job]) -> Result<Vec<u8>> {
    let page_width = 210.0;
    let page_height = 297.0;
    let column_x = [14.0, 58.0, 102.0, 130.0, 164.0];
    let row_step = 7.0;
    let bottom_margin = 16.0;

    let (doc, first_page, first_layer) =
        PdfDocument::new("Job Applications Report", Mm(page_width), Mm(page_height), "table");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("Failed to load report font: {e}"))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("Failed to load report font: {e}"))?;

    let header_row = |layer: &printpdf::PdfLayerReference, y| {
        for (text, x) in COLUMNS.iter().zip(column_x) {
            layer.use_text(*text, 11.0, Mm(x), Mm(y), &font_bold);
        }
    };

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    layer.use_text("Job Applications Report", 16.0, Mm(column_x[0]), Mm(280.0), &font_bold);

    let mut y = 268.0;
    header_row(&layer, y);
    y -= row_step;

    for job in jobs {
        if y < bottom_margin {
            let (page, page_layer) = doc.add_page(Mm(page_width), Mm(page_height), "table");
            layer = doc.get_page(page).get_layer(page_layer);
            y = 281.0;
            header_row(&layer, y);
            y -= row_step;
        }

        let date = render_date(job);
        let cells = [
            truncate(&job.company, 24),
            truncate(&job.position, 24),
            job.status.as_str().to_string(),
            job.job_type.as_str().to_string(),
            date,
        ];
        for (cell, x) in cells.iter().zip(column_x) {
            layer.use_text(cell.as_str(), 10.0, Mm(x), Mm(y), &font);
        }
        y -= row_step;
    }

    doc.save_to_bytes()
        .map_err(|e| anyhow!("Failed to render PDF report: {e}"))
}

// Counts chars, not bytes, so multibyte names never split mid-character.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobStatus, JobType};
    use chrono::{TimeZone, Utc};

    fn job(company: &str, position: &str, interview: bool) -> Job {
        Job {
            id: format!("{company}-{position}"),
            company: company.to_string(),
            position: position.to_string(),
            status: JobStatus::Pending,
            job_type: JobType::FullTime,
            interview_date: interview
                .then(|| Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_csv_row_count_matches_collection() {
        let a = job("Acme", "Engineer", true);
        let b = job("Globex", "Designer", false);
        let bytes = to_csv(&[&a, &b]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Company,Position,Status,Job Type,Interview Date");
        assert_eq!(lines[1], "Acme,Engineer,pending,full-time,2026-09-01");
    }

    #[test]
    fn test_csv_absent_interview_date_is_empty_cell() {
        let a = job("Globex", "Designer", false);
        let bytes = to_csv(&[&a]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with("full-time,"));
    }

    #[test]
    fn test_csv_rows_end_with_newline() {
        let a = job("Acme", "Engineer", false);
        let bytes = to_csv(&[&a]).unwrap();
        assert_eq!(*bytes.last().unwrap(), b'\n');
    }

    #[test]
    fn test_csv_does_not_escape_embedded_commas() {
        // Known format gap: the extra comma shifts every later cell.
        let a = job("Acme, Inc.", "Engineer", false);
        let bytes = to_csv(&[&a]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, "Acme, Inc.,Engineer,pending,full-time,");
        assert_eq!(row.split(',').count(), 6);
    }

    #[test]
    fn test_truncate_cuts_on_char_boundaries() {
        assert_eq!(truncate("héllo", 5), "héllo");
        assert_eq!(truncate("Ingenieurbüro Müller AG", 10), "Ingenie...");
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }

    #[test]
    fn test_pdf_truncates_multibyte_names_without_panicking() {
        let a = job("Ingenieurbüro Müller & Söhne GmbH", "Développeur logiciel sénior", true);
        let bytes = to_pdf(&[&a]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_pdf_report_has_pdf_magic() {
        let a = job("Acme", "Engineer", true);
        let bytes = to_pdf(&[&a]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_pdf_report_handles_empty_and_overflowing_collections() {
        assert!(to_pdf(&[]).unwrap().starts_with(b"%PDF"));

        let many: Vec<Job> = (0..80).map(|i| job(&format!("Co{i}"), "Engineer", false)).collect();
        let refs: Vec<&Job> = many.iter().collect();
        let bytes = to_pdf(&refs).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
