use super::{OutputFormatter, ReportRow, report_rows};
use crate::model::ScanReport;
use std::io::Write;

#[derive(Default)]
pub struct CsvOutput;

impl CsvOutput {
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for CsvOutput {
    fn format<W: Write>(&self, report: &ScanReport, writer: &mut W) -> std::io::Result<()> {
        let mut csv = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(writer);

        csv.write_record(ReportRow::HEADERS)?;
        for row in report_rows(&report.issues) {
            csv.write_record(row.cells())?;
        }
        csv.flush()
    }
}
