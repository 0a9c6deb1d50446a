mod csv;
mod json;
mod markdown;
mod row;

pub use self::csv::CsvOutput;
pub use json::{JsonOutput, ReportJsonOutput};
pub use markdown::MarkdownOutput;
pub use row::{NOT_AVAILABLE, ReportRow, element_name, report_rows};

use crate::model::ScanReport;
use std::io::Write;

pub trait OutputFormatter {
    fn format<W: Write>(&self, report: &ScanReport, writer: &mut W) -> std::io::Result<()>;
}
