pub mod analysis;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod fs;
pub mod host;
pub mod logging;
pub mod model;
pub mod output;
pub mod protocol;
pub mod session;
pub mod style;

pub use api::{AuditError, ReportFormat, ScanOptions, render_report, scan_file, scan_json};
pub use cli::Cli;
pub use commands::{cmd_fix, cmd_init, cmd_quick_check, cmd_scan};
pub use config::Config;
pub use model::ScanReport;
