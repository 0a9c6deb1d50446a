mod fix;
mod init;
mod quick_check;
mod scan;

pub use fix::{cmd_fix, cmd_fix_with_fs};
pub use init::{cmd_init, cmd_init_with_fs};
pub use quick_check::cmd_quick_check;
pub use scan::{cmd_scan, cmd_scan_with_fs};

use crate::cli::ThresholdArgs;
use crate::config::Config;
use crate::fs::FileSystem;
use crate::host::DocumentSnapshot;
use crate::style;
use std::path::{Path, PathBuf};

/// Document, config and runtime shared by every command that audits a file.
/// Setup failures are already reported when `new` returns `Err(exit_code)`.
pub struct CommandContext {
    pub document_path: PathBuf,
    pub document: DocumentSnapshot,
    pub config: Config,
    pub runtime: tokio::runtime::Runtime,
}

impl CommandContext {
    pub fn new(
        document_path: &Path,
        thresholds: &ThresholdArgs,
        fs: &dyn FileSystem,
    ) -> Result<Self, i32> {
        let document = match DocumentSnapshot::load_with_fs(document_path, fs) {
            Ok(document) => document,
            Err(e) => {
                style::error(&format!(
                    "Could not load {}: {}",
                    style::path(document_path),
                    e
                ));
                return Err(1);
            }
        };

        let config_dir = document_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut config = Config::load_with_fs(config_dir, fs).unwrap_or_else(|e| {
            style::warning(&format!("Failed to load config: {}. Using defaults.", e));
            Config::default()
        });
        thresholds.apply(&mut config);

        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                style::error(&format!("Failed to start async runtime: {}", e));
                return Err(1);
            }
        };

        tracing::debug!(
            document = %document_path.display(),
            nodes = document.len(),
            "loaded document"
        );

        Ok(Self {
            document_path: document_path.to_path_buf(),
            document,
            config,
            runtime,
        })
    }
}
