//! File access for documents, reports and config files.
//!
//! Commands take a `&dyn FileSystem` so they can run against an in-memory
//! filesystem in tests; everything else goes through [`default_fs`].

use std::io;
use std::path::Path;

pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Create or truncate `path` and write `content` to it.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

pub fn default_fs() -> &'static RealFs {
    static INSTANCE: RealFs = RealFs;
    &INSTANCE
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// In-memory filesystem keyed by path.
    #[derive(Debug, Default)]
    pub struct MockFs {
        files: Mutex<BTreeMap<PathBuf, String>>,
    }

    impl MockFs {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
            self.files
                .lock()
                .unwrap()
                .insert(path.as_ref().to_path_buf(), content.into());
            self
        }

        pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
            self.files.lock().unwrap().get(path.as_ref()).cloned()
        }
    }

    impl FileSystem for MockFs {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.contents(path).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such file: {}", path.display()),
                )
            })
        }

        fn write(&self, path: &Path, content: &str) -> io::Result<()> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), content.to_string());
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.lock().unwrap().contains_key(path)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_mock_fs_write_then_read() {
            let fs = MockFs::new();
            let path = Path::new("/designs/home.json");

            assert!(!fs.exists(path));
            assert_eq!(
                fs.read_to_string(path).unwrap_err().kind(),
                io::ErrorKind::NotFound
            );

            fs.write(path, "{}").unwrap();
            assert!(fs.exists(path));
            assert_eq!(fs.read_to_string(path).unwrap(), "{}");
        }

        #[test]
        fn test_mock_fs_prepopulated() {
            let fs = MockFs::new()
                .with_file("/a.json", "a")
                .with_file("/b.toml", "b");
            assert_eq!(fs.contents("/a.json").as_deref(), Some("a"));
            assert_eq!(fs.read_to_string(Path::new("/b.toml")).unwrap(), "b");
        }
    }
}
