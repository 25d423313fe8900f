//! Fixture discovery - find fixture files and load their golden companions

use crate::error::{HarnessError, HarnessResult};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension reserved for golden companion files
const GOLDEN_EXT: &str = "expected";

/// A discovered fixture file
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Path to the fixture source file
    pub path: PathBuf,
    /// Exact stdout the tool must produce, when a golden file exists
    pub expected_stdout: Option<Vec<u8>>,
}

impl Fixture {
    /// Path of the sibling golden file (the fixture file name with
    /// ".expected" appended)
    pub fn golden_path(&self) -> PathBuf {
        golden_path(&self.path)
    }
}

/// A matching file that could not be loaded
#[derive(Debug, Clone)]
pub struct ScanError {
    /// The fixture the problem belongs to
    pub path: PathBuf,
    /// What went wrong while loading it
    pub message: String,
}

/// A set of discovered fixtures
#[derive(Debug, Default)]
pub struct FixtureSet {
    /// All discovered fixtures, sorted by path
    pub fixtures: Vec<Fixture>,
    /// Fixtures whose golden companion could not be read
    pub scan_errors: Vec<ScanError>,
}

impl FixtureSet {
    /// Discover all fixture files in a directory tree
    pub fn discover(root: &Path, extensions: &[String]) -> HarnessResult<Self> {
        if !root.is_dir() {
            return Err(HarnessError::invalid_root(root));
        }

        let mut set = FixtureSet::default();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
        {
            let path = entry.path();

            if !entry.file_type().is_file() || !matches_extension(path, extensions) {
                continue;
            }

            match load_golden(path) {
                Ok(expected_stdout) => set.fixtures.push(Fixture {
                    path: path.to_path_buf(),
                    expected_stdout,
                }),
                Err(e) => set.scan_errors.push(ScanError {
                    path: path.to_path_buf(),
                    message: e,
                }),
            }
        }

        // Sort by path for deterministic reports
        set.fixtures.sort_by(|a, b| a.path.cmp(&b.path));
        set.scan_errors.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(set)
    }

    /// Keep only fixtures whose path contains the pattern
    pub fn filter(&self, pattern: &str) -> Self {
        let fixtures = self
            .fixtures
            .iter()
            .filter(|f| f.path.to_string_lossy().contains(pattern))
            .cloned()
            .collect();

        let scan_errors = self
            .scan_errors
            .iter()
            .filter(|s| s.path.to_string_lossy().contains(pattern))
            .cloned()
            .collect();

        FixtureSet {
            fixtures,
            scan_errors,
        }
    }

    /// Check if discovery found nothing at all
    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty() && self.scan_errors.is_empty()
    }

    /// Get count of fixtures
    pub fn len(&self) -> usize {
        self.fixtures.len()
    }
}

/// Whether a path is a fixture under the configured extension set
fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    if let Some(ext) = path.extension() {
        // Golden companions are never fixtures themselves
        if ext == OsStr::new(GOLDEN_EXT) {
            return false;
        }
        extensions.iter().any(|e| ext == OsStr::new(e.as_str()))
    } else {
        false
    }
}

/// Load the golden companion for a fixture, if present
fn load_golden(path: &Path) -> Result<Option<Vec<u8>>, String> {
    let golden = golden_path(path);
    match fs::read(&golden) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(format!("Failed to read {}: {}", golden.display(), e)),
    }
}

fn golden_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(GOLDEN_EXT);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn exts() -> Vec<String> {
        vec!["c".to_string()]
    }

    #[test]
    fn test_discover_finds_fixtures_recursively() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("include")).unwrap();
        fs::write(dir.path().join("simple.c"), "int main() {}\n").unwrap();
        fs::write(dir.path().join("include/nested.c"), "int main() {}\n").unwrap();
        fs::write(dir.path().join("include/nested.h"), "#define X 1\n").unwrap();

        let set = FixtureSet::discover(dir.path(), &exts()).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.scan_errors.is_empty());
    }

    #[test]
    fn test_discover_loads_golden_companion() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("answer.c"), "int main() {}\n").unwrap();
        fs::write(dir.path().join("answer.c.expected"), "42\n").unwrap();

        let set = FixtureSet::discover(dir.path(), &exts()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.fixtures[0].expected_stdout, Some(b"42\n".to_vec()));
    }

    #[test]
    fn test_discover_without_golden_companion() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("loner.c"), "int main() {}\n").unwrap();

        let set = FixtureSet::discover(dir.path(), &exts()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.fixtures[0].expected_stdout, None);
    }

    #[test]
    fn test_discover_skips_golden_files_as_fixtures() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.c"), "").unwrap();
        fs::write(dir.path().join("a.c.expected"), "out\n").unwrap();

        let set = FixtureSet::discover(dir.path(), &["c".into(), "expected".into()]).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.fixtures[0].path.ends_with("a.c"));
    }

    #[test]
    fn test_discover_sorted_by_path() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("zeta.c"), "").unwrap();
        fs::write(dir.path().join("alpha.c"), "").unwrap();
        fs::write(dir.path().join("mid.c"), "").unwrap();

        let set = FixtureSet::discover(dir.path(), &exts()).unwrap();
        let names: Vec<_> = set
            .fixtures
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["alpha.c", "mid.c", "zeta.c"]);
    }

    #[test]
    fn test_discover_rejects_missing_root() {
        let err = FixtureSet::discover(Path::new("/nonexistent/fixtures"), &exts()).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidRoot { .. }));
    }

    #[test]
    fn test_discover_rejects_file_root() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("not_a_dir.c");
        fs::write(&file, "").unwrap();

        let err = FixtureSet::discover(&file, &exts()).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidRoot { .. }));
    }

    #[test]
    fn test_discover_records_unreadable_golden() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("guarded.c"), "").unwrap();
        // A directory in the golden slot makes the companion unreadable
        fs::create_dir(dir.path().join("guarded.c.expected")).unwrap();

        let set = FixtureSet::discover(dir.path(), &exts()).unwrap();
        assert_eq!(set.len(), 0);
        assert_eq!(set.scan_errors.len(), 1);
        assert!(set.scan_errors[0].message.contains("Failed to read"));
        assert!(set.scan_errors[0].path.ends_with("guarded.c"));
    }

    #[test]
    fn test_filter_by_path_substring() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("macros")).unwrap();
        fs::write(dir.path().join("macros/define.c"), "").unwrap();
        fs::write(dir.path().join("plain.c"), "").unwrap();

        let set = FixtureSet::discover(dir.path(), &exts()).unwrap();
        let filtered = set.filter("macros");
        assert_eq!(filtered.len(), 1);
        assert!(filtered.fixtures[0].path.ends_with("macros/define.c"));
    }

    #[test]
    fn test_custom_extensions() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("lexer.i"), "").unwrap();
        fs::write(dir.path().join("lexer.c"), "").unwrap();

        let set = FixtureSet::discover(dir.path(), &["i".to_string()]).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.fixtures[0].path.ends_with("lexer.i"));
    }

    #[test]
    fn test_golden_path_appends_suffix() {
        let fixture = Fixture {
            path: PathBuf::from("tests/include/multi.c"),
            expected_stdout: None,
        };
        assert_eq!(
            fixture.golden_path(),
            PathBuf::from("tests/include/multi.c.expected")
        );
    }
}
