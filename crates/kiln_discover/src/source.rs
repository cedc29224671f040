//! Translation unit nodes and `#include` directive scanning.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::DiscoverError;

/// The two compiled-source suffixes kiln recognizes.
pub const SOURCE_SUFFIXES: [&str; 2] = ["cpp", "cc"];

static LOCAL_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"#include\s+"(.*)""#).unwrap());
static SYSTEM_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#include\s+<(.*)>").unwrap());

/// One node of the local-include graph.
///
/// Created during discovery, one per distinct implementation file reached
/// (plus the entry file itself), and immutable thereafter. `local` holds the
/// unit's *direct* quoted includes, resolved against the including file's
/// directory; transitively reachable headers belong to other nodes.
#[derive(Debug, Clone)]
pub struct Source {
    /// Path of the file this node describes.
    pub path: PathBuf,

    /// Direct local includes (`#include "..."`), resolved to project paths.
    pub local: BTreeSet<PathBuf>,

    /// System includes (`#include <...>`), recorded but never followed.
    pub system: BTreeSet<String>,

    /// Explicit build target, overriding the derived object path.
    pub target_override: Option<PathBuf>,
}

impl Source {
    /// Parses a file's `#include` directives.
    ///
    /// Quoted includes are resolved relative to the file's own directory.
    pub fn parse(path: &Path) -> Result<Self, DiscoverError> {
        let content = std::fs::read_to_string(path).map_err(|e| DiscoverError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut local = BTreeSet::new();
        let mut system = BTreeSet::new();
        for line in content.lines() {
            if let Some(m) = LOCAL_INCLUDE.captures(line) {
                local.insert(dir.join(&m[1]));
            } else if let Some(m) = SYSTEM_INCLUDE.captures(line) {
                system.insert(m[1].to_string());
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            local,
            system,
            target_override: None,
        })
    }

    /// The object path this unit compiles to, if it is compilable.
    ///
    /// An explicit override wins. Otherwise files with a recognized
    /// compiled-source suffix map to the same path with a `.o` extension;
    /// header-only nodes have no target.
    pub fn target(&self) -> Option<PathBuf> {
        if let Some(target) = &self.target_override {
            return Some(target.clone());
        }

        let ext = self.path.extension()?.to_str()?;
        if SOURCE_SUFFIXES.contains(&ext) {
            Some(self.path.with_extension("o"))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn parse_local_and_system_includes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "a.cpp",
            "#include <vector>\n#include \"b.h\"\nint main() {}\n",
        );

        let src = Source::parse(&path).unwrap();
        assert_eq!(src.local.len(), 1);
        assert!(src.local.contains(&dir.path().join("b.h")));
        assert_eq!(src.system.len(), 1);
        assert!(src.system.contains("vector"));
    }

    #[test]
    fn duplicate_includes_deduplicate() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "a.cpp", "#include \"b.h\"\n#include \"b.h\"\n");

        let src = Source::parse(&path).unwrap();
        assert_eq!(src.local.len(), 1);
    }

    #[test]
    fn includes_resolve_against_including_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let path = write(dir.path(), "sub/x.h", "#include \"y.h\"\n");

        let src = Source::parse(&path).unwrap();
        assert!(src.local.contains(&dir.path().join("sub/y.h")));
    }

    #[test]
    fn parse_missing_file_errors() {
        let err = Source::parse(Path::new("/nonexistent/a.cpp")).unwrap_err();
        assert!(matches!(err, DiscoverError::Io { .. }));
    }

    #[test]
    fn target_for_recognized_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let cpp = Source::parse(&write(dir.path(), "a.cpp", "")).unwrap();
        assert_eq!(cpp.target(), Some(dir.path().join("a.o")));

        let cc = Source::parse(&write(dir.path(), "b.cc", "")).unwrap();
        assert_eq!(cc.target(), Some(dir.path().join("b.o")));
    }

    #[test]
    fn no_target_for_headers() {
        let dir = tempfile::tempdir().unwrap();
        let hdr = Source::parse(&write(dir.path(), "a.h", "")).unwrap();
        assert_eq!(hdr.target(), None);
    }

    #[test]
    fn target_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut src = Source::parse(&write(dir.path(), "a.cpp", "")).unwrap();
        src.target_override = Some(PathBuf::from("custom/a.obj"));
        assert_eq!(src.target(), Some(PathBuf::from("custom/a.obj")));
    }

    #[test]
    fn non_directive_lines_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "a.cpp",
            "// #includeish comment\nstd::string s = \"quoted\";\n",
        );
        let src = Source::parse(&path).unwrap();
        assert!(src.local.is_empty());
        assert!(src.system.is_empty());
    }
}
