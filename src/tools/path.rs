use globset::GlobBuilder;
use std::path::{Path, PathBuf};

/// An owned file path with the handful of operations the analyzer needs.
/// All methods return new values; the original path is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilePath(PathBuf);

impl FilePath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Last element of the path.
    pub fn base(&self) -> String {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory part of the path.
    pub fn dir(&self) -> FilePath {
        match self.0.parent() {
            Some(p) if !p.as_os_str().is_empty() => FilePath(p.to_path_buf()),
            _ => FilePath(PathBuf::from(".")),
        }
    }

    pub fn join(&self, parts: &[&str]) -> FilePath {
        let mut out = self.0.clone();
        for p in parts {
            out.push(p);
        }
        FilePath(normalize(&out))
    }

    /// This path relative to `base`.
    pub fn rel(&self, base: &Path) -> Option<FilePath> {
        pathdiff(&self.0, base).map(FilePath)
    }

    pub fn has_ext(&self, ext: &str) -> bool {
        self.0.to_string_lossy().ends_with(ext)
    }

    pub fn is_dir(&self) -> bool {
        self.0.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.0.is_file()
    }

    /// Doublestar-style glob match: `**` crosses path separators, `*` does not.
    pub fn matches(&self, pattern: &str) -> bool {
        matches_pattern(pattern, &self.0.to_string_lossy())
    }
}

impl std::fmt::Display for FilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Glob match with doublestar semantics. An invalid pattern never matches.
pub fn matches_pattern(pattern: &str, path: &str) -> bool {
    match GlobBuilder::new(pattern).literal_separator(true).build() {
        Ok(glob) => glob.compile_matcher().is_match(path),
        Err(_) => false,
    }
}

/// Lexical `Path::join` + `..`/`.` normalization, no filesystem access.
fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<std::ffi::OsString> = Vec::new();
    let mut prefix = PathBuf::new();
    for comp in path.components() {
        use std::path::Component::*;
        match comp {
            Prefix(_) | RootDir => prefix.push(comp.as_os_str()),
            CurDir => {}
            ParentDir => {
                if out.pop().is_none() {
                    out.push(comp.as_os_str().to_os_string());
                }
            }
            Normal(s) => out.push(s.to_os_string()),
        }
    }
    let mut result = prefix;
    for part in out {
        result.push(part);
    }
    if result.as_os_str().is_empty() {
        result.push(".");
    }
    result
}

/// Relative path from `base` to `path`, both treated lexically.
fn pathdiff(path: &Path, base: &Path) -> Option<PathBuf> {
    let path = normalize(path);
    let base = normalize(base);
    if path.is_absolute() != base.is_absolute() {
        return None;
    }
    let mut p = path.components();
    let mut b = base.components();
    let mut out = PathBuf::new();
    loop {
        match (p.clone().next(), b.clone().next()) {
            (Some(x), Some(y)) if x == y => {
                p.next();
                b.next();
            }
            (_, Some(_)) => {
                out.push("..");
                b.next();
            }
            (Some(x), None) => {
                out.push(x.as_os_str());
                p.next();
            }
            (None, None) => break,
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        let cases = [
            ("github.com", &["acme", "ripplescope"][..], "github.com/acme/ripplescope"),
            ("./", &["a", "b", "cfg.yml"][..], "a/b/cfg.yml"),
            ("/home/code", &["a", "b.yaml"][..], "/home/code/a/b.yaml"),
        ];
        for (base, parts, want) in cases {
            assert_eq!(FilePath::new(base).join(parts).to_string(), want);
        }
    }

    #[test]
    fn test_rel() {
        let rel = FilePath::new("/repo/cmd/svc")
            .rel(Path::new("/repo"))
            .unwrap();
        assert_eq!(rel.to_string(), "cmd/svc");
    }

    #[test]
    fn test_dir_and_base() {
        let p = FilePath::new("a/b/c.go");
        assert_eq!(p.dir().to_string(), "a/b");
        assert_eq!(p.base(), "c.go");
        assert_eq!(FilePath::new("c.go").dir().to_string(), ".");
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        assert!(matches_pattern("*_gen.go", "api_gen.go"));
        assert!(!matches_pattern("*_gen.go", "internal/api_gen.go"));
        assert!(!matches_pattern("*.sql", "migrations/001.sql"));
    }

    #[test]
    fn test_doublestar_crosses_segments() {
        assert!(matches_pattern("migrations/**", "migrations/001.sql"));
        assert!(matches_pattern("migrations/**", "migrations/v2/002.sql"));
        assert!(matches_pattern("**/*.go", "a/b/c.go"));
        assert!(!matches_pattern("migrations/**", "schema/001.sql"));
    }

    #[test]
    fn test_invalid_pattern_never_matches() {
        assert!(!matches_pattern("[", "anything"));
    }
}
