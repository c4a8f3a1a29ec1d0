//! Imports-only scan of a source file.
//!
//! The file-level dependency graph only needs each file's import paths,
//! so this is a line-oriented scan rather than a full parse: single
//! `import "path"` forms and parenthesized import blocks, with optional
//! aliases and line comments tolerated.

/// Returns the import paths declared in `source`, in order of appearance.
pub fn scan_imports(source: &str) -> Vec<String> {
    let mut imports = Vec::new();
    let mut in_block = false;

    for raw in source.lines() {
        let line = strip_line_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if in_block {
            if line.starts_with(')') {
                in_block = false;
                continue;
            }
            if let Some(path) = quoted_path(line) {
                imports.push(path);
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("import") {
            let rest = rest.trim_start();
            if rest.starts_with('(') {
                in_block = true;
                // Tolerate `import ("a")` on one line
                if let Some(path) = quoted_path(&rest[1..]) {
                    imports.push(path);
                    if rest.contains(')') {
                        in_block = false;
                    }
                }
            } else if let Some(path) = quoted_path(rest) {
                imports.push(path);
            }
        }
    }
    imports
}

fn strip_line_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Extracts the first double-quoted string from a line, skipping any alias
/// in front of it.
fn quoted_path(line: &str) -> Option<String> {
    let start = line.find('"')?;
    let rest = &line[start + 1..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_import() {
        let src = "package a\n\nimport \"fmt\"\n";
        assert_eq!(scan_imports(src), vec!["fmt"]);
    }

    #[test]
    fn test_block_import_with_alias() {
        let src = r#"
package a

import (
    "fmt"
    x "github.com/acme/app/internal/store" // alias
    _ "embed"
)
"#;
        assert_eq!(
            scan_imports(src),
            vec!["fmt", "github.com/acme/app/internal/store", "embed"]
        );
    }

    #[test]
    fn test_no_imports() {
        assert!(scan_imports("package a\n\nfunc main() {}\n").is_empty());
    }
}
