//! Submission input validation
//!
//! The façade rejects a file set before anything touches a sandbox:
//! filename shape, forbidden patterns, and per-file/total size caps.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{
    FORBIDDEN_FILENAME_PATTERNS, MAX_CODE_LENGTH, MAX_FILES, MAX_INPUT_LENGTH,
    VALID_FILENAME_PATTERN,
};

static FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VALID_FILENAME_PATTERN).expect("valid filename regex"));

static FORBIDDEN_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    FORBIDDEN_FILENAME_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("valid forbidden-filename regex"))
        .collect()
});

/// Validate a submitted file set against count, name, and size rules.
/// Returns the specific reason on rejection.
pub fn validate_files(
    files: &BTreeMap<String, String>,
    max_file_size: usize,
    max_total_size: usize,
) -> Result<(), String> {
    if files.is_empty() {
        return Err("No files provided".to_string());
    }
    if files.len() > MAX_FILES {
        return Err(format!("Too many files (maximum {MAX_FILES})"));
    }

    let mut total_size = 0usize;
    for (fname, content) in files {
        if !FILENAME_RE.is_match(fname) {
            return Err(format!("Invalid filename: {fname}"));
        }
        for re in FORBIDDEN_RES.iter() {
            if re.is_match(fname) {
                return Err(format!("Forbidden filename pattern: {fname}"));
            }
        }

        let content_size = content.len();
        if content_size > max_file_size {
            return Err(format!("File {fname} too large"));
        }
        total_size += content_size;
    }

    if total_size > max_total_size {
        return Err("Total files size too large".to_string());
    }

    Ok(())
}

/// Truncate stdin to its cap and HTML-escape it
pub fn sanitize_input(text: &str) -> String {
    let truncated: String = text.chars().take(MAX_INPUT_LENGTH).collect();
    html_escape::encode_safe(&truncated).into_owned()
}

/// Cap each source file's length before execution
pub fn truncate_sources(files: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    files
        .iter()
        .map(|(name, content)| {
            let capped = match content.char_indices().nth(MAX_CODE_LENGTH) {
                Some((idx, _)) => content[..idx].to_string(),
                None => content.clone(),
            };
            (name.clone(), capped)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_FILE: usize = 50_000;
    const MAX_TOTAL: usize = 200_000;

    fn files(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(n, c)| (n.to_string(), c.to_string()))
            .collect()
    }

    fn check(entries: &[(&str, &str)]) -> Result<(), String> {
        validate_files(&files(entries), MAX_FILE, MAX_TOTAL)
    }

    #[test]
    fn test_accepts_simple_file_set() {
        assert!(check(&[("app.py", "print(1)")]).is_ok());
        assert!(check(&[("Main.java", "class Main {}"), ("Util.java", "class Util {}")]).is_ok());
    }

    #[test]
    fn test_rejects_empty_set() {
        assert!(check(&[]).is_err());
    }

    #[test]
    fn test_rejects_eleventh_file() {
        let names: Vec<String> = (0..11).map(|i| format!("f{i}.py")).collect();
        let entries: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "x")).collect();
        let err = check(&entries).unwrap_err();
        assert!(err.contains("Too many files"));

        let ten: Vec<(&str, &str)> = names[..10].iter().map(|n| (n.as_str(), "x")).collect();
        assert!(check(&ten).is_ok());
    }

    #[test]
    fn test_rejects_bad_filenames() {
        assert!(check(&[("sp ace.py", "x")]).is_err());
        assert!(check(&[("über.py", "x")]).is_err());
        assert!(check(&[("", "x")]).is_err());
    }

    #[test]
    fn test_rejects_forbidden_patterns() {
        for name in ["..secret.py", "evil.sh", "a.class", "x.exe", "lib.so", "b.dll", "c.pyc"] {
            assert!(check(&[(name, "x")]).is_err(), "{name} should be rejected");
        }
    }

    #[test]
    fn test_file_size_boundary() {
        let at_limit = "x".repeat(50_000);
        assert!(check(&[("app.py", at_limit.as_str())]).is_ok());

        let over = "x".repeat(50_001);
        let err = check(&[("app.py", over.as_str())]).unwrap_err();
        assert!(err.contains("too large"));
    }

    #[test]
    fn test_total_size_cap() {
        let chunk = "x".repeat(50_000);
        // 5 x 50k = 250k > 200k total even though each file is at its own cap.
        let names: Vec<String> = (0..5).map(|i| format!("f{i}.py")).collect();
        let entries: Vec<(&str, &str)> =
            names.iter().map(|n| (n.as_str(), chunk.as_str())).collect();
        let err = check(&entries).unwrap_err();
        assert_eq!(err, "Total files size too large");
    }

    #[test]
    fn test_sanitize_input_truncates_and_escapes() {
        let long = "a".repeat(MAX_INPUT_LENGTH + 50);
        assert_eq!(sanitize_input(&long).len(), MAX_INPUT_LENGTH);

        assert_eq!(sanitize_input("<b>hi</b>"), "&lt;b&gt;hi&lt;/b&gt;");
        assert_eq!(sanitize_input(""), "");
    }

    #[test]
    fn test_truncate_sources_caps_each_file() {
        let files = files(&[("app.py", "short")]);
        assert_eq!(truncate_sources(&files)["app.py"], "short");

        let mut big = BTreeMap::new();
        big.insert("app.py".to_string(), "y".repeat(MAX_CODE_LENGTH + 10));
        assert_eq!(truncate_sources(&big)["app.py"].len(), MAX_CODE_LENGTH);
    }
}
