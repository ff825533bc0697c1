//! Input file discovery
//!
//! Finds the files directly inside a folder whose names match a shell-style
//! pattern (`*`, `?`, `[abc]`, `[!abc]`, `[a-z]`). Like a shell, wildcards do
//! not match a leading `.` unless the pattern itself starts with one.

use crate::error::{IngestError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default pattern for Bakta TSV output
pub const DEFAULT_PATTERN: &str = "*.tsv";

/// A compiled file-name pattern
#[derive(Debug, Clone)]
pub struct FilePattern {
    source: String,
    regex: Regex,
}

impl FilePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(IngestError::invalid_pattern(pattern, "pattern is empty"));
        }
        if pattern.contains('/') {
            return Err(IngestError::invalid_pattern(
                pattern,
                "pattern must match file names, not paths",
            ));
        }

        let regex = Regex::new(&glob_to_regex(pattern))
            .map_err(|e| IngestError::invalid_pattern(pattern, e.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, file_name: &str) -> bool {
        if file_name.starts_with('.') && !self.source.starts_with('.') {
            return false;
        }
        self.regex.is_match(file_name)
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    let mut class: String = chars[i + 1..end].iter().collect();
                    out.push('[');
                    if let Some(rest) = class.strip_prefix('!') {
                        out.push('^');
                        class = rest.to_string();
                    }
                    // Only `-` keeps its meaning inside the class
                    for c in class.chars() {
                        match c {
                            '\\' | '[' | ']' | '^' | '&' | '~' => {
                                out.push('\\');
                                out.push(c);
                            },
                            _ => out.push(c),
                        }
                    }
                    out.push(']');
                    i = end;
                },
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    out.push('$');
    out
}

/// Index of the `]` closing the class opened at `start`, if any
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    // A `]` right after the opening bracket is a literal member
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() {
        if chars[j] == ']' {
            return Some(j);
        }
        j += 1;
    }
    None
}

/// List matching files in `folder`, sorted by path
pub fn discover_files(folder: &Path, pattern: &FilePattern) -> Result<Vec<PathBuf>> {
    let folder = std::path::absolute(folder).map_err(|e| IngestError::read(folder, e))?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry.map_err(|source| IngestError::Walk {
            path: folder.clone(),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let matched = entry
            .file_name()
            .to_str()
            .is_some_and(|name| pattern.matches(name));
        if matched {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}
