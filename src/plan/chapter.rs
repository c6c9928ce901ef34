//! Legacy chapter numbering from directory contents.
//!
//! Output planning keys runs by timestamp-derived chapter ids, but some
//! callers still number chapters sequentially from the `Cap<N>` entries
//! already present in a directory. Both entry points are kept.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// One greater than the highest `Cap<digits>` prefix among the immediate
/// children of `dir`, or 1 when none match.
pub fn next_chapter_number(dir: &Path) -> Result<u32> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    let mut max_num = 0u32;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(num) = chapter_number(&name) {
            max_num = max_num.max(num);
        }
    }

    Ok(max_num + 1)
}

/// The numeric prefix value of a `Cap<digits>` name, if present.
fn chapter_number(name: &str) -> Option<u32> {
    let rest = name.strip_prefix("Cap")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_empty_directory_starts_at_one() {
        let temp = TempDir::new().unwrap();
        assert_eq!(next_chapter_number(temp.path()).unwrap(), 1);
    }

    #[test]
    fn test_returns_one_past_the_maximum() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Cap3.mp4");
        touch(temp.path(), "Cap12_final.mp4");
        touch(temp.path(), "Cap7.mp4");

        assert_eq!(next_chapter_number(temp.path()).unwrap(), 13);
    }

    #[test]
    fn test_ignores_non_matching_names() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Capture.mp4");
        touch(temp.path(), "notes.txt");
        touch(temp.path(), "Cap2.mp4");

        assert_eq!(next_chapter_number(temp.path()).unwrap(), 3);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(next_chapter_number(&temp.path().join("nope")).is_err());
    }
}
