use std::fs;
use std::path::Path;

use dialoguer::Confirm;

use crate::error::Result;

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// True when `dir` exists and has at least one entry.
pub fn has_existing_output(dir: &Path) -> Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    Ok(fs::read_dir(dir)?.next().is_some())
}

/// Ask before writing into a non-empty output directory.
///
/// `assume_yes` skips the prompt.
pub fn confirm_overwrite(dir: &Path, assume_yes: bool) -> Result<bool> {
    if assume_yes || !has_existing_output(dir)? {
        return Ok(true);
    }
    prompt_yes_no(
        &format!("'{}' already has files. Overwrite report files?", dir.display()),
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_existing_output_detection() {
        let dir = TempDir::new().unwrap();
        assert!(!has_existing_output(dir.path()).unwrap());
        assert!(!has_existing_output(&dir.path().join("missing")).unwrap());

        fs::write(dir.path().join("cost_summary.csv"), "x").unwrap();
        assert!(has_existing_output(dir.path()).unwrap());
        assert!(confirm_overwrite(dir.path(), true).unwrap());
    }
}
