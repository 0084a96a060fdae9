//! What to do with the originals of updated DATs.
//!
//! The originals are left untouched during the run and act as backups.
//! Once the report is out, they are deleted or kept, by flag or by asking.

use anyhow::Result;
use miafix_core::{CancellationToken, WrittenOutput};
use std::fs;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupPolicy {
    Delete,
    Keep,
    Ask,
}

impl BackupPolicy {
    /// Policy from the `--delete-originals` / `--keep-originals` flags.
    pub fn from_flags(delete: bool, keep: bool) -> Self {
        match (delete, keep) {
            (true, _) => BackupPolicy::Delete,
            (false, true) => BackupPolicy::Keep,
            (false, false) => BackupPolicy::Ask,
        }
    }
}

/// Apply `policy` to the originals of `written`.
///
/// Nothing is deleted once `cancel` has fired, whatever the answer.
pub fn resolve(
    policy: BackupPolicy,
    written: &[WrittenOutput],
    cancel: &CancellationToken,
) -> Result<()> {
    if written.is_empty() {
        return Ok(());
    }

    if written.len() == 1 {
        info!("Original version of updated DAT has been retained as a backup.");
    } else {
        info!("Original versions of updated DATs have been retained as backups.");
    }

    let delete = match policy {
        BackupPolicy::Delete => true,
        BackupPolicy::Keep => false,
        BackupPolicy::Ask => {
            let question = if written.len() == 1 {
                "Would you like to delete it?"
            } else {
                "Would you like to delete them?"
            };
            ask_yes_no(question, &mut io::stdin().lock(), &mut io::stderr().lock())?
        }
    };

    if delete && cancel.is_cancelled() {
        info!("Interrupted; file(s) retained.");
        return Ok(());
    }
    if !delete {
        info!("File(s) retained.");
        return Ok(());
    }

    let mut deleted = 0;
    for output in written {
        match fs::remove_file(&output.original) {
            Ok(()) => deleted += 1,
            Err(e) => warn!("Failed to delete {}: {}", output.original.display(), e),
        }
    }
    info!("{} file(s) deleted.", deleted);
    Ok(())
}

/// Ask until the answer is `y` or `n`. End of input counts as `n`.
fn ask_yes_no<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> io::Result<bool> {
    writeln!(output, "{}", question)?;
    loop {
        write!(output, "    y/n: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        match line.trim() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => writeln!(output, "Please only enter 'y' for yes or 'n' for no.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_policy_from_flags() {
        assert_eq!(BackupPolicy::from_flags(true, false), BackupPolicy::Delete);
        assert_eq!(BackupPolicy::from_flags(false, true), BackupPolicy::Keep);
        assert_eq!(BackupPolicy::from_flags(false, false), BackupPolicy::Ask);
    }

    #[test]
    fn test_ask_reprompts_until_valid() {
        let mut input = Cursor::new("maybe\nY\ny\n");
        let mut output = Vec::new();
        assert!(ask_yes_no("Delete?", &mut input, &mut output).unwrap());

        let printed = String::from_utf8(output).unwrap();
        assert_eq!(printed.matches("Please only enter").count(), 2);
    }

    #[test]
    fn test_ask_end_of_input_keeps() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert!(!ask_yes_no("Delete?", &mut input, &mut output).unwrap());
    }

    #[test]
    fn test_resolve_delete_and_keep() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("a.dat");
        let output = temp_dir.path().join("a [mia-fixed].dat");
        fs::write(&original, "x").unwrap();
        fs::write(&output, "y").unwrap();
        let written = vec![WrittenOutput {
            original: original.clone(),
            output: output.clone(),
        }];

        let cancel = CancellationToken::new();
        resolve(BackupPolicy::Keep, &written, &cancel).unwrap();
        assert!(original.exists());

        resolve(BackupPolicy::Delete, &written, &cancel).unwrap();
        assert!(!original.exists());
        assert!(output.exists());
    }

    #[test]
    fn test_interrupted_run_never_deletes() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("a.dat");
        fs::write(&original, "x").unwrap();
        let written = vec![WrittenOutput {
            original: original.clone(),
            output: temp_dir.path().join("a [mia-fixed].dat"),
        }];

        let cancel = CancellationToken::new();
        cancel.cancel();
        resolve(BackupPolicy::Delete, &written, &cancel).unwrap();
        assert!(original.exists());
    }
}
