use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use modelcheck_core::{DecodeError, load_file};
use modelcheck_validate::{ErrorList, check};

/// Result of checking one models file.
#[derive(Debug)]
pub enum Outcome {
    Passed,
    /// The document decoded but violates the schema rules.
    Violations(ErrorList),
    /// The document could not be read or decoded.
    Malformed(DecodeError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    fn status(&self) -> &'static str {
        match self {
            Outcome::Passed => "success",
            Outcome::Violations(_) => "violations",
            Outcome::Malformed(_) => "malformed",
        }
    }
}

/// Decode and validate the models file at `path`.
pub fn check_file(path: &Path) -> Outcome {
    let schema = match load_file(path) {
        Ok(schema) => schema,
        Err(err) => return Outcome::Malformed(err),
    };

    match check(&schema) {
        Ok(()) => Outcome::Passed,
        Err(report) => Outcome::Violations(report),
    }
}

/// Check every file and write one verdict per file to `out`.
///
/// Returns true when all files passed.
pub fn run_checks<W: Write>(paths: &[PathBuf], out: &mut W) -> io::Result<bool> {
    let mut all_passed = true;

    for path in paths {
        let timer = Instant::now();
        tracing::info!(event = "check_started", path = %path.display());

        let outcome = check_file(path);
        match &outcome {
            Outcome::Passed => writeln!(out, "Check for {} successful.", path.display())?,
            Outcome::Violations(report) => {
                writeln!(out, "Check for {} failed:\n{report}", path.display())?
            }
            Outcome::Malformed(err) => writeln!(out, "Check for {} failed: {err}", path.display())?,
        }
        all_passed &= outcome.is_success();

        tracing::info!(
            event = "check_finished",
            path = %path.display(),
            status = outcome.status(),
            duration_ms = timer.elapsed().as_millis()
        );
    }

    Ok(all_passed)
}
