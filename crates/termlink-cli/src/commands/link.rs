//! Link command - insert or remove glossary links across the docs tree.

use crate::app::App;
use crate::OutputFormat;
use anyhow::bail;
use termlink_core::{Config, FileStatus, Mode, RunReport};

/// Flags for the link command.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkOptions {
    pub cleanup: bool,
    pub dry_run: bool,
    /// Fail when any file would change
    pub check: bool,
    pub output: OutputFormat,
}

/// Run the link command.
pub fn run(config: Config, options: LinkOptions) -> anyhow::Result<()> {
    let app = App::new(config)?;
    let corpus = app.corpus(options.dry_run)?;

    let mode = if options.cleanup {
        Mode::Cleanup
    } else {
        Mode::Link
    };
    let report = corpus.run(&app.index, mode)?;

    for failure in report.failures() {
        eprintln!(
            "error: {}",
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }

    match options.output {
        OutputFormat::Text => {
            if report.dry_run {
                for file in report.files.iter().filter(|f| f.status == FileStatus::Changed) {
                    println!("would update {} ({} links)", file.path.display(), file.links);
                }
            }
            println!("{}", summary(&report));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    if options.check && report.changed() > 0 {
        bail!("{} files need updating", report.changed());
    }

    Ok(())
}

/// One-line run summary.
fn summary(report: &RunReport) -> String {
    let verb = match report.mode {
        Mode::Link => "processed",
        Mode::Cleanup => "cleaned up",
    };
    let mut line = format!("Successfully {} {} markdown files", verb, report.processed());

    if report.dry_run {
        line.push_str(&format!(", {} would change", report.changed()));
    } else {
        line.push_str(&format!(", {} changed", report.changed()));
    }
    if report.repairs() > 0 {
        line.push_str(&format!(", {} links repaired", report.repairs()));
    }
    if report.failed() > 0 {
        line.push_str(&format!(", {} failed", report.failed()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;
    use termlink_core::FileOutcome;

    fn outcome(path: &str, status: FileStatus) -> FileOutcome {
        FileOutcome {
            path: PathBuf::from(path),
            status,
            links: 1,
            repairs: 0,
            error: None,
        }
    }

    fn report(mode: Mode, dry_run: bool) -> RunReport {
        RunReport {
            mode,
            dry_run,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            files: vec![
                outcome("a.md", FileStatus::Changed),
                outcome("b.md", FileStatus::Unchanged),
                outcome("c.md", FileStatus::Failed),
            ],
        }
    }

    #[test]
    fn test_summary_link() {
        assert_eq!(
            summary(&report(Mode::Link, false)),
            "Successfully processed 2 markdown files, 1 changed, 1 failed"
        );
    }

    #[test]
    fn test_summary_cleanup_dry_run() {
        assert_eq!(
            summary(&report(Mode::Cleanup, true)),
            "Successfully cleaned up 2 markdown files, 1 would change, 1 failed"
        );
    }

    #[test]
    fn test_summary_reports_repairs() {
        let mut report = report(Mode::Link, false);
        report.files[0].repairs = 3;
        report.files.pop();
        assert_eq!(
            summary(&report),
            "Successfully processed 2 markdown files, 1 changed, 3 links repaired"
        );
    }
}
