use std::error::Error as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use scour_core::clean::{Candidate, CandidateKind, CleanEvent, CleanOutcome, CleanPlan};
use scour_core::error::ScourError;
use scour_core::size::format_size;

/// Prints the human-readable report as a plan is executed.
#[derive(Debug, Default)]
pub struct Printer {
    groups: usize,
}

impl Printer {
    pub fn event(&mut self, event: CleanEvent<'_>) {
        match event {
            CleanEvent::Group(kind) => {
                if self.groups > 0 {
                    println!();
                }
                self.groups += 1;
                match kind {
                    CandidateKind::Directory => println!("Directories to remove:"),
                    CandidateKind::File => println!("Files to remove:"),
                }
            }
            CleanEvent::Candidate(candidate) => println!("   {}", candidate_line(candidate)),
            CleanEvent::Failed { candidate, error } => println!(
                "   Warning: failed to remove {}: {}",
                candidate.relative.display(),
                io_message(error)
            ),
        }
    }

    pub fn finish(&self, outcome: &CleanOutcome, dry_run: bool) {
        if self.groups > 0 {
            println!();
        }
        let total = format_size(outcome.total_bytes);
        if dry_run {
            println!("Dry run complete. Would free {total}");
            println!("   Run without --dry-run to actually delete these files.");
        } else {
            println!("Cleaned! Freed {total}");
            if !outcome.failures.is_empty() {
                println!("   {} item(s) could not be removed.", outcome.failures.len());
            }
        }
    }
}

fn candidate_line(candidate: &Candidate) -> String {
    let size = format_size(candidate.size);
    match candidate.kind {
        CandidateKind::Directory => format!("{}/ ({size})", candidate.relative.display()),
        CandidateKind::File => format!("{} ({size})", candidate.relative.display()),
    }
}

/// The underlying OS message, without the path the error already carries.
fn io_message(error: &ScourError) -> String {
    error
        .source()
        .map(|source| source.to_string())
        .unwrap_or_else(|| error.to_string())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    root: &'a Path,
    dry_run: bool,
    include_protected: bool,
    directories: &'a [Candidate],
    files: &'a [Candidate],
    total_bytes: u64,
    total_display: String,
    removed: usize,
    failures: Vec<JsonFailure>,
}

#[derive(Serialize)]
struct JsonFailure {
    path: PathBuf,
    error: String,
}

pub fn print_json(
    plan: &CleanPlan,
    outcome: &CleanOutcome,
    dry_run: bool,
    include_protected: bool,
) -> color_eyre::Result<()> {
    let report = json_report(plan, outcome, dry_run, include_protected);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn json_report<'a>(
    plan: &'a CleanPlan,
    outcome: &CleanOutcome,
    dry_run: bool,
    include_protected: bool,
) -> JsonReport<'a> {
    JsonReport {
        root: &plan.root,
        dry_run,
        include_protected,
        directories: &plan.dirs,
        files: &plan.files,
        total_bytes: outcome.total_bytes,
        total_display: format_size(outcome.total_bytes),
        removed: outcome.removed,
        failures: outcome
            .failures
            .iter()
            .map(|f| JsonFailure {
                path: f.path.clone(),
                error: io_message(&f.error),
            })
            .collect(),
    }
}
