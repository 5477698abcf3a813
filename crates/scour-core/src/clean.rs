use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::detect::Rules;
use crate::error::ScourError;
use crate::size::{dir_size, file_size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Directory,
    File,
}

/// A path selected for removal, with its size computed at planning time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    #[serde(skip)]
    pub path: PathBuf,
    /// Path relative to the project root.
    #[serde(rename = "path")]
    pub relative: PathBuf,
    pub size: u64,
    #[serde(skip)]
    pub kind: CandidateKind,
}

impl Candidate {
    fn new(root: &Path, path: PathBuf, kind: CandidateKind) -> Self {
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        Self {
            path,
            relative,
            size: 0,
            kind,
        }
    }

    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Delete this candidate from disk.
    pub fn remove(&self) -> Result<(), ScourError> {
        let result = match self.kind {
            CandidateKind::Directory => std::fs::remove_dir_all(&self.path),
            CandidateKind::File => std::fs::remove_file(&self.path),
        };
        result.map_err(|e| ScourError::from_io(&self.relative, e))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CleanOptions {
    /// Also remove the protected dependency-environment directory.
    pub include_protected: bool,
}

/// Summary of what a clean operation would remove.
#[derive(Debug, Clone)]
pub struct CleanPlan {
    pub root: PathBuf,
    pub dirs: Vec<Candidate>,
    pub files: Vec<Candidate>,
}

impl CleanPlan {
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.dirs.iter().chain(&self.files).map(|c| c.size).sum()
    }
}

/// Find everything under `root` that the rules select for removal.
pub fn plan_clean(root: &Path, rules: &Rules, options: CleanOptions) -> CleanPlan {
    let (mut dirs, mut files) = collect_candidates(root, rules, options);

    if options.include_protected {
        let protected = root.join(rules.protected_dir());
        let is_dir = std::fs::symlink_metadata(&protected)
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if is_dir {
            dirs.push(Candidate::new(root, protected, CandidateKind::Directory));
        }
    }

    dirs.retain(|c| keep_candidate(c, rules, options));
    files.retain(|c| keep_candidate(c, rules, options));

    dirs.sort_by(|a, b| a.path.cmp(&b.path));
    dirs.dedup_by(|a, b| a.path == b.path);
    let dirs = collapse_nested(dirs);

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.retain(|f| !dirs.iter().any(|d| f.path.starts_with(&d.path)));

    let dirs = dirs
        .into_iter()
        .map(|mut c| {
            c.size = dir_size(&c.path);
            c
        })
        .collect();
    let files = files
        .into_iter()
        .map(|mut c| {
            c.size = file_size(&c.path);
            c
        })
        .collect();

    let plan = CleanPlan {
        root: root.to_path_buf(),
        dirs,
        files,
    };
    tracing::debug!(
        dirs = plan.dirs.len(),
        files = plan.files.len(),
        bytes = plan.total_bytes(),
        "planned clean"
    );
    plan
}

fn collect_candidates(
    root: &Path,
    rules: &Rules,
    options: CleanOptions,
) -> (Vec<Candidate>, Vec<Candidate>) {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            // Nothing below the protected dir survives filtering, so don't walk it.
            options.include_protected
                || !(e.file_type().is_dir() && e.file_name() == rules.protected_dir())
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type();

        if file_type.is_dir() && rules.dirs.matches(&name) {
            dirs.push(Candidate::new(
                root,
                entry.into_path(),
                CandidateKind::Directory,
            ));
        } else if file_type.is_file() && rules.files.matches(&name) {
            files.push(Candidate::new(root, entry.into_path(), CandidateKind::File));
        } else if file_type.is_symlink() && (rules.dirs.matches(&name) || rules.files.matches(&name))
        {
            tracing::debug!(path = %entry.path().display(), "skipping symlink");
        }
    }

    (dirs, files)
}

fn keep_candidate(candidate: &Candidate, rules: &Rules, options: CleanOptions) -> bool {
    if rules.is_preserved(&candidate.name()) {
        tracing::debug!(path = %candidate.relative.display(), "preserved");
        return false;
    }
    options.include_protected || !has_component(&candidate.relative, rules.protected_dir())
}

fn has_component(path: &Path, name: &str) -> bool {
    path.components()
        .any(|c| matches!(c, Component::Normal(part) if part == name))
}

/// Drop directories that sit inside another directory in the (sorted) list.
fn collapse_nested(sorted: Vec<Candidate>) -> Vec<Candidate> {
    let mut kept: Vec<Candidate> = Vec::with_capacity(sorted.len());
    for dir in sorted {
        if kept.iter().any(|k| dir.path.starts_with(&k.path)) {
            continue;
        }
        kept.push(dir);
    }
    kept
}

/// Progress reported while a plan is executed.
#[derive(Debug)]
pub enum CleanEvent<'a> {
    /// Emitted once before the first candidate of each non-empty group.
    Group(CandidateKind),
    Candidate(&'a Candidate),
    Failed {
        candidate: &'a Candidate,
        error: &'a ScourError,
    },
}

/// A candidate that could not be removed.
#[derive(Debug)]
pub struct RemovalFailure {
    pub path: PathBuf,
    pub error: ScourError,
}

/// Result of executing a plan.
#[derive(Debug, Default)]
pub struct CleanOutcome {
    /// Bytes freed, or that would be freed in a dry run.
    pub total_bytes: u64,
    pub removed: usize,
    pub failures: Vec<RemovalFailure>,
}

/// Report each candidate and, unless `dry_run`, delete it. A failed removal
/// is recorded and the run moves on to the next candidate.
pub fn execute_clean<F>(plan: &CleanPlan, dry_run: bool, mut report: F) -> CleanOutcome
where
    F: FnMut(CleanEvent<'_>),
{
    let mut outcome = CleanOutcome::default();

    for (kind, group) in [
        (CandidateKind::Directory, &plan.dirs),
        (CandidateKind::File, &plan.files),
    ] {
        if group.is_empty() {
            continue;
        }
        report(CleanEvent::Group(kind));

        for candidate in group {
            outcome.total_bytes += candidate.size;
            report(CleanEvent::Candidate(candidate));

            if dry_run {
                continue;
            }
            match candidate.remove() {
                Ok(()) => {
                    tracing::debug!(path = %candidate.relative.display(), "removed");
                    outcome.removed += 1;
                }
                Err(error) => {
                    tracing::warn!(path = %candidate.relative.display(), %error, "removal failed");
                    report(CleanEvent::Failed {
                        candidate,
                        error: &error,
                    });
                    outcome.failures.push(RemovalFailure {
                        path: candidate.relative.clone(),
                        error,
                    });
                }
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path, bytes: usize) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, vec![b'x'; bytes]).unwrap();
    }

    fn relatives(candidates: &[Candidate]) -> Vec<String> {
        candidates
            .iter()
            .map(|c| c.relative.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    fn plan(root: &Path, include_protected: bool) -> CleanPlan {
        plan_clean(root, &Rules::default(), CleanOptions { include_protected })
    }

    #[test]
    fn finds_nested_artifact_dirs_and_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("__pycache__/a.pyc"), 10);
        touch(&root.join("src/pkg/__pycache__/b.pyc"), 5);
        touch(&root.join("src/pkg/mod.pyc"), 3);
        touch(&root.join("scour.egg-info/PKG-INFO"), 7);
        touch(&root.join("coverage.xml"), 2);
        touch(&root.join("src/pkg/mod.py"), 100);

        let plan = plan(root, false);
        assert_eq!(
            relatives(&plan.dirs),
            ["__pycache__", "scour.egg-info", "src/pkg/__pycache__"]
        );
        assert_eq!(relatives(&plan.files), ["coverage.xml", "src/pkg/mod.pyc"]);
        assert_eq!(plan.dirs[0].size, 10);
        assert_eq!(plan.total_bytes(), 10 + 7 + 5 + 2 + 3);
    }

    #[test]
    fn name_match_requires_the_right_file_type() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("build"), 4);
        fs::create_dir_all(tmp.path().join("weird.pyc")).unwrap();

        let plan = plan(tmp.path(), false);
        assert!(plan.is_empty());
    }

    #[test]
    fn preserved_names_are_never_selected() {
        let tmp = tempfile::tempdir().unwrap();
        let rules = Rules::new(
            "pyproject.toml",
            ".venv",
            &["build", "*.local"],
            &["*.pyc", ".env"],
            &[".env", "*.local"],
        )
        .unwrap();
        touch(&tmp.path().join(".env"), 1);
        touch(&tmp.path().join("keep.local/x"), 1);
        touch(&tmp.path().join("build/y"), 1);

        let plan = plan_clean(tmp.path(), &rules, CleanOptions::default());
        assert_eq!(relatives(&plan.dirs), ["build"]);
        assert!(plan.files.is_empty());
    }

    #[test]
    fn files_inside_selected_dirs_are_not_listed() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("build/lib/mod.pyc"), 8);
        touch(&tmp.path().join("build/.coverage"), 8);
        touch(&tmp.path().join("top.pyc"), 1);

        let plan = plan(tmp.path(), false);
        assert_eq!(relatives(&plan.dirs), ["build"]);
        assert_eq!(relatives(&plan.files), ["top.pyc"]);
    }

    #[test]
    fn nested_dirs_fold_into_their_ancestor() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("build/pkg/__pycache__/m.pyc"), 6);
        touch(&tmp.path().join("build/out"), 4);

        let plan = plan(tmp.path(), false);
        assert_eq!(relatives(&plan.dirs), ["build"]);
        assert_eq!(plan.dirs[0].size, 10);
        assert_eq!(plan.total_bytes(), 10);
    }

    #[test]
    fn protected_dir_is_skipped_by_default() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join(".venv/lib/__pycache__/x.pyc"), 3);
        touch(&tmp.path().join(".venv/lib/y.pyc"), 3);
        touch(&tmp.path().join("sub/.venv/dist/z"), 3);

        let plan = plan(tmp.path(), false);
        assert!(plan.is_empty(), "unexpected plan: {plan:?}");
    }

    #[test]
    fn include_protected_selects_the_protected_dir_itself() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join(".venv/lib/__pycache__/x.pyc"), 3);
        touch(&tmp.path().join(".venv/bin/python"), 5);

        let plan = plan(tmp.path(), true);
        assert_eq!(relatives(&plan.dirs), [".venv"]);
        assert!(plan.files.is_empty());
        assert_eq!(plan.dirs[0].size, 8);
    }

    #[test]
    fn include_protected_stays_inside_the_root() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("project");
        touch(&root.join("keep.py"), 1);
        touch(&tmp.path().join("sibling/data"), 1);

        let rules = crate::config::Config {
            protected_dir: "..".to_string(),
            ..Default::default()
        }
        .rules();
        assert!(matches!(rules, Err(ScourError::InvalidName { .. })));

        let plan = plan(&root, true);
        assert!(plan.dirs.iter().all(|c| c.path.starts_with(&root)));
        assert!(plan.is_empty(), "unexpected plan: {plan:?}");
        assert!(tmp.path().join("sibling/data").exists());
    }

    #[test]
    fn execute_dry_run_touches_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("__pycache__/a.pyc"), 10);
        touch(&tmp.path().join("x.pyo"), 2);

        let plan = plan(tmp.path(), false);
        let mut listed = Vec::new();
        let outcome = execute_clean(&plan, true, |event| {
            if let CleanEvent::Candidate(c) = event {
                listed.push(c.relative.clone());
            }
        });

        assert_eq!(listed.len(), 2);
        assert_eq!(outcome.total_bytes, 12);
        assert_eq!(outcome.removed, 0);
        assert!(tmp.path().join("__pycache__/a.pyc").exists());
        assert!(tmp.path().join("x.pyo").exists());
    }

    #[test]
    fn execute_removes_and_reports_groups_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("dist/pkg.whl"), 10);
        touch(&tmp.path().join("x.pyo"), 2);
        touch(&tmp.path().join(".env"), 1);

        let plan = plan(tmp.path(), false);
        let mut groups = Vec::new();
        let outcome = execute_clean(&plan, false, |event| {
            if let CleanEvent::Group(kind) = event {
                groups.push(kind);
            }
        });

        assert_eq!(groups, [CandidateKind::Directory, CandidateKind::File]);
        assert_eq!(outcome.removed, 2);
        assert!(outcome.failures.is_empty());
        assert!(!tmp.path().join("dist").exists());
        assert!(!tmp.path().join("x.pyo").exists());
        assert!(tmp.path().join(".env").exists());
        assert!(plan_clean(tmp.path(), &Rules::default(), CleanOptions::default()).is_empty());
    }

    #[test]
    fn failed_removal_does_not_stop_the_run() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("build/a"), 3);
        touch(&tmp.path().join("dist/b"), 4);

        let plan = plan(tmp.path(), false);
        // Remove one directory behind the plan's back so its removal fails.
        fs::remove_dir_all(tmp.path().join("build")).unwrap();

        let mut failed = Vec::new();
        let outcome = execute_clean(&plan, false, |event| {
            if let CleanEvent::Failed { candidate, .. } = event {
                failed.push(candidate.relative.clone());
            }
        });

        assert_eq!(failed, [PathBuf::from("build")]);
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(
            outcome.failures[0].error,
            ScourError::Filesystem { .. }
        ));
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.total_bytes, 7);
        assert!(!tmp.path().join("dist").exists());
    }

    #[test]
    fn has_component_matches_whole_components_only() {
        assert!(has_component(Path::new("a/.venv/b"), ".venv"));
        assert!(!has_component(Path::new("a/.venv2/b"), ".venv"));
        assert!(!has_component(Path::new("my.venv"), ".venv"));
    }
}
