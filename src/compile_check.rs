use std::io::Result;
use std::path::PathBuf;
use std::sync::mpsc::channel;

use tempfile::{Builder, TempDir};
use threadpool::ThreadPool;

use crate::archive;
use crate::toolchain::Toolchain;
use crate::types::{CheckOutcome, CompileResult, ReportMode, StudentEntry, SubmissionEntry};

/// Builds one submission at a time inside a run-unique scratch directory.
pub struct CompileChecker {
    toolchain: Toolchain,
    scratch_parent: PathBuf,
}

impl CompileChecker {
    pub fn new(toolchain: Toolchain) -> Self {
        CompileChecker {
            toolchain,
            scratch_parent: std::env::temp_dir(),
        }
    }

    pub fn with_scratch_parent(toolchain: Toolchain, scratch_parent: PathBuf) -> Self {
        CompileChecker {
            toolchain,
            scratch_parent,
        }
    }

    /// Stages `submission` into a fresh scratch directory, builds it, and
    /// classifies the outcome. The scratch directory is removed on every exit
    /// path; failure to create or remove it is a hard error, unlike the
    /// ordinary `Failed`/`NotBuildable` outcomes.
    pub fn check(&self, submission: &SubmissionEntry) -> Result<CompileResult> {
        let scratch = self.scratch_dir()?;
        let result = self.stage_and_build(submission, &scratch);
        scratch.close()?;
        result
    }

    fn stage_and_build(
        &self,
        submission: &SubmissionEntry,
        scratch: &TempDir,
    ) -> Result<CompileResult> {
        if archive::extract_zip(&submission.source_path, scratch.path()).is_err() {
            return Ok(CompileResult::NotBuildable);
        }
        self.toolchain.build(scratch.path())?;
        if self.toolchain.artifact_built(scratch.path()) {
            Ok(CompileResult::Compiled)
        } else {
            Ok(CompileResult::Failed)
        }
    }

    fn scratch_dir(&self) -> Result<TempDir> {
        Builder::new()
            .prefix("scratch-")
            .tempdir_in(&self.scratch_parent)
    }
}

/// Checks students on a worker pool, one student per task. Checks are
/// independent given distinct scratch directories. Outcomes come back in
/// traversal order regardless of completion order; the first hard error
/// aborts the batch.
pub fn concurrent_check_students<F>(
    toolchain: &Toolchain,
    students: &[StudentEntry],
    mode: ReportMode,
    num_threads: usize,
    on_student_done: F,
) -> Result<Vec<CheckOutcome>>
where
    F: Fn(&str),
{
    let pool = ThreadPool::new(num_threads.max(1));
    let (tx, rx) = channel();

    for (index, student) in students.iter().enumerate() {
        let tx = tx.clone();
        let checker = CompileChecker::new(toolchain.clone());
        let student_id = student.id.clone();
        let attempts: Vec<SubmissionEntry> = match mode {
            ReportMode::FinalOnly => student.submissions.last().cloned().into_iter().collect(),
            ReportMode::AllAttempts => student.submissions.clone(),
        };
        pool.execute(move || {
            let outcome = check_attempts(&checker, &student_id, &attempts);
            // A closed receiver means the caller already bailed on a hard error
            let _ = tx.send((index, outcome));
        });
    }
    drop(tx);

    let mut outcomes: Vec<Option<CheckOutcome>> = vec![None; students.len()];
    for (index, outcome) in rx {
        let outcome = outcome?;
        on_student_done(&outcome.student_id);
        outcomes[index] = Some(outcome);
    }
    Ok(outcomes.into_iter().flatten().collect())
}

fn check_attempts(
    checker: &CompileChecker,
    student_id: &str,
    attempts: &[SubmissionEntry],
) -> Result<CheckOutcome> {
    let mut results = Vec::with_capacity(attempts.len());
    for attempt in attempts {
        results.push((attempt.sequence_number, checker.check(attempt)?));
    }
    Ok(CheckOutcome {
        student_id: student_id.to_string(),
        attempts: results,
    })
}
