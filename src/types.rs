use std::fmt;
use std::path::PathBuf;

/// One student directory under the submission root, with their attempts in
/// submission order.
#[derive(Debug, Clone)]
pub struct StudentEntry {
    pub id: String,
    pub dir: PathBuf,
    pub submissions: Vec<SubmissionEntry>,
}

/// One archived submission attempt. `sequence_number` starts at 1 and follows
/// the lexical order of the attempt file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionEntry {
    pub sequence_number: u32,
    pub source_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileResult {
    Compiled,
    Failed,
    /// The staged content could not be treated as an archive of sources.
    /// Distinct from a build that ran and produced no binary.
    NotBuildable,
}

impl fmt::Display for CompileResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileResult::Compiled => write!(f, "Compiled"),
            CompileResult::Failed => write!(f, "Failed"),
            CompileResult::NotBuildable => write!(f, "Not buildable"),
        }
    }
}

/// Per-student classification results, in attempt order. In final-only mode
/// `attempts` holds at most the highest-numbered attempt.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub student_id: String,
    pub attempts: Vec<(u32, CompileResult)>,
}

/// One row of the tabular report. An empty `student_label` marks a
/// continuation row belonging to the previous student's block.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub student_label: String,
    pub attempt: Option<u32>,
    pub result: Option<CompileResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    FinalOnly,
    AllAttempts,
}

impl ReportMode {
    pub fn sheet_name(&self) -> &'static str {
        match self {
            ReportMode::FinalOnly => "Final Submissions",
            ReportMode::AllAttempts => "All Submissions",
        }
    }
}
