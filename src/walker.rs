use std::fs;
use std::io::{Error, ErrorKind, Result};
use std::path::Path;

use crate::types::{StudentEntry, SubmissionEntry};

/// Lists every student directory directly under `root`, sorted by name, each
/// with its attempts already enumerated. Non-directory entries at the root
/// (stray `.DS_Store` and the like) are skipped.
pub fn list_students(root: &Path) -> Result<Vec<StudentEntry>> {
    if !root.is_dir() {
        return Err(Error::new(
            ErrorKind::NotFound,
            format!(
                "Submission root {:?} doesn't exist or couldn't be opened",
                root
            ),
        ));
    }

    let mut students = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let id = entry.file_name().to_string_lossy().to_string();
        let dir = entry.path();
        let submissions = list_attempts(&dir)?;
        students.push(StudentEntry {
            id,
            dir,
            submissions,
        });
    }
    students.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(students)
}

/// Lists the submission files directly inside one student directory, numbered
/// sequentially from 1.
///
/// Attempts are sorted by file name. Submission names are assumed to embed a
/// sortable timestamp, so lexical order stands in for chronological order;
/// the walker cannot enforce that assumption.
pub fn list_attempts(student_dir: &Path) -> Result<Vec<SubmissionEntry>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(student_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));

    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(i, source_path)| SubmissionEntry {
            sequence_number: i as u32 + 1,
            source_path,
        })
        .collect())
}
