use std::fs::OpenOptions;
use std::io::{BufWriter, Result};
use std::path::{Path, PathBuf};

use crate::types::{CheckOutcome, ReportMode, ReportRow, StudentEntry};

/// Attempts across all students, counted whether or not they were checked.
pub fn total_submissions(students: &[StudentEntry]) -> usize {
    students.iter().map(|s| s.submissions.len()).sum()
}

/// One row per student: their label and the classification of their final
/// attempt. A student with no attempts keeps their row, with no result.
pub fn final_rows(outcomes: &[CheckOutcome]) -> Vec<ReportRow> {
    outcomes
        .iter()
        .map(|outcome| ReportRow {
            student_label: outcome.student_id.clone(),
            attempt: None,
            result: outcome.attempts.last().map(|(_, result)| *result),
        })
        .collect()
}

/// One row per attempt, flattened. The first row of each student's block
/// carries the label; continuation rows leave it empty.
pub fn all_rows(outcomes: &[CheckOutcome]) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    for outcome in outcomes {
        if outcome.attempts.is_empty() {
            rows.push(ReportRow {
                student_label: outcome.student_id.clone(),
                attempt: None,
                result: None,
            });
            continue;
        }
        for (i, (attempt, result)) in outcome.attempts.iter().enumerate() {
            rows.push(ReportRow {
                student_label: if i == 0 {
                    outcome.student_id.clone()
                } else {
                    String::new()
                },
                attempt: Some(*attempt),
                result: Some(*result),
            });
        }
    }
    rows
}

/// Writes the report as `<root_label> - <sheet>.csv` in `dest_dir`, with the
/// total submission count in a trailing column of the first row. An existing
/// report is never overwritten; the rows go to `temp.csv` instead, with a
/// warning.
pub fn write_report(
    dest_dir: &Path,
    root_label: &str,
    mode: ReportMode,
    rows: &[ReportRow],
    total: usize,
) -> Result<PathBuf> {
    let mut path = dest_dir.join(format!("{} - {}.csv", root_label, mode.sheet_name()));
    if path.exists() {
        eprintln!(
            "{:?} already exists! Move or rename the old report first.",
            path
        );
        path = dest_dir.join("temp.csv");
        eprintln!("Writing {:?} instead...", path);
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)?;
    let mut wtr = csv::Writer::from_writer(BufWriter::new(file));

    let mut headers = vec![String::from("Student ID")];
    if mode == ReportMode::AllAttempts {
        headers.push(String::from("Attempt Number"));
    }
    headers.push(String::from("Compile Result"));
    headers.push(String::from("Total Submissions"));
    wtr.write_record(&headers)?;

    for (i, row) in rows.iter().enumerate() {
        let mut record = vec![row.student_label.clone()];
        if mode == ReportMode::AllAttempts {
            record.push(row.attempt.map_or_else(String::new, |a| a.to_string()));
        }
        record.push(row.result.map_or_else(String::new, |r| r.to_string()));
        record.push(if i == 0 {
            total.to_string()
        } else {
            String::new()
        });
        wtr.write_record(&record)?;
    }
    if rows.is_empty() {
        let mut record = vec![String::new(); headers.len()];
        if let Some(last) = record.last_mut() {
            *last = total.to_string();
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(path)
}
