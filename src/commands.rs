use std::path::{Path, PathBuf};

use crate::toolchain::Toolchain;
use crate::types::ReportMode;
use crate::{anonymize, archive, compile_check, report, walker};

/// Stem of the input with any `.zip` suffix dropped, used to label the run's
/// outputs.
fn root_label(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| String::from("submissions"))
}

/// Compile-checks every student under the input root with `toolchain` and
/// writes the CSV report into `out_dir`. Returns false when the run should
/// exit non-zero.
pub fn check(input: &Path, out_dir: &Path, toolchain: &Toolchain, all: bool, jobs: usize) -> bool {
    let staged = match archive::stage_root(input) {
        Ok(staged) => staged,
        Err(e) => {
            eprintln!("{}", e);
            return false;
        }
    };
    let students = match walker::list_students(staged.path()) {
        Ok(students) => students,
        Err(e) => {
            eprintln!("{}", e);
            return false;
        }
    };

    let total = report::total_submissions(&students);
    let mode = if all {
        ReportMode::AllAttempts
    } else {
        ReportMode::FinalOnly
    };
    let outcomes = match compile_check::concurrent_check_students(
        toolchain,
        &students,
        mode,
        jobs.clamp(1, 8),
        |student| println!("Checked {}", student),
    ) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            eprintln!("Error while checking submissions: {}", e);
            return false;
        }
    };

    let rows = match mode {
        ReportMode::FinalOnly => report::final_rows(&outcomes),
        ReportMode::AllAttempts => report::all_rows(&outcomes),
    };
    match report::write_report(out_dir, &root_label(input), mode, &rows, total) {
        Ok(path) => {
            println!("Report written to {:?}", path);
            true
        }
        Err(e) => {
            eprintln!("Error writing report: {}", e);
            false
        }
    }
}

/// Renames every student entry to a random `Student NNNNN` label and packages
/// the result as `<root>-anonymized.zip` next to the input. The staged
/// working tree is deleted once packaging finishes; the input itself is never
/// modified.
pub fn anonymize(input: &Path) -> bool {
    let staged = match archive::stage_mutable_root(input) {
        Ok(staged) => staged,
        Err(e) => {
            eprintln!("{}", e);
            return false;
        }
    };
    let students = match walker::list_students(staged.path()) {
        Ok(students) => students,
        Err(e) => {
            eprintln!("{}", e);
            return false;
        }
    };

    let mut rng = rand::thread_rng();
    let assignment = anonymize::assign(&students, &mut rng);
    let renamed = anonymize::apply(staged.path(), &assignment);
    println!("{} of {} entries anonymized", renamed, students.len());

    let archive_path = anonymized_archive_path(input);
    if let Err(e) = archive::zip_dir(staged.path(), &archive_path) {
        eprintln!("Error creating {:?}: {}", archive_path, e);
        return false;
    }
    println!("Created {:?}", archive_path);
    true
}

fn anonymized_archive_path(input: &Path) -> PathBuf {
    let name = format!("{}-anonymized.zip", root_label(input));
    match input.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs::{create_dir, read_dir, read_to_string, write};
    use std::time::Duration;

    use crate::anonymize::is_anonymized_label;
    use crate::archive::extract_zip;
    use crate::toolchain::Toolchain;

    use super::{anonymize, check};

    #[test]
    fn final_mode_report_has_one_row_per_student_and_counts_every_attempt() {
        let work = tempfile::tempdir().unwrap();
        let input = work.path().join("cs101");
        create_dir(&input).unwrap();
        // 3 students, 2 attempts each; the attempts are not extractable, so
        // the toolchain never runs and every final attempt is Not buildable
        for name in ["alice", "bob", "carol"] {
            let dir = input.join(name);
            create_dir(&dir).unwrap();
            write(dir.join("v1.zip"), b"not a zip").unwrap();
            write(dir.join("v2.zip"), b"also not a zip").unwrap();
        }
        let toolchain = Toolchain {
            program: String::from("true"),
            args: Vec::new(),
            source_extension: String::from("cpp"),
            artifact: String::from("a.out"),
            timeout: Duration::from_secs(5),
        };
        let out = tempfile::tempdir().unwrap();

        assert!(check(&input, out.path(), &toolchain, false, 2));

        let report = out.path().join("cs101 - Final Submissions.csv");
        let contents = read_to_string(&report).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Student ID,Compile Result,Total Submissions");
        // One row per student; attempts not checked still count in the total
        assert_eq!(lines[1], "alice,Not buildable,6");
        assert_eq!(lines[2], "bob,Not buildable,");
        assert_eq!(lines[3], "carol,Not buildable,");
    }

    #[test]
    fn anonymize_packages_renamed_entries_and_keeps_the_input() {
        let work = tempfile::tempdir().unwrap();
        let input = work.path().join("cs101");
        create_dir(&input).unwrap();
        for name in ["alice", "bob", "carol", "dana", "elif"] {
            let dir = input.join(name);
            create_dir(&dir).unwrap();
            write(dir.join("v1.zip"), b"payload").unwrap();
        }

        assert!(anonymize(&input));

        // Original tree untouched
        assert!(input.join("alice").is_dir());

        let archive = work.path().join("cs101-anonymized.zip");
        assert!(archive.is_file());
        let extracted = tempfile::tempdir().unwrap();
        extract_zip(&archive, extracted.path()).unwrap();

        let mut ids = HashSet::new();
        for entry in read_dir(extracted.path()).unwrap() {
            let entry = entry.unwrap();
            let name = entry.file_name().to_string_lossy().to_string();
            assert!(is_anonymized_label(&name), "unexpected entry {}", name);
            assert!(entry.path().join("v1.zip").is_file());
            ids.insert(name["Student ".len()..].parse::<usize>().unwrap());
        }
        assert_eq!(ids, (0..5).collect::<HashSet<usize>>());
    }

    #[test]
    fn anonymize_rejects_a_missing_input() {
        assert!(!anonymize(std::path::Path::new("no/such/tree")));
    }
}
