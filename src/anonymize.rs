use std::collections::HashSet;
use std::fs::rename;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::StudentEntry;

/// Draws a uniform random permutation of the unclaimed ids in `[0, N)` and
/// pairs one with each not-yet-anonymized student in traversal order. Ids
/// already held by `Student NNNNN` entries from an earlier partial run are
/// reserved, so the ids in use after renaming are still each used exactly
/// once. The mapping lives only as long as the caller keeps it.
pub fn assign<'a, R: Rng>(
    students: &'a [StudentEntry],
    rng: &mut R,
) -> Vec<(&'a StudentEntry, usize)> {
    let claimed: HashSet<usize> = students.iter().filter_map(|s| claimed_id(&s.id)).collect();
    let mut ids: Vec<usize> = (0..students.len())
        .filter(|id| !claimed.contains(id))
        .collect();
    ids.shuffle(rng);
    students
        .iter()
        .filter(|s| claimed_id(&s.id).is_none())
        .zip(ids)
        .collect()
}

pub fn anonymized_label(id: usize) -> String {
    format!("Student {:05}", id)
}

/// The id a folder already holds from a previous anonymization run, if its
/// name is an anonymized label.
fn claimed_id(name: &str) -> Option<usize> {
    name.strip_prefix("Student ")
        .filter(|rest| rest.len() == 5 && rest.chars().all(|c| c.is_ascii_digit()))
        .and_then(|rest| rest.parse().ok())
}

/// Whether a folder name was already produced by a previous anonymization
/// run.
pub fn is_anonymized_label(name: &str) -> bool {
    claimed_id(name).is_some()
}

/// Renames each assigned entry under `root` to its anonymized label. Entries
/// already carrying an anonymized label are skipped, so a partially-failed
/// run can be resumed. A rename whose destination exists, or that fails, is
/// reported and left as-is; `rename` would silently replace an empty
/// destination directory otherwise. No rollback is attempted. Returns how
/// many entries were renamed.
pub fn apply(root: &Path, assignment: &[(&StudentEntry, usize)]) -> usize {
    let mut renamed = 0;
    for (student, id) in assignment {
        if is_anonymized_label(&student.id) {
            continue;
        }
        let dest = root.join(anonymized_label(*id));
        if dest.exists() {
            eprintln!("Failed to anonymize {}: {:?} already exists", student.id, dest);
            continue;
        }
        match rename(&student.dir, &dest) {
            Ok(()) => renamed += 1,
            Err(e) => eprintln!("Failed to anonymize {}: {}", student.id, e),
        }
    }
    renamed
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs::{create_dir, read_dir, write};

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::walker::list_students;

    use super::{anonymized_label, apply, assign, is_anonymized_label};

    #[test]
    fn assignment_is_a_bijection_onto_the_dense_id_range() {
        let root = tempfile::tempdir().unwrap();
        for i in 0..25 {
            create_dir(root.path().join(format!("student-{:02}", i))).unwrap();
        }
        let students = list_students(root.path()).unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        let assignment = assign(&students, &mut rng);
        let ids: HashSet<usize> = assignment.iter().map(|(_, id)| *id).collect();
        assert_eq!(ids, (0..25).collect::<HashSet<usize>>());
    }

    #[test]
    fn no_students_means_an_empty_assignment() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(assign(&[], &mut rng).is_empty());
    }

    #[test]
    fn labels_are_zero_padded_to_width_five() {
        assert_eq!(anonymized_label(7), "Student 00007");
        assert_eq!(anonymized_label(123), "Student 00123");
        assert!(is_anonymized_label("Student 00007"));
        assert!(!is_anonymized_label("Student 7"));
        assert!(!is_anonymized_label("jsmith"));
    }

    #[test]
    fn apply_renames_every_entry_to_a_label() {
        let root = tempfile::tempdir().unwrap();
        for name in ["alice", "bob", "carol", "dana", "elif"] {
            create_dir(root.path().join(name)).unwrap();
        }
        let students = list_students(root.path()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let assignment = assign(&students, &mut rng);

        assert_eq!(apply(root.path(), &assignment), 5);

        let mut ids = HashSet::new();
        for entry in read_dir(root.path()).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(is_anonymized_label(&name), "unexpected entry {}", name);
            ids.insert(name["Student ".len()..].parse::<usize>().unwrap());
        }
        assert_eq!(ids, (0..5).collect::<HashSet<usize>>());
    }

    #[test]
    fn already_anonymized_entries_are_skipped_on_resume() {
        let root = tempfile::tempdir().unwrap();
        create_dir(root.path().join("Student 00004")).unwrap();
        create_dir(root.path().join("bob")).unwrap();
        let students = list_students(root.path()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let assignment = assign(&students, &mut rng);

        // Only "bob" is renamed; the pre-anonymized entry is left alone
        assert_eq!(apply(root.path(), &assignment), 1);
        assert!(root.path().join("Student 00004").is_dir());
        assert!(!root.path().join("bob").exists());
    }

    #[test]
    fn resumed_run_never_draws_an_already_claimed_id() {
        let root = tempfile::tempdir().unwrap();
        let kept = root.path().join("Student 00000");
        create_dir(&kept).unwrap();
        write(kept.join("v1.zip"), b"first run").unwrap();
        create_dir(root.path().join("alice")).unwrap();
        let students = list_students(root.path()).unwrap();

        // Id 0 is claimed, so with N=2 every seed must hand alice id 1
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let assignment = assign(&students, &mut rng);
            assert_eq!(assignment.len(), 1);
            assert_eq!(assignment[0].0.id, "alice");
            assert_eq!(assignment[0].1, 1);
        }

        let mut rng = StdRng::seed_from_u64(3);
        let assignment = assign(&students, &mut rng);
        assert_eq!(apply(root.path(), &assignment), 1);

        let names: HashSet<String> = read_dir(root.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            HashSet::from([String::from("Student 00000"), String::from("Student 00001")])
        );
        assert_eq!(
            std::fs::read(root.path().join("Student 00000").join("v1.zip")).unwrap(),
            b"first run"
        );
    }

    #[test]
    fn apply_refuses_to_replace_an_existing_destination() {
        let root = tempfile::tempdir().unwrap();
        create_dir(root.path().join("Student 00000")).unwrap();
        create_dir(root.path().join("bob")).unwrap();
        let students = list_students(root.path()).unwrap();
        let bob = students.iter().find(|s| s.id == "bob").unwrap();

        // Hand-built colliding assignment; `assign` itself never produces one
        let assignment = vec![(bob, 0usize)];
        assert_eq!(apply(root.path(), &assignment), 0);
        assert!(root.path().join("bob").is_dir());
        assert!(root.path().join("Student 00000").is_dir());
    }
}
