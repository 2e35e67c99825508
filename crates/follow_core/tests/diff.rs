use follow_core::{compute_diff, DiffResult, Followee, Snapshot};
use pretty_assertions::assert_eq;

fn snapshot(names: &[&str]) -> Snapshot {
    names.iter().copied().collect()
}

#[test]
fn added_and_removed_follow_set_difference() {
    let previous = snapshot(&["a", "b", "c"]);
    let current = snapshot(&["b", "c", "d"]);

    let diff = compute_diff(Some(&previous), &current).expect("diff computed");
    assert_eq!(
        diff,
        DiffResult {
            added: vec!["d".to_string()],
            removed: vec!["a".to_string()],
        }
    );
}

#[test]
fn results_are_sorted_and_disjoint() {
    let previous = snapshot(&["zed", "mia", "bob", "ann"]);
    let current = snapshot(&["yan", "bob", "carl", "ann", "ébène"]);

    let diff = compute_diff(Some(&previous), &current).unwrap();
    assert_eq!(diff.added, vec!["carl", "yan", "ébène"]);
    assert_eq!(diff.removed, vec!["mia", "zed"]);
    assert!(diff.added.iter().all(|name| !diff.removed.contains(name)));
    assert!(diff.added.iter().all(|name| !previous.to_sorted_vec().contains(name)));
    assert!(diff.removed.iter().all(|name| !current.to_sorted_vec().contains(name)));
}

#[test]
fn no_previous_snapshot_means_no_diff() {
    let current = snapshot(&["a", "b"]);
    assert_eq!(compute_diff(None, &current), None);
    assert_eq!(compute_diff(Some(&Snapshot::default()), &current), None);
}

#[test]
fn identical_sets_give_empty_diff() {
    let previous = snapshot(&["a", "b"]);
    let diff = compute_diff(Some(&previous), &previous.clone()).unwrap();
    assert_eq!(diff, DiffResult::default());
}

#[test]
fn snapshot_from_followees_dedupes_and_sorts() {
    let followees = vec![
        Followee::new("charlie"),
        Followee::new("alpha"),
        Followee::new("charlie"),
    ];
    let snap = Snapshot::from_followees(&followees);
    assert_eq!(snap.len(), 2);
    assert_eq!(snap.to_sorted_vec(), vec!["alpha", "charlie"]);
}
