/// End-to-end scanner tests against real temporary directory trees.
///
/// The scanner spawns a producer thread and follows directory links through
/// its cycle check, so these run on a real filesystem with no mocking.
mod common;

use common::write_bytes;
use disksweep_core::scanner::{estimate_size, scan, ScanRoot};
use disksweep_core::CancelToken;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// ```text
/// root/
///   a.log        (100 bytes)   depth 0
///   one/
///     b.log      (200 bytes)   depth 1
///     two/
///       c.txt    (300 bytes)   depth 2
///       three/
///         d.log  (400 bytes)   depth 3
/// ```
fn build_nested_tree(root: &Path) {
    write_bytes(&root.join("a.log"), 100);
    write_bytes(&root.join("one").join("b.log"), 200);
    write_bytes(&root.join("one").join("two").join("c.txt"), 300);
    write_bytes(&root.join("one").join("two").join("three").join("d.log"), 400);
}

fn names(root: &ScanRoot) -> BTreeSet<String> {
    scan(root, &CancelToken::new())
        .unwrap()
        .map(|c| c.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn scan_reports_every_matching_file_with_its_size() {
    let tmp = tempfile::TempDir::new().unwrap();
    build_nested_tree(tmp.path());

    let root = ScanRoot::all(tmp.path());
    let candidates: Vec<_> = scan(&root, &CancelToken::new()).unwrap().collect();
    assert_eq!(candidates.len(), 4);
    assert_eq!(candidates.iter().map(|c| c.size).sum::<u64>(), 1_000);
    assert!(candidates.iter().all(|c| c.modified.is_some()));

    assert_eq!(estimate_size(&root, &CancelToken::new()).unwrap(), 1_000);
}

#[test]
fn pattern_filters_by_file_name_at_every_depth() {
    let tmp = tempfile::TempDir::new().unwrap();
    build_nested_tree(tmp.path());

    let root = ScanRoot::new(tmp.path(), "*.log").unwrap();
    assert_eq!(names(&root), set(&["a.log", "b.log", "d.log"]));
}

#[test]
fn depth_bound_hides_deeper_files() {
    let tmp = tempfile::TempDir::new().unwrap();
    build_nested_tree(tmp.path());

    assert_eq!(names(&ScanRoot::all(tmp.path()).max_depth(0)), set(&["a.log"]));
    assert_eq!(
        names(&ScanRoot::all(tmp.path()).max_depth(1)),
        set(&["a.log", "b.log"])
    );
    assert_eq!(
        names(&ScanRoot::all(tmp.path()).max_depth(2)),
        set(&["a.log", "b.log", "c.txt"])
    );
}

#[test]
fn missing_root_yields_nothing() {
    let tmp = tempfile::TempDir::new().unwrap();
    let root = ScanRoot::all(tmp.path().join("does-not-exist"));
    let mut scan = scan(&root, &CancelToken::new()).unwrap();
    assert!(scan.next().is_none());
    assert_eq!(scan.stats().dirs_unreadable, 1);
}

#[test]
fn cancellation_ends_the_sequence_immediately() {
    let tmp = tempfile::TempDir::new().unwrap();
    for i in 0..500 {
        write_bytes(&tmp.path().join(format!("file{i:03}.tmp")), 1);
    }

    let cancel = CancelToken::new();
    let mut scan = scan(&ScanRoot::all(tmp.path()), &cancel).unwrap();
    assert!(scan.next().is_some());

    cancel.cancel();
    assert!(scan.next().is_none());
    assert!(estimate_size(&ScanRoot::all(tmp.path()), &cancel)
        .unwrap_err()
        .is_cancelled());
}

#[test]
fn dropping_the_scan_stops_the_producer() {
    let tmp = tempfile::TempDir::new().unwrap();
    for i in 0..500 {
        write_bytes(&tmp.path().join(format!("file{i:03}.tmp")), 1);
    }

    let first: Vec<PathBuf> = scan(&ScanRoot::all(tmp.path()), &CancelToken::new())
        .unwrap()
        .take(3)
        .map(|c| c.path)
        .collect();
    assert_eq!(first.len(), 3);
    assert_eq!(
        scan(&ScanRoot::all(tmp.path()), &CancelToken::new())
            .unwrap()
            .count(),
        500
    );
}

/// `root/one/back -> root`: the link re-enters a directory that is still open
/// on the recursion stack and must be skipped.
#[cfg(unix)]
#[test]
fn symlink_cycle_terminates_with_each_file_once() {
    let tmp = tempfile::TempDir::new().unwrap();
    build_nested_tree(tmp.path());
    std::os::unix::fs::symlink(tmp.path(), tmp.path().join("one").join("back")).unwrap();

    let root = ScanRoot::all(tmp.path()).unbounded();
    let mut scan = scan(&root, &CancelToken::new()).unwrap();
    let mut paths: Vec<PathBuf> = scan.by_ref().map(|c| c.path).collect();
    paths.sort();
    assert_eq!(paths.len(), 4, "{paths:?}");
    assert!(scan.stats().cycles_skipped >= 1);
}

/// Two sibling links to the same directory: the second visit happens after
/// the first has unwound, so it is explored again rather than treated as a
/// cycle.
#[cfg(unix)]
#[test]
fn sibling_links_to_one_directory_are_not_cycles() {
    let tmp = tempfile::TempDir::new().unwrap();
    let shared = tmp.path().join("shared");
    write_bytes(&shared.join("x.dat"), 10);
    for side in ["left", "right"] {
        let dir = tmp.path().join(side);
        fs::create_dir_all(&dir).unwrap();
        std::os::unix::fs::symlink(&shared, dir.join("link")).unwrap();
    }

    let mut scan = scan(&ScanRoot::all(tmp.path()), &CancelToken::new()).unwrap();
    assert_eq!(scan.by_ref().count(), 3);
    assert_eq!(scan.stats().cycles_skipped, 0);
}

/// `temp/innocent -> home`: a directory link whose target lies outside the
/// root is never entered.
#[cfg(unix)]
#[test]
fn links_leaving_the_root_are_not_followed() {
    let tmp = tempfile::TempDir::new().unwrap();
    let home = tmp.path().join("home");
    write_bytes(&home.join("Documents").join("thesis.docx"), 999);
    let temp = tmp.path().join("temp");
    write_bytes(&temp.join("a.tmp"), 10);
    std::os::unix::fs::symlink(&home, temp.join("innocent")).unwrap();

    let mut scan = scan(&ScanRoot::all(&temp).unbounded(), &CancelToken::new()).unwrap();
    let paths: Vec<PathBuf> = scan.by_ref().map(|c| c.path).collect();
    assert_eq!(paths, vec![temp.join("a.tmp")]);
    assert_eq!(scan.stats().escapes_skipped, 1);
}

/// FIFOs are never candidates: opening one without a writer would block.
#[cfg(unix)]
#[test]
fn named_pipes_are_not_reported() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_bytes(&tmp.path().join("a.tmp"), 10);
    common::make_fifo(&tmp.path().join("pipe"));

    assert_eq!(names(&ScanRoot::all(tmp.path())), set(&["a.tmp"]));
}
