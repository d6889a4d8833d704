use camino::Utf8PathBuf;
use slipway_scanner::{collect_artifacts, find_bin_dirs, scan, ScannerError};
use std::fs;

fn utf8(p: &std::path::Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(p.to_path_buf()).expect("utf8 path")
}

fn fixture_tree() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = utf8(dir.path());

    fs::create_dir_all(root.join("projA/bin")).expect("mkdir");
    fs::create_dir_all(root.join("projB/bin/sub")).expect("mkdir");
    fs::create_dir_all(root.join("projB/obj")).expect("mkdir");

    fs::write(root.join("projA/bin/app.dll"), b"a").expect("write");
    fs::write(root.join("projA/bin/app.pdb"), b"p").expect("write");
    fs::write(root.join("projB/bin/tool.exe"), b"e").expect("write");
    fs::write(root.join("projB/bin/sub/nested.dll"), b"n").expect("write");
    fs::write(root.join("projB/obj/skip.dll"), b"s").expect("write");

    (dir, root)
}

#[test]
fn finds_all_bin_dirs_and_nothing_else() {
    let (_guard, root) = fixture_tree();

    let bins = find_bin_dirs(&root).expect("scan");
    assert_eq!(
        bins,
        vec![root.join("projA/bin"), root.join("projB/bin")]
    );
}

#[test]
fn collects_bin_dirs_outer_patterns_inner() {
    let (_guard, root) = fixture_tree();

    let bins = find_bin_dirs(&root).expect("scan");
    let files = collect_artifacts(&bins, &["*.dll".to_string(), "*.exe".to_string()])
        .expect("collect");

    assert_eq!(
        files,
        vec![
            root.join("projA/bin/app.dll"),
            root.join("projB/bin/sub/nested.dll"),
            root.join("projB/bin/tool.exe"),
        ]
    );
}

#[test]
fn files_outside_bin_dirs_are_ignored() {
    let (_guard, root) = fixture_tree();

    let (files, summary) = scan(&root, &["*.dll".to_string()]).expect("scan");
    assert!(files.iter().all(|f| !f.as_str().contains("obj")));
    assert_eq!(summary.bin_dirs, 2);
    assert_eq!(summary.files_matched, 2);
}

#[test]
fn overlapping_patterns_duplicate_matches() {
    let (_guard, root) = fixture_tree();

    let bins = vec![root.join("projA/bin")];
    let files = collect_artifacts(&bins, &["*.dll".to_string(), "app.*".to_string()])
        .expect("collect");

    // app.dll is hit by both patterns; duplicates are preserved, and app.*
    // also picks up the pdb.
    assert_eq!(
        files,
        vec![
            root.join("projA/bin/app.dll"),
            root.join("projA/bin/app.dll"),
            root.join("projA/bin/app.pdb"),
        ]
    );
}

#[test]
fn nested_bin_dirs_are_walked_from_both_roots() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = utf8(dir.path());
    fs::create_dir_all(root.join("x/bin/bin")).expect("mkdir");
    fs::write(root.join("x/bin/bin/inner.dll"), b"i").expect("write");

    let (files, summary) = scan(&root, &["*.dll".to_string()]).expect("scan");

    assert_eq!(summary.bin_dirs, 2);
    // Once via x/bin, once via x/bin/bin.
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f == &root.join("x/bin/bin/inner.dll")));
}

#[test]
fn empty_pattern_segment_matches_nothing() {
    let (_guard, root) = fixture_tree();

    let (files, _) = scan(&root, &["".to_string()]).expect("scan");
    assert!(files.is_empty());
}

#[test]
fn invalid_glob_is_reported() {
    let (_guard, root) = fixture_tree();

    let res = scan(&root, &["a[".to_string()]);
    assert!(matches!(res, Err(ScannerError::Pattern { .. })));
}
