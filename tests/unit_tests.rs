//! Tests for descriptor resolution and profile translation against real
//! directories.

mod helpers;

use std::fs;
use tempfile::TempDir;

use helpers::assert_file_content;
use hackeros_builder::descriptor::{self, DescriptorError};
use hackeros_builder::profile::{self, ProfileError};
use hackeros_builder::track::Track;

fn project(descriptor: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("build.json"), descriptor).unwrap();
    fs::create_dir(dir.path().join("config")).unwrap();
    dir
}

// =============================================================================
// Descriptor
// =============================================================================

#[test]
fn test_descriptor_tracks() {
    assert_eq!(descriptor::resolve(project(r#"["lts"]"#).path()).unwrap(), Track::Stable);
    assert_eq!(descriptor::resolve(project(r#"["normal"]"#).path()).unwrap(), Track::Rolling);
    assert_eq!(
        descriptor::resolve(project(r#"["NORMAL", "ignored"]"#).path()).unwrap(),
        Track::Rolling
    );
}

#[test]
fn test_descriptor_rejections() {
    let cases = [
        (r#"["sid"]"#, "unsupported"),
        ("[]", "empty"),
        ("[1]", "string"),
        ("{}", "list"),
        ("not json", "json"),
    ];
    for (content, what) in cases {
        let err = descriptor::resolve(project(content).path()).unwrap_err();
        let ok = match what {
            "unsupported" => matches!(err, DescriptorError::UnsupportedVersion { .. }),
            "empty" => matches!(err, DescriptorError::Empty),
            "string" => matches!(err, DescriptorError::NotAString(_)),
            "list" => matches!(err, DescriptorError::NotAList(_)),
            _ => matches!(err, DescriptorError::Parse { .. }),
        };
        assert!(ok, "{:?} gave {:?}", content, err);
    }
}

// =============================================================================
// Profile translation
// =============================================================================

#[test]
fn test_translate_writes_one_package_per_line() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("base.profile"),
        "[packages]\nfirst = pkg1\nsecond = pkg2\n",
    )
    .unwrap();

    let report = profile::translate(dir.path()).unwrap();

    assert!(report.is_clean());
    assert_file_content(
        &dir.path().join("config/package-lists/base.list.chroot"),
        "pkg1\npkg2",
    );
}

#[test]
fn test_translate_empty_directory_writes_nothing() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), "[packages]\na = b\n").unwrap();

    let report = profile::translate(dir.path()).unwrap();

    assert!(report.profiles.is_empty());
    assert!(report.written.is_empty());
    assert!(report.bootappend.is_none());
    assert!(!dir.path().join("config").exists());
}

#[test]
fn test_translate_continues_past_bad_profile() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a-broken.profile"), "orphan = value\n").unwrap();
    fs::write(dir.path().join("b-good.profile"), "[packages]\na = htop\n").unwrap();

    let report = profile::translate(dir.path()).unwrap();

    assert!(!report.is_clean());
    assert_eq!(report.profiles, vec!["b-good"]);
    assert!(matches!(report.failures.as_slice(), [ProfileError::Syntax { .. }]));
    assert_file_content(
        &dir.path().join("config/package-lists/b-good.list.chroot"),
        "htop",
    );
    assert!(!dir
        .path()
        .join("config/package-lists/a-broken.list.chroot")
        .exists());
}

#[test]
fn test_translate_overwrites_previous_list() {
    let dir = TempDir::new().unwrap();
    let lists = dir.path().join("config/package-lists");
    fs::create_dir_all(&lists).unwrap();
    fs::write(lists.join("base.list.chroot"), "stale\nentries\n").unwrap();
    fs::write(dir.path().join("base.profile"), "[packages]\na = vim\n").unwrap();

    profile::translate(dir.path()).unwrap();

    assert_file_content(&lists.join("base.list.chroot"), "vim");
}

#[test]
fn test_translate_ignores_nested_profiles() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested/deep.profile"), "[packages]\na = x\n").unwrap();

    let report = profile::translate(dir.path()).unwrap();

    assert!(report.profiles.is_empty());
}

#[test]
fn test_bootappend_joined_in_file_order() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("z.profile"), "[bootappend]\nparameters = splash\n").unwrap();
    fs::write(dir.path().join("a.profile"), "[bootappend]\nparameters = quiet\n").unwrap();
    fs::write(dir.path().join("m.profile"), "[packages]\na = b\n").unwrap();

    let report = profile::translate(dir.path()).unwrap();

    assert_eq!(report.profiles, vec!["a", "m", "z"]);
    assert_eq!(report.bootappend.as_deref(), Some("quiet splash"));
}
