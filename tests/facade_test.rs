mod common;

use common::{fail_installs, fake_profile, install_calls, query_calls, set_query_output};
use osdeps::atom::Atom;
use osdeps::manager::{InstallMode, InstallOptions, NativeManager, ShellManager};

fn auto_manager(dir: &std::path::Path) -> ShellManager {
    let mut manager = ShellManager::new(fake_profile(dir));
    manager.set_mode(InstallMode::Auto);
    manager
}

fn options() -> InstallOptions {
    InstallOptions {
        silent: true,
        ..InstallOptions::default()
    }
}

#[test]
fn queries_are_cached_until_an_install_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = auto_manager(dir.path());
    let foo = Atom::parse("foo");

    set_query_output(dir.path(), "N foo\n");
    assert!(!manager.is_installed(&foo).unwrap());
    assert_eq!(query_calls(dir.path()), 1);

    // Second query hits the cache.
    assert!(!manager.is_installed(&foo).unwrap());
    assert!(!manager.is_up_to_date(&foo).unwrap());
    assert_eq!(query_calls(dir.path()), 1);

    assert!(manager.install(&[foo.clone()], &options()).unwrap());
    assert_eq!(install_calls(dir.path()), 1);

    // The install cleared the whole cache: the next query re-resolves and
    // sees the new state.
    set_query_output(dir.path(), "R foo\n");
    assert!(manager.is_installed(&foo).unwrap());
    assert!(manager.is_up_to_date(&foo).unwrap());
    assert_eq!(query_calls(dir.path()), 2);
}

#[test]
fn install_of_nothing_runs_no_subprocess() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = auto_manager(dir.path());

    assert!(!manager.install(&[], &options()).unwrap());
    assert_eq!(query_calls(dir.path()), 0);
    assert_eq!(install_calls(dir.path()), 0);
}

#[test]
fn up_to_date_atoms_are_filtered_out() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = auto_manager(dir.path());
    let foo = Atom::parse("foo");

    set_query_output(dir.path(), "R foo\n");
    assert!(!manager.install(&[foo], &options()).unwrap());
    assert_eq!(install_calls(dir.path()), 0);
}

#[test]
fn stale_atoms_are_updated_when_keeping_current() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = auto_manager(dir.path());
    let foo = Atom::parse("foo");

    set_query_output(dir.path(), "U foo\n");
    assert!(manager.is_installed(&foo).unwrap());
    assert!(!manager.is_up_to_date(&foo).unwrap());

    assert!(manager.install(&[foo], &options()).unwrap());
    assert_eq!(install_calls(dir.path()), 1);
}

#[test]
fn stale_atoms_are_left_alone_when_not_keeping_current() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = auto_manager(dir.path());
    manager.set_keep_uptodate(false);
    let foo = Atom::parse("foo");

    set_query_output(dir.path(), "U foo\n");
    assert!(!manager.install(&[foo], &options()).unwrap());
    assert_eq!(install_calls(dir.path()), 0);
}

#[test]
fn missing_only_skips_updates() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = auto_manager(dir.path());
    let stale = Atom::parse("foo");
    let fresh = Atom::parse("bar");

    set_query_output(dir.path(), "U foo\nN bar\n");
    let opts = InstallOptions {
        install_only: true,
        ..options()
    };
    assert!(manager.install(&[stale, fresh], &opts).unwrap());

    let log = std::fs::read_to_string(dir.path().join("install_calls.log")).unwrap();
    assert!(log.contains("bar"));
    assert!(!log.contains("foo"));
}

#[test]
fn failed_install_reports_false_and_keeps_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = auto_manager(dir.path());
    let foo = Atom::parse("foo");

    set_query_output(dir.path(), "N foo\n");
    assert!(!manager.is_installed(&foo).unwrap());
    let queries_before = query_calls(dir.path());

    fail_installs(dir.path());
    assert!(!manager.install(&[foo.clone()], &options()).unwrap());
    assert_eq!(install_calls(dir.path()), 1);

    // Cache untouched: no fresh resolution happens.
    assert!(!manager.is_installed(&foo).unwrap());
    assert_eq!(query_calls(dir.path()), queries_before);
}

#[test]
fn reinstall_bypasses_all_filtering() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = auto_manager(dir.path());
    let foo = Atom::parse("foo");

    set_query_output(dir.path(), "R foo\n");
    let opts = InstallOptions {
        filter_up_to_date: false,
        install_only: false,
        silent: true,
    };
    assert!(manager.install(&[foo], &opts).unwrap());
    assert_eq!(install_calls(dir.path()), 1);
    // The unfiltered path never needed a query.
    assert_eq!(query_calls(dir.path()), 0);
}
