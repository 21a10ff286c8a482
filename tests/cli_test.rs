use assert_cmd::Command;
use predicates::prelude::*;

fn osdeps() -> Command {
    Command::cargo_bin("osdeps").unwrap()
}

#[test]
fn managers_lists_known_families() {
    osdeps()
        .arg("managers")
        .assert()
        .success()
        .stdout(predicate::str::contains("emerge"))
        .stdout(predicate::str::contains("apt"))
        .stdout(predicate::str::contains("pip"));
}

#[test]
fn unknown_family_is_rejected() {
    osdeps()
        .args(["status", "--manager", "bogus", "foo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown package manager family"));
}

#[test]
fn install_requires_atoms() {
    osdeps().arg("install").assert().failure();
}

#[test]
fn completions_generate_a_script() {
    osdeps()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("osdeps"));
}

#[test]
fn config_round_trips_through_the_settings_file() {
    let dir = tempfile::tempdir().unwrap();

    osdeps()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "set", "keep_uptodate", "false"])
        .assert()
        .success();

    osdeps()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "get", "keep_uptodate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("false"));
}

#[test]
fn config_rejects_invalid_install_mode() {
    let dir = tempfile::tempdir().unwrap();

    osdeps()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "set", "install_mode", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an install mode"));
}
