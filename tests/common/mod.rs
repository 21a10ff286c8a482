//! Shared helpers for integration tests: a fake manager family whose
//! query and install commands are shell scripts under a temp directory.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use osdeps::cache::InstallState;
use osdeps::executor::ExecutionPolicy;
use osdeps::family::{FamilyProfile, FlagRule, FlagTable};
use osdeps::template::{CommandTemplate, TemplateSet};
use regex::Regex;

/// Flag vocabulary of the fake family: `N foo` would newly install,
/// `R foo` would reinstall unchanged, anything else updates.
const FAKE_CLASSES: &[(&str, InstallState)] = &[
    ("N", InstallState::MISSING),
    ("R", InstallState::CURRENT),
];

/// Build a fake family whose commands log their invocations.
///
/// The query command appends its arguments to `query_calls.log` and prints
/// the contents of `query_output`. The install command appends to
/// `install_calls.log` and fails with status 7 while `install_fail`
/// exists.
pub fn fake_profile(dir: &Path) -> FamilyProfile {
    let query_script = dir.join("query.sh");
    fs::write(
        &query_script,
        format!(
            "echo \"$@\" >> {dir}/query_calls.log\n\
             [ -f {dir}/query_output ] && cat {dir}/query_output\n\
             exit 0\n",
            dir = dir.display()
        ),
    )
    .unwrap();

    let install_script = dir.join("install.sh");
    fs::write(
        &install_script,
        format!(
            "echo \"$@\" >> {dir}/install_calls.log\n\
             [ -f {dir}/install_fail ] && exit 7\n\
             exit 0\n",
            dir = dir.display()
        ),
    )
    .unwrap();

    FamilyProfile {
        name: "fake",
        binary: "sh",
        templates: TemplateSet {
            query: Some(CommandTemplate::new([
                "sh",
                query_script.to_str().unwrap(),
                "%s",
            ])),
            install: Some(CommandTemplate::new([
                "sh",
                install_script.to_str().unwrap(),
                "%s",
            ])),
            install_user: None,
        },
        policy: ExecutionPolicy::user(),
        table: FlagTable::new(vec![FlagRule {
            line: Regex::new(r"^(?P<flag>[A-Z]+)\s+(?P<atom>\S+)$").unwrap(),
            classes: FAKE_CLASSES,
            other: InstallState::STALE,
        }]),
    }
}

pub fn set_query_output(dir: &Path, output: &str) {
    fs::write(dir.join("query_output"), output).unwrap();
}

pub fn query_calls(dir: &Path) -> usize {
    match fs::read_to_string(dir.join("query_calls.log")) {
        Ok(contents) => contents.lines().count(),
        Err(_) => 0,
    }
}

pub fn install_calls(dir: &Path) -> usize {
    match fs::read_to_string(dir.join("install_calls.log")) {
        Ok(contents) => contents.lines().count(),
        Err(_) => 0,
    }
}

pub fn fail_installs(dir: &Path) {
    fs::write(dir.join("install_fail"), "").unwrap();
}
