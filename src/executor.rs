//! Privileged command execution with environment isolation and
//! cross-process serialization.
//!
//! Package databases are machine-global, so installs from independently
//! launched processes must not interleave. Serialization uses an advisory
//! exclusive lock on a fixed well-known path shared by every instance of
//! the tool, regardless of manager family.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use sudo::RunningAs;

use crate::error::OsdepsError;

/// Well-known lock path shared by all instances on the machine.
pub const DEFAULT_LOCK_PATH: &str = "/tmp/osdeps-package-manager.lock";

/// Search path for elevated commands. The caller's `PATH` is never used.
pub const PRIVILEGED_PATH: &str =
    "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

/// Polling interval while the lock is held elsewhere.
pub const LOCK_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// How a manager family's commands are executed.
///
/// Configured once per manager instance and not mutated afterward.
#[derive(Debug, Clone)]
pub struct ExecutionPolicy {
    pub needs_root: bool,
    pub needs_locking: bool,
    /// Environment variables copied from the caller into the isolated
    /// elevated environment. Everything else is dropped.
    pub inherit_env: Vec<String>,
    pub lock_path: PathBuf,
}

impl ExecutionPolicy {
    /// Run as the invoking user with no serialization (pip-style managers).
    pub fn user() -> Self {
        Self {
            needs_root: false,
            needs_locking: false,
            inherit_env: Vec::new(),
            lock_path: PathBuf::from(DEFAULT_LOCK_PATH),
        }
    }

    /// Elevated and serialized, inheriting only the named variables.
    pub fn privileged(inherit_env: &[&str]) -> Self {
        Self {
            needs_root: true,
            needs_locking: true,
            inherit_env: inherit_env.iter().map(|s| s.to_string()).collect(),
            lock_path: PathBuf::from(DEFAULT_LOCK_PATH),
        }
    }

    pub fn with_lock_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock_path = path.into();
        self
    }
}

/// Exit status and captured output of an executed command, returned to the
/// caller uninterpreted.
#[derive(Debug)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
}

/// Scoped advisory lock on the shared package-manager lock file.
///
/// Released on drop, on every exit path. Blocking waiters poll on a fixed
/// interval with a notice per retry; no fairness beyond OS flock
/// semantics.
pub struct PackageLock {
    _lock: Flock<std::fs::File>,
}

impl PackageLock {
    pub fn acquire(path: &Path) -> Result<Self, OsdepsError> {
        loop {
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .open(path)
                .map_err(|source| OsdepsError::Lock {
                    path: path.display().to_string(),
                    source,
                })?;

            match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
                Ok(lock) => return Ok(Self { _lock: lock }),
                Err((_, Errno::EAGAIN)) => {
                    eprintln!(
                        "{} package manager lock at {} is held by another process, retrying in {}s",
                        "waiting:".yellow().bold(),
                        path.display(),
                        LOCK_RETRY_INTERVAL.as_secs()
                    );
                    std::thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err((_, errno)) => {
                    return Err(OsdepsError::Lock {
                        path: path.display().to_string(),
                        source: std::io::Error::from(errno),
                    });
                }
            }
        }
    }
}

/// Run a command line under the given policy.
///
/// The lock, when requested, is held for the whole subprocess lifetime.
/// Output interpretation is the resolver's job, not the executor's.
pub fn execute(command: &str, policy: &ExecutionPolicy) -> Result<ExecutionOutcome, OsdepsError> {
    let _lock = if policy.needs_locking {
        Some(PackageLock::acquire(&policy.lock_path)?)
    } else {
        None
    };
    run_isolated(command, policy)
}

fn run_isolated(command: &str, policy: &ExecutionPolicy) -> Result<ExecutionOutcome, OsdepsError> {
    let expression = if policy.needs_root {
        let env = constructed_env(policy);
        if matches!(sudo::check(), RunningAs::Root) {
            // Already elevated: same constructed environment, no prefix.
            duct::cmd("sh", ["-c", command]).full_env(env)
        } else {
            let preserve = env.keys().cloned().collect::<Vec<_>>().join(",");
            let args = vec![
                format!("--preserve-env={preserve}"),
                "sh".to_string(),
                "-c".to_string(),
                command.to_string(),
            ];
            duct::cmd("sudo", args).full_env(env)
        }
    } else {
        duct::cmd("sh", ["-c", command])
    };

    let output = expression.stdout_capture().unchecked().run()?;
    Ok(ExecutionOutcome {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    })
}

/// The environment an elevated command sees: empty except for a fixed
/// privileged `PATH` and the explicitly inherited variables. An elevated
/// install must not pick up arbitrary variables from the calling session.
fn constructed_env(policy: &ExecutionPolicy) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    env.insert("PATH".to_string(), PRIVILEGED_PATH.to_string());
    for name in &policy.inherit_env {
        if let Ok(value) = std::env::var(name) {
            env.insert(name.clone(), value);
        }
    }
    env
}
