use std::thread;

use osdeps::executor::{self, ExecutionPolicy};

/// Two concurrent installs on a locking manager must serialize: each run
/// records its start and end time, and the recorded intervals must not
/// overlap.
#[test]
fn concurrent_locked_installs_never_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let lock_path = dir.path().join("manager.lock");
    let markers = dir.path().join("markers");

    let command = format!(
        "start=$(date +%s%N); sleep 0.4; end=$(date +%s%N); echo \"$start $end\" >> {}",
        markers.display()
    );

    let mut handles = Vec::new();
    for _ in 0..2 {
        let command = command.clone();
        let policy = ExecutionPolicy {
            needs_root: false,
            needs_locking: true,
            inherit_env: Vec::new(),
            lock_path: lock_path.clone(),
        };
        handles.push(thread::spawn(move || {
            executor::execute(&command, &policy).unwrap()
        }));
    }
    for handle in handles {
        let outcome = handle.join().unwrap();
        assert!(outcome.success);
    }

    let contents = std::fs::read_to_string(&markers).unwrap();
    let mut intervals: Vec<(u128, u128)> = contents
        .lines()
        .map(|line| {
            let mut parts = line.split_whitespace();
            let start: u128 = parts.next().unwrap().parse().unwrap();
            let end: u128 = parts.next().unwrap().parse().unwrap();
            (start, end)
        })
        .collect();
    assert_eq!(intervals.len(), 2);

    intervals.sort();
    let (_, first_end) = intervals[0];
    let (second_start, _) = intervals[1];
    assert!(
        first_end <= second_start,
        "locked installs overlapped: {intervals:?}"
    );
}

/// A non-locking policy runs without ever touching the lock file.
#[test]
fn unlocked_execution_skips_the_lock_file() {
    let dir = tempfile::tempdir().unwrap();
    let lock_path = dir.path().join("manager.lock");

    let policy = ExecutionPolicy {
        needs_root: false,
        needs_locking: false,
        inherit_env: Vec::new(),
        lock_path: lock_path.clone(),
    };
    let outcome = executor::execute("true", &policy).unwrap();
    assert!(outcome.success);
    assert!(!lock_path.exists());
}
