use std::fs;
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;

/// Whether `pid` refers to a live, non-zombie process.
///
/// Zombies count as gone: they have exited and only wait to be reaped by
/// their (possibly re-assigned) parent.
pub fn process_is_running(pid: i32) -> bool {
    if let Ok(stat) = fs::read_to_string(format!("/proc/{pid}/stat")) {
        // Format: `pid (comm) state ...`; comm may contain spaces or parens.
        return match stat.rfind(')').and_then(|i| stat[i + 1..].split_whitespace().next()) {
            Some(state) => state != "Z" && state != "X",
            None => true,
        };
    }
    !matches!(kill(Pid::from_raw(pid), None), Err(Errno::ESRCH))
        && fs::metadata("/proc/self").is_err()
}

/// Poll until `pid` is no longer running or `timeout` elapses. Returns
/// whether the process is gone.
pub async fn wait_until_gone(pid: i32, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if !process_is_running(pid) {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Live, non-zombie processes whose process group is `pgid`.
pub fn group_members(pgid: i32) -> Vec<i32> {
    let Ok(entries) = fs::read_dir("/proc") else {
        return Vec::new();
    };
    let mut members: Vec<i32> = entries
        .filter_map(|entry| entry.ok()?.file_name().to_str()?.parse::<i32>().ok())
        .filter(|pid| {
            let Ok(stat) = fs::read_to_string(format!("/proc/{pid}/stat")) else {
                return false;
            };
            // After `(comm)`: state, ppid, pgrp.
            let mut fields = match stat.rfind(')') {
                Some(i) => stat[i + 1..].split_whitespace(),
                None => return false,
            };
            let state = fields.next();
            let pgrp = fields.nth(1).and_then(|f| f.parse::<i32>().ok());
            !matches!(state, Some("Z") | Some("X")) && pgrp == Some(pgid)
        })
        .collect();
    members.sort_unstable();
    members
}

/// Poll until group `pgid` has no live members or `timeout` elapses, and
/// return whatever members are left.
pub async fn wait_for_empty_group(pgid: i32, timeout: Duration) -> Vec<i32> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let members = group_members(pgid);
        if members.is_empty() || tokio::time::Instant::now() >= deadline {
            return members;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
