// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for scheduler CLI calls.
pub const SCHEDULER_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for secrets decryption.
pub const SECRETS_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for git clone/fetch/checkout.
pub const GIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default timeout for quick git queries (rev-parse, rev-list).
pub const GIT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for container image build and push.
pub const IMAGE_TIMEOUT: Duration = Duration::from_secs(1800);

/// Default timeout for user commands (tests, migrations).
/// Set to 10 minutes as a safety net for long-running user scripts.
pub const SHELL_COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

/// Default timeout for database dumps.
pub const DUMP_TIMEOUT: Duration = Duration::from_secs(1800);

/// Default timeout for routing layer reloads.
pub const RELOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting
/// timeout expiration into a descriptive error message. The child process
/// is killed automatically if the timeout elapses.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{} failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        )),
    }
}

/// Stdout followed by stderr, trimmed.
pub fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    match (stdout.trim(), stderr.trim()) {
        ("", err) => err.to_string(),
        (out, "") => out.to_string(),
        (out, err) => format!("{}\n{}", out, err),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
