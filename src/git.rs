use std::process::Command;

use tracing::warn;

/// Reads the full message of the last commit of the repository in the working directory.
///
/// Any failure (git missing, shallow clone without history, non UTF-8 output) is
/// logged and reported as `None` so the run can carry on with a placeholder.
pub fn last_commit_message() -> Option<String> {
    command_output("git", &["log", "-1", "--pretty=%B"])
}

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = match Command::new(program).args(args).output() {
        Ok(output) => output,
        Err(e) => {
            warn!("could not get commit message: {e}");
            return None;
        }
    };

    if !output.status.success() {
        warn!(
            "could not get commit message: `{program}` exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }

    match String::from_utf8(output.stdout) {
        Ok(message) => Some(message.trim().to_string()).filter(|m| !m.is_empty()),
        Err(e) => {
            warn!("could not get commit message: invalid utf8 output: {e}");
            None
        }
    }
}
