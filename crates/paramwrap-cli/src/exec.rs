//! Process replacement after injection.

use std::process::Command;

/// Replace the current process with `command`, inheriting the (now
/// populated) environment.
///
/// Only returns on failure; on success the process image is gone. The binary
/// is resolved through `PATH` the way a shell would.
pub fn exec_command(command: &[String]) -> anyhow::Error {
    use std::os::unix::process::CommandExt;

    let err = Command::new(&command[0]).args(&command[1..]).exec();

    anyhow::Error::new(err).context(format!("command is not executable: {}", command[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exec_failure_reports_command() {
        let err = exec_command(&["paramwrap-no-such-binary".to_string()]);
        assert!(err.to_string().contains("paramwrap-no-such-binary"));
    }
}
