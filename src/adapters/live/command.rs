//! Live command runner using `std::process::Command`.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::ports::command::{CommandOutput, CommandRunner};

/// Runs programs directly, without a shell in between.
pub struct LiveCommandRunner;

impl CommandRunner for LiveCommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<CommandOutput, Box<dyn std::error::Error + Send + Sync>> {
        debug!(program, ?args, cwd = ?cwd, "running");
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        let output = command
            .output()
            .map_err(|e| format!("Failed to spawn {program}: {e}"))?;
        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        let runner = LiveCommandRunner;
        let result = runner.run("echo", &["hello"], None).unwrap();

        assert!(result.success());
        assert_eq!(result.stdout.trim(), "hello");
        assert!(result.stderr.is_empty());
    }

    #[test]
    fn captures_exit_code() {
        let runner = LiveCommandRunner;
        let result = runner.run("sh", &["-c", "exit 42"], None).unwrap();

        assert_eq!(result.exit_code, 42);
        assert!(!result.success());
    }

    #[test]
    fn runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let runner = LiveCommandRunner;
        let result = runner.run("pwd", &[], Some(dir.path())).unwrap();

        let reported = std::fs::canonicalize(result.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn missing_program_is_an_error() {
        let runner = LiveCommandRunner;
        assert!(runner.run("firehose-no-such-program", &[], None).is_err());
    }
}
