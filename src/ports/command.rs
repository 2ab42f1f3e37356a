//! Command runner port for invoking external programs.

use std::path::Path;

/// The captured result of running a program.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// The exit code of the process.
    pub exit_code: i32,
    /// The captured standard output.
    pub stdout: String,
    /// The captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns `true` when the process exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external programs (in practice, `git`).
///
/// Arguments are passed as a vector, never through a shell.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args`, in `cwd` when given, and captures output.
    ///
    /// A non-zero exit is *not* an error at this level; callers inspect
    /// [`CommandOutput::exit_code`].
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<CommandOutput, Box<dyn std::error::Error + Send + Sync>>;
}
