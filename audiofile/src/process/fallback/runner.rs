use std::io;
use std::process::{Child, Command, Stdio};

use log::debug;

/// Seam between the fallback pipeline and the operating system.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner: Send + Sync {
    /// Whether `program` can be started at all.
    fn program_exists(&self, program: &str) -> bool;

    /// Runs `program` to completion and returns its standard output.
    ///
    /// A non-zero exit status is an error.
    fn output(&self, program: &str, args: &[String]) -> io::Result<String>;

    /// Starts `program` with standard output and standard error piped.
    fn spawn(&self, program: &str, args: &[String]) -> io::Result<Child>;
}

/// [`ProcessRunner`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn program_exists(&self, program: &str) -> bool {
        let found = Command::new(program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success());

        debug!("{program} available: {found}");
        found
    }

    fn output(&self, program: &str, args: &[String]) -> io::Result<String> {
        debug!("Running {program} {}", args.join(" "));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(io::Error::other(format!(
                "{program} exited with {}",
                output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn spawn(&self, program: &str, args: &[String]) -> io::Result<Child> {
        debug!("Spawning {program} {}", args.join(" "));

        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_reported() {
        assert!(!SystemProcessRunner.program_exists("definitely-not-a-real-program-4711"));
    }

    #[test]
    fn output_captures_stdout() -> io::Result<()> {
        let out = SystemProcessRunner.output("sh", &["-c".into(), "echo 48000".into()])?;
        assert_eq!(out.trim(), "48000");

        assert!(SystemProcessRunner.output("sh", &["-c".into(), "exit 3".into()]).is_err());
        Ok(())
    }
}
