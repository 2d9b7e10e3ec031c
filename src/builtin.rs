pub type ExitCode = i32;

use crate::{args, path, program, repl::State};

#[derive(thiserror::Error, Debug)]
pub enum Errors {
    #[error("shutdown code called {0}")]
    Shutdown(ExitCode),
    #[error("Io Error <{0}>")]
    IoError(#[from] std::io::Error),
    #[error("{0}")]
    ParseError(#[from] args::Error),
    #[error("{0}")]
    LaunchError(#[from] program::LaunchError),
}

/// Failure of the file system call behind a builtin.
#[derive(thiserror::Error, Debug)]
enum FsError {
    #[error(transparent)]
    Path(#[from] path::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtins {
    Cd,
    Ln,
    Rm,
    Exit,
}

impl Builtins {
    pub fn supported() -> [(Builtins, &'static str); 4] {
        [
            (Builtins::Cd, "cd"),
            (Builtins::Ln, "ln"),
            (Builtins::Rm, "rm"),
            (Builtins::Exit, "exit"),
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtins::Cd => "cd",
            Builtins::Ln => "ln",
            Builtins::Rm => "rm",
            Builtins::Exit => "exit",
        }
    }
}

impl TryFrom<&str> for Builtins {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::supported()
            .into_iter()
            .find(|(_, name)| *name == value)
            .map(|(com, _)| com)
            .ok_or(())
    }
}

/// Runs a builtin. Usage and file system errors are reported on the given
/// streams and the builtin returns normally, only `exit` ends the session.
pub fn run(
    state: &mut State,
    com: Builtins,
    rest: &[&str],
    stdout: &mut dyn std::io::Write,
    stderr: &mut dyn std::io::Write,
) -> Result<(), Errors> {
    tracing::debug!(builtin = com.name(), ?rest, "running builtin");

    match com {
        Builtins::Cd => cd::run(state, rest, stderr),
        Builtins::Ln => ln::run(state, rest, stderr),
        Builtins::Rm => rm::run(state, rest, stdout, stderr),
        Builtins::Exit => exit::run(),
    }
}

fn syntax_error(com: Builtins, stderr: &mut dyn std::io::Write) -> Result<(), Errors> {
    writeln!(stderr, "{}: syntax error", com.name())?;
    Ok(())
}

mod cd {
    use std::path::{Path, PathBuf};

    use crate::{path, repl::State};

    use super::{Builtins, Errors, FsError};

    pub fn run(
        state: &mut State,
        rest: &[&str],
        stderr: &mut dyn std::io::Write,
    ) -> Result<(), Errors> {
        let Some(target) = rest.first() else {
            return super::syntax_error(Builtins::Cd, stderr);
        };

        match change_directory(&state.path, target) {
            Ok(new) => state.path = new,
            Err(e) => writeln!(stderr, "cd: {e}")?,
        }

        Ok(())
    }

    fn change_directory(cwd: &Path, target: &str) -> Result<PathBuf, FsError> {
        let new = std::fs::canonicalize(path::resolve(cwd, target)?)?;
        if !new.is_dir() {
            return Err(std::io::Error::from(std::io::ErrorKind::NotADirectory).into());
        }
        Ok(new)
    }
}

mod ln {
    use std::path::Path;

    use crate::{path, repl::State};

    use super::{Builtins, Errors, FsError};

    pub fn run(
        state: &State,
        rest: &[&str],
        stderr: &mut dyn std::io::Write,
    ) -> Result<(), Errors> {
        let [existing, new, ..] = rest else {
            return super::syntax_error(Builtins::Ln, stderr);
        };

        if let Err(e) = link(&state.path, existing, new) {
            writeln!(stderr, "ln: {e}")?;
        }

        Ok(())
    }

    fn link(cwd: &Path, existing: &str, new: &str) -> Result<(), FsError> {
        let existing = path::resolve(cwd, existing)?;
        let new = path::resolve(cwd, new)?;
        std::fs::hard_link(existing, new)?;
        Ok(())
    }
}

mod rm {
    use crate::{path, repl::State};

    use super::{Builtins, Errors};

    pub fn run(
        state: &State,
        rest: &[&str],
        stdout: &mut dyn std::io::Write,
        stderr: &mut dyn std::io::Write,
    ) -> Result<(), Errors> {
        let Some(target) = rest.first() else {
            return super::syntax_error(Builtins::Rm, stderr);
        };

        let full = match path::full_path(target) {
            Ok(full) => full,
            Err(e) => {
                writeln!(stderr, "rm: {e}")?;
                return Ok(());
            }
        };

        if let Err(e) = std::fs::remove_file(state.path.join(full.as_ref())) {
            writeln!(stderr, "rm: {e}")?;
            writeln!(stdout, "{full}")?;
        }

        Ok(())
    }
}

mod exit {
    use super::Errors;

    /// Extra arguments are ignored, the status is always 0.
    pub fn run() -> Result<(), Errors> {
        Err(Errors::Shutdown(0))
    }
}
