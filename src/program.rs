use std::{
    os::unix::process::{CommandExt as _, ExitStatusExt as _},
    path::Path,
    process::{Command, ExitStatus},
};

use tracing::debug;

use crate::{
    args,
    builtin::ExitCode,
    path,
    redirect::{OpenError, Redirect},
};

/// Status recorded when the program could not be started at all.
pub const LAUNCH_FAILURE: ExitCode = 1;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("{0}")]
    Path(#[from] path::Error),
    #[error("open: {0}")]
    Open(#[from] OpenError),
    #[error("exec: {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("wait: {0}")]
    Wait(#[source] std::io::Error),
}

/// Runs `com.args[0]` as an external program and blocks until it exits.
///
/// The program is looked up at its resolved path (`./name` for relative
/// names, anchored at `cwd`) and sees its own basename as `argv[0]`. The
/// redirection targets are opened before the child starts, a failure there
/// means nothing is run.
pub fn launch(cwd: &Path, com: &args::Command<'_>) -> Result<ExitStatus, LaunchError> {
    let full = path::full_path(com.name())?;
    let program = cwd.join(full.as_ref());
    let name = path::program_name(&full);

    let redirect = Redirect::new_program(cwd, &com.redirect)?;

    let mut child = Command::new(&program)
        .arg0(name)
        .args(&com.args[1..])
        .current_dir(cwd)
        .stdin(redirect.stdin)
        .stdout(redirect.stdout)
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            program: full.to_string(),
            source,
        })?;

    debug!(pid = child.id(), program = %program.display(), "spawned child");

    let status = child.wait().map_err(LaunchError::Wait)?;
    debug!(%status, "child terminated");

    Ok(status)
}

/// Shell style exit code, `128 + signal` for a killed child.
pub fn exit_code(status: ExitStatus) -> ExitCode {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => LAUNCH_FAILURE,
    }
}
