use std::{
    fs::File,
    path::{Path, PathBuf},
    process::Stdio,
};

use crate::args::Redirection;

/// Standard streams handed to a child. Without a redirection the child
/// inherits the interpreter's own descriptor.
pub struct Redirect {
    pub stdin: Stdio,
    pub stdout: Stdio,
}

impl Redirect {
    /// Opens the targets relative to `cwd`. The interpreter's own stdin and
    /// stdout are never touched.
    pub fn new_program(cwd: &Path, redirect: &Redirection<'_>) -> Result<Self, OpenError> {
        let stdin = match redirect.input {
            Some(path) => {
                let path = cwd.join(path);
                let file = open_input(&path).map_err(|source| OpenError::Input { path, source })?;
                Stdio::from(file)
            }
            None => Stdio::inherit(),
        };

        let stdout = match redirect.output {
            Some(target) => {
                let path = cwd.join(target.file_path);
                let file = open_output(&path, target.append)
                    .map_err(|source| OpenError::Output { path, source })?;
                Stdio::from(file)
            }
            None => Stdio::inherit(),
        };

        Ok(Self { stdin, stdout })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("{}: {source}", .path.display())]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A missing input file is an error, it is not created.
fn open_input(path: &Path) -> std::io::Result<File> {
    File::options().read(true).open(path)
}

fn open_output(path: &Path, append: bool) -> std::io::Result<File> {
    let mut opts = File::options();
    opts.create(true).write(true);

    if append {
        opts.truncate(false).append(true);
    } else {
        opts.truncate(true);
    }

    opts.open(path)
}
