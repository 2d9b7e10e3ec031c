use std::{
    io::{BufRead, IsTerminal as _, Write},
    path::PathBuf,
};

use anyhow::Context;
use tracing::{debug, trace};

use crate::{
    args::{self, BUF_LEN},
    builtin::{self, Builtins, Errors, ExitCode},
    config::Config,
    program,
    terminal::{self, ReadLineError},
};

/// Status the interpreter exits with once its input is exhausted.
pub const END_OF_INPUT: ExitCode = 1;

/// Session state shared by all commands of one interpreter.
pub struct State {
    /// Status of the last program run, for diagnostics only.
    pub last_exit_code: ExitCode,
    /// Working directory every relative path is resolved against.
    pub path: PathBuf,
}

impl State {
    pub fn new(path: PathBuf) -> Self {
        Self {
            last_exit_code: 0,
            path,
        }
    }

    /// Parses and executes one input line. Blank lines do nothing.
    pub fn run_line(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<(), Errors> {
        let Some(com) = args::process_args(line)? else {
            return Ok(());
        };
        debug!(args = ?com.args, redirect = ?com.redirect, "parsed command");

        self.run_command(&com, stdout, stderr)
    }

    fn run_command(
        &mut self,
        com: &args::Command<'_>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<(), Errors> {
        match Builtins::try_from(com.name()) {
            Ok(builtin) => {
                if !com.redirect.is_empty() {
                    debug!(builtin = builtin.name(), "builtins do not redirect, ignoring");
                }
                builtin::run(self, builtin, &com.args[1..], stdout, stderr)
            }
            Err(()) => {
                // keep our own buffered output ahead of the child's
                stdout.flush()?;
                self.run_program(com)
            }
        }
    }

    fn run_program(&mut self, com: &args::Command<'_>) -> Result<(), Errors> {
        match program::launch(&self.path, com) {
            Ok(status) => {
                self.last_exit_code = program::exit_code(status);
                Ok(())
            }
            Err(err) => {
                self.last_exit_code = program::LAUNCH_FAILURE;
                Err(err.into())
            }
        }
    }
}

/// Where input lines come from.
pub enum LineSource<R> {
    /// Raw mode line editor on a terminal.
    Terminal { prompt: String, history: Vec<String> },
    /// Plain reads, one line at a time.
    Stream(R),
}

impl<R: BufRead> LineSource<R> {
    /// Appends the next line to `line`. `Ok(false)` once the input is
    /// exhausted.
    fn read_line(&mut self, line: &mut String, state: &State) -> Result<bool, ReadLineError> {
        match self {
            Self::Terminal { prompt, history } => {
                let mut stdout = std::io::stdout();
                match terminal::read_line(line, &mut stdout, prompt, history, &state.path) {
                    Ok(()) => {}
                    Err(ReadLineError::EndOfInput) => return Ok(false),
                    Err(err) => return Err(err),
                }
                let entry = line.trim();
                if !entry.is_empty() {
                    history.push(entry.to_string());
                }
                Ok(true)
            }
            Self::Stream(reader) => {
                let mut buf = Vec::with_capacity(BUF_LEN);
                if reader.read_until(b'\n', &mut buf)? == 0 {
                    return Ok(false);
                }
                line.push_str(&String::from_utf8_lossy(&buf));
                Ok(true)
            }
        }
    }
}

/// The read-eval loop. Returns the status the interpreter should exit with.
///
/// Syntax errors go to `stdout`, everything else to `stderr`. Nothing but
/// `exit` or the end of the input stops the loop.
pub fn run<R: BufRead>(
    state: &mut State,
    source: &mut LineSource<R>,
    prompt: Option<&str>,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> anyhow::Result<ExitCode> {
    let mut input = String::with_capacity(BUF_LEN);

    loop {
        input.clear();

        if let Some(prompt) = prompt {
            write!(stdout, "{prompt}")?;
            stdout.flush()?;
        }

        match source.read_line(&mut input, state) {
            Ok(true) => {}
            Ok(false) => {
                debug!("end of input");
                return Ok(END_OF_INPUT);
            }
            Err(err) => {
                writeln!(stderr, "read: {err}")?;
                return Ok(END_OF_INPUT);
            }
        }
        trace!(line = %input.trim_end(), "read line");

        match state.run_line(&input, stdout, stderr) {
            Ok(()) => {}
            Err(Errors::Shutdown(code)) => return Ok(code),
            Err(e @ Errors::ParseError(_)) => {
                writeln!(stdout, "{e}")?;
            }
            Err(e @ (Errors::LaunchError(_) | Errors::IoError(_))) => {
                writeln!(stderr, "{e}")?;
            }
        }
        debug!(status = state.last_exit_code, "command done");

        stdout.flush()?;
        stderr.flush()?;
    }
}

pub fn repl(config: &Config) -> anyhow::Result<ExitCode> {
    let path = match &config.directory {
        Some(dir) => std::fs::canonicalize(dir)
            .with_context(|| format!("Cannot enter {}", dir.display()))?,
        None => std::env::current_dir().context("Current directory is invalid?")?,
    };
    let mut state = State::new(path);

    let prompt = config.prompt();
    let stdin = std::io::stdin();

    let mut source = match prompt {
        Some(prompt) if !config.plain && stdin.is_terminal() => LineSource::Terminal {
            prompt: prompt.to_string(),
            history: Vec::with_capacity(100),
        },
        _ => LineSource::Stream(stdin.lock()),
    };

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    run(&mut state, &mut source, prompt, &mut stdout, &mut stderr)
}
