use std::path::PathBuf;

use clap::Parser;

use crate::terminal::PROMPT;

/// A minimal interactive command interpreter.
///
/// Reads one command per line, supports `<`, `>` and `>>` redirection and the
/// builtins `cd`, `ln`, `rm` and `exit`. Every other command is run as a
/// program relative to the working directory.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Config {
    /// Prompt printed before each line is read.
    #[arg(long, default_value = PROMPT)]
    pub prompt: String,

    /// Never print a prompt.
    #[arg(long)]
    pub no_prompt: bool,

    /// Read plain lines even when stdin is a terminal.
    #[arg(long)]
    pub plain: bool,

    /// Initial working directory of the session.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

impl Config {
    pub fn prompt(&self) -> Option<&str> {
        (!self.no_prompt).then_some(self.prompt.as_str())
    }
}
