/// Size of the input buffer, the terminator included.
pub const BUF_LEN: usize = 1024;
pub const MAX_TOKENS: usize = 16;

const INPUT: &str = "<";
const OUTPUT: &str = ">";
const APPEND: &str = ">>";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("syntax error: line too long (max {} bytes)", BUF_LEN - 1)]
    LineTooLong(usize),
    #[error("syntax error: too many tokens (max {})", MAX_TOKENS)]
    TooManyTokens,
    #[error("syntax error: multiple input files")]
    DuplicateInputRedirect,
    #[error("syntax error: no input file")]
    MissingInputFile,
    #[error("syntax error: multiple output files")]
    DuplicateOutputRedirect,
    #[error("syntax error: no output file")]
    MissingOutputFile,
    #[error("syntax error: no command")]
    MissingCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputTarget<'a> {
    pub file_path: &'a str,
    pub append: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Redirection<'a> {
    pub input: Option<&'a str>,
    pub output: Option<OutputTarget<'a>>,
}

impl Redirection<'_> {
    pub fn is_empty(&self) -> bool {
        self.input.is_none() && self.output.is_none()
    }
}

/// One parsed line: the argument vector with the redirections pulled out.
///
/// `args` is never empty, `args[0]` is the command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    pub args: Vec<&'a str>,
    pub redirect: Redirection<'a>,
}

impl<'a> Command<'a> {
    pub fn name(&self) -> &'a str {
        self.args[0]
    }
}

/// Splits a raw line on runs of spaces and tabs.
///
/// A single trailing newline is dropped. A blank line gives no tokens.
pub fn tokenize(line: &str) -> Result<Vec<&str>, Error> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    if line.len() >= BUF_LEN {
        return Err(Error::LineTooLong(line.len()));
    }

    let mut tokens = Vec::with_capacity(MAX_TOKENS);
    for token in line.split([' ', '\t']).filter(|t| !t.is_empty()) {
        if tokens.len() == MAX_TOKENS {
            return Err(Error::TooManyTokens);
        }
        tokens.push(token);
    }

    Ok(tokens)
}

/// Single left to right pass over the tokens, moving `<`, `>` and `>>`
/// together with their file name into the [`Redirection`].
pub fn parse<'a>(tokens: &[&'a str]) -> Result<Command<'a>, Error> {
    let mut args = Vec::with_capacity(tokens.len());
    let mut redirect = Redirection::default();

    let mut it = tokens.iter().copied();
    while let Some(token) = it.next() {
        match token {
            INPUT => {
                if redirect.input.is_some() {
                    return Err(Error::DuplicateInputRedirect);
                }
                redirect.input = Some(it.next().ok_or(Error::MissingInputFile)?);
            }
            OUTPUT | APPEND => {
                if redirect.output.is_some() {
                    return Err(Error::DuplicateOutputRedirect);
                }
                let file_path = it.next().ok_or(Error::MissingOutputFile)?;
                redirect.output = Some(OutputTarget {
                    file_path,
                    append: token == APPEND,
                });
            }
            _ => args.push(token),
        }
    }

    if args.is_empty() {
        return Err(Error::MissingCommand);
    }

    Ok(Command { args, redirect })
}

/// Tokenizes and parses one line. `Ok(None)` means the line was blank.
pub fn process_args(line: &str) -> Result<Option<Command<'_>>, Error> {
    let tokens = tokenize(line)?;
    if tokens.is_empty() {
        return Ok(None);
    }
    parse(&tokens).map(Some)
}
