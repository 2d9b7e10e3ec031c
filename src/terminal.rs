use std::{io::Write, path::Path};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style,
    terminal::{self, disable_raw_mode, enable_raw_mode},
    ExecutableCommand, QueueableCommand,
};

use crate::completion::{self, Completion};

pub const PROMPT: &str = "$ ";
pub const BELL: char = '\u{07}';
pub const NEWLINE_RAW_TERM: &str = "\r\n";

#[derive(Debug, thiserror::Error)]
pub enum ReadLineError {
    #[error("end of input")]
    EndOfInput,
    #[error("Io Error <{0}>")]
    Io(#[from] std::io::Error),
}

/// Line editor state for one call of [`read_line`].
struct Editor<'a, W> {
    stdout: &'a mut W,
    prompt: &'a str,
    history: &'a [String],
    history_idx: usize,
    completion: Completion,
    tab_state: TabCompletionState,
}

/// Reads one line in raw mode. The prompt must already be printed.
///
/// The returned line carries no newline.
pub fn read_line<W: Write>(
    line: &mut String,
    stdout: &mut W,
    prompt: &str,
    history: &[String],
    cwd: &Path,
) -> Result<(), ReadLineError> {
    let mut editor = Editor {
        stdout,
        prompt,
        history,
        history_idx: history.len(),
        completion: completion::generate_completion(cwd),
        tab_state: TabCompletionState::None,
    };

    enable_raw_mode()?;
    let res = editor.read_line_loop(line);
    disable_raw_mode()?;
    res
}

impl<W: Write> Editor<'_, W> {
    fn prompt_width(&self) -> u16 {
        u16::try_from(self.prompt.chars().count()).unwrap_or(u16::MAX)
    }

    fn redraw(&mut self, line: &str) -> std::io::Result<()> {
        let width = self.prompt_width();
        self.stdout
            .queue(cursor::MoveToColumn(width))?
            .queue(terminal::Clear(terminal::ClearType::UntilNewLine))?
            .queue(style::Print(line))?;
        self.stdout.flush()
    }

    fn read_line_loop(&mut self, line: &mut String) -> Result<(), ReadLineError> {
        loop {
            match event::read()? {
                Event::Paste(s) => self.paste(line, &s)?,
                Event::Key(KeyEvent {
                    kind: KeyEventKind::Release,
                    ..
                }) => {}
                Event::Key(KeyEvent {
                    code,
                    modifiers: KeyModifiers::CONTROL,
                    ..
                }) => {
                    if !self.handle_control(line, code)? {
                        break;
                    }
                }
                Event::Key(KeyEvent {
                    code: KeyCode::Tab, ..
                }) => {
                    self.tab_state = self.handle_tab(line)?;
                }
                Event::Key(KeyEvent { code, .. }) => {
                    if !self.handle_key_event(line, code)? {
                        break;
                    }
                }
                _ => (),
            }
        }

        Ok(())
    }

    /// Line breaks in pasted text become spaces, a paste never ends the line.
    fn paste(&mut self, line: &mut String, text: &str) -> std::io::Result<()> {
        let text = text.replace(['\r', '\n'], " ");
        self.stdout.execute(style::Print(&text))?;
        line.push_str(&text);
        Ok(())
    }

    /// `Ok(false)` ends the line.
    fn handle_control(
        &mut self,
        line: &mut String,
        code: KeyCode,
    ) -> Result<bool, ReadLineError> {
        match code {
            KeyCode::Char('l' | 'L') => {
                self.stdout
                    .queue(terminal::Clear(terminal::ClearType::All))?
                    .queue(cursor::MoveTo(0, 0))?
                    .queue(style::Print(self.prompt))?
                    .queue(style::Print(&line))?;

                self.stdout.flush()?;
            }
            KeyCode::Char('d' | 'D') => {
                self.stdout.execute(style::Print(NEWLINE_RAW_TERM))?;
                return Err(ReadLineError::EndOfInput);
            }
            KeyCode::Char('c' | 'C') => {
                // drop the line, fresh prompt
                line.clear();

                self.stdout
                    .queue(style::Print(NEWLINE_RAW_TERM))?
                    .queue(style::Print(self.prompt))?;

                self.stdout.flush()?;
            }
            KeyCode::Char('j' | 'J') => {
                self.stdout.execute(style::Print(NEWLINE_RAW_TERM))?;
                return Ok(false);
            }
            _ => {}
        }
        Ok(true)
    }

    /// `Ok(false)` ends the line.
    fn handle_key_event(
        &mut self,
        line: &mut String,
        code: KeyCode,
    ) -> Result<bool, ReadLineError> {
        match code {
            KeyCode::Up => {
                if self.history.is_empty() {
                    return Ok(true);
                }
                self.history_idx = self.history_idx.saturating_sub(1);

                line.clear();
                line.push_str(&self.history[self.history_idx]);
                self.redraw(line)?;
            }
            KeyCode::Down => {
                if self.history.is_empty() || self.history_idx == self.history.len() {
                    return Ok(true);
                }
                self.history_idx += 1;

                line.clear();
                if let Some(entry) = self.history.get(self.history_idx) {
                    line.push_str(entry);
                }
                self.redraw(line)?;
            }
            KeyCode::Enter | KeyCode::Char('\r' | '\n') => {
                self.stdout.execute(style::Print(NEWLINE_RAW_TERM))?;
                return Ok(false);
            }
            KeyCode::Backspace => {
                if line.pop().is_none() {
                    return Ok(true);
                }
                self.redraw(line)?;
            }
            KeyCode::Char(c) => {
                self.stdout.execute(style::Print(c))?;

                line.push(c);
            }
            _ => {}
        }
        Ok(true)
    }

    fn handle_tab(&mut self, line: &mut String) -> std::io::Result<TabCompletionState> {
        let matches = self.completion.predictive_search(line);

        match matches.len() {
            0 => {
                self.stdout.execute(style::Print(BELL))?;
                return Ok(TabCompletionState::None);
            }
            1 => {
                replace_word(line, &matches[0]);
                line.push(' ');
                self.redraw(line)?;
                return Ok(TabCompletionState::None);
            }
            _ => {}
        }

        if let Some(prefix) = self.completion.longest_prefix(line) {
            if prefix != completion::current_word(line).1 {
                replace_word(line, &prefix);
                self.redraw(line)?;
                return Ok(TabCompletionState::Active);
            }
        }

        if let TabCompletionState::None = self.tab_state {
            // ring the bell
            self.stdout.execute(style::Print(BELL))?;
            return Ok(TabCompletionState::Active);
        }

        self.stdout.queue(style::Print(NEWLINE_RAW_TERM))?;

        for option in matches {
            self.stdout
                .queue(style::Print(&option))?
                .queue(style::Print("  "))?;
        }

        self.stdout
            .queue(style::Print(NEWLINE_RAW_TERM))?
            .queue(style::Print(self.prompt))?
            .queue(style::Print(&line))?;

        self.stdout.flush()?;

        Ok(TabCompletionState::None)
    }
}

fn replace_word(line: &mut String, word: &str) {
    let start = completion::current_word(line).0.len();
    line.truncate(start);
    line.push_str(word);
}

#[derive(Clone, Copy)]
enum TabCompletionState {
    /// No completion required
    None,
    /// In the sate of completion
    Active,
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;

    fn editor<'a>(
        out: &'a mut Vec<u8>,
        history: &'a [String],
        completion: Completion,
    ) -> Editor<'a, Vec<u8>> {
        Editor {
            stdout: out,
            prompt: PROMPT,
            history,
            history_idx: history.len(),
            completion,
            tab_state: TabCompletionState::None,
        }
    }

    fn empty_completion() -> (tempfile::TempDir, Completion) {
        let dir = tempfile::tempdir().unwrap();
        let completion = completion::generate_completion(dir.path());
        (dir, completion)
    }

    #[test]
    fn replaces_last_word() {
        let mut line = String::from("cat rep");
        replace_word(&mut line, "report.txt");
        assert_eq!(line, "cat report.txt");

        let mut line = String::from("ex");
        replace_word(&mut line, "exit");
        assert_eq!(line, "exit");

        let mut line = String::from("cat ");
        replace_word(&mut line, "a");
        assert_eq!(line, "cat a");
    }

    #[test]
    fn history_stays_in_bounds() {
        let (_dir, completion) = empty_completion();
        let history = vec!["ls".to_string(), "cat a".to_string()];
        let mut out = vec![];
        let mut ed = editor(&mut out, &history, completion);
        let mut line = String::new();

        for expected in ["cat a", "ls", "ls"] {
            assert!(ed.handle_key_event(&mut line, KeyCode::Up).unwrap());
            assert_eq!(line, expected);
        }
        for expected in ["cat a", "", ""] {
            assert!(ed.handle_key_event(&mut line, KeyCode::Down).unwrap());
            assert_eq!(line, expected);
        }
    }

    #[test]
    fn empty_history_leaves_line() {
        let (_dir, completion) = empty_completion();
        let mut out = vec![];
        let mut ed = editor(&mut out, &[], completion);
        let mut line = String::from("pwd");

        assert!(ed.handle_key_event(&mut line, KeyCode::Up).unwrap());
        assert!(ed.handle_key_event(&mut line, KeyCode::Down).unwrap());
        assert_eq!(line, "pwd");
    }

    #[test]
    fn typing_and_backspace() {
        let (_dir, completion) = empty_completion();
        let mut out = vec![];
        let mut ed = editor(&mut out, &[], completion);
        let mut line = String::new();

        // nothing to delete, nothing drawn
        assert!(ed.handle_key_event(&mut line, KeyCode::Backspace).unwrap());
        assert_eq!(line, "");
        assert!(ed.stdout.is_empty());

        for c in "lsx".chars() {
            assert!(ed.handle_key_event(&mut line, KeyCode::Char(c)).unwrap());
        }
        assert!(ed.handle_key_event(&mut line, KeyCode::Backspace).unwrap());
        assert_eq!(line, "ls");

        assert!(!ed.handle_key_event(&mut line, KeyCode::Enter).unwrap());
        assert!(ed.stdout.ends_with(NEWLINE_RAW_TERM.as_bytes()));
    }

    #[test]
    fn control_keys() {
        let (_dir, completion) = empty_completion();
        let mut out = vec![];
        let mut ed = editor(&mut out, &[], completion);
        let mut line = String::from("rm -rf");

        assert!(ed.handle_control(&mut line, KeyCode::Char('c')).unwrap());
        assert_eq!(line, "");

        line.push_str("ls");
        assert!(!ed.handle_control(&mut line, KeyCode::Char('j')).unwrap());
        assert_eq!(line, "ls");

        assert!(matches!(
            ed.handle_control(&mut line, KeyCode::Char('d')),
            Err(ReadLineError::EndOfInput)
        ));
    }

    #[test]
    fn paste_joins_lines() {
        let (_dir, completion) = empty_completion();
        let mut out = vec![];
        let mut ed = editor(&mut out, &[], completion);
        let mut line = String::from("cat ");

        ed.paste(&mut line, "a.txt\r\nb.txt\n").unwrap();
        assert_eq!(line, "cat a.txt  b.txt ");
        assert_eq!(
            crate::args::tokenize(&line),
            Ok(vec!["cat", "a.txt", "b.txt"])
        );
    }

    #[test]
    fn tab_completion_states() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["report.txt", "readme.md", "cdrom"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let completion = completion::generate_completion(dir.path());
        let mut out = vec![];
        let mut ed = editor(&mut out, &[], completion);

        // unique match is completed with a trailing space
        let mut line = String::from("cat rep");
        ed.tab_state = ed.handle_tab(&mut line).unwrap();
        assert_eq!(line, "cat report.txt ");
        assert!(matches!(ed.tab_state, TabCompletionState::None));

        // no match rings the bell
        let mut line = String::from("cat x");
        ed.stdout.clear();
        ed.tab_state = ed.handle_tab(&mut line).unwrap();
        assert_eq!(line, "cat x");
        assert_eq!(ed.stdout.as_slice(), BELL.to_string().as_bytes());

        // shared prefix is filled in first
        let mut line = String::from("c");
        ed.tab_state = ed.handle_tab(&mut line).unwrap();
        assert_eq!(line, "cd");
        assert!(matches!(ed.tab_state, TabCompletionState::Active));

        // ambiguous: bell on the first press, listing on the second
        let mut line = String::from("cat re");
        ed.tab_state = TabCompletionState::None;
        ed.stdout.clear();
        ed.tab_state = ed.handle_tab(&mut line).unwrap();
        assert_eq!(ed.stdout.as_slice(), BELL.to_string().as_bytes());
        assert!(matches!(ed.tab_state, TabCompletionState::Active));

        ed.stdout.clear();
        ed.tab_state = ed.handle_tab(&mut line).unwrap();
        let printed = String::from_utf8_lossy(ed.stdout.as_slice()).into_owned();
        assert!(printed.contains("readme.md  report.txt  "), "{printed:?}");
        assert!(printed.ends_with("$ cat re"), "{printed:?}");
        assert!(matches!(ed.tab_state, TabCompletionState::None));
        assert_eq!(line, "cat re");
    }
}
