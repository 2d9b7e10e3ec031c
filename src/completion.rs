use std::path::Path;

use itertools::Itertools as _;
use trie_rs::{Trie, TrieBuilder};

use crate::builtin::Builtins;

/// Completion candidates for one prompt.
///
/// The first word of a line completes against the builtins and the entries
/// of the working directory (programs are looked up there), every later word
/// only against the entries.
pub struct Completion {
    commands: Trie<u8>,
    entries: Trie<u8>,
}

/// Splits `line` into everything before the word being typed and the word.
pub fn current_word(line: &str) -> (&str, &str) {
    let start = line.rfind([' ', '\t']).map_or(0, |i| i + 1);
    line.split_at(start)
}

fn entry_names(cwd: &Path) -> std::io::Result<Vec<String>> {
    let names = std::fs::read_dir(cwd)?
        .filter_map(Result::ok)
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    Ok(names)
}

/// Builds the candidates for `cwd`. An unreadable or vanished directory only
/// costs its entries, the builtins still complete.
pub fn generate_completion(cwd: &Path) -> Completion {
    let names = entry_names(cwd).unwrap_or_else(|err| {
        tracing::warn!(cwd = %cwd.display(), %err, "cannot list directory for completion");
        Vec::new()
    });

    let mut commands = TrieBuilder::new();
    let mut entries = TrieBuilder::new();

    for (_, name) in Builtins::supported() {
        commands.push(name);
    }
    for name in &names {
        commands.push(name);
        entries.push(name);
    }

    Completion {
        commands: commands.build(),
        entries: entries.build(),
    }
}

impl Completion {
    fn trie(&self, head: &str) -> &Trie<u8> {
        if head.trim().is_empty() {
            &self.commands
        } else {
            &self.entries
        }
    }

    /// Every candidate for the word under the cursor, sorted and unique.
    pub fn predictive_search(&self, line: &str) -> Vec<String> {
        let (head, word) = current_word(line);
        let matches: Vec<String> = self.trie(head).predictive_search(word).collect();
        matches.into_iter().sorted().dedup().collect()
    }

    /// Longest prefix shared by all candidates for the word under the cursor.
    pub fn longest_prefix(&self, line: &str) -> Option<String> {
        let (head, word) = current_word(line);
        self.trie(head).longest_prefix(word)
    }
}
