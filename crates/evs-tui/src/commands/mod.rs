//! `:` command-line parsing.
//!
//! | Command | Action |
//! |---------|--------|
//! | `q`, `quit` | Quit |
//! | `help` | Toggle the help popup |
//! | `search <id>`, `s <id>` | Search for an event ID without the form |
//! | `limit <n>` | Set the result cap for later searches |
//! | `theme <dark\|light>` | Switch theme |

use crate::theme::ThemeKind;
use evs_core::{SearchCriterion, SearchLimit};

/// A parsed, validated command ready to be executed by the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Search(SearchCriterion),
    Limit(SearchLimit),
    Theme(ThemeKind),
}

impl Command {
    /// Parse a raw command string (the text after the `:` prefix).
    ///
    /// An empty string returns `Err("")` as a sentinel meaning "close without
    /// acting".
    pub fn parse(input: &str) -> Result<Command, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(String::new());
        }

        let (word, rest) = input
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((input, ""));

        match word {
            "q" | "quit" => Ok(Command::Quit),
            "help" => Ok(Command::Help),
            "s" | "search" => {
                if rest.is_empty() {
                    return Err("usage: search <event id>".to_string());
                }
                rest.parse::<SearchCriterion>()
                    .map(Command::Search)
                    .map_err(|_| format!("Invalid event ID: {rest}"))
            }
            "limit" => match rest.parse::<usize>().ok().and_then(SearchLimit::new) {
                Some(limit) => Ok(Command::Limit(limit)),
                None => Err("usage: limit <n> (n > 0)".to_string()),
            },
            "theme" => {
                if rest.is_empty() {
                    Err("usage: theme <dark|light>".to_string())
                } else {
                    rest.parse().map(Command::Theme)
                }
            }
            other => Err(format!("unknown command: {other}")),
        }
    }
}
