//! Vocabulary of the interactive grammar.
//!
//! Every keyword the prompt understands is listed exactly once, in the token
//! tables below. Parsing and display both go through these tables so the two
//! can never disagree.
//!
//! ```text
//! list
//! set key=value [key=value ...]      keys: tube, ttr, delay, priority
//! put -d <text...>
//! put -f <path>
//! ```

use std::fmt;

/// Top-level command, the first token of a line.
///
/// # Examples
///
/// ```rust
/// use tubeline::Command;
///
/// assert_eq!(Command::from_token("LIST"), Some(Command::List));
/// assert_eq!(Command::from_token("frobnicate"), None);
/// assert_eq!(Command::Put.as_str(), "put");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    List,
    Set,
    Put,
}

const COMMANDS: [(&str, Command); 3] = [
    ("list", Command::List),
    ("set", Command::Set),
    ("put", Command::Put),
];

impl Command {
    /// Case-insensitive lookup of a command keyword.
    pub fn from_token(token: &str) -> Option<Self> {
        lookup(&COMMANDS, token)
    }

    pub fn as_str(self) -> &'static str {
        name_of(&COMMANDS, self)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queue setting that can be changed with `set key=value`.
///
/// The declaration order is the order in which changed settings are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueOption {
    Tube,
    Ttr,
    Delay,
    Priority,
}

const OPTIONS: [(&str, QueueOption); 4] = [
    ("tube", QueueOption::Tube),
    ("ttr", QueueOption::Ttr),
    ("delay", QueueOption::Delay),
    ("priority", QueueOption::Priority),
];

impl QueueOption {
    pub const ALL: [QueueOption; 4] = [
        QueueOption::Tube,
        QueueOption::Ttr,
        QueueOption::Delay,
        QueueOption::Priority,
    ];

    /// Case-insensitive lookup of an option key.
    pub fn from_token(token: &str) -> Option<Self> {
        lookup(&OPTIONS, token)
    }

    pub fn as_str(self) -> &'static str {
        name_of(&OPTIONS, self)
    }
}

impl fmt::Display for QueueOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the payload of a `put` comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PutSource {
    /// `-d`: the rest of the line is the payload.
    Inline,
    /// `-f`: the next token names a file whose bytes are the payload.
    File,
}

const PUT_SOURCES: [(&str, PutSource); 2] = [("-d", PutSource::Inline), ("-f", PutSource::File)];

impl PutSource {
    pub fn from_token(token: &str) -> Option<Self> {
        lookup(&PUT_SOURCES, token)
    }

    pub fn as_str(self) -> &'static str {
        name_of(&PUT_SOURCES, self)
    }
}

impl fmt::Display for PutSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn lookup<T: Copy>(table: &[(&'static str, T)], token: &str) -> Option<T> {
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token))
        .map(|(_, value)| *value)
}

fn name_of<T: Copy + PartialEq>(table: &[(&'static str, T)], value: T) -> &'static str {
    table
        .iter()
        .find(|(_, candidate)| *candidate == value)
        .map(|(name, _)| *name)
        .unwrap_or_default()
}
