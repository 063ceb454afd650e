//! Line parser for the interactive prompt.
//!
//! [`CommandParser`] turns one line of operator input into a call on a
//! [`QueueOperations`] backend. It keeps no state between lines: the session
//! lends it the backend and the current [`Settings`] for the duration of a
//! single [`parse`](CommandParser::parse).
//!
//! A `set` line is decoded completely before anything is applied, so a line
//! such as `set tube=ok delay=bad` is rejected as a whole and leaves both the
//! settings and the backend untouched.

use crate::command::{Command, PutSource, QueueOption};
use crate::error::{CommandError, ValueError};
use crate::queue::QueueOperations;
use crate::settings::Settings;
use std::path::Path;
use tracing::debug;

/// Result of parsing one line: optional text to show, or the reason the line
/// was rejected.
pub type ParseOutcome = Result<Option<String>, CommandError>;

/// Decoded options of a `set` line. `None` means the option was not given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub tube: Option<String>,
    pub ttr: Option<u32>,
    pub delay: Option<u32>,
    pub priority: Option<u32>,
}

impl SettingsUpdate {
    /// Decode the `key=value` tokens that follow `set`.
    ///
    /// Fails on the first token that is malformed. When a key appears more
    /// than once, the last value wins.
    pub fn from_tokens(tokens: &[&str]) -> Result<Self, CommandError> {
        if tokens.is_empty() {
            return Err(CommandError::NoOptionSet {
                command: Command::Set.to_string(),
            });
        }

        let mut update = Self::default();
        for token in tokens {
            let (key, value) = match token.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (*token, None),
            };

            let (option, value) = match (QueueOption::from_token(key), value) {
                (Some(_), None) | (_, Some("")) => {
                    return Err(CommandError::EmptyOptionValue {
                        option: key.to_lowercase(),
                    });
                }
                (None, _) => return Err(unknown_option(key)),
                (Some(option), Some(value)) => (option, value),
            };

            update.decode(option, value)?;
        }
        Ok(update)
    }

    fn decode(&mut self, option: QueueOption, value: &str) -> Result<(), CommandError> {
        let bad_value = |reason| CommandError::BadOptionValue {
            option: option.to_string(),
            value: value.to_string(),
            reason,
        };

        match option {
            QueueOption::Tube => self.tube = Some(value.to_string()),
            QueueOption::Ttr => self.ttr = Some(parse_seconds(value).map_err(bad_value)?),
            QueueOption::Delay => self.delay = Some(parse_seconds(value).map_err(bad_value)?),
            QueueOption::Priority => {
                let priority = value
                    .parse::<u32>()
                    .map_err(|_| bad_value(ValueError::NotUnsignedInteger))?;
                self.priority = Some(priority);
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.options().next().is_none()
    }

    /// Options present in this update, in application order.
    pub fn options(&self) -> impl Iterator<Item = QueueOption> + '_ {
        QueueOption::ALL.into_iter().filter(|option| match option {
            QueueOption::Tube => self.tube.is_some(),
            QueueOption::Ttr => self.ttr.is_some(),
            QueueOption::Delay => self.delay.is_some(),
            QueueOption::Priority => self.priority.is_some(),
        })
    }

    /// Write every present option to `settings` and pass it on to `queue`.
    pub fn apply<Q>(&self, settings: &mut Settings, queue: &mut Q)
    where
        Q: QueueOperations + ?Sized,
    {
        for option in self.options() {
            match option {
                QueueOption::Tube => {
                    if let Some(tube) = &self.tube {
                        settings.set_tube(tube.as_str());
                        queue.set_tube(tube);
                    }
                }
                QueueOption::Ttr => {
                    if let Some(ttr) = self.ttr {
                        settings.set_ttr(ttr);
                        queue.set_ttr(ttr);
                    }
                }
                QueueOption::Delay => {
                    if let Some(delay) = self.delay {
                        settings.set_delay(delay);
                        queue.set_delay(delay);
                    }
                }
                QueueOption::Priority => {
                    if let Some(priority) = self.priority {
                        settings.set_priority(priority);
                        queue.set_priority(priority);
                    }
                }
            }
            debug!(option = %option, "Applied setting");
        }
    }
}

fn unknown_option(key: &str) -> CommandError {
    CommandError::UnknownOption {
        option: key.to_lowercase(),
    }
}

/// Delays and TTRs are whole seconds; negatives and values past `u32::MAX`
/// get the same reason.
fn parse_seconds(value: &str) -> Result<u32, ValueError> {
    value
        .parse::<u32>()
        .map_err(|_| ValueError::NotNonNegativeInteger)
}

/// Parses operator input and dispatches it to a queue backend.
///
/// # Examples
///
/// ```rust
/// use tubeline::{CommandParser, Settings};
/// use tubeline::queue::MemoryQueue;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut queue = MemoryQueue::new();
/// let mut settings = Settings::default();
///
/// let mut parser = CommandParser::new(&mut queue);
/// assert_eq!(parser.parse("set tube=emails ttr=30", &mut settings).await?, None);
/// let reply = parser.parse("put -d hello world", &mut settings).await?;
/// assert_eq!(reply.as_deref(), Some("INSERTED 1"));
///
/// assert_eq!(settings.tube(), "emails");
/// assert_eq!(queue.jobs()[0].payload, b"hello world");
/// # Ok(())
/// # }
/// ```
pub struct CommandParser<'q, Q: ?Sized> {
    queue: &'q mut Q,
}

impl<'q, Q> CommandParser<'q, Q>
where
    Q: QueueOperations + ?Sized,
{
    pub fn new(queue: &'q mut Q) -> Self {
        Self { queue }
    }

    /// Parse and execute one line of input.
    ///
    /// Trailing line breaks are ignored. Tokens are separated by single
    /// spaces, so repeated spaces yield empty tokens.
    pub async fn parse(&mut self, line: &str, settings: &mut Settings) -> ParseOutcome {
        let line = line.trim_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(CommandError::EmptyCommand);
        }

        let tokens: Vec<&str> = line.split(' ').collect();
        let (first, args) = tokens
            .split_first()
            .ok_or(CommandError::EmptyCommand)?;

        let command = Command::from_token(first).ok_or_else(|| CommandError::UnknownCommand {
            command: first.to_string(),
        })?;
        debug!(command = %command, args = args.len(), "Parsed command");

        match command {
            Command::List => Ok(Some(self.queue.list_tubes().await?)),
            Command::Set => {
                let update = SettingsUpdate::from_tokens(args)?;
                update.apply(settings, &mut *self.queue);
                Ok(None)
            }
            Command::Put => self.put(args).await.map(Some),
        }
    }

    async fn put(&mut self, args: &[&str]) -> Result<String, CommandError> {
        let [flag, rest @ ..] = args else {
            return Err(CommandError::EmptyOption);
        };
        if rest.is_empty() {
            return Err(CommandError::EmptyOption);
        }

        let source = PutSource::from_token(flag).ok_or_else(|| unknown_option(flag))?;
        let payload = match source {
            PutSource::Inline => rest.join(" ").into_bytes(),
            PutSource::File => {
                let path = rest[0];
                read_payload_file(path)
                    .await
                    .map_err(|e| CommandError::BadOptionValue {
                        option: source.to_string(),
                        value: path.to_string(),
                        reason: ValueError::Unreadable(e),
                    })?
            }
        };
        debug!(source = %source, bytes = payload.len(), "Dispatching put");

        Ok(self.queue.put(&payload).await?)
    }
}

async fn read_payload_file(path: &str) -> std::io::Result<Vec<u8>> {
    let absolute = std::path::absolute(Path::new(path))?;
    tokio::fs::read(absolute).await
}
