use thiserror::Error;

/// Failure reported by a [`QueueOperations`](crate::queue::QueueOperations) backend.
///
/// These are surfaced to the operator unchanged; the parser never reclassifies them.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{command} rejected by server: {reply}")]
    Rejected { command: String, reply: String },

    #[error("unexpected reply to {command}: {reply}")]
    UnexpectedReply { command: String, reply: String },

    #[error("malformed reply body to {command}: {source}")]
    MalformedBody {
        command: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("connection closed by server")]
    Closed,
}

/// Why an option value could not be decoded.
#[derive(Error, Debug)]
pub enum ValueError {
    #[error("value must be of integer type and not less than zero")]
    NotNonNegativeInteger,

    #[error("value must be an unsigned integer of at most {max}", max = u32::MAX)]
    NotUnsignedInteger,

    #[error("{0}")]
    Unreadable(#[from] std::io::Error),
}

/// Classification of a rejected command line.
///
/// Mirrors the variants of [`CommandError`] without their context, which makes
/// it convenient to match on in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EmptyCommand,
    UnknownCommand,
    NoOptionSet,
    UnknownOption,
    EmptyOptionValue,
    BadOptionValue,
    EmptyOption,
    Queue,
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("empty command")]
    EmptyCommand,

    #[error("unknown command: {command}")]
    UnknownCommand { command: String },

    #[error("no option for operation {command}")]
    NoOptionSet { command: String },

    #[error("unknown option: {option}")]
    UnknownOption { option: String },

    #[error("empty value for option: {option}")]
    EmptyOptionValue { option: String },

    #[error("bad option value {value} for key {option}: {reason}")]
    BadOptionValue {
        option: String,
        value: String,
        #[source]
        reason: ValueError,
    },

    #[error("empty option")]
    EmptyOption,

    #[error("ERROR: {0}")]
    Queue(#[from] QueueError),
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::EmptyCommand => ErrorKind::EmptyCommand,
            CommandError::UnknownCommand { .. } => ErrorKind::UnknownCommand,
            CommandError::NoOptionSet { .. } => ErrorKind::NoOptionSet,
            CommandError::UnknownOption { .. } => ErrorKind::UnknownOption,
            CommandError::EmptyOptionValue { .. } => ErrorKind::EmptyOptionValue,
            CommandError::BadOptionValue { .. } => ErrorKind::BadOptionValue,
            CommandError::EmptyOption => ErrorKind::EmptyOption,
            CommandError::Queue(_) => ErrorKind::Queue,
        }
    }

    /// The token from the input line that caused the failure, if there is one.
    pub fn token(&self) -> Option<&str> {
        match self {
            CommandError::UnknownCommand { command } | CommandError::NoOptionSet { command } => {
                Some(command.as_str())
            }
            CommandError::UnknownOption { option } | CommandError::EmptyOptionValue { option } => {
                Some(option.as_str())
            }
            CommandError::BadOptionValue { value, .. } => Some(value.as_str()),
            CommandError::EmptyCommand | CommandError::EmptyOption | CommandError::Queue(_) => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let unknown = CommandError::UnknownCommand {
            command: "frobnicate".to_string(),
        };
        assert_eq!(unknown.to_string(), "unknown command: frobnicate");

        let empty_value = CommandError::EmptyOptionValue {
            option: "delay".to_string(),
        };
        assert_eq!(empty_value.to_string(), "empty value for option: delay");

        let bad = CommandError::BadOptionValue {
            option: "ttr".to_string(),
            value: "-3".to_string(),
            reason: ValueError::NotNonNegativeInteger,
        };
        assert_eq!(
            bad.to_string(),
            "bad option value -3 for key ttr: value must be of integer type and not less than zero"
        );
    }

    #[test]
    fn test_queue_error_is_prefixed_not_reclassified() {
        let err: CommandError = QueueError::Rejected {
            command: "put".to_string(),
            reply: "DRAINING".to_string(),
        }
        .into();

        assert_eq!(err.kind(), ErrorKind::Queue);
        assert_eq!(err.to_string(), "ERROR: put rejected by server: DRAINING");
    }

    #[test]
    fn test_unreadable_file_keeps_io_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = CommandError::BadOptionValue {
            option: "-f".to_string(),
            value: "/missing".to_string(),
            reason: ValueError::Unreadable(io),
        };

        assert_eq!(err.token(), Some("/missing"));
        let reason = err.source().expect("reason is the source");
        let io = reason.source().expect("io error is chained");
        assert_eq!(io.to_string(), "no such file");
    }

    #[test]
    fn test_error_debug() {
        let error = CommandError::UnknownOption {
            option: "foo".to_string(),
        };

        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("UnknownOption"));
        assert!(debug_str.contains("foo"));
    }
}
