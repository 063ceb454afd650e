//! # Tubeline
//!
//! The engine behind an interactive beanstalkd prompt: a parser for a small
//! line-oriented command grammar, the settings it manipulates, and the queue
//! backends it dispatches to.
//!
//! ## Grammar
//!
//! ```text
//! list                               list every tube on the server
//! set key=value [key=value ...]      change tube, ttr, delay or priority
//! put -d <text...>                   enqueue the rest of the line
//! put -f <path>                      enqueue the contents of a file
//! ```
//!
//! Commands and option keys are case-insensitive. Tokens are separated by
//! single spaces.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tubeline::{CommandParser, Settings};
//! use tubeline::queue::BeanstalkClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = BeanstalkClient::connect("localhost", 11300).await?;
//!     let mut settings = Settings::default();
//!     let mut parser = CommandParser::new(&mut client);
//!
//!     parser.parse("set tube=emails priority=10", &mut settings).await?;
//!     if let Some(reply) = parser.parse("put -d welcome", &mut settings).await? {
//!         println!("{}", reply);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Rejected lines come back as [`CommandError`], whose [`kind`](CommandError::kind)
//! tells malformed input apart from failures reported by the queue backend.
//! Nothing is ever applied from a rejected line.

pub mod command;
pub mod error;
pub mod parser;
pub mod queue;
pub mod settings;

pub use command::{Command, PutSource, QueueOption};
pub use error::{CommandError, ErrorKind, QueueError, ValueError};
pub use parser::{CommandParser, ParseOutcome, SettingsUpdate};
pub use queue::{BeanstalkClient, JobId, MemoryQueue, QueueOperations, TubeStats};
pub use settings::Settings;

/// Convenient type alias for Results with [`CommandError`] as the error type.
pub type Result<T> = std::result::Result<T, CommandError>;
