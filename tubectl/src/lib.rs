//! # tubectl
//!
//! Interactive command-line front end for beanstalkd.
//!
//! ## Usage
//!
//! ```bash
//! # Connect to localhost:11300 and open the prompt
//! tubectl
//!
//! # Another broker
//! tubectl --host queue.internal -p 11301
//!
//! # Try the prompt without a broker
//! tubectl --offline
//!
//! # One-shot statistics for every tube, or for one
//! tubectl stats
//! tubectl stats emails
//! ```
//!
//! At the prompt:
//!
//! ```text
//! list
//! set tube=emails priority=10 delay=0 ttr=120
//! put -d {"to": "user@example.com"}
//! put -f ./payload.json
//! ```
//!
//! A settings banner is printed before every prompt. The session ends at end
//! of input (Ctrl-D).
//!
//! ## Configuration
//!
//! Values are read from `~/.config/tubeline/config.toml` (or the platform
//! equivalent), then from the environment, then from command-line flags:
//!
//! ```toml
//! host = "localhost"
//! port = 11300
//! tube = "default"
//! priority = 1
//! delay = 0
//! ttr = 60
//! log_level = "warn"
//! ```
//!
//! Environment variables: `TUBELINE_HOST`, `TUBELINE_PORT`, `TUBELINE_TUBE`,
//! `TUBELINE_PRIORITY`, `TUBELINE_DELAY`, `TUBELINE_TTR`,
//! `TUBELINE_LOG_LEVEL`. `RUST_LOG` is honoured as well.

pub mod commands;
pub mod config;
pub mod session;
pub mod utils;

pub use commands::*;
pub use config::*;
pub use session::*;
