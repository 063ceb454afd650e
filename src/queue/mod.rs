//! Queue backends the command parser dispatches to.
//!
//! The parser only ever talks to a [`QueueOperations`] implementation. Two are
//! provided: [`beanstalk::BeanstalkClient`] speaks to a running broker, and
//! [`memory::MemoryQueue`] keeps everything in process for offline use and
//! tests.

use crate::error::QueueError;
use async_trait::async_trait;

pub mod beanstalk;
pub mod memory;

pub use beanstalk::BeanstalkClient;
pub use memory::MemoryQueue;

/// Identifier the broker assigns to an inserted job.
pub type JobId = u64;

/// Statistics reported for a single tube, in the order the broker sent them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TubeStats {
    pub name: String,
    pub fields: Vec<(String, String)>,
}

impl TubeStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// The operations the interactive front end needs from a queue.
///
/// Setters are fire-and-forget: they record the new value and never fail.
/// A backend that needs to tell the broker about a change does so lazily, so
/// any error surfaces from the next `put`.
#[async_trait]
pub trait QueueOperations: Send {
    /// Enqueue a job built from `payload` and the current settings.
    ///
    /// Returns the text shown to the operator, e.g. `INSERTED 42`.
    async fn put(&mut self, payload: &[u8]) -> Result<String, QueueError>;

    /// Names of all tubes the broker knows about.
    async fn tube_names(&mut self) -> Result<Vec<String>, QueueError>;

    async fn stats_tube(&mut self, tube: &str) -> Result<TubeStats, QueueError>;

    fn set_tube(&mut self, tube: &str);
    fn set_delay(&mut self, seconds: u32);
    fn set_priority(&mut self, priority: u32);
    fn set_ttr(&mut self, seconds: u32);

    /// Tube listing formatted for display.
    async fn list_tubes(&mut self) -> Result<String, QueueError> {
        let names = self.tube_names().await?;
        Ok(format_tube_list(&names))
    }

    /// Statistics for every tube, in listing order.
    async fn stats_tubes(&mut self) -> Result<Vec<TubeStats>, QueueError> {
        let names = self.tube_names().await?;
        let mut stats = Vec::with_capacity(names.len());
        for name in &names {
            stats.push(self.stats_tube(name).await?);
        }
        Ok(stats)
    }

    /// Release the underlying connection, if any.
    async fn close(&mut self) -> Result<(), QueueError> {
        Ok(())
    }
}

pub(crate) fn format_tube_list(names: &[String]) -> String {
    let mut out = String::from("Tubes:");
    for name in names {
        out.push('\n');
        out.push_str(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tube_list() {
        let names = vec!["default".to_string(), "jobs".to_string()];
        assert_eq!(format_tube_list(&names), "Tubes:\ndefault\njobs");
        assert_eq!(format_tube_list(&[]), "Tubes:");
    }

    #[test]
    fn test_tube_stats_lookup() {
        let stats = TubeStats::new("jobs")
            .with_field("current-jobs-ready", "3")
            .with_field("pause", "0");

        assert_eq!(stats.get("current-jobs-ready"), Some("3"));
        assert_eq!(stats.get("missing"), None);
    }
}
