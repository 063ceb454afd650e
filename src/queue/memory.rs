//! In-memory implementation of [`QueueOperations`].
//!
//! `MemoryQueue` keeps jobs in process, which makes it suitable for running the
//! prompt without a broker (`--offline`) and for exercising the parser in
//! tests. It records every setter call so callers can check exactly what was
//! applied and in which order.
//!
//! # Examples
//!
//! ```rust
//! use tubeline::queue::{MemoryQueue, QueueOperations};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut queue = MemoryQueue::new();
//! queue.set_tube("emails");
//! let reply = queue.put(b"hello").await?;
//! assert_eq!(reply, "INSERTED 1");
//! assert_eq!(queue.jobs()[0].tube, "emails");
//! # Ok(())
//! # }
//! ```

use super::{JobId, QueueOperations, TubeStats};
use crate::error::QueueError;
use crate::settings::Settings;
use async_trait::async_trait;
use tracing::debug;

/// A job as stored by [`MemoryQueue`], with the settings it was put with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredJob {
    pub id: JobId,
    pub tube: String,
    pub payload: Vec<u8>,
    pub priority: u32,
    pub delay: u32,
    pub ttr: u32,
}

/// One call to a setter on the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetterCall {
    Tube(String),
    Ttr(u32),
    Delay(u32),
    Priority(u32),
}

#[derive(Debug, Clone)]
pub struct MemoryQueue {
    tubes: Vec<String>,
    jobs: Vec<StoredJob>,
    current: Settings,
    next_id: JobId,
    setter_calls: Vec<SetterCall>,
    failure: Option<String>,
    closed: bool,
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryQueue {
    /// An empty queue that only knows the default tube, like a fresh broker.
    pub fn new() -> Self {
        let current = Settings::default();
        Self {
            tubes: vec![current.tube().to_string()],
            jobs: Vec::new(),
            current,
            next_id: 1,
            setter_calls: Vec::new(),
            failure: None,
            closed: false,
        }
    }

    /// A queue that reports the given tubes, in order.
    pub fn with_tubes<I, S>(tubes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tubes: tubes.into_iter().map(Into::into).collect(),
            ..Self::new()
        }
    }

    /// Make every subsequent operation fail with `reply` until [`recover`](Self::recover).
    pub fn fail_with(&mut self, reply: impl Into<String>) {
        self.failure = Some(reply.into());
    }

    pub fn recover(&mut self) {
        self.failure = None;
    }

    pub fn jobs(&self) -> &[StoredJob] {
        &self.jobs
    }

    pub fn setter_calls(&self) -> &[SetterCall] {
        &self.setter_calls
    }

    pub fn clear_setter_calls(&mut self) {
        self.setter_calls.clear();
    }

    /// Settings the next job would be put with.
    pub fn current(&self) -> &Settings {
        &self.current
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn check(&self, command: &str) -> Result<(), QueueError> {
        if self.closed {
            return Err(QueueError::Closed);
        }
        match &self.failure {
            Some(reply) => Err(QueueError::Rejected {
                command: command.to_string(),
                reply: reply.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl QueueOperations for MemoryQueue {
    async fn put(&mut self, payload: &[u8]) -> Result<String, QueueError> {
        self.check("put")?;

        let id = self.next_id;
        self.next_id += 1;

        let tube = self.current.tube().to_string();
        if !self.tubes.contains(&tube) {
            self.tubes.push(tube.clone());
        }

        self.jobs.push(StoredJob {
            id,
            tube,
            payload: payload.to_vec(),
            priority: self.current.priority(),
            delay: self.current.delay(),
            ttr: self.current.ttr(),
        });
        debug!(id, bytes = payload.len(), "Stored job in memory");

        Ok(format!("INSERTED {}", id))
    }

    async fn tube_names(&mut self) -> Result<Vec<String>, QueueError> {
        self.check("list-tubes")?;
        Ok(self.tubes.clone())
    }

    async fn stats_tube(&mut self, tube: &str) -> Result<TubeStats, QueueError> {
        self.check("stats-tube")?;
        if !self.tubes.iter().any(|t| t == tube) {
            return Err(QueueError::Rejected {
                command: "stats-tube".to_string(),
                reply: "NOT_FOUND".to_string(),
            });
        }

        let jobs = self.jobs.iter().filter(|job| job.tube == tube);
        let (mut ready, mut delayed, mut total) = (0u64, 0u64, 0u64);
        for job in jobs {
            total += 1;
            if job.delay > 0 {
                delayed += 1;
            } else {
                ready += 1;
            }
        }

        Ok(TubeStats::new(tube)
            .with_field("name", tube)
            .with_field("current-jobs-ready", ready.to_string())
            .with_field("current-jobs-delayed", delayed.to_string())
            .with_field("total-jobs", total.to_string()))
    }

    fn set_tube(&mut self, tube: &str) {
        self.current.set_tube(tube);
        self.setter_calls.push(SetterCall::Tube(tube.to_string()));
    }

    fn set_delay(&mut self, seconds: u32) {
        self.current.set_delay(seconds);
        self.setter_calls.push(SetterCall::Delay(seconds));
    }

    fn set_priority(&mut self, priority: u32) {
        self.current.set_priority(priority);
        self.setter_calls.push(SetterCall::Priority(priority));
    }

    fn set_ttr(&mut self, seconds: u32) {
        self.current.set_ttr(seconds);
        self.setter_calls.push(SetterCall::Ttr(seconds));
    }

    async fn close(&mut self) -> Result<(), QueueError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_uses_current_settings() {
        let mut queue = MemoryQueue::new();
        queue.set_tube("reports");
        queue.set_priority(10);
        queue.set_delay(5);
        queue.set_ttr(120);

        assert_eq!(queue.put(b"first").await.unwrap(), "INSERTED 1");
        assert_eq!(queue.put(b"second").await.unwrap(), "INSERTED 2");

        let job = &queue.jobs()[0];
        assert_eq!(job.tube, "reports");
        assert_eq!(job.payload, b"first");
        assert_eq!((job.priority, job.delay, job.ttr), (10, 5, 120));
    }

    #[tokio::test]
    async fn test_put_creates_tube() {
        let mut queue = MemoryQueue::new();
        queue.set_tube("fresh");
        queue.put(b"x").await.unwrap();

        let names = queue.tube_names().await.unwrap();
        assert_eq!(names, vec!["default".to_string(), "fresh".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let mut queue = MemoryQueue::with_tubes(["default"]);
        queue.fail_with("DRAINING");

        let err = queue.put(b"x").await.unwrap_err();
        assert!(matches!(err, QueueError::Rejected { ref reply, .. } if reply == "DRAINING"));
        assert!(queue.jobs().is_empty());

        queue.recover();
        assert!(queue.put(b"x").await.is_ok());
    }

    #[tokio::test]
    async fn test_stats_counts_delayed_jobs() {
        let mut queue = MemoryQueue::new();
        queue.put(b"now").await.unwrap();
        queue.set_delay(30);
        queue.put(b"later").await.unwrap();

        let stats = queue.stats_tube("default").await.unwrap();
        assert_eq!(stats.get("current-jobs-ready"), Some("1"));
        assert_eq!(stats.get("current-jobs-delayed"), Some("1"));
        assert_eq!(stats.get("total-jobs"), Some("2"));

        let err = queue.stats_tube("nope").await.unwrap_err();
        assert!(matches!(err, QueueError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_closed_queue_rejects_operations() {
        let mut queue = MemoryQueue::new();
        queue.close().await.unwrap();
        assert!(queue.is_closed());
        assert!(matches!(queue.put(b"x").await, Err(QueueError::Closed)));
    }
}
