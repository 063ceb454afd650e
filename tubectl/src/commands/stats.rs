use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use tubeline::queue::{BeanstalkClient, QueueOperations};

use crate::config::Config;
use crate::utils::display::render_stats;

#[derive(Args, Debug, Clone)]
pub struct StatsCommand {
    #[arg(help = "Tube to inspect (all tubes when omitted)")]
    pub tube: Option<String>,
}

impl StatsCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let address = config.address();
        let mut client = BeanstalkClient::connect(config.get_host(), config.get_port())
            .await
            .with_context(|| format!("Could not connect to {}", address))?;

        let report = self.collect(&mut client).await;
        client.close().await?;

        println!("{}", report?);
        Ok(())
    }

    /// Fetch the requested statistics and render them as tables.
    pub async fn collect<Q>(&self, queue: &mut Q) -> Result<String>
    where
        Q: QueueOperations + ?Sized,
    {
        let stats = match &self.tube {
            Some(tube) => vec![
                queue
                    .stats_tube(tube)
                    .await
                    .with_context(|| format!("Can't get stats of tube {}", tube))?,
            ],
            None => queue
                .stats_tubes()
                .await
                .context("Can't get stats of tubes")?,
        };
        info!("Fetched statistics for {} tube(s)", stats.len());

        Ok(render_stats(&stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubeline::MemoryQueue;

    #[tokio::test]
    async fn test_collect_single_tube() {
        let mut queue = MemoryQueue::with_tubes(["default", "jobs"]);
        let command = StatsCommand {
            tube: Some("jobs".to_string()),
        };

        let report = command.collect(&mut queue).await.unwrap();
        assert!(report.contains("tube: jobs"));
        assert!(!report.contains("tube: default"));
    }

    #[tokio::test]
    async fn test_collect_all_tubes() {
        let mut queue = MemoryQueue::with_tubes(["default", "jobs"]);
        let command = StatsCommand { tube: None };

        let report = command.collect(&mut queue).await.unwrap();
        assert!(report.contains("tube: default"));
        assert!(report.contains("tube: jobs"));
    }

    #[tokio::test]
    async fn test_collect_unknown_tube() {
        let mut queue = MemoryQueue::new();
        let command = StatsCommand {
            tube: Some("ghost".to_string()),
        };

        let err = command.collect(&mut queue).await.unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }
}
