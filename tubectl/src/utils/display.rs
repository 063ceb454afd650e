use comfy_table::Table;
use console::style;
use std::fmt;
use tubeline::{ParseOutcome, Settings, TubeStats};

const RULE: &str = "------------------------";

/// Settings summary printed before every prompt.
pub fn render_banner(address: &str, settings: &Settings) -> String {
    format!(
        "{rule}\nAddress: {}\nTube: {}\nPriority: {}\nDelay: {}\nTime to run: {}\n{rule}\n",
        address,
        settings.tube(),
        settings.priority(),
        settings.delay(),
        settings.ttr(),
        rule = RULE,
    )
}

/// Result text in cyan, `OK` when a command produced no text, errors in red.
pub fn render_outcome(outcome: &ParseOutcome) -> String {
    match outcome {
        Ok(Some(text)) => style(text).cyan().to_string(),
        Ok(None) => style("OK").cyan().to_string(),
        Err(e) => render_error(e),
    }
}

pub fn render_error(error: impl fmt::Display) -> String {
    style(error.to_string()).red().to_string()
}

pub struct StatsTable {
    tube: String,
    table: Table,
}

impl StatsTable {
    pub fn new(stats: &TubeStats) -> Self {
        let mut table = Table::new();
        table.set_header(vec!["Statistic", "Value"]);

        // The tube name is already the table title.
        for (key, value) in stats.fields.iter().filter(|(key, _)| key != "name") {
            table.add_row(vec![key.as_str(), value.as_str()]);
        }

        Self {
            tube: stats.name.clone(),
            table,
        }
    }
}

impl fmt::Display for StatsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", style(format!("tube: {}", self.tube)).green())?;
        write!(f, "{}", self.table)
    }
}

pub fn render_stats(stats: &[TubeStats]) -> String {
    stats
        .iter()
        .map(|s| StatsTable::new(s).to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}
