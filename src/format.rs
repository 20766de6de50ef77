//! Output formatting for check results and the stored price (text, JSON).

use crate::config::OutputFormat;
use crate::store::PersistedPrice;
use crate::watch::CheckOutcome;

/// Formats results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the result of a single check.
    pub fn format_outcome(&self, outcome: &CheckOutcome) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Text => self.text_outcome(outcome),
        }
    }

    /// Formats the persisted record, if any.
    pub fn format_record(&self, record: Option<&PersistedPrice>) -> String {
        match (self.format, record) {
            (OutputFormat::Json, Some(record)) => {
                serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string())
            }
            (OutputFormat::Json, None) => "null".to_string(),
            (OutputFormat::Text, Some(record)) => format!(
                "Key:     {}/{}\nPrice:   {}",
                record.partition_key, record.row_key, record.price
            ),
            (OutputFormat::Text, None) => "No price recorded yet.".to_string(),
        }
    }

    fn text_outcome(&self, outcome: &CheckOutcome) -> String {
        let mut lines = vec![format!("Status:  {}", outcome)];

        let observation = match outcome {
            CheckOutcome::NotFound => None,
            CheckOutcome::Unchanged { observation }
            | CheckOutcome::Notified { observation, .. }
            | CheckOutcome::Suppressed { observation, .. } => Some(observation),
        };

        if let Some(observation) = observation {
            lines.push(format!("Vendor:  {}", observation.vendor));
            lines.push(format!("Price:   {}", observation.price));
        }

        if let CheckOutcome::Notified { link, .. } = outcome {
            lines.push(format!("Link:    {}", link.as_deref().unwrap_or("N/A")));
        }

        lines.join("\n")
    }
}
