//! Table output formatting for CLI commands, using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::Guide;
use crate::services::{ClosureReason, ClosureStatus};

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
    max_width: Option<u16>,
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self { use_colors, max_width }
    }

    /// Two-column field/value view of a closure descriptor.
    pub fn format_closure_status(&self, status: &ClosureStatus) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Field").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        let reason = match status.reason {
            ClosureReason::ThresholdReached { count, threshold } => {
                format!("{} ({count}/{threshold})", status.reason.as_str())
            }
            other => other.as_str().to_string(),
        };
        let reason_cell = if self.use_colors {
            Cell::new(&reason).fg(reason_color(status.reason))
        } else {
            Cell::new(&reason)
        };

        let threshold = status
            .participant_threshold
            .map_or_else(|| "-".to_string(), |t| t.to_string());

        table.add_row(vec![Cell::new("Vote"), Cell::new(status.vote_id)]);
        table.add_row(vec![Cell::new("Status"), Cell::new(status.status.as_str())]);
        table.add_row(vec![Cell::new("Reason"), reason_cell]);
        table.add_row(vec![Cell::new("Closure type"), Cell::new(status.closure_type.as_str())]);
        table.add_row(vec![Cell::new("Finishes"), Cell::new(status.finished_at)]);
        table.add_row(vec![Cell::new("Threshold"), Cell::new(threshold)]);
        table.add_row(vec![Cell::new("Responses"), Cell::new(status.response_count)]);
        table.add_row(vec![Cell::new("Evaluated on"), Cell::new(status.evaluated_on)]);

        table.to_string()
    }

    pub fn format_guide(&self, guide: &Guide) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Guide").add_attribute(Attribute::Bold),
            Cell::new(&guide.title).add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![Cell::new("ID"), Cell::new(guide.id)]);
        table.add_row(vec![Cell::new("Vote"), Cell::new(guide.vote_id)]);
        table.add_row(vec![Cell::new("Type"), Cell::new(guide.guide_type.as_str())]);
        table.add_row(vec![Cell::new("Content"), Cell::new(&guide.content)]);
        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width);
        }
        table
    }
}

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

fn reason_color(reason: ClosureReason) -> Color {
    match reason {
        ClosureReason::AlreadyClosed => Color::DarkGrey,
        ClosureReason::DatePassed | ClosureReason::ThresholdReached { .. } => Color::Yellow,
        ClosureReason::StillOpen => Color::Green,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Category, ClosureType, VoteStatus};
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn test_format_closure_status_plain() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let status = ClosureStatus {
            vote_id: Uuid::nil(),
            status: VoteStatus::Open,
            closure_type: ClosureType::Participant,
            finished_at: date,
            participant_threshold: Some(5),
            response_count: 5,
            evaluated_on: date,
            reason: ClosureReason::ThresholdReached { count: 5, threshold: 5 },
        };

        let rendered = TableFormatter::with_config(false, Some(100)).format_closure_status(&status);
        assert!(rendered.contains("threshold_reached (5/5)"));
        assert!(rendered.contains("participant"));
        assert!(rendered.contains("2024-01-01"));
    }

    #[test]
    fn test_format_guide() {
        let guide = Guide::new(Uuid::new_v4(), "Jeju", "Go in spring.", Category::Travel, Category::Travel);
        let rendered = TableFormatter::with_config(false, Some(100)).format_guide(&guide);
        assert!(rendered.contains("Jeju"));
        assert!(rendered.contains("Go in spring."));
        assert!(rendered.contains("travel"));
    }
}
