use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::catalog::PropertyCatalog;
use super::domain::{Property, PropertyId, RunMode, Status, StatusRecord, TransitionEvent};

/// Per-property result of one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyOutcome {
    pub property: Property,
    pub previous: Status,
    pub status: Status,
    pub first_registration: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertFailure {
    pub property: PropertyId,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: RunMode,
    pub observed_at: DateTime<FixedOffset>,
    pub outcomes: Vec<PropertyOutcome>,
    pub events: Vec<TransitionEvent>,
    pub alerts_attempted: usize,
    pub alerts_delivered: usize,
    pub alert_failures: Vec<AlertFailure>,
    pub persisted: bool,
}

impl RunSummary {
    pub fn count(&self, status: Status) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == status)
            .count()
    }

    /// True when nothing was on record for any tracked property before this pass.
    pub fn is_first_run(&self) -> bool {
        !self.outcomes.is_empty()
            && self
                .outcomes
                .iter()
                .all(|outcome| outcome.first_registration)
    }

    pub fn headline(&self) -> String {
        match self.mode {
            RunMode::Manual if self.alerts_attempted == 0 => {
                "manual run: no available properties".to_string()
            }
            RunMode::Manual => format!(
                "manual run: {} properties currently available",
                self.alerts_attempted
            ),
            RunMode::Scheduled if !self.events.is_empty() => {
                format!("detected {} new vacancies", self.events.len())
            }
            RunMode::Scheduled if self.is_first_run() => format!(
                "first run: recorded {} properties without alerting",
                self.outcomes.len()
            ),
            RunMode::Scheduled => "no new vacancies".to_string(),
        }
    }
}

/// One row of the `status` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRow {
    pub property: PropertyId,
    pub status: Status,
    pub status_label: &'static str,
    pub url: String,
    pub recorded: bool,
}

/// Stored status for every catalog property, in catalog order.
pub fn status_rows(catalog: &PropertyCatalog, record: &StatusRecord) -> Vec<StatusRow> {
    catalog
        .iter()
        .map(|property| {
            let status = record.get(&property.id);
            StatusRow {
                property: property.id.clone(),
                status,
                status_label: status.label(),
                url: property.url.clone(),
                recorded: !record.is_first_registration(&property.id),
            }
        })
        .collect()
}
