use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::workflows::vacancy::domain::{Property, TransitionEvent};

const SUBJECT_PREFIX: &str = "【UR空き物件】";
const JST_OFFSET_SECS: i32 = 9 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// The property moved from not available to available in this run.
    NewVacancy,
    /// Manual runs report every property that is available right now.
    CurrentlyAvailable,
}

/// Message handed to a notifier for one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacancyAlert {
    pub property: Property,
    pub kind: AlertKind,
    pub observed_at: DateTime<FixedOffset>,
}

impl VacancyAlert {
    pub fn new_vacancy(event: &TransitionEvent, observed_at: DateTime<FixedOffset>) -> Self {
        Self {
            property: event.property.clone(),
            kind: AlertKind::NewVacancy,
            observed_at,
        }
    }

    pub fn currently_available(property: &Property, observed_at: DateTime<FixedOffset>) -> Self {
        Self {
            property: property.clone(),
            kind: AlertKind::CurrentlyAvailable,
            observed_at,
        }
    }

    pub fn subject(&self) -> String {
        format!("{SUBJECT_PREFIX}{}", self.property.id)
    }

    pub fn body(&self) -> String {
        format!(
            "{}\n{}\n解析日時: {}",
            self.property.id,
            self.property.url,
            format_timestamp(&self.observed_at)
        )
    }
}

/// `2025-04-01 09:30:00 JST`, or a `UTC+hh:mm` label for other offsets.
pub(crate) fn format_timestamp(at: &DateTime<FixedOffset>) -> String {
    let zone = if at.offset().local_minus_utc() == JST_OFFSET_SECS {
        "JST".to_string()
    } else {
        format!("UTC{}", at.format("%:z"))
    };
    format!("{} {zone}", at.format("%Y-%m-%d %H:%M:%S"))
}
