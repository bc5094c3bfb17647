use chrono::{DateTime, FixedOffset, Offset, Utc};
use tracing::{error, info};

use super::catalog::PropertyCatalog;
use super::detector::{currently_available, reconcile, DetectionPolicy};
use super::domain::RunMode;
use super::notify::{Notifier, VacancyAlert};
use super::probe::{observe_catalog, AvailabilitySource};
use super::report::{AlertFailure, PropertyOutcome, RunSummary};
use super::store::{PersistenceError, StatusStore};

/// Options for a single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub mode: RunMode,
    /// When false the updated record is computed and reported but not saved.
    pub persist: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: RunMode::Scheduled,
            persist: true,
        }
    }
}

/// Composes the availability source, status store and notifier into one pass:
/// load, observe, reconcile, notify, save.
pub struct VacancyWatch<A, S, N> {
    source: A,
    store: S,
    notifier: N,
    policy: DetectionPolicy,
    report_offset: FixedOffset,
}

impl<A, S, N> VacancyWatch<A, S, N>
where
    A: AvailabilitySource,
    S: StatusStore,
    N: Notifier,
{
    pub fn new(source: A, store: S, notifier: N, policy: DetectionPolicy) -> Self {
        Self {
            source,
            store,
            notifier,
            policy,
            report_offset: Utc.fix(),
        }
    }

    /// Timezone used for alert timestamps.
    pub fn with_report_offset(mut self, offset: FixedOffset) -> Self {
        self.report_offset = offset;
        self
    }

    pub fn source(&self) -> &A {
        &self.source
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Runs one pass. Per-property fetch, classification and notification failures are
    /// absorbed; only a failed save is returned as an error.
    pub async fn run(
        &self,
        catalog: &PropertyCatalog,
        options: RunOptions,
    ) -> Result<RunSummary, PersistenceError> {
        let observed_at = self.now();
        let prior = self.store.load(catalog);
        let observations = observe_catalog(&self.source, catalog).await;
        let reconciliation = reconcile(&prior, &observations, self.policy);

        let outcomes: Vec<PropertyOutcome> = observations
            .iter()
            .map(|(property, status)| PropertyOutcome {
                property: property.clone(),
                previous: prior.get(&property.id),
                status,
                first_registration: prior.is_first_registration(&property.id),
            })
            .collect();

        let alerts: Vec<VacancyAlert> = match options.mode {
            RunMode::Scheduled => reconciliation
                .events
                .iter()
                .map(|event| VacancyAlert::new_vacancy(event, observed_at))
                .collect(),
            RunMode::Manual => currently_available(&observations)
                .iter()
                .map(|property| VacancyAlert::currently_available(property, observed_at))
                .collect(),
        };

        let mut alerts_delivered = 0;
        let mut alert_failures = Vec::new();
        for alert in &alerts {
            match self.notifier.notify(alert).await {
                Ok(()) => {
                    alerts_delivered += 1;
                    info!(property = %alert.property.id, subject = %alert.subject(), "alert sent");
                }
                Err(err) => {
                    error!(property = %alert.property.id, error = %err, "alert delivery failed");
                    alert_failures.push(AlertFailure {
                        property: alert.property.id.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        // a lost alert must not also lose the state update
        if options.persist {
            self.store.save(&reconciliation.updated)?;
        }

        Ok(RunSummary {
            mode: options.mode,
            observed_at,
            outcomes,
            events: reconciliation.events,
            alerts_attempted: alerts.len(),
            alerts_delivered,
            alert_failures,
            persisted: options.persist,
        })
    }

    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.report_offset)
    }
}
