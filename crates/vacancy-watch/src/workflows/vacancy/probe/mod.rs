pub mod classifier;
pub mod fetcher;

use std::future::Future;

use tracing::{info, warn};

use super::catalog::PropertyCatalog;
use super::domain::{Observations, Property, Status};

pub use classifier::{ClassificationAmbiguous, PageClassifier, UrListingClassifier};
pub use fetcher::{HttpPageFetcher, PageFetcher, RetryPolicy, TransportError};

/// Resolves a listing URL to a status. Implementations absorb every failure as `unknown`.
pub trait AvailabilitySource: Send + Sync {
    fn classify(&self, url: &str) -> impl Future<Output = Status> + Send;
}

/// Fetcher and classifier composed into a single availability source.
#[derive(Debug, Clone)]
pub struct VacancyProbe<F, C> {
    fetcher: F,
    classifier: C,
}

impl<F, C> VacancyProbe<F, C>
where
    F: PageFetcher,
    C: PageClassifier,
{
    pub fn new(fetcher: F, classifier: C) -> Self {
        Self {
            fetcher,
            classifier,
        }
    }
}

impl<F, C> AvailabilitySource for VacancyProbe<F, C>
where
    F: PageFetcher,
    C: PageClassifier,
{
    async fn classify(&self, url: &str) -> Status {
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(err) => {
                warn!(%url, error = %err, "fetch failed, treating as unknown");
                return Status::Unknown;
            }
        };

        match self.classifier.classify(&html) {
            Ok(status) => status,
            Err(err) => {
                info!(%url, reason = %err, "page classification ambiguous");
                Status::Unknown
            }
        }
    }
}

/// Observes every catalog property in order, logging one line per property.
pub async fn observe_catalog<A>(source: &A, catalog: &PropertyCatalog) -> Observations
where
    A: AvailabilitySource,
{
    let mut observations = Observations::new();
    for property in catalog.iter() {
        let status = source.classify(&property.url).await;
        log_observation(property, status);
        observations.record(property.clone(), status);
    }
    observations
}

fn log_observation(property: &Property, status: Status) {
    info!(property = %property.id, status = status.as_str(), "observed property");
}
