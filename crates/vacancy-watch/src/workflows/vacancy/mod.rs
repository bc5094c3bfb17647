pub mod catalog;
pub mod detector;
pub mod domain;
pub mod notify;
pub mod probe;
pub mod report;
pub mod store;
mod watch;

pub use catalog::{CatalogError, PropertyCatalog};
pub use detector::{currently_available, reconcile, DetectionPolicy, Reconciliation};
pub use domain::{
    Observations, Property, PropertyId, RunMode, Status, StatusRecord, TransitionEvent,
};
pub use report::{status_rows, RunSummary, StatusRow};
pub use store::{JsonFileStatusStore, MemoryStatusStore, PersistenceError, StatusStore};
pub use watch::{RunOptions, VacancyWatch};
