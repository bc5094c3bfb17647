use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use vacancy_watch::workflows::vacancy::notify::{
    AlertKind, NotificationError, Notifier, VacancyAlert,
};
use vacancy_watch::workflows::vacancy::probe::AvailabilitySource;
use vacancy_watch::workflows::vacancy::{
    DetectionPolicy, JsonFileStatusStore, MemoryStatusStore, PersistenceError, Property,
    PropertyCatalog, PropertyId, RunMode, RunOptions, Status, VacancyWatch,
};

struct ScriptedSource {
    statuses: Mutex<HashMap<String, Status>>,
}

impl ScriptedSource {
    fn new(entries: &[(&str, Status)]) -> Self {
        Self {
            statuses: Mutex::new(
                entries
                    .iter()
                    .map(|(name, status)| (url_for(name), *status))
                    .collect(),
            ),
        }
    }

    fn set(&self, name: &str, status: Status) {
        self.statuses
            .lock()
            .expect("source mutex")
            .insert(url_for(name), status);
    }
}

impl AvailabilitySource for ScriptedSource {
    async fn classify(&self, url: &str) -> Status {
        self.statuses
            .lock()
            .expect("source mutex")
            .get(url)
            .copied()
            .unwrap_or(Status::Unknown)
    }
}

#[derive(Default)]
struct RecordingNotifier {
    alerts: Mutex<Vec<VacancyAlert>>,
    fail: bool,
}

impl RecordingNotifier {
    fn failing() -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn delivered(&self) -> Vec<String> {
        self.alerts
            .lock()
            .expect("notifier mutex")
            .iter()
            .map(|alert| alert.property.id.to_string())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, alert: &VacancyAlert) -> Result<(), NotificationError> {
        self.alerts
            .lock()
            .expect("notifier mutex")
            .push(alert.clone());
        if self.fail {
            Err(NotificationError::Transport("smtp relay offline".to_string()))
        } else {
            Ok(())
        }
    }
}

fn url_for(name: &str) -> String {
    format!("https://listings.example.com/{}", name.to_lowercase())
}

fn catalog(names: &[&str]) -> PropertyCatalog {
    PropertyCatalog::new(
        names
            .iter()
            .map(|name| Property::new(*name, url_for(name)))
            .collect(),
    )
    .expect("valid catalog")
}

fn stored(entries: &[(&str, Status)]) -> BTreeMap<PropertyId, Status> {
    entries
        .iter()
        .map(|(name, status)| (PropertyId::from(*name), *status))
        .collect()
}

#[tokio::test]
async fn scheduled_run_alerts_once_per_new_vacancy() {
    let store = MemoryStatusStore::with_entries(stored(&[
        ("Maple", Status::NotAvailable),
        ("Birch", Status::Available),
    ]));
    let source = ScriptedSource::new(&[("Maple", Status::Available), ("Birch", Status::Available)]);
    let watch = VacancyWatch::new(
        source,
        store,
        RecordingNotifier::default(),
        DetectionPolicy::default(),
    );
    let catalog = catalog(&["Maple", "Birch"]);

    let first = watch
        .run(&catalog, RunOptions::default())
        .await
        .expect("run completes");
    assert_eq!(first.events.len(), 1);
    assert_eq!(first.alerts_delivered, 1);
    assert_eq!(
        watch.store().snapshot(),
        Some(stored(&[
            ("Maple", Status::Available),
            ("Birch", Status::Available)
        ]))
    );

    let second = watch
        .run(&catalog, RunOptions::default())
        .await
        .expect("run completes");
    assert!(second.events.is_empty(), "no re-alert while still available");
    assert_eq!(second.headline(), "no new vacancies");
}

#[tokio::test]
async fn first_deployment_records_state_without_alerting() {
    let notifier = RecordingNotifier::default();
    let watch = VacancyWatch::new(
        ScriptedSource::new(&[("Maple", Status::Available), ("Birch", Status::NotAvailable)]),
        MemoryStatusStore::new(),
        notifier,
        DetectionPolicy::default(),
    );

    let summary = watch
        .run(&catalog(&["Maple", "Birch"]), RunOptions::default())
        .await
        .expect("run completes");

    assert!(summary.events.is_empty());
    assert!(summary.is_first_run());
    assert_eq!(
        watch.store().snapshot(),
        Some(stored(&[
            ("Maple", Status::Available),
            ("Birch", Status::NotAvailable)
        ]))
    );
}

#[tokio::test]
async fn first_observation_policy_alerts_on_new_listing() {
    let notifier = RecordingNotifier::default();
    let watch = VacancyWatch::new(
        ScriptedSource::new(&[("Maple", Status::NotAvailable), ("Cedar", Status::Available)]),
        MemoryStatusStore::with_entries(stored(&[("Maple", Status::NotAvailable)])),
        notifier,
        DetectionPolicy {
            notify_on_first_observation: true,
        },
    );

    let summary = watch
        .run(&catalog(&["Maple", "Cedar"]), RunOptions::default())
        .await
        .expect("run completes");

    assert_eq!(summary.events.len(), 1);
    assert_eq!(summary.events[0].property.id, PropertyId::from("Cedar"));
}

#[tokio::test]
async fn failed_classification_rearms_the_next_run() {
    let source = ScriptedSource::new(&[("Maple", Status::Unknown)]);
    let watch = VacancyWatch::new(
        source,
        MemoryStatusStore::with_entries(stored(&[("Maple", Status::Available)])),
        RecordingNotifier::default(),
        DetectionPolicy::default(),
    );
    let catalog = catalog(&["Maple"]);

    let failed = watch
        .run(&catalog, RunOptions::default())
        .await
        .expect("run completes");
    assert!(failed.events.is_empty());
    assert_eq!(failed.count(Status::Unknown), 1);
    assert_eq!(
        watch.store().snapshot(),
        Some(stored(&[("Maple", Status::Unknown)]))
    );

    watch.source().set("Maple", Status::Available);
    let recovered = watch
        .run(&catalog, RunOptions::default())
        .await
        .expect("run completes");
    assert_eq!(recovered.events.len(), 1);
}

#[tokio::test]
async fn manual_run_reports_every_current_vacancy() {
    let watch = VacancyWatch::new(
        ScriptedSource::new(&[
            ("Maple", Status::Available),
            ("Birch", Status::NotAvailable),
            ("Cedar", Status::Available),
        ]),
        MemoryStatusStore::with_entries(stored(&[
            ("Maple", Status::Available),
            ("Birch", Status::NotAvailable),
            ("Cedar", Status::Available),
        ])),
        RecordingNotifier::default(),
        DetectionPolicy::default(),
    );

    let summary = watch
        .run(
            &catalog(&["Maple", "Birch", "Cedar"]),
            RunOptions {
                mode: RunMode::Manual,
                persist: true,
            },
        )
        .await
        .expect("run completes");

    assert!(summary.events.is_empty());
    assert_eq!(summary.alerts_attempted, 2);
    assert_eq!(
        summary.headline(),
        "manual run: 2 properties currently available"
    );
    assert_eq!(watch.notifier().delivered(), vec!["Maple", "Cedar"]);
    assert!(watch
        .notifier()
        .alerts
        .lock()
        .expect("notifier mutex")
        .iter()
        .all(|alert| alert.kind == AlertKind::CurrentlyAvailable));
}

#[tokio::test]
async fn notifier_failure_still_saves_state() {
    let watch = VacancyWatch::new(
        ScriptedSource::new(&[("Maple", Status::Available)]),
        MemoryStatusStore::with_entries(stored(&[("Maple", Status::NotAvailable)])),
        RecordingNotifier::failing(),
        DetectionPolicy::default(),
    );

    let summary = watch
        .run(&catalog(&["Maple"]), RunOptions::default())
        .await
        .expect("notification failures are not fatal");

    assert_eq!(summary.alerts_attempted, 1);
    assert_eq!(summary.alerts_delivered, 0);
    assert_eq!(summary.alert_failures.len(), 1);
    assert!(summary.alert_failures[0].error.contains("smtp relay offline"));
    assert_eq!(
        watch.store().snapshot(),
        Some(stored(&[("Maple", Status::Available)]))
    );
}

#[tokio::test]
async fn save_failure_is_surfaced() {
    let watch = VacancyWatch::new(
        ScriptedSource::new(&[("Maple", Status::Available)]),
        MemoryStatusStore::failing(),
        RecordingNotifier::default(),
        DetectionPolicy::default(),
    );

    let result = watch.run(&catalog(&["Maple"]), RunOptions::default()).await;

    assert!(matches!(result, Err(PersistenceError::Unavailable(_))));
}

#[tokio::test]
async fn dry_run_leaves_store_untouched() {
    let watch = VacancyWatch::new(
        ScriptedSource::new(&[("Maple", Status::Available)]),
        MemoryStatusStore::with_entries(stored(&[("Maple", Status::NotAvailable)])),
        RecordingNotifier::default(),
        DetectionPolicy::default(),
    );

    let summary = watch
        .run(
            &catalog(&["Maple"]),
            RunOptions {
                mode: RunMode::Scheduled,
                persist: false,
            },
        )
        .await
        .expect("run completes");

    assert_eq!(summary.events.len(), 1);
    assert!(!summary.persisted);
    assert_eq!(
        watch.store().snapshot(),
        Some(stored(&[("Maple", Status::NotAvailable)]))
    );
}

#[tokio::test]
async fn corrupt_status_file_degrades_to_first_run() {
    let temp = tempfile::TempDir::new().expect("temp dir");
    let path = temp.path().join("status.json");
    std::fs::write(&path, "not json at all").expect("write corrupt file");

    let watch = VacancyWatch::new(
        ScriptedSource::new(&[("Maple", Status::Available)]),
        JsonFileStatusStore::new(&path),
        RecordingNotifier::default(),
        DetectionPolicy::default(),
    );

    let summary = watch
        .run(&catalog(&["Maple"]), RunOptions::default())
        .await
        .expect("corrupt state is not fatal");

    assert!(summary.events.is_empty());
    assert!(summary.is_first_run());
    let content = std::fs::read_to_string(&path).expect("status rewritten");
    assert!(content.contains("\"Maple\": \"available\""));
}
