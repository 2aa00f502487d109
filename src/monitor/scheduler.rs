use chrono::{DateTime, Local, Utc};
use futures::FutureExt;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::db::enums::ServiceStatus;
use crate::db::models::MonitoredService;
use crate::db::store::{MonitorStore, StoreError};
use crate::monitor::checkers::{CheckOutcome, HealthChecker};
use crate::monitor::interval::next_due;
use crate::monitor::population::{OceanPopulation, populate_ocean_services};
use crate::monitor::recorder::record_outcome;

pub const MIN_SLEEP: Duration = Duration::from_secs(1);
pub const MAX_SLEEP: Duration = Duration::from_secs(60);
pub const ERROR_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Evaluating,
    Checking,
    Stopped,
}

/// Owns the in-memory schedule and drives checks for every active service.
pub struct Scheduler {
    store: Arc<dyn MonitorStore>,
    checker: HealthChecker,
    schedule: HashMap<i32, DateTime<Utc>>,
    population: Option<OceanPopulation>,
    state: SchedulerState,
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

/// Runs the checker, turning a panic into an `unknown` outcome.
async fn check_guarded(checker: &HealthChecker, service: &MonitoredService) -> CheckOutcome {
    match AssertUnwindSafe(checker.check(service)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            error!(service_id = service.id, reason, "Checker panicked.");
            CheckOutcome::new(ServiceStatus::Unknown, format!("Checker panicked: {reason}"), "")
        }
    }
}

/// Time until the earliest pending deadline, clamped to `[MIN_SLEEP, MAX_SLEEP]`.
pub fn sleep_until_next(schedule: &HashMap<i32, DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
    let Some(earliest) = schedule.values().min() else {
        return MAX_SLEEP;
    };
    let wait = (*earliest - now).to_std().unwrap_or(Duration::ZERO);
    wait.clamp(MIN_SLEEP, MAX_SLEEP)
}

impl Scheduler {
    pub fn new(store: Arc<dyn MonitorStore>, checker: HealthChecker) -> Self {
        Self {
            store,
            checker,
            schedule: HashMap::new(),
            population: None,
            state: SchedulerState::Idle,
        }
    }

    /// Runs the ocean population job at start and then every `interval`.
    pub fn with_ocean_population(mut self, interval: Duration) -> Self {
        self.population = Some(OceanPopulation::new(interval));
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn next_due_for(&self, service_id: i32) -> Option<DateTime<Utc>> {
        self.schedule.get(&service_id).copied()
    }

    pub fn scheduled_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.schedule.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    async fn populate_if_due(&mut self) {
        let Some(population) = self.population.as_mut() else {
            return;
        };
        let started = tokio::time::Instant::now();
        if !population.is_due(started) {
            return;
        }
        let today = Local::now().date_naive();
        match populate_ocean_services(
            self.store.as_ref(),
            self.checker.partner(),
            self.checker.config(),
            today,
        )
        .await
        {
            Ok(inserted) => info!(inserted, "Ocean task population finished."),
            Err(e) => warn!(error = %e, "Ocean task population failed. Retrying after the interval."),
        }
        population.mark_run(started);
    }

    /// One evaluate/check pass at `now`. Returns how long to sleep before the next one.
    pub async fn run_iteration(&mut self, now: DateTime<Utc>) -> Result<Duration, StoreError> {
        self.state = SchedulerState::Evaluating;
        self.populate_if_due().await;

        let mut services = match self.store.list_active_services().await {
            Ok(services) => services,
            Err(e) => {
                self.state = SchedulerState::Idle;
                return Err(e);
            }
        };
        services.sort_by_key(|s| s.id);
        let active: HashSet<i32> = services.iter().map(|s| s.id).collect();

        for service in &services {
            self.schedule.entry(service.id).or_insert_with(|| {
                info!(service_id = service.id, name = %service.name, "Scheduling new service.");
                now
            });
        }

        let due: Vec<&MonitoredService> = services
            .iter()
            .filter(|s| self.schedule.get(&s.id).is_some_and(|at| *at <= now))
            .collect();
        for service in &due {
            self.schedule.insert(service.id, next_due(service, now));
        }
        debug!(active = services.len(), due = due.len(), "Evaluated schedule.");

        self.state = SchedulerState::Checking;
        for service in due {
            let outcome = check_guarded(&self.checker, service).await;
            info!(
                service_id = service.id,
                name = %service.name,
                status = %outcome.status,
                "Checked service."
            );
            record_outcome(self.store.as_ref(), service.id, &outcome, Utc::now()).await;
        }

        self.schedule.retain(|id, _| {
            let keep = active.contains(id);
            if !keep {
                info!(service_id = *id, "Unscheduling inactive service.");
            }
            keep
        });

        self.state = SchedulerState::Idle;
        Ok(sleep_until_next(&self.schedule, now))
    }

    /// Loops until `shutdown` turns true. The signal is only observed between
    /// iterations, so an in-flight pass always completes.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!("Monitoring scheduler started.");
        while !*shutdown.borrow() {
            let pause = match self.run_iteration(Utc::now()).await {
                Ok(pause) => pause,
                Err(e) => {
                    error!(error = %e, "Scheduler iteration failed. Backing off.");
                    ERROR_BACKOFF
                }
            };
            debug!(sleep_secs = pause.as_secs(), "Sleeping until the next deadline.");

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        self.state = SchedulerState::Stopped;
        info!("Monitoring scheduler stopped.");
    }

    /// Checks and records one service immediately; the schedule is left untouched.
    pub async fn check_service_now(&self, service_id: i32) -> Result<CheckOutcome, StoreError> {
        let service = self
            .store
            .get_service(service_id)
            .await?
            .ok_or(StoreError::ServiceNotFound(service_id))?;
        let outcome = check_guarded(&self.checker, &service).await;
        record_outcome(self.store.as_ref(), service.id, &outcome, Utc::now()).await;
        Ok(outcome)
    }

    /// Checks and records every active service immediately; the schedule is left untouched.
    pub async fn run_full_cycle_now(&self) -> Result<Vec<(i32, CheckOutcome)>, StoreError> {
        let mut services = self.store.list_active_services().await?;
        services.sort_by_key(|s| s.id);
        let mut results = Vec::with_capacity(services.len());
        for service in &services {
            let outcome = check_guarded(&self.checker, service).await;
            record_outcome(self.store.as_ref(), service.id, &outcome, Utc::now()).await;
            results.push((service.id, outcome));
        }
        Ok(results)
    }
}
