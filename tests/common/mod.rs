#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use gem_monitor::config::MonitorConfig;
use gem_monitor::db::enums::{IntervalType, Protocol, ServiceKind, ServiceStatus};
use gem_monitor::db::models::{CloudSystem, MonitoredService, NewLogEntry, NewService, Upserted};
use gem_monitor::db::{MonitorStore, StoreError};
use gem_monitor::monitor::HealthChecker;
use gem_monitor::monitor::checkers::command::{CommandOutput, CommandRunner, ProbeCommand, ProbeError};
use gem_monitor::monitor::checkers::partner::PartnerClient;

#[derive(Default)]
struct StoreState {
    services: Vec<MonitoredService>,
    logs: Vec<NewLogEntry>,
    configs: HashMap<String, String>,
    inserted: Vec<NewService>,
    fail_listing: bool,
    next_id: i32,
}

/// `MonitorStore` kept in memory for tests.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn with_services(services: Vec<MonitoredService>) -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            state.next_id = services.iter().map(|s| s.id).max().unwrap_or(0) + 1;
            state.services = services;
        }
        store
    }

    pub fn add_service(&self, service: MonitoredService) {
        self.state.lock().unwrap().services.push(service);
    }

    pub fn remove_service(&self, service_id: i32) {
        self.state.lock().unwrap().services.retain(|s| s.id != service_id);
    }

    pub fn set_config(&self, key: &str, value: &str) {
        self.state.lock().unwrap().configs.insert(key.to_string(), value.to_string());
    }

    pub fn fail_listing(&self, fail: bool) {
        self.state.lock().unwrap().fail_listing = fail;
    }

    pub fn service(&self, service_id: i32) -> MonitoredService {
        self.state
            .lock()
            .unwrap()
            .services
            .iter()
            .find(|s| s.id == service_id)
            .cloned()
            .expect("service exists")
    }

    pub fn logs(&self) -> Vec<NewLogEntry> {
        self.state.lock().unwrap().logs.clone()
    }

    pub fn inserted(&self) -> Vec<NewService> {
        self.state.lock().unwrap().inserted.clone()
    }

    fn with_service<F: FnOnce(&mut MonitoredService)>(&self, service_id: i32, f: F) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let service = state
            .services
            .iter_mut()
            .find(|s| s.id == service_id)
            .ok_or(StoreError::ServiceNotFound(service_id))?;
        f(service);
        Ok(())
    }
}

#[async_trait]
impl MonitorStore for InMemoryStore {
    async fn list_active_services(&self) -> Result<Vec<MonitoredService>, StoreError> {
        let state = self.state.lock().unwrap();
        if state.fail_listing {
            return Err(StoreError::Database(sea_orm::DbErr::Custom("connection refused".to_string())));
        }
        let mut services: Vec<MonitoredService> = state.services.iter().filter(|s| s.is_active).cloned().collect();
        services.sort_by_key(|s| s.id);
        Ok(services)
    }

    async fn get_service(&self, service_id: i32) -> Result<Option<MonitoredService>, StoreError> {
        Ok(self.state.lock().unwrap().services.iter().find(|s| s.id == service_id).cloned())
    }

    async fn get_config(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.state.lock().unwrap().configs.get(key).cloned())
    }

    async fn append_log(&self, entry: NewLogEntry) -> Result<(), StoreError> {
        self.state.lock().unwrap().logs.push(entry);
        Ok(())
    }

    async fn update_service_status(
        &self,
        service_id: i32,
        status: &str,
        success_delta: i32,
        failure_delta: i32,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.with_service(service_id, |s| {
            s.last_status = ServiceStatus::from(status);
            s.success_count += success_delta;
            s.failure_count += failure_delta;
            s.updated_at = Some(updated_at.naive_utc());
        })
    }

    async fn overwrite_service_counters(
        &self,
        service_id: i32,
        status: &str,
        success_count: i32,
        failure_count: i32,
        comment: Option<String>,
    ) -> Result<(), StoreError> {
        self.with_service(service_id, |s| {
            s.last_status = ServiceStatus::from(status);
            s.success_count = success_count;
            s.failure_count = failure_count;
            s.comment = comment;
        })
    }

    async fn existing_service_names(&self, names: &[String]) -> Result<Vec<String>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .services
            .iter()
            .filter(|s| names.contains(&s.name))
            .map(|s| s.name.clone())
            .collect())
    }

    async fn insert_service(&self, service: NewService) -> Result<i32, StoreError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id.max(1);
        state.next_id = id + 1;
        let mut stored = MonitoredService::new(id, service.name.clone(), service.address.clone(), service.protocol.as_str().into());
        stored.port = service.port;
        stored.last_status = ServiceStatus::from(service.last_status.as_str());
        stored.comment = service.comment.clone();
        state.services.push(stored);
        state.inserted.push(service);
        Ok(id)
    }

    async fn upsert_cloud_service(&self, system: &CloudSystem) -> Result<Upserted, StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state.services.iter_mut().find(|s| s.name == system.name) {
            existing.address = system.address.clone();
            existing.port = system.port;
            existing.last_status = ServiceStatus::from(system.status.as_str());
            existing.updated_at = Some(system.updated_at.naive_utc());
            existing.kind = ServiceKind::ServerCloud;
            return Ok(Upserted::Updated(existing.id));
        }
        let id = state.next_id.max(1);
        state.next_id = id + 1;
        let mut stored = MonitoredService::new(id, system.name.clone(), system.address.clone(), Protocol::Api)
            .with_kind(ServiceKind::ServerCloud)
            .with_interval(IntervalType::Minutes, 5);
        stored.port = system.port;
        stored.last_status = ServiceStatus::from(system.status.as_str());
        stored.updated_at = Some(system.updated_at.naive_utc());
        state.services.push(stored);
        Ok(Upserted::Inserted(id))
    }
}

/// One recorded invocation of the scripted runner.
#[derive(Debug, Clone)]
pub struct RunnerCall {
    pub command: String,
    pub timeout: Duration,
    pub at: Instant,
}

/// `CommandRunner` that replays scripted results; an exhausted script succeeds.
#[derive(Default, Clone)]
pub struct ScriptedRunner {
    script: Arc<Mutex<VecDeque<Result<CommandOutput, ProbeError>>>>,
    calls: Arc<Mutex<Vec<RunnerCall>>>,
}

pub fn exit(code: i32, stdout: &str, stderr: &str) -> Result<CommandOutput, ProbeError> {
    Ok(CommandOutput {
        exit_code: Some(code),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    })
}

impl ScriptedRunner {
    pub fn new(script: Vec<Result<CommandOutput, ProbeError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<RunnerCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &ProbeCommand, timeout: Duration) -> Result<CommandOutput, ProbeError> {
        self.calls.lock().unwrap().push(RunnerCall {
            command: command.to_string(),
            timeout,
            at: Instant::now(),
        });
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| exit(0, "ok", ""))
    }
}

/// `CommandRunner` that panics when probing `host` and succeeds otherwise.
#[derive(Clone)]
pub struct PanickingRunner {
    pub host: String,
}

#[async_trait]
impl CommandRunner for PanickingRunner {
    async fn run(&self, command: &ProbeCommand, _timeout: Duration) -> Result<CommandOutput, ProbeError> {
        if command.to_string().contains(&self.host) {
            panic!("runner blew up on {}", self.host);
        }
        exit(0, "ok", "")
    }
}

pub fn test_config() -> MonitorConfig {
    MonitorConfig::new("postgres://localhost/monitoring_test")
}

/// Points every partner endpoint at a mock server.
pub fn config_for(base_uri: &str) -> MonitorConfig {
    let mut config = test_config();
    config.ocean_api_base = format!("{base_uri}/middleware/api/");
    config.dataset_health_url = format!("{base_uri}/health/tasks/");
    config.cloud_api_base = base_uri.to_string();
    config
}

pub fn checker(store: &InMemoryStore, runner: &ScriptedRunner, config: MonitorConfig) -> HealthChecker {
    checker_with_runner(store, Arc::new(runner.clone()), config)
}

pub fn checker_with_runner(
    store: &InMemoryStore,
    runner: Arc<dyn CommandRunner>,
    config: MonitorConfig,
) -> HealthChecker {
    HealthChecker::new(
        Arc::new(store.clone()),
        runner,
        PartnerClient::new().expect("http client"),
        Arc::new(config),
    )
}
