//! The persistence seam used by the scheduler, the checkers and the population job.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, DbErr};
use tracing::debug;

use crate::db::models::{CloudSystem, MonitoredService, NewLogEntry, NewService, Upserted};
use crate::db::services;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error("Service {0} not found")]
    ServiceNotFound(i32),
}

#[async_trait]
pub trait MonitorStore: Send + Sync {
    /// Active services ordered by ascending id.
    async fn list_active_services(&self) -> Result<Vec<MonitoredService>, StoreError>;

    async fn get_service(&self, service_id: i32) -> Result<Option<MonitoredService>, StoreError>;

    async fn get_config(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn append_log(&self, entry: NewLogEntry) -> Result<(), StoreError>;

    async fn update_service_status(
        &self,
        service_id: i32,
        status: &str,
        success_delta: i32,
        failure_delta: i32,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn overwrite_service_counters(
        &self,
        service_id: i32,
        status: &str,
        success_count: i32,
        failure_count: i32,
        comment: Option<String>,
    ) -> Result<(), StoreError>;

    /// The subset of `names` already registered.
    async fn existing_service_names(&self, names: &[String]) -> Result<Vec<String>, StoreError>;

    async fn insert_service(&self, service: NewService) -> Result<i32, StoreError>;

    /// Updates the service named like `system` or creates it as a `Server Cloud` service.
    async fn upsert_cloud_service(&self, system: &CloudSystem) -> Result<Upserted, StoreError>;
}

/// `MonitorStore` backed by the pooled SeaORM connection.
#[derive(Clone)]
pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn close(self) -> Result<(), StoreError> {
        self.db.close().await?;
        Ok(())
    }
}

#[async_trait]
impl MonitorStore for DbStore {
    async fn list_active_services(&self) -> Result<Vec<MonitoredService>, StoreError> {
        let rows = services::list_active_services(&self.db).await?;
        Ok(rows.into_iter().map(MonitoredService::from).collect())
    }

    async fn get_service(&self, service_id: i32) -> Result<Option<MonitoredService>, StoreError> {
        let row = services::find_service(&self.db, service_id).await?;
        Ok(row.map(MonitoredService::from))
    }

    async fn get_config(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(services::get_config(&self.db, key).await?)
    }

    async fn append_log(&self, entry: NewLogEntry) -> Result<(), StoreError> {
        services::insert_log(&self.db, &entry).await?;
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
        let result = services::update_status(
            &self.db,
            service_id,
            status,
            success_delta,
            failure_delta,
            updated_at.naive_utc(),
        )
        .await?;
        if result.rows_affected == 0 {
            return Err(StoreError::ServiceNotFound(service_id));
        }
        Ok(())
    }

    async fn overwrite_service_counters(
        &self,
        service_id: i32,
        status: &str,
        success_count: i32,
        failure_count: i32,
        comment: Option<String>,
    ) -> Result<(), StoreError> {
        let result = services::overwrite_counters(
            &self.db,
            service_id,
            status,
            success_count,
            failure_count,
            comment.as_deref(),
            Utc::now().naive_utc(),
        )
        .await?;
        if result.rows_affected == 0 {
            return Err(StoreError::ServiceNotFound(service_id));
        }
        Ok(())
    }

    async fn existing_service_names(&self, names: &[String]) -> Result<Vec<String>, StoreError> {
        Ok(services::existing_service_names(&self.db, names).await?)
    }

    async fn insert_service(&self, service: NewService) -> Result<i32, StoreError> {
        let model = services::insert_service(&self.db, service).await?;
        debug!(service_id = model.id, name = %model.name, "Inserted monitored service.");
        Ok(model.id)
    }

    async fn upsert_cloud_service(&self, system: &CloudSystem) -> Result<Upserted, StoreError> {
        let upserted = services::upsert_cloud_service(&self.db, system).await?;
        debug!(name = %system.name, ?upserted, "Mirrored cloud system.");
        Ok(upserted)
    }
}
