//! Queries against `monitored_services` and `monitoring_logs`.

use chrono::NaiveDateTime;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryFilter,
    QueryOrder, QuerySelect, Set, UpdateMany, UpdateResult,
};

use crate::db::entities::{monitored_service, monitoring_log};
use crate::db::enums::ServiceKind;
use crate::db::models::{CloudSystem, NewLogEntry, NewService, Upserted};

pub async fn list_active_services(
    db: &DatabaseConnection,
) -> Result<Vec<monitored_service::Model>, DbErr> {
    monitored_service::Entity::find()
        .filter(monitored_service::Column::IsActive.eq(true))
        .order_by_asc(monitored_service::Column::Id)
        .all(db)
        .await
}

pub async fn find_service(
    db: &DatabaseConnection,
    service_id: i32,
) -> Result<Option<monitored_service::Model>, DbErr> {
    monitored_service::Entity::find_by_id(service_id).one(db).await
}

pub async fn insert_log(db: &DatabaseConnection, entry: &NewLogEntry) -> Result<(), DbErr> {
    let log = monitoring_log::ActiveModel {
        id: NotSet,
        service_id: Set(Some(entry.service_id)),
        status: Set(entry.status.clone()),
        message: Set(Some(entry.message.clone())),
        ..Default::default()
    };
    monitoring_log::Entity::insert(log).exec(db).await?;
    Ok(())
}

fn status_update(
    service_id: i32,
    status: &str,
    success_delta: i32,
    failure_delta: i32,
    updated_at: NaiveDateTime,
) -> UpdateMany<monitored_service::Entity> {
    // Counters may be NULL on rows created by the API.
    let success = Func::coalesce([
        Expr::col(monitored_service::Column::SuccessCount).into(),
        Expr::val(0).into(),
    ]);
    let failure = Func::coalesce([
        Expr::col(monitored_service::Column::FailureCount).into(),
        Expr::val(0).into(),
    ]);

    monitored_service::Entity::update_many()
        .col_expr(monitored_service::Column::LastStatus, Expr::value(status.to_owned()))
        .col_expr(
            monitored_service::Column::SuccessCount,
            Expr::expr(success).add(success_delta),
        )
        .col_expr(
            monitored_service::Column::FailureCount,
            Expr::expr(failure).add(failure_delta),
        )
        .col_expr(monitored_service::Column::UpdatedAt, Expr::value(updated_at))
        .filter(monitored_service::Column::Id.eq(service_id))
}

/// Sets `last_status` and `updated_at` and adds the given deltas to the counters.
pub async fn update_status(
    db: &DatabaseConnection,
    service_id: i32,
    status: &str,
    success_delta: i32,
    failure_delta: i32,
    updated_at: NaiveDateTime,
) -> Result<UpdateResult, DbErr> {
    status_update(service_id, status, success_delta, failure_delta, updated_at)
        .exec(db)
        .await
}

/// Replaces the counters with externally reported totals.
pub async fn overwrite_counters(
    db: &DatabaseConnection,
    service_id: i32,
    status: &str,
    success_count: i32,
    failure_count: i32,
    comment: Option<&str>,
    updated_at: NaiveDateTime,
) -> Result<UpdateResult, DbErr> {
    let mut update = monitored_service::Entity::update_many()
        .col_expr(monitored_service::Column::LastStatus, Expr::value(status.to_owned()))
        .col_expr(monitored_service::Column::SuccessCount, Expr::value(success_count))
        .col_expr(monitored_service::Column::FailureCount, Expr::value(failure_count))
        .col_expr(monitored_service::Column::UpdatedAt, Expr::value(updated_at));
    if let Some(comment) = comment {
        update = update.col_expr(monitored_service::Column::Comment, Expr::value(comment.to_owned()));
    }
    update
        .filter(monitored_service::Column::Id.eq(service_id))
        .exec(db)
        .await
}

/// Returns the subset of `names` that already exist as services.
pub async fn existing_service_names(
    db: &DatabaseConnection,
    names: &[String],
) -> Result<Vec<String>, DbErr> {
    if names.is_empty() {
        return Ok(Vec::new());
    }
    monitored_service::Entity::find()
        .select_only()
        .column(monitored_service::Column::Name)
        .filter(monitored_service::Column::Name.is_in(names.iter().cloned()))
        .into_tuple::<String>()
        .all(db)
        .await
}

pub async fn insert_service(
    db: &DatabaseConnection,
    service: NewService,
) -> Result<monitored_service::Model, DbErr> {
    let now = chrono::Utc::now().naive_utc();
    let model = monitored_service::ActiveModel {
        id: NotSet,
        name: Set(service.name),
        ip_address: Set(service.address),
        port: Set(service.port),
        protocol: Set(service.protocol),
        check_interval_sec: Set(Some(service.check_interval_sec)),
        interval_type: Set(Some(service.interval_type)),
        interval_value: Set(Some(service.interval_value)),
        interval_unit: Set(Some(service.interval_unit)),
        cron_expression: Set(Some(String::new())),
        cron_job_name: Set(Some(String::new())),
        last_status: Set(Some(service.last_status)),
        success_count: Set(Some(0)),
        failure_count: Set(Some(0)),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        comment: Set(service.comment),
        is_active: Set(Some(true)),
        ..Default::default()
    };
    model.insert(db).await
}

/// Mirrors one cloud-inventory system, matching on the service name.
pub async fn upsert_cloud_service(
    db: &DatabaseConnection,
    system: &CloudSystem,
) -> Result<Upserted, DbErr> {
    let kind = ServiceKind::ServerCloud.to_string();
    let updated_at = system.updated_at.naive_utc();
    let existing = monitored_service::Entity::find()
        .filter(monitored_service::Column::Name.eq(system.name.as_str()))
        .order_by_asc(monitored_service::Column::Id)
        .one(db)
        .await?;

    if let Some(existing) = existing {
        monitored_service::Entity::update_many()
            .col_expr(monitored_service::Column::IpAddress, Expr::value(system.address.clone()))
            .col_expr(monitored_service::Column::Port, Expr::value(system.port))
            .col_expr(monitored_service::Column::LastStatus, Expr::value(system.status.clone()))
            .col_expr(monitored_service::Column::UpdatedAt, Expr::value(updated_at))
            .col_expr(monitored_service::Column::ServiceType, Expr::value(kind))
            .filter(monitored_service::Column::Id.eq(existing.id))
            .exec(db)
            .await?;
        return Ok(Upserted::Updated(existing.id));
    }

    let created_at = system.created_at.map_or(updated_at, |ts| ts.naive_utc());
    let model = monitored_service::ActiveModel {
        id: NotSet,
        name: Set(system.name.clone()),
        ip_address: Set(system.address.clone()),
        port: Set(system.port),
        protocol: Set("api".to_string()),
        check_interval_sec: Set(Some(300)),
        interval_type: Set(Some("minutes".to_string())),
        interval_value: Set(Some(5)),
        interval_unit: Set(Some("minutes".to_string())),
        last_status: Set(Some(system.status.clone())),
        success_count: Set(Some(0)),
        failure_count: Set(Some(0)),
        created_at: Set(Some(created_at)),
        updated_at: Set(Some(updated_at)),
        is_active: Set(Some(true)),
        service_type: Set(Some(kind)),
        ..Default::default()
    };
    let inserted = model.insert(db).await?;
    Ok(Upserted::Inserted(inserted.id))
}
