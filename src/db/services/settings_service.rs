use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use crate::db::entities::dashboard_config;

/// Retrieves a configuration value by its name.
pub async fn get_config(db: &DatabaseConnection, key: &str) -> Result<Option<String>, DbErr> {
    let row = dashboard_config::Entity::find()
        .filter(dashboard_config::Column::Name.eq(key))
        .one(db)
        .await?;
    Ok(row.and_then(|r| r.configuration))
}
