use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monitoring_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub service_id: Option<i32>,
    pub checked_at: Option<ChronoDateTime>,
    pub status: String,
    pub message: Option<String>,
    pub notification_sent: Option<bool>,
    pub updated_at: Option<ChronoDateTime>,
    pub comment: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::monitored_service::Entity",
        from = "Column::ServiceId",
        to = "super::monitored_service::Column::Id",
        on_delete = "Cascade"
    )]
    MonitoredService,
}

impl Related<super::monitored_service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonitoredService.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
