use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monitored_services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub ip_address: String,
    pub port: Option<i32>,
    pub protocol: String,
    pub check_interval_sec: Option<i32>,
    pub interval_type: Option<String>,
    pub interval_value: Option<i32>,
    pub interval_unit: Option<String>,
    pub cron_expression: Option<String>,
    pub cron_job_name: Option<String>,
    pub last_status: Option<String>,
    pub success_count: Option<i32>,
    pub failure_count: Option<i32>,
    pub created_at: Option<ChronoDateTime>,
    pub updated_at: Option<ChronoDateTime>,
    pub comment: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
    #[sea_orm(column_name = "type")]
    pub service_type: Option<String>,
    pub collection: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::monitoring_log::Entity")]
    MonitoringLog,
}

impl Related<super::monitoring_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonitoringLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
