use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "bonus_ticket_status"
)]
#[serde(rename_all = "snake_case")]
pub enum BonusTicketStatus {
    #[sea_orm(string_value = "issued")]
    Issued,
    #[sea_orm(string_value = "used")]
    Used,
}

impl std::fmt::Display for BonusTicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BonusTicketStatus::Issued => write!(f, "issued"),
            BonusTicketStatus::Used => write!(f, "used"),
        }
    }
}

/// 额外抽奖券实体
/// 状态只能 issued -> used 单向流转，使用时记录 used_at
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "roulette_bonus_tickets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub ticket_idx: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub ticket_date: NaiveDate,
    pub status: BonusTicketStatus,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
