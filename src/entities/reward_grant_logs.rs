use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "grant_status")]
#[serde(rename_all = "snake_case")]
pub enum GrantStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl std::fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrantStatus::Pending => write!(f, "pending"),
            GrantStatus::Approved => write!(f, "approved"),
            GrantStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "grant_source_type"
)]
#[serde(rename_all = "snake_case")]
pub enum GrantSourceType {
    #[sea_orm(string_value = "roulette")]
    Roulette,
}

impl std::fmt::Display for GrantSourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrantSourceType::Roulette => write!(f, "roulette"),
        }
    }
}

/// 奖励发放记录实体
/// 说明:
/// - source_type = roulette 时 source_id 指向 roulette_spins.spin_idx
/// - request_id 与产生它的抽奖请求相同
/// - status 仅能从 pending 单向变为 approved / rejected，由条件更新保证只成功一次
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "reward_grant_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub grant_idx: i64,
    pub user_id: i64,
    pub amount: i64,
    pub source_type: GrantSourceType,
    pub source_id: i64,
    pub request_id: String,
    pub status: GrantStatus,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<i64>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub decision_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::roulette_spins::Entity",
        from = "Column::SourceId",
        to = "super::roulette_spins::Column::SpinIdx",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Spin,
}

impl Related<super::roulette_spins::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Spin.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
