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
    enum_name = "roulette_spin_type"
)]
#[serde(rename_all = "snake_case")]
pub enum SpinType {
    /// 每日免费一次
    #[sea_orm(string_value = "daily")]
    Daily,
    /// 消耗一张额外抽奖券
    #[sea_orm(string_value = "bonus")]
    Bonus,
}

impl SpinType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(SpinType::Daily),
            "bonus" => Some(SpinType::Bonus),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpinType::Daily => write!(f, "daily"),
            SpinType::Bonus => write!(f, "bonus"),
        }
    }
}

/// 抽奖流水实体 (只追加，创建后不可修改)
/// 约束由数据库保证:
/// - uq_spins_request: request_id 唯一（幂等）
/// - uq_spins_daily_once: spin_type = daily 时 (event_id, user_id, spin_date) 唯一
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "roulette_spins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub spin_idx: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub spin_date: NaiveDate,
    pub spin_type: SpinType,
    pub request_id: String,
    pub reward_id: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reward_grant_logs::Entity")]
    Grants,
}

impl Related<super::reward_grant_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
