use chrono::{DateTime, Utc};
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
    enum_name = "roulette_reward_type"
)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    /// 积分，直接到账无需审批
    #[sea_orm(string_value = "point")]
    Point,
    #[sea_orm(string_value = "item")]
    Item,
    #[sea_orm(string_value = "coupon")]
    Coupon,
}

impl RewardType {
    /// 是否为自助到账类型（发放记录直接为 approved）
    pub fn is_self_service(&self) -> bool {
        matches!(self, RewardType::Point)
    }
}

impl std::fmt::Display for RewardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewardType::Point => write!(f, "point"),
            RewardType::Item => write!(f, "item"),
            RewardType::Coupon => write!(f, "coupon"),
        }
    }
}

/// 转盘奖励配置实体
/// 说明:
/// - reward_id 在同一活动内唯一，抽奖流水以 (event_id, reward_id) 引用
/// - weight 为非负整数权重，0 表示不参与抽取
/// - 仅 is_active = true 的奖励参与抽奖
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "roulette_rewards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub event_id: i64,
    pub reward_id: String,
    pub reward_type: RewardType,
    /// 奖励数值（积分数 / 面值）
    pub reward_value: i64,
    pub weight: i32,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
