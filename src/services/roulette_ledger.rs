//! 转盘相关表的存储访问
//!
//! 所有函数对 `ConnectionTrait` 泛型，既可在抽奖事务内调用，也可在事务回滚后
//! 直接用连接池重新读取。

use crate::entities::{
    BonusTicketStatus, GrantSourceType, GrantStatus, SpinType, bonus_ticket_entity as tickets,
    grant_entity as grants, reward_entity as rewards, spin_entity as spins,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr,
};

/// request_id 唯一索引
pub const REQUEST_UNIQUE_CONSTRAINT: &str = "uq_spins_request";
/// daily 每日一次的部分唯一索引
pub const DAILY_UNIQUE_CONSTRAINT: &str = "uq_spins_daily_once";

/// 写入抽奖流水时触发的唯一约束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinConflict {
    /// 同一 request_id 已被并发请求写入
    RequestId,
    /// 当日 daily 抽奖已存在
    DailyOnce,
}

impl SpinConflict {
    /// 按数据库报错信息中的约束名识别
    pub fn from_message(message: &str) -> Option<Self> {
        if message.contains(DAILY_UNIQUE_CONSTRAINT) {
            Some(SpinConflict::DailyOnce)
        } else if message.contains(REQUEST_UNIQUE_CONSTRAINT) {
            Some(SpinConflict::RequestId)
        } else {
            None
        }
    }
}

/// 仅识别唯一约束冲突，其余错误返回 None
pub fn spin_conflict(err: &DbErr) -> Option<SpinConflict> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => SpinConflict::from_message(&message),
        _ => None,
    }
}

pub struct NewSpin<'a> {
    pub event_id: i64,
    pub user_id: i64,
    pub spin_date: NaiveDate,
    pub spin_type: SpinType,
    pub request_id: &'a str,
    pub reward_id: &'a str,
}

pub struct NewGrant<'a> {
    pub user_id: i64,
    pub amount: i64,
    pub source_id: i64,
    pub request_id: &'a str,
    pub status: GrantStatus,
}

pub async fn find_spin_by_request_id<C: ConnectionTrait>(
    db: &C,
    request_id: &str,
) -> Result<Option<spins::Model>, DbErr> {
    spins::Entity::find()
        .filter(spins::Column::RequestId.eq(request_id))
        .one(db)
        .await
}

pub async fn find_reward<C: ConnectionTrait>(
    db: &C,
    event_id: i64,
    reward_id: &str,
) -> Result<Option<rewards::Model>, DbErr> {
    rewards::Entity::find()
        .filter(rewards::Column::EventId.eq(event_id))
        .filter(rewards::Column::RewardId.eq(reward_id))
        .one(db)
        .await
}

/// 活动下启用的奖励，按 id 升序（即加权抽取时的累加顺序）
pub async fn active_rewards<C: ConnectionTrait>(
    db: &C,
    event_id: i64,
) -> Result<Vec<rewards::Model>, DbErr> {
    rewards::Entity::find()
        .filter(rewards::Column::EventId.eq(event_id))
        .filter(rewards::Column::IsActive.eq(true))
        .order_by_asc(rewards::Column::Id)
        .all(db)
        .await
}

/// `SELECT ... FOR UPDATE` 锁定当日最早的一张 issued 抽奖券。
/// 锁持有到事务结束，并发的 bonus 抽奖会在此阻塞。
pub async fn lock_issued_ticket<C: ConnectionTrait>(
    db: &C,
    event_id: i64,
    user_id: i64,
    ticket_date: NaiveDate,
) -> Result<Option<tickets::Model>, DbErr> {
    tickets::Entity::find()
        .filter(tickets::Column::EventId.eq(event_id))
        .filter(tickets::Column::UserId.eq(user_id))
        .filter(tickets::Column::TicketDate.eq(ticket_date))
        .filter(tickets::Column::Status.eq(BonusTicketStatus::Issued))
        .order_by_asc(tickets::Column::TicketIdx)
        .lock_exclusive()
        .one(db)
        .await
}

/// issued -> used，必须在持有行锁的同一事务内调用
pub async fn mark_ticket_used<C: ConnectionTrait>(
    db: &C,
    ticket_idx: i64,
    used_at: DateTime<Utc>,
) -> Result<(), DbErr> {
    let result = tickets::Entity::update_many()
        .set(tickets::ActiveModel {
            status: Set(BonusTicketStatus::Used),
            used_at: Set(Some(used_at)),
            ..Default::default()
        })
        .filter(tickets::Column::TicketIdx.eq(ticket_idx))
        .filter(tickets::Column::Status.eq(BonusTicketStatus::Issued))
        .exec(db)
        .await?;

    if result.rows_affected != 1 {
        return Err(DbErr::RecordNotUpdated);
    }
    Ok(())
}

/// 插入抽奖流水；唯一约束由数据库检查，冲突以 DbErr 返回给调用方分类
pub async fn insert_spin<C: ConnectionTrait>(
    db: &C,
    spin: NewSpin<'_>,
) -> Result<spins::Model, DbErr> {
    spins::ActiveModel {
        event_id: Set(spin.event_id),
        user_id: Set(spin.user_id),
        spin_date: Set(spin.spin_date),
        spin_type: Set(spin.spin_type),
        request_id: Set(spin.request_id.to_string()),
        reward_id: Set(spin.reward_id.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn insert_grant<C: ConnectionTrait>(
    db: &C,
    grant: NewGrant<'_>,
) -> Result<grants::Model, DbErr> {
    grants::ActiveModel {
        user_id: Set(grant.user_id),
        amount: Set(grant.amount),
        source_type: Set(GrantSourceType::Roulette),
        source_id: Set(grant.source_id),
        request_id: Set(grant.request_id.to_string()),
        status: Set(grant.status),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// 运营发放抽奖券
pub async fn insert_issued_ticket<C: ConnectionTrait>(
    db: &C,
    event_id: i64,
    user_id: i64,
    ticket_date: NaiveDate,
) -> Result<tickets::Model, DbErr> {
    tickets::ActiveModel {
        event_id: Set(event_id),
        user_id: Set(user_id),
        ticket_date: Set(ticket_date),
        status: Set(BonusTicketStatus::Issued),
        ..Default::default()
    }
    .insert(db)
    .await
}
