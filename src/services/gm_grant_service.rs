use crate::database::DbPool;
use crate::entities::{
    GrantSourceType, GrantStatus, gm_action_entity as actions, grant_entity as grants,
    spin_entity as spins,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    DecisionOutcome, DecisionResult, GrantAction, GrantSummary, PendingGrantQuery,
};
use crate::utils::PageWindow;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set,
};

/// 审批日志的 target_type
const GRANT_TARGET_TYPE: &str = "reward_grant";

/// 发放记录审批（GM 后台）
#[derive(Clone)]
pub struct GmGrantService {
    pool: DbPool,
    default_limit: u64,
}

impl GmGrantService {
    pub fn new(pool: DbPool, default_limit: u64) -> Self {
        Self {
            pool,
            default_limit,
        }
    }

    /// 待审批列表，按创建时间升序
    ///
    /// 传 event_id 时只看转盘来源，并通过 source_id 关联抽奖流水过滤活动。
    pub async fn list_pending(&self, query: &PendingGrantQuery) -> AppResult<Vec<GrantSummary>> {
        let window = PageWindow::new(query.limit, query.offset, self.default_limit);

        let mut select =
            grants::Entity::find().filter(grants::Column::Status.eq(GrantStatus::Pending));

        if let Some(event_id) = query.event_id {
            select = select
                .join(JoinType::InnerJoin, grants::Relation::Spin.def())
                .filter(grants::Column::SourceType.eq(GrantSourceType::Roulette))
                .filter(spins::Column::EventId.eq(event_id));
        }

        let list = select
            .order_by_asc(grants::Column::CreatedAt)
            .order_by_asc(grants::Column::GrantIdx)
            .limit(window.limit)
            .offset(window.offset)
            .all(self.pool.as_ref())
            .await?;

        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn approve(
        &self,
        grant_idx: i64,
        actor_id: i64,
        memo: Option<String>,
    ) -> DecisionResult {
        let outcome = self
            .decide(GrantAction::Approve, grant_idx, actor_id, None)
            .await;
        self.finish(GrantAction::Approve, grant_idx, actor_id, outcome, memo)
            .await
    }

    pub async fn reject(
        &self,
        grant_idx: i64,
        actor_id: i64,
        reason: Option<String>,
        memo: Option<String>,
    ) -> DecisionResult {
        let outcome = self
            .decide(GrantAction::Reject, grant_idx, actor_id, reason.clone())
            .await;
        self.finish(GrantAction::Reject, grant_idx, actor_id, outcome, memo.or(reason))
            .await
    }

    /// 单条条件更新 `WHERE grant_idx = ? AND status = 'pending'`，
    /// 并发审批只有一个能影响到 1 行；0 行即已被处理（或不存在）。
    pub async fn decide(
        &self,
        action: GrantAction,
        grant_idx: i64,
        actor_id: i64,
        reason: Option<String>,
    ) -> AppResult<DecisionOutcome> {
        if grant_idx <= 0 || actor_id <= 0 {
            return Err(AppError::ValidationError(
                "grant_idx and actor_id must be positive".into(),
            ));
        }

        let now = Utc::now();
        let target = action.target_status();
        let mut changes = grants::ActiveModel {
            status: Set(target),
            ..Default::default()
        };
        match action {
            GrantAction::Approve => {
                changes.approved_by = Set(Some(actor_id));
                changes.approved_at = Set(Some(now));
            }
            GrantAction::Reject => {
                changes.rejected_by = Set(Some(actor_id));
                changes.rejected_at = Set(Some(now));
                changes.decision_reason = Set(reason);
            }
        }

        let result = grants::Entity::update_many()
            .set(changes)
            .filter(grants::Column::GrantIdx.eq(grant_idx))
            .filter(grants::Column::Status.eq(GrantStatus::Pending))
            .exec(self.pool.as_ref())
            .await?;

        if result.rows_affected != 1 {
            return Ok(DecisionOutcome::AlreadyDecided);
        }
        Ok(DecisionOutcome::Decided(target))
    }

    async fn finish(
        &self,
        action: GrantAction,
        grant_idx: i64,
        actor_id: i64,
        outcome: AppResult<DecisionOutcome>,
        memo: Option<String>,
    ) -> DecisionResult {
        match outcome {
            Ok(DecisionOutcome::Decided(status)) => {
                log::info!("Grant {grant_idx} {status} by actor {actor_id}");
                self.record_action(actor_id, action, grant_idx, memo).await;
                DecisionResult::decided()
            }
            Ok(DecisionOutcome::AlreadyDecided) => {
                log::info!(
                    "Grant {grant_idx} already decided, {} by actor {actor_id} ignored",
                    action.as_str()
                );
                DecisionResult::already_decided()
            }
            Err(AppError::ValidationError(msg)) => DecisionResult::failed("INVALID_ARGUMENT", msg),
            Err(e) => {
                log::error!("Failed to {} grant {grant_idx}: {e}", action.as_str());
                DecisionResult::failed(action.failure_code(), e.to_string())
            }
        }
    }

    /// 审批日志尽力写入：失败只记 warn，不影响已提交的审批结果。
    // TODO: 审批日志写入失败目前只打日志，需要接入告警或补偿重试
    async fn record_action(
        &self,
        actor_id: i64,
        action: GrantAction,
        grant_idx: i64,
        memo: Option<String>,
    ) {
        let entry = actions::ActiveModel {
            actor_id: Set(actor_id),
            action_type: Set(action.as_str().to_string()),
            target_type: Set(GRANT_TARGET_TYPE.to_string()),
            target_id: Set(grant_idx),
            memo: Set(memo),
            ..Default::default()
        };
        if let Err(e) = entry.insert(self.pool.as_ref()).await {
            log::warn!(
                "Failed to write gm action log ({} grant {grant_idx}): {e}",
                action.as_str()
            );
        }
    }
}
