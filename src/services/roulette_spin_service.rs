use crate::database::DbPool;
use crate::entities::{GrantStatus, SpinType, spin_entity as spins};
use crate::error::{AppError, AppResult};
use crate::models::{
    GrantRef, RewardResponse, SpinCommand, SpinData, SpinErrorCode, SpinOutcome, SpinRejection,
    SpinResult, SpinView,
};
use crate::services::roulette_ledger::{self as ledger, NewGrant, NewSpin, SpinConflict};
use crate::utils::{ThreadRngDraw, WeightDraw, pick_weighted};
use chrono::{Local, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, DbErr, TransactionTrait};

#[derive(Clone)]
pub struct RouletteSpinService {
    pool: DbPool,
}

impl RouletteSpinService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 活动当前启用的奖励（按抽取顺序）
    pub async fn list_active_rewards(&self, event_id: i64) -> AppResult<Vec<RewardResponse>> {
        if event_id <= 0 {
            return Err(AppError::ValidationError("event_id must be positive".into()));
        }
        let list = ledger::active_rewards(self.pool.as_ref(), event_id).await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// 抽奖入口：校验入参后执行抽奖事务，所有结果折叠为 [`SpinResult`]。
    pub async fn spin(
        &self,
        event_id: i64,
        user_id: i64,
        spin_type: &str,
        request_id: &str,
    ) -> SpinResult {
        let cmd = match SpinCommand::parse(event_id, user_id, spin_type, request_id) {
            Ok(cmd) => cmd,
            Err(code) => return SpinResult::failure(code, code.default_message()),
        };
        self.spin_with(&cmd, &mut ThreadRngDraw).await
    }

    pub async fn spin_with<D>(&self, cmd: &SpinCommand, source: &mut D) -> SpinResult
    where
        D: WeightDraw + ?Sized,
    {
        let today = Local::now().date_naive();
        match self.execute(cmd, today, source).await {
            Ok(SpinOutcome::Completed(data)) => SpinResult::success(data),
            Ok(SpinOutcome::Rejected(rejection)) => {
                let code = rejection.code();
                SpinResult::failure(code, code.default_message())
            }
            Err(e) => {
                log::error!(
                    "Spin failed for request {} (event {}, user {}): {e}",
                    cmd.request_id,
                    cmd.event_id,
                    cmd.user_id
                );
                SpinResult::failure(SpinErrorCode::SpinFailed, e.to_string())
            }
        }
    }

    /// 抽奖事务
    ///
    /// 逻辑:
    /// 1. 按 request_id 查已有流水，命中则重放原结果 (idempotent = true)
    /// 2. bonus: 锁定当日最早一张 issued 抽奖券并置为 used，无券则 NO_BONUS_TICKET
    /// 3. 读取启用奖励并按权重抽取
    /// 4. 写抽奖流水，唯一约束由数据库保证
    /// 5. 写发放记录: point 直接 approved，其它 pending 等待审批
    ///
    /// 第 4 步唯一约束冲突时回滚并重新读取: request_id 冲突收敛到胜出的那条流水，
    /// daily 冲突返回 DAILY_LIMIT_REACHED。
    /// 事务对象在任何未 commit 的退出路径上被 drop 即回滚。
    pub async fn execute<D>(
        &self,
        cmd: &SpinCommand,
        today: NaiveDate,
        source: &mut D,
    ) -> AppResult<SpinOutcome>
    where
        D: WeightDraw + ?Sized,
    {
        let txn = self.pool.begin().await?;

        if let Some(existing) = ledger::find_spin_by_request_id(&txn, &cmd.request_id).await? {
            let data = replay(&txn, existing).await?;
            txn.commit().await?;
            log::info!(
                "Replayed spin {} for request {}",
                data.spin.spin_idx,
                cmd.request_id
            );
            return Ok(SpinOutcome::Completed(data));
        }

        if cmd.spin_type == SpinType::Bonus {
            let Some(ticket) =
                ledger::lock_issued_ticket(&txn, cmd.event_id, cmd.user_id, today).await?
            else {
                txn.rollback().await?;
                log::info!(
                    "No bonus ticket for user {} in event {} on {today}",
                    cmd.user_id,
                    cmd.event_id
                );
                return Ok(SpinOutcome::Rejected(SpinRejection::NoBonusTicket));
            };
            ledger::mark_ticket_used(&txn, ticket.ticket_idx, Utc::now()).await?;
        }

        let rewards = ledger::active_rewards(&txn, cmd.event_id).await?;
        if rewards.is_empty() {
            log::error!("Event {} has no active rewards", cmd.event_id);
            return Err(AppError::NoActiveRewards);
        }
        let picked = pick_weighted(&rewards, source)?;

        let spin = match ledger::insert_spin(
            &txn,
            NewSpin {
                event_id: cmd.event_id,
                user_id: cmd.user_id,
                spin_date: today,
                spin_type: cmd.spin_type,
                request_id: &cmd.request_id,
                reward_id: &picked.reward_id,
            },
        )
        .await
        {
            Ok(spin) => spin,
            Err(err) => {
                txn.rollback().await?;
                return self.resolve_conflict(cmd, err).await;
            }
        };

        let status = if picked.reward_type.is_self_service() {
            GrantStatus::Approved
        } else {
            GrantStatus::Pending
        };
        let grant = ledger::insert_grant(
            &txn,
            NewGrant {
                user_id: cmd.user_id,
                amount: picked.reward_value,
                source_id: spin.spin_idx,
                request_id: &cmd.request_id,
                status,
            },
        )
        .await?;

        txn.commit().await?;

        log::info!(
            "Spin {} ({}) for user {} in event {} won {} -> grant {} {}",
            spin.spin_idx,
            cmd.spin_type,
            cmd.user_id,
            cmd.event_id,
            picked.reward_id,
            grant.grant_idx,
            grant.status
        );

        Ok(SpinOutcome::Completed(SpinData {
            idempotent: false,
            spin: SpinView::new(&spin, Some(picked)),
            grant: Some(GrantRef {
                grant_idx: grant.grant_idx,
                status: grant.status,
            }),
        }))
    }

    /// 写流水失败后（事务已回滚）的处理
    async fn resolve_conflict(&self, cmd: &SpinCommand, err: DbErr) -> AppResult<SpinOutcome> {
        let Some(conflict) = ledger::spin_conflict(&err) else {
            return Err(err.into());
        };

        let existing =
            ledger::find_spin_by_request_id(self.pool.as_ref(), &cmd.request_id).await?;
        match converge(conflict, existing, &cmd.request_id)? {
            Convergence::Replay(spin) => {
                let data = replay(self.pool.as_ref(), spin).await?;
                log::info!(
                    "Concurrent request {} converged on spin {}",
                    cmd.request_id,
                    data.spin.spin_idx
                );
                Ok(SpinOutcome::Completed(data))
            }
            Convergence::Reject(rejection) => {
                log::info!(
                    "Daily spin already used by user {} in event {}",
                    cmd.user_id,
                    cmd.event_id
                );
                Ok(SpinOutcome::Rejected(rejection))
            }
        }
    }
}

/// 唯一约束冲突后的去向
#[derive(Debug, Clone, PartialEq)]
enum Convergence {
    Replay(spins::Model),
    Reject(SpinRejection),
}

/// 冲突后按 request_id 重新读取的结果决定去向。
/// 同一 request_id 的并发请求可能先撞上 daily 约束，所以先看 request_id 是否已落库。
fn converge(
    conflict: SpinConflict,
    existing: Option<spins::Model>,
    request_id: &str,
) -> AppResult<Convergence> {
    if let Some(spin) = existing {
        return Ok(Convergence::Replay(spin));
    }
    match conflict {
        SpinConflict::DailyOnce => Ok(Convergence::Reject(SpinRejection::DailyLimitReached)),
        SpinConflict::RequestId => Err(AppError::InternalError(format!(
            "spin for request {request_id} missing after unique conflict"
        ))),
    }
}

/// 以已有流水构造重放结果；奖励快照取当前配置
async fn replay<C: ConnectionTrait>(db: &C, spin: spins::Model) -> Result<SpinData, DbErr> {
    let reward = ledger::find_reward(db, spin.event_id, &spin.reward_id).await?;
    Ok(SpinData {
        idempotent: true,
        spin: SpinView::new(&spin, reward.as_ref()),
        grant: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        BonusTicketStatus, GrantSourceType, RewardType, bonus_ticket_entity as tickets,
        grant_entity as grants, reward_entity as rewards,
    };
    use crate::database::mock::{shared, transaction_log};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    fn reward(
        id: i64,
        reward_id: &str,
        reward_type: RewardType,
        value: i64,
        weight: i32,
    ) -> rewards::Model {
        rewards::Model {
            id,
            event_id: 1,
            reward_id: reward_id.to_string(),
            reward_type,
            reward_value: value,
            weight,
            is_active: true,
            created_at: None,
        }
    }

    fn spin_row(
        spin_idx: i64,
        spin_type: SpinType,
        request_id: &str,
        reward_id: &str,
    ) -> spins::Model {
        spins::Model {
            spin_idx,
            event_id: 1,
            user_id: 7,
            spin_date: day(),
            spin_type,
            request_id: request_id.to_string(),
            reward_id: reward_id.to_string(),
            created_at: None,
        }
    }

    fn grant_row(
        grant_idx: i64,
        source_id: i64,
        amount: i64,
        status: GrantStatus,
    ) -> grants::Model {
        grants::Model {
            grant_idx,
            user_id: 7,
            amount,
            source_type: GrantSourceType::Roulette,
            source_id,
            request_id: "req-1".to_string(),
            status,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            decision_reason: None,
            created_at: None,
        }
    }

    fn ticket_row(ticket_idx: i64) -> tickets::Model {
        tickets::Model {
            ticket_idx,
            event_id: 1,
            user_id: 7,
            ticket_date: day(),
            status: BonusTicketStatus::Issued,
            used_at: None,
            created_at: None,
        }
    }

    fn cmd(spin_type: SpinType, request_id: &str) -> SpinCommand {
        SpinCommand {
            event_id: 1,
            user_id: 7,
            spin_type,
            request_id: request_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_daily_spin_grants_point_as_approved() {
        let db = shared(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<spins::Model>::new()])
                .append_query_results([vec![reward(1, "R1", RewardType::Point, 100, 1)]])
                .append_query_results([vec![spin_row(10, SpinType::Daily, "req-1", "R1")]])
                .append_query_results([vec![grant_row(20, 10, 100, GrantStatus::Approved)]]),
        );
        let service = RouletteSpinService::new(db);

        let outcome = service
            .execute(&cmd(SpinType::Daily, "req-1"), day(), &mut |_: i64| 1)
            .await
            .unwrap();

        let SpinOutcome::Completed(data) = outcome else {
            panic!("expected completed spin, got {outcome:?}");
        };
        assert!(!data.idempotent);
        assert_eq!(data.spin.spin_idx, 10);
        assert_eq!(data.spin.spin_type, SpinType::Daily);
        assert_eq!(data.spin.reward_id, "R1");
        assert_eq!(data.spin.reward_value, Some(100));
        let grant = data.grant.unwrap();
        assert_eq!(grant.grant_idx, 20);
        assert_eq!(grant.status, GrantStatus::Approved);
    }

    #[tokio::test]
    async fn test_spin_inserts_status_by_reward_type() {
        let db = shared(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<spins::Model>::new()])
                .append_query_results([vec![
                    reward(1, "P", RewardType::Point, 100, 1),
                    reward(2, "GIFT", RewardType::Item, 1, 3),
                ]])
                .append_query_results([vec![spin_row(11, SpinType::Daily, "req-1", "GIFT")]])
                .append_query_results([vec![grant_row(21, 11, 1, GrantStatus::Pending)]]),
        );
        let service = RouletteSpinService::new(db.clone());

        let outcome = service
            .execute(&cmd(SpinType::Daily, "req-1"), day(), &mut |_: i64| 2)
            .await
            .unwrap();
        let SpinOutcome::Completed(data) = outcome else {
            panic!("expected completed spin");
        };
        assert_eq!(data.spin.reward_type, Some(RewardType::Item));
        assert_eq!(data.grant.unwrap().status, GrantStatus::Pending);

        drop(service);
        let log = format!("{:?}", transaction_log(db));
        assert!(log.contains("reward_grant_log"));
        assert!(log.contains("pending"));
    }

    #[tokio::test]
    async fn test_existing_request_is_replayed_without_insert() {
        let db = shared(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![spin_row(10, SpinType::Daily, "req-1", "R1")]])
                .append_query_results([vec![reward(1, "R1", RewardType::Point, 100, 1)]]),
        );
        let service = RouletteSpinService::new(db.clone());

        let outcome = service
            .execute(&cmd(SpinType::Daily, "req-1"), day(), &mut |_: i64| 1)
            .await
            .unwrap();
        let SpinOutcome::Completed(data) = outcome else {
            panic!("expected replay");
        };
        assert!(data.idempotent);
        assert_eq!(data.spin.spin_idx, 10);
        assert_eq!(data.spin.reward_value, Some(100));
        assert!(data.grant.is_none());

        drop(service);
        let log = format!("{:?}", transaction_log(db));
        assert!(!log.contains("INSERT"));
        assert!(!log.contains("UPDATE"));
    }

    #[tokio::test]
    async fn test_replay_with_removed_reward_has_empty_snapshot() {
        let db = shared(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![spin_row(10, SpinType::Bonus, "req-9", "GONE")]])
                .append_query_results([Vec::<rewards::Model>::new()]),
        );
        let service = RouletteSpinService::new(db);

        let outcome = service
            .execute(&cmd(SpinType::Bonus, "req-9"), day(), &mut |_: i64| 1)
            .await
            .unwrap();
        let SpinOutcome::Completed(data) = outcome else {
            panic!("expected replay");
        };
        assert!(data.idempotent);
        assert_eq!(data.spin.reward_id, "GONE");
        assert_eq!(data.spin.reward_type, None);
        assert_eq!(data.spin.reward_value, None);
    }

    #[tokio::test]
    async fn test_bonus_without_ticket_is_rejected() {
        let db = shared(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<spins::Model>::new()])
                .append_query_results([Vec::<tickets::Model>::new()]),
        );
        let service = RouletteSpinService::new(db.clone());

        let outcome = service
            .execute(&cmd(SpinType::Bonus, "req-2"), day(), &mut |_: i64| 1)
            .await
            .unwrap();
        assert_eq!(outcome, SpinOutcome::Rejected(SpinRejection::NoBonusTicket));

        drop(service);
        let log = format!("{:?}", transaction_log(db));
        assert!(log.contains("FOR UPDATE"));
        assert!(!log.contains("INSERT"));
    }

    #[tokio::test]
    async fn test_bonus_consumes_locked_ticket() {
        let db = shared(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<spins::Model>::new()])
                .append_query_results([vec![ticket_row(5)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([vec![reward(1, "R1", RewardType::Point, 100, 1)]])
                .append_query_results([vec![spin_row(12, SpinType::Bonus, "req-3", "R1")]])
                .append_query_results([vec![grant_row(22, 12, 100, GrantStatus::Approved)]]),
        );
        let service = RouletteSpinService::new(db.clone());

        let outcome = service
            .execute(&cmd(SpinType::Bonus, "req-3"), day(), &mut |_: i64| 1)
            .await
            .unwrap();
        let SpinOutcome::Completed(data) = outcome else {
            panic!("expected completed spin");
        };
        assert_eq!(data.spin.spin_type, SpinType::Bonus);

        drop(service);
        let log = format!("{:?}", transaction_log(db));
        assert!(log.contains("FOR UPDATE"));
        assert!(log.contains("UPDATE \\\"roulette_bonus_tickets\\\" SET"));
    }

    #[tokio::test]
    async fn test_ticket_lost_between_lock_and_update_fails() {
        let db = shared(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<spins::Model>::new()])
                .append_query_results([vec![ticket_row(5)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }]),
        );
        let service = RouletteSpinService::new(db);

        let result = service
            .execute(&cmd(SpinType::Bonus, "req-4"), day(), &mut |_: i64| 1)
            .await;
        assert!(matches!(
            result,
            Err(AppError::DatabaseError(DbErr::RecordNotUpdated))
        ));
    }

    #[tokio::test]
    async fn test_empty_catalog_is_fatal() {
        let db = shared(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<spins::Model>::new()])
                .append_query_results([Vec::<rewards::Model>::new()]),
        );
        let service = RouletteSpinService::new(db);

        let result = service
            .execute(&cmd(SpinType::Daily, "req-5"), day(), &mut |_: i64| 1)
            .await;
        assert!(matches!(result, Err(AppError::NoActiveRewards)));
    }

    #[tokio::test]
    async fn test_zero_weights_fail_as_spin_failed() {
        let db = shared(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<spins::Model>::new()])
                .append_query_results([vec![reward(1, "R1", RewardType::Point, 100, 0)]]),
        );
        let service = RouletteSpinService::new(db);

        let result = service
            .spin_with(&cmd(SpinType::Daily, "req-6"), &mut |_: i64| 1)
            .await;
        assert!(!result.ok);
        assert_eq!(result.code, Some(SpinErrorCode::SpinFailed));
        assert_eq!(result.error.unwrap().message, "INVALID_REWARD_WEIGHTS");
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_touch_storage() {
        let db = shared(MockDatabase::new(DatabaseBackend::Postgres));
        let service = RouletteSpinService::new(db.clone());

        let result = service.spin(1, 7, "weekly", "req-7").await;
        assert_eq!(result.code, Some(SpinErrorCode::InvalidSpinType));

        let result = service.spin(0, 7, "daily", "req-7").await;
        assert_eq!(result.code, Some(SpinErrorCode::InvalidArgument));
        assert_eq!(result.status(), actix_web::http::StatusCode::BAD_REQUEST);

        drop(service);
        assert!(transaction_log(db).is_empty());
    }

    #[test]
    fn test_conflict_with_winning_row_replays_it() {
        let winner = spin_row(10, SpinType::Daily, "req-1", "R1");
        for conflict in [SpinConflict::RequestId, SpinConflict::DailyOnce] {
            let resolved = converge(conflict, Some(winner.clone()), "req-1").unwrap();
            assert_eq!(resolved, Convergence::Replay(winner.clone()));
        }
    }

    #[test]
    fn test_daily_conflict_without_row_is_limit_reached() {
        let resolved = converge(SpinConflict::DailyOnce, None, "req-2").unwrap();
        assert_eq!(resolved, Convergence::Reject(SpinRejection::DailyLimitReached));
    }

    #[test]
    fn test_request_conflict_without_row_is_internal_error() {
        let err = converge(SpinConflict::RequestId, None, "req-3").unwrap_err();
        assert!(matches!(err, AppError::InternalError(_)));
        assert!(err.to_string().contains("req-3"));
    }
}
