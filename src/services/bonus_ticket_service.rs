use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{IssueBonusTicketsRequest, IssueBonusTicketsResponse};
use crate::services::roulette_ledger as ledger;
use chrono::Local;
use sea_orm::TransactionTrait;

/// 单次发放上限
pub const MAX_TICKETS_PER_ISSUE: i64 = 50;

/// 运营发放当日额外抽奖券
#[derive(Clone)]
pub struct BonusTicketService {
    pool: DbPool,
}

impl BonusTicketService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 一个事务内插入 count 张 issued 券，日期为服务器本地当天
    pub async fn issue_today(
        &self,
        req: &IssueBonusTicketsRequest,
    ) -> AppResult<IssueBonusTicketsResponse> {
        if req.event_id <= 0 || req.user_id <= 0 {
            return Err(AppError::ValidationError(
                "event_id and user_id must be positive".into(),
            ));
        }
        if !(1..=MAX_TICKETS_PER_ISSUE).contains(&req.count) {
            return Err(AppError::ValidationError(format!(
                "count must be between 1 and {MAX_TICKETS_PER_ISSUE}"
            )));
        }

        let today = Local::now().date_naive();
        let txn = self.pool.begin().await?;

        let mut ticket_idxs = Vec::with_capacity(req.count as usize);
        for _ in 0..req.count {
            let ticket =
                ledger::insert_issued_ticket(&txn, req.event_id, req.user_id, today).await?;
            ticket_idxs.push(ticket.ticket_idx);
        }

        txn.commit().await?;

        log::info!(
            "Issued {} bonus tickets to user {} for event {} on {}",
            ticket_idxs.len(),
            req.user_id,
            req.event_id,
            today
        );

        Ok(IssueBonusTicketsResponse {
            ticket_date: today,
            ticket_idxs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::mock::{shared, transaction_log};
    use crate::entities::{BonusTicketStatus, bonus_ticket_entity as tickets};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn ticket_row(ticket_idx: i64) -> tickets::Model {
        tickets::Model {
            ticket_idx,
            event_id: 1,
            user_id: 7,
            ticket_date: Local::now().date_naive(),
            status: BonusTicketStatus::Issued,
            used_at: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_issue_inserts_requested_count() {
        let db = shared(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![ticket_row(11)], vec![ticket_row(12)]]),
        );
        let service = BonusTicketService::new(db.clone());

        let resp = service
            .issue_today(&IssueBonusTicketsRequest {
                event_id: 1,
                user_id: 7,
                count: 2,
            })
            .await
            .unwrap();

        assert_eq!(resp.ticket_idxs, vec![11, 12]);
        assert_eq!(resp.ticket_date, Local::now().date_naive());

        drop(service);
        let log = format!("{:?}", transaction_log(db));
        assert!(log.contains("roulette_bonus_tickets"));
        assert!(log.contains("COMMIT"));
    }

    #[tokio::test]
    async fn test_issue_rejects_out_of_range_count() {
        let db = shared(MockDatabase::new(DatabaseBackend::Postgres));
        let service = BonusTicketService::new(db.clone());

        for count in [0, MAX_TICKETS_PER_ISSUE + 1] {
            let err = service
                .issue_today(&IssueBonusTicketsRequest {
                    event_id: 1,
                    user_id: 7,
                    count,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }

        let err = service
            .issue_today(&IssueBonusTicketsRequest {
                event_id: 1,
                user_id: 0,
                count: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        drop(service);
        assert!(transaction_log(db).is_empty());
    }

    #[tokio::test]
    async fn test_issue_failure_rolls_back() {
        // 第二条插入无结果，mock 返回错误
        let db = shared(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![ticket_row(11)]]),
        );
        let service = BonusTicketService::new(db);

        let err = service
            .issue_today(&IssueBonusTicketsRequest {
                event_id: 1,
                user_id: 7,
                count: 2,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }
}
