use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

/// 转盘奖励定义 (按活动配置权重)
#[derive(DeriveIden)]
enum RouletteRewards {
    Table,
    Id,
    EventId,
    RewardId,
    RewardType,
    RewardValue,
    Weight,
    IsActive,
    CreatedAt,
}

/// 额外抽奖券 (按 活动/用户/日期 发放)
#[derive(DeriveIden)]
enum RouletteBonusTickets {
    Table,
    TicketIdx,
    EventId,
    UserId,
    TicketDate,
    Status,
    UsedAt,
    CreatedAt,
}

/// 抽奖流水 (只追加, 不更新)
#[derive(DeriveIden)]
enum RouletteSpins {
    Table,
    SpinIdx,
    EventId,
    UserId,
    SpinDate,
    SpinType,
    RequestId,
    RewardId,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 约束名称是业务语义的一部分:
/// - uq_spins_request: request_id 幂等键唯一
/// - uq_spins_daily_once: daily 类型每个 (event, user, day) 仅一次 (partial unique index)
///
/// 服务层根据违反的约束名区分 DAILY_LIMIT_REACHED 与并发重复请求，修改名称时需同步
/// `services::roulette_ledger` 中的常量。
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("roulette_reward_type"))
                    .values(vec![
                        Alias::new("point"),
                        Alias::new("item"),
                        Alias::new("coupon"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("bonus_ticket_status"))
                    .values(vec![Alias::new("issued"), Alias::new("used")])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("roulette_spin_type"))
                    .values(vec![Alias::new("daily"), Alias::new("bonus")])
                    .to_owned(),
            )
            .await?;

        // 奖励定义表
        manager
            .create_table(
                Table::create()
                    .table(RouletteRewards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RouletteRewards::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RouletteRewards::EventId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RouletteRewards::RewardId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RouletteRewards::RewardType)
                            .custom(Alias::new("roulette_reward_type"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RouletteRewards::RewardValue)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RouletteRewards::Weight)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(RouletteRewards::Weight).gte(0)),
                    )
                    .col(
                        ColumnDef::new(RouletteRewards::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(RouletteRewards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_rewards_event_reward")
                    .table(RouletteRewards::Table)
                    .col(RouletteRewards::EventId)
                    .col(RouletteRewards::RewardId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 抽奖券表
        manager
            .create_table(
                Table::create()
                    .table(RouletteBonusTickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RouletteBonusTickets::TicketIdx)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RouletteBonusTickets::EventId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RouletteBonusTickets::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RouletteBonusTickets::TicketDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RouletteBonusTickets::Status)
                            .custom(Alias::new("bonus_ticket_status"))
                            .not_null()
                            .default(Expr::cust("'issued'::bonus_ticket_status")),
                    )
                    .col(
                        ColumnDef::new(RouletteBonusTickets::UsedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RouletteBonusTickets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bonus_tickets_lookup")
                    .table(RouletteBonusTickets::Table)
                    .col(RouletteBonusTickets::EventId)
                    .col(RouletteBonusTickets::UserId)
                    .col(RouletteBonusTickets::TicketDate)
                    .col(RouletteBonusTickets::Status)
                    .to_owned(),
            )
            .await?;

        // 抽奖流水表
        manager
            .create_table(
                Table::create()
                    .table(RouletteSpins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RouletteSpins::SpinIdx)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RouletteSpins::EventId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RouletteSpins::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RouletteSpins::SpinDate).date().not_null())
                    .col(
                        ColumnDef::new(RouletteSpins::SpinType)
                            .custom(Alias::new("roulette_spin_type"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RouletteSpins::RequestId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RouletteSpins::RewardId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RouletteSpins::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_spins_request")
                    .table(RouletteSpins::Table)
                    .col(RouletteSpins::RequestId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // daily 每日一次: 部分唯一索引 sea-query 无法表达，直接执行 SQL
        let conn = manager.get_connection();
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            r#"
CREATE UNIQUE INDEX IF NOT EXISTS uq_spins_daily_once
    ON roulette_spins (event_id, user_id, spin_date)
    WHERE spin_type = 'daily';
"#
            .to_string(),
        ))
        .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_spins_event_user")
                    .table(RouletteSpins::Table)
                    .col(RouletteSpins::EventId)
                    .col(RouletteSpins::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(RouletteSpins::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(RouletteBonusTickets::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(RouletteRewards::Table)
                    .to_owned(),
            )
            .await?;

        for name in [
            "roulette_spin_type",
            "bonus_ticket_status",
            "roulette_reward_type",
        ] {
            manager
                .drop_type(Type::drop().if_exists().name(Alias::new(name)).to_owned())
                .await?;
        }

        Ok(())
    }
}
