use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

/// 奖励发放记录 (待审批 / 已审批 / 已拒绝)
#[derive(DeriveIden)]
enum RewardGrantLog {
    Table,
    GrantIdx,
    UserId,
    Amount,
    SourceType,
    SourceId,
    RequestId,
    Status,
    ApprovedBy,
    ApprovedAt,
    RejectedBy,
    RejectedAt,
    DecisionReason,
    CreatedAt,
}

/// GM 操作日志 (尽力写入)
#[derive(DeriveIden)]
enum GmActionsLog {
    Table,
    Id,
    ActorId,
    ActionType,
    TargetType,
    TargetId,
    Memo,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RouletteSpins {
    Table,
    SpinIdx,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("grant_source_type"))
                    .values(vec![Alias::new("roulette")])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("grant_status"))
                    .values(vec![
                        Alias::new("pending"),
                        Alias::new("approved"),
                        Alias::new("rejected"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RewardGrantLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RewardGrantLog::GrantIdx)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RewardGrantLog::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RewardGrantLog::Amount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RewardGrantLog::SourceType)
                            .custom(Alias::new("grant_source_type"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RewardGrantLog::SourceId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RewardGrantLog::RequestId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RewardGrantLog::Status)
                            .custom(Alias::new("grant_status"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RewardGrantLog::ApprovedBy)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RewardGrantLog::ApprovedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RewardGrantLog::RejectedBy)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RewardGrantLog::RejectedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RewardGrantLog::DecisionReason)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RewardGrantLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_grant_source_spin")
                            .from(RewardGrantLog::Table, RewardGrantLog::SourceId)
                            .to(RouletteSpins::Table, RouletteSpins::SpinIdx)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一请求只会产生一条发放记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_grant_request")
                    .table(RewardGrantLog::Table)
                    .col(RewardGrantLog::RequestId)
                    .col(RewardGrantLog::SourceType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 待审批列表分页
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grant_status_created")
                    .table(RewardGrantLog::Table)
                    .col(RewardGrantLog::Status)
                    .col(RewardGrantLog::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GmActionsLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GmActionsLog::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GmActionsLog::ActorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GmActionsLog::ActionType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GmActionsLog::TargetType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GmActionsLog::TargetId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GmActionsLog::Memo).text().null())
                    .col(
                        ColumnDef::new(GmActionsLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
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
                    .table(GmActionsLog::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(RewardGrantLog::Table)
                    .to_owned(),
            )
            .await?;

        for name in ["grant_status", "grant_source_type"] {
            manager
                .drop_type(Type::drop().if_exists().name(Alias::new(name)).to_owned())
                .await?;
        }

        Ok(())
    }
}
