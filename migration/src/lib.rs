pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_roulette;
mod m20251001_000002_create_reward_grants;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_roulette::Migration),
            Box::new(m20251001_000002_create_reward_grants::Migration),
        ]
    }
}
