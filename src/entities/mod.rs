pub mod gm_actions_logs;
pub mod reward_grant_logs;
pub mod roulette_bonus_tickets;
pub mod roulette_rewards;
pub mod roulette_spins;

pub use gm_actions_logs as gm_action_entity;
pub use reward_grant_logs as grant_entity;
pub use roulette_bonus_tickets as bonus_ticket_entity;
pub use roulette_rewards as reward_entity;
pub use roulette_spins as spin_entity;

pub use reward_grant_logs::{GrantSourceType, GrantStatus};
pub use roulette_bonus_tickets::BonusTicketStatus;
pub use roulette_rewards::RewardType;
pub use roulette_spins::SpinType;
