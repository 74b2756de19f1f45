pub mod bonus_ticket_service;
pub mod gm_grant_service;
pub mod roulette_ledger;
pub mod roulette_spin_service;

pub use bonus_ticket_service::*;
pub use gm_grant_service::*;
pub use roulette_spin_service::*;
