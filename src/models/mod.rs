pub mod common;
pub mod grant;
pub mod roulette;

pub use common::*;
pub use grant::*;
pub use roulette::*;
