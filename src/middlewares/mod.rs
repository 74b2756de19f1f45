pub mod cors;
pub mod gm_auth;

pub use cors::create_cors;
pub use gm_auth::GmKeyMiddleware;
