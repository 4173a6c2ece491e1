pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::{router, PublicOrigin};
