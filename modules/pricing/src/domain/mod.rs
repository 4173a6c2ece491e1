pub mod quote;
pub mod rejection;
pub mod repo;
pub mod service;
pub mod voucher;
