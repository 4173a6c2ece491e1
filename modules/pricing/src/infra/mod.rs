pub mod store_repo;

pub use store_repo::StoreVoucherRepo;
