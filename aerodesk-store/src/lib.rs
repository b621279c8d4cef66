pub mod app_config;
pub mod checkin_repo;
pub mod database;
pub mod error;
pub mod query_repo;

pub use checkin_repo::PgCheckInStore;
pub use database::DbClient;
pub use query_repo::PgQueryRepository;
