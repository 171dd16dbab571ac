pub mod app_config;
pub mod coupon_repo;
pub mod database;
pub mod edition_repo;
pub mod error;
pub mod registration_repo;

pub use app_config::Config;
pub use coupon_repo::StoreCouponRepository;
pub use database::DbClient;
pub use edition_repo::StoreEditionRepository;
pub use error::StoreError;
pub use registration_repo::StoreRegistrationRepository;
