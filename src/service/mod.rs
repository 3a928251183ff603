pub mod cache;
pub mod delivery;
mod error;
pub mod http;
pub mod settings;

pub use cache::{CacheService, Cacheable};
pub use error::ServiceError;
pub use settings::SettingsService;
