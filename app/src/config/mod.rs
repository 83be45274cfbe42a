mod promotion;

pub use promotion::PromotionConfig;

use lattice::{Config, DatabaseConfig};

/// Register all application configs
pub fn register_all() {
    Config::register(PromotionConfig::from_env());
    Config::register(DatabaseConfig::from_env());
}
