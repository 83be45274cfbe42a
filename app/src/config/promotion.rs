use lattice::env;

/// Promotion settings
#[derive(Debug, Clone)]
pub struct PromotionConfig {
    /// Percent taken off every order (`PROMO_PERCENT`, default 10)
    pub percent: u8,
}

impl PromotionConfig {
    pub fn from_env() -> Self {
        Self {
            percent: env("PROMO_PERCENT", 10),
        }
    }
}
