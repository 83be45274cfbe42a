//! Seasonal pricing
//!
//! Registered after `app::business`, so its `PriceCalculator` replaces
//! `StandardPricing` for the rest of the process.

use crate::business::{PriceCalculator, Product};
use crate::config::PromotionConfig;
use lattice::{component, Config};

lattice::declare_module!("app::promotions", requires = ["app::business"]);

/// Discount percentage, read from `PromotionConfig` when the component is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discount(pub u8);

impl Default for Discount {
    fn default() -> Self {
        let config = Config::get::<PromotionConfig>().unwrap_or_else(PromotionConfig::from_env);
        Discount(config.percent.min(100))
    }
}

#[component(PriceCalculator)]
pub struct PromotionalPricing {
    discount: Discount,
}

impl PromotionalPricing {
    pub fn new(discount: Discount) -> Self {
        Self { discount }
    }
}

impl PriceCalculator for PromotionalPricing {
    fn price(&self, product: &Product, quantity: u32) -> u64 {
        let total = product.unit_price * u64::from(quantity);
        total - total * u64::from(self.discount.0) / 100
    }

    fn name(&self) -> &'static str {
        "promotional"
    }
}
