use super::{PriceCalculator, Product};
use lattice::component;

/// Minimum quantity for the bulk discount
pub const BULK_QUANTITY: u32 = 10;

/// List price, 5% off from `BULK_QUANTITY` units
#[component(PriceCalculator)]
pub struct StandardPricing;

impl PriceCalculator for StandardPricing {
    fn price(&self, product: &Product, quantity: u32) -> u64 {
        let total = product.unit_price * u64::from(quantity);
        if quantity >= BULK_QUANTITY {
            total - total * 5 / 100
        } else {
            total
        }
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_discount() {
        let cable = Product::new(4, "CB-USB", "USB-C cable", 900);

        assert_eq!(StandardPricing.price(&cable, 1), 900);
        assert_eq!(StandardPricing.price(&cable, 9), 8_100);
        assert_eq!(StandardPricing.price(&cable, 10), 8_550);
        assert_eq!(StandardPricing.price(&cable, 0), 0);
    }
}
