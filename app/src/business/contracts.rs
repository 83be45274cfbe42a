use lattice::contract;
use serde::Serialize;

/// A sellable product; prices are in cents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: u64,
    pub sku: String,
    pub name: String,
    pub unit_price: u64,
}

impl Product {
    pub fn new(id: u64, sku: &str, name: &str, unit_price: u64) -> Self {
        Self {
            id,
            sku: sku.to_string(),
            name: name.to_string(),
            unit_price,
        }
    }
}

#[contract]
pub trait ProductCatalog {
    fn products(&self) -> Vec<Product>;

    fn find(&self, id: u64) -> Option<Product>;
}

#[contract]
pub trait PriceCalculator {
    /// Total price in cents for `quantity` units
    fn price(&self, product: &Product, quantity: u32) -> u64;

    /// Name shown to clients
    fn name(&self) -> &'static str;
}

/// Events recorded during one unit of work
#[contract]
pub trait AuditTrail {
    fn record(&self, event: &str);

    fn events(&self) -> Vec<String>;
}
