use super::{AuditTrail, Product, ProductCatalog};
use lattice::component;
use std::sync::Arc;

/// Products known to the in-memory catalog
#[derive(Debug, Clone)]
pub struct Stock(pub Vec<Product>);

impl Default for Stock {
    fn default() -> Self {
        Stock(vec![
            Product::new(1, "KB-101", "Mechanical keyboard", 8_900),
            Product::new(2, "MS-220", "Wireless mouse", 2_450),
            Product::new(3, "MN-270", "27\" monitor", 27_900),
            Product::new(4, "CB-USB", "USB-C cable", 900),
        ])
    }
}

#[component(ProductCatalog)]
pub struct InMemoryCatalog {
    #[inject]
    audit: Arc<dyn AuditTrail>,
    stock: Stock,
}

impl ProductCatalog for InMemoryCatalog {
    fn products(&self) -> Vec<Product> {
        self.audit.record("catalog.list");
        self.stock.0.clone()
    }

    fn find(&self, id: u64) -> Option<Product> {
        self.audit.record(&format!("catalog.find {}", id));
        self.stock.0.iter().find(|p| p.id == id).cloned()
    }
}
