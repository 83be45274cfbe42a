use crate::business::{AuditTrail, CurrencyFormat, PriceCalculator, ProductCatalog};
use lattice::{json, route, AppError, Request, Response};
use serde::Deserialize;
use serde_json::json;

pub async fn index(req: Request) -> Response {
    let catalog = req.resolve::<dyn ProductCatalog>()?;
    let format = CurrencyFormat;

    let products: Vec<_> = catalog
        .products()
        .into_iter()
        .map(|p| {
            let id = p.id.to_string();
            json!({
                "id": p.id,
                "sku": p.sku,
                "name": p.name,
                "unit_price": p.unit_price,
                "display_price": format.format(p.unit_price),
                "url": route("products.show", &[("id", id.as_str())]),
            })
        })
        .collect();

    json(json!({ "products": products }))
}

pub async fn show(req: Request) -> Response {
    let id: u64 = req
        .param("id")?
        .parse()
        .map_err(|_| AppError::bad_request("Product id must be a number"))?;

    let catalog = req.resolve::<dyn ProductCatalog>()?;
    let product = catalog
        .find(id)
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;

    json(json!({ "product": product }))
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub product_id: u64,
    pub quantity: u32,
}

/// Price an order line
///
/// The response includes the request's audit events: the catalog and this
/// handler share one `AuditTrail` because it is scoped to the request.
pub async fn quote(req: Request) -> Response {
    let input: QuoteRequest = req.json()?;
    if input.quantity == 0 {
        return Err(AppError::bad_request("Quantity must be at least 1").into());
    }

    let catalog = req.resolve::<dyn ProductCatalog>()?;
    let pricing = req.resolve::<dyn PriceCalculator>()?;
    let audit = req.resolve::<dyn AuditTrail>()?;

    let product = catalog
        .find(input.product_id)
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", input.product_id)))?;
    let total = pricing.price(&product, input.quantity);
    audit.record(&format!("quote {} x{}", product.sku, input.quantity));

    json(json!({
        "product": product,
        "quantity": input.quantity,
        "total": total,
        "display_total": CurrencyFormat.format(total),
        "pricing": pricing.name(),
        "audit": audit.events(),
    }))
}
