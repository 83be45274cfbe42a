//! Application middleware

mod audit;

pub use audit::AuditMiddleware;
