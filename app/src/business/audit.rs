use super::AuditTrail;
use crate::notifications::Notifier;
use lattice::component;
use std::sync::{Arc, Mutex};

/// Collects the events of one request
///
/// Forwards each event to the `Notifier` when one is bound.
#[component(AuditTrail)]
pub struct RequestAuditTrail {
    #[inject]
    notifier: Option<Arc<dyn Notifier>>,
    events: Mutex<Vec<String>>,
}

impl AuditTrail for RequestAuditTrail {
    fn record(&self, event: &str) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.to_string()),
            Err(poisoned) => poisoned.into_inner().push(event.to_string()),
        }
        if let Some(notifier) = &self.notifier {
            notifier.notify(event);
        }
    }

    fn events(&self) -> Vec<String> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
