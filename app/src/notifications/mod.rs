//! Notification contracts
//!
//! This module only declares the contract; implementations live in
//! deployments that need them. Registering it binds nothing.

use lattice::contract;

#[contract]
pub trait Notifier {
    fn notify(&self, message: &str);
}
