//! Request handlers.

pub mod admin;
pub mod events;
pub mod health;
pub mod subscriptions;
pub mod sync;
