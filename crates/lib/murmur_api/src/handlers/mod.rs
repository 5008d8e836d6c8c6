//! Request handlers.

pub mod conversation;
pub mod health;
pub mod message;
pub mod thought;
