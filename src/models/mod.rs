//! Typed records shared by the store, handlers and notifications.

pub mod email;
pub mod inbox;
pub mod response;
