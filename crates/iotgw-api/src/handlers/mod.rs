//! Request handlers for the gateway API

pub mod discovery;
pub mod registration;
