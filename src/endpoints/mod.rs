mod openapi;
pub use openapi::*;

pub mod auth;

pub mod me;

pub mod transactions;
