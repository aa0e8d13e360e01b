//! Storefront core: a persisted shopping cart and a coalescing, invalidating
//! cache over a remote product catalog.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
