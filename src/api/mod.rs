//! HTTP host: session middleware and handlers

pub mod middleware;
pub mod services;
