//! Core functionality for the rate governor

pub mod rate_limit;
