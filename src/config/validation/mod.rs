//! Configuration validation
//!
//! - `trait_def`: the `Validate` trait
//! - `config_validators`: server and logging validators
//! - `storage_validators`: Redis validators
//! - `rate_limit_validators`: class, route table and exclusion validators
//! - `tests`: cross-cutting validator tests

mod config_validators;
mod rate_limit_validators;
mod storage_validators;
mod trait_def;

pub use trait_def::Validate;
