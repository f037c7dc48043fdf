//! Validation trait definition

/// Validation trait for configuration structures.
///
/// Errors are human-readable strings; callers wrap them into `WardenError::Config` together
/// with the section they came from.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}
