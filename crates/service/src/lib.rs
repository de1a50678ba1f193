//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from the HTTP layer.
//! - Reuses validation and entity definitions in the `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod auth;
pub mod client;
pub mod errors;
pub mod export;
pub mod import;
pub mod pagination;
pub mod provider;
#[cfg(test)]
pub mod test_support;
