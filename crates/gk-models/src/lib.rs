//! # gk-models
//!
//! Domain models for Gatekeeper.
//!
//! These are the records the authentication engine reads from its stores. None of them
//! are written back by the engine.

pub mod api_key;
pub mod group;
pub mod principal;
pub mod tenant;

pub use api_key::ApiKey;
pub use group::Group;
pub use principal::{Principal, PrincipalCredentials};
pub use tenant::Tenant;
