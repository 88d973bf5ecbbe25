//! Request and response models for the HTTP API.
//!
//! Record fields keep their snake_case TOML names in JSON so field-level
//! validation issues point at the names the client sent; everything else on
//! the wire is camelCase, matching the site's existing API consumers.

pub mod request;
pub mod response;
