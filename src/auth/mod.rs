//! Authentication types for Azure service clients.
//!
//! Azure services accept either a service key sent in a fixed header or an
//! OAuth bearer token issued for a service scope. This module provides both,
//! plus the [`AuthPolicy`] the HTTP pipeline applies to every request.
//!
//! # Overview
//!
//! - [`KeyCredential`]: A service key (e.g. `Ocp-Apim-Subscription-Key`)
//! - [`TokenCredential`]: An object-safe source of bearer tokens
//! - [`AccessToken`]: A bearer token and its expiry
//! - [`StaticTokenCredential`]: A credential that always returns one token
//! - [`AuthPolicy`]: How the pipeline authenticates requests
//!
//! Token acquisition from Azure AD is left to the caller. Any type that
//! implements [`TokenCredential`] can be plugged in.
//!
//! # Example
//!
//! ```rust
//! use azure_api::auth::{AccessToken, AuthPolicy, StaticTokenCredential};
//! use std::sync::Arc;
//!
//! let credential = StaticTokenCredential::new(AccessToken::never_expiring("token"));
//! let policy = AuthPolicy::bearer(Arc::new(credential), "https://management.azure.com/.default");
//! assert!(matches!(policy, AuthPolicy::Bearer(_)));
//! ```

mod credential;
mod policy;

pub use credential::{
    AccessToken, CredentialError, KeyCredential, StaticTokenCredential, TokenCredential,
};
pub use policy::{AuthPolicy, BearerTokenPolicy, TOKEN_REFRESH_MARGIN_SECS};

/// Scope requested for Azure Resource Manager tokens.
pub const ARM_SCOPE: &str = "https://management.azure.com/.default";

/// Scope requested for Cognitive Services (language) tokens.
pub const COGNITIVE_SERVICES_SCOPE: &str = "https://cognitiveservices.azure.com/.default";
