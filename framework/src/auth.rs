//! Bearer token authentication
//!
//! Validation itself is a collaborator: the framework only asks a
//! `TokenValidator` resolved from the request scope whether a token is good.
//! `StaticTokenValidator` accepts the tokens listed in `AuthConfig`.

use crate::config::AuthConfig;
use async_trait::async_trait;
use std::collections::HashSet;

/// The authenticated caller of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Stable identifier of the caller
    pub subject: String,
    pub scopes: Vec<String>,
}

impl Principal {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            scopes: Vec::new(),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

/// Validates bearer tokens
///
/// Bind an implementation with `bind!(dyn TokenValidator, ...)` or as a
/// `#[component(TokenValidator)]`.
#[async_trait]
pub trait TokenValidator: Send + Sync + 'static {
    /// The principal behind `token`, or `None` if it is not accepted
    async fn validate(&self, token: &str) -> Option<Principal>;
}

/// Accepts a fixed set of tokens
#[derive(Debug, Clone, Default)]
pub struct StaticTokenValidator {
    tokens: HashSet<String>,
}

impl StaticTokenValidator {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.tokens.iter().cloned())
    }
}

#[async_trait]
impl TokenValidator for StaticTokenValidator {
    async fn validate(&self, token: &str) -> Option<Principal> {
        if self.tokens.contains(token) {
            // Never echo the token itself
            let subject = format!("token-{}", token.len());
            Some(Principal::new(subject))
        } else {
            None
        }
    }
}
