use axum::http::HeaderMap;
use domain::Capabilities;
use std::sync::Arc;

use crate::config::SandboxSettings;

/// Decides what a caller may do, from the request alone.
pub trait Authorizer: Send + Sync {
    fn capabilities(&self, headers: &HeaderMap) -> Capabilities;

    /// Identity anti-forgery tokens are bound to. Empty for anonymous.
    fn identity(&self, headers: &HeaderMap) -> String;
}

/// Used outside the sandboxing host, where nothing vouches for callers.
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn capabilities(&self, _headers: &HeaderMap) -> Capabilities {
        Capabilities::Unrestricted
    }

    fn identity(&self, _headers: &HeaderMap) -> String {
        String::new()
    }
}

/// Trusts the capability list the sandboxing host puts in a header.
pub struct HeaderAllowList {
    permissions_header: String,
    user_id_header: String,
}

impl HeaderAllowList {
    pub fn new(permissions_header: impl Into<String>, user_id_header: impl Into<String>) -> Self {
        Self {
            permissions_header: permissions_header.into(),
            user_id_header: user_id_header.into(),
        }
    }

    fn header<'a>(&self, headers: &'a HeaderMap, name: &str) -> &'a str {
        headers
            .get(name)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("")
    }
}

impl Authorizer for HeaderAllowList {
    fn capabilities(&self, headers: &HeaderMap) -> Capabilities {
        Capabilities::from_claims(self.header(headers, &self.permissions_header))
    }

    fn identity(&self, headers: &HeaderMap) -> String {
        self.header(headers, &self.user_id_header).to_string()
    }
}

pub fn from_settings(sandbox: &SandboxSettings) -> Arc<dyn Authorizer> {
    if sandbox.enabled {
        tracing::info!(
            "Sandboxed host detected, enforcing permissions from {}",
            sandbox.permissions_header
        );
        Arc::new(HeaderAllowList::new(
            sandbox.permissions_header.clone(),
            sandbox.user_id_header.clone(),
        ))
    } else {
        tracing::warn!("Not running under a sandboxed host, permission checks are disabled");
        Arc::new(AllowAll)
    }
}
