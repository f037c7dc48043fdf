//! Caller identification
//!
//! Authenticated callers are limited per identity, anonymous callers per network address.

use super::types::KeyScope;
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use std::net::IpAddr;

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const UNKNOWN: &str = "unknown";

/// Identity established by an upstream authentication layer.
///
/// Inserted into request extensions; when present it takes precedence over every other
/// identity source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal(pub String);

/// Request facts identification reads from
#[derive(Debug, Clone, Copy)]
pub struct CallerContext<'a> {
    pub headers: &'a HeaderMap,
    pub principal: Option<&'a str>,
    pub peer_addr: Option<IpAddr>,
}

/// Sources of an authenticated identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// [`AuthenticatedPrincipal`] from request extensions
    Principal,
    /// Raw `Authorization: Bearer` token, unverified. Only its digest ever leaves this process.
    BearerToken,
}

/// Sources of a network address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSource {
    /// First entry of `X-Forwarded-For`
    ForwardedFor,
    /// `X-Real-IP`
    RealIp,
    /// Transport peer address
    PeerAddr,
}

/// Identified caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId {
    pub scope: KeyScope,
    pub identifier: String,
}

impl CallerId {
    pub fn user(identifier: impl Into<String>) -> Self {
        Self {
            scope: KeyScope::User,
            identifier: identifier.into(),
        }
    }

    pub fn ip(identifier: impl Into<String>) -> Self {
        Self {
            scope: KeyScope::Ip,
            identifier: identifier.into(),
        }
    }
}

/// Resolves the caller of a request by walking identity sources, then address sources,
/// in order
#[derive(Debug, Clone)]
pub struct CallerIdentifier {
    identity_sources: Vec<IdentitySource>,
    address_sources: Vec<AddressSource>,
}

impl Default for CallerIdentifier {
    fn default() -> Self {
        Self {
            identity_sources: vec![IdentitySource::Principal, IdentitySource::BearerToken],
            address_sources: vec![
                AddressSource::ForwardedFor,
                AddressSource::RealIp,
                AddressSource::PeerAddr,
            ],
        }
    }
}

impl CallerIdentifier {
    pub fn new(identity_sources: Vec<IdentitySource>, address_sources: Vec<AddressSource>) -> Self {
        Self {
            identity_sources,
            address_sources,
        }
    }

    /// Identify the caller; never fails, anonymous callers with no address share `unknown`
    pub fn identify(&self, ctx: &CallerContext<'_>) -> CallerId {
        if let Some(identity) = self
            .identity_sources
            .iter()
            .find_map(|source| Self::identity_from(*source, ctx))
        {
            return CallerId::user(identity);
        }

        let address = self
            .address_sources
            .iter()
            .find_map(|source| Self::address_from(*source, ctx))
            .unwrap_or_else(|| UNKNOWN.to_string());
        CallerId::ip(address)
    }

    fn identity_from(source: IdentitySource, ctx: &CallerContext<'_>) -> Option<String> {
        match source {
            IdentitySource::Principal => ctx
                .principal
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            IdentitySource::BearerToken => header_str(ctx.headers, AUTHORIZATION.as_str())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string),
        }
    }

    fn address_from(source: AddressSource, ctx: &CallerContext<'_>) -> Option<String> {
        match source {
            AddressSource::ForwardedFor => header_str(ctx.headers, FORWARDED_FOR)
                .and_then(|value| value.split(',').next())
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
                .map(str::to_string),
            AddressSource::RealIp => header_str(ctx.headers, REAL_IP)
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
                .map(str::to_string),
            AddressSource::PeerAddr => ctx.peer_addr.map(|ip| ip.to_string()),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
