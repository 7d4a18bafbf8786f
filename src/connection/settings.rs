//! Connection options and credentials.

use std::fmt;
use std::time::Duration;

use async_snmp::v3::{AuthProtocol, PrivProtocol};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, ProtocolKind, Result};

/// Default SNMP agent port.
pub const DEFAULT_PORT: u16 = 161;
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
/// Default retry count.
pub const DEFAULT_RETRIES: u32 = 5;

/// Transport options shared by v2c and v3 connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub port: u16,
    pub timeout: Duration,
    pub retries: u32,
    /// Name usable with `switch_connection` in place of the index.
    pub alias: Option<String>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            alias: None,
        }
    }
}

impl ConnectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// `host:port` target string; IPv6 literals are bracketed.
    pub fn target(&self, host: &str) -> String {
        if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, self.port)
        } else {
            format!("{}:{}", host, self.port)
        }
    }
}

/// Community string or USM password. Wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl From<&str> for Secret {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl From<String> for Secret {
    fn from(secret: String) -> Self {
        Self(secret)
    }
}

/// SNMPv3 user-based security settings.
#[derive(Debug, Clone)]
pub struct UsmCredentials {
    pub user: String,
    pub auth: Option<(AuthProtocol, Secret)>,
    pub privacy: Option<(PrivProtocol, Secret)>,
}

impl UsmCredentials {
    /// Build USM settings from keyword arguments.
    ///
    /// Protocol names are matched case-insensitively; `None` or `"none"`
    /// disables that half. Privacy without authentication is rejected.
    pub fn new(
        user: impl Into<String>,
        password: Option<&str>,
        priv_password: Option<&str>,
        auth_protocol: Option<&str>,
        priv_protocol: Option<&str>,
    ) -> Result<Self> {
        let auth = parse_auth_protocol(auth_protocol)?;
        let privacy = parse_priv_protocol(priv_protocol)?;

        if let (None, Some(protocol)) = (auth, privacy) {
            return Err(Error::UnsupportedProtocol {
                kind: ProtocolKind::Encryption,
                name: protocol.to_string(),
                reason: "encryption requires an authentication protocol",
            });
        }

        Ok(Self {
            user: user.into(),
            auth: auth.map(|p| (p, Secret::new(password.unwrap_or_default()))),
            privacy: privacy.map(|p| (p, Secret::new(priv_password.unwrap_or_default()))),
        })
    }

    /// RFC 3411 security level name, for logs.
    pub fn security_level(&self) -> &'static str {
        match (&self.auth, &self.privacy) {
            (None, _) => "noAuthNoPriv",
            (Some(_), None) => "authNoPriv",
            (Some(_), Some(_)) => "authPriv",
        }
    }
}

/// How a connection authenticates.
#[derive(Debug, Clone)]
pub enum Credentials {
    Community(Secret),
    Usm(UsmCredentials),
}

impl Credentials {
    pub fn community(community: impl Into<Secret>) -> Self {
        Self::Community(community.into())
    }
}

fn is_none(name: &str) -> bool {
    name.eq_ignore_ascii_case("none")
}

/// Parse an authentication protocol name: `MD5`, `SHA` or none.
pub fn parse_auth_protocol(name: Option<&str>) -> Result<Option<AuthProtocol>> {
    let Some(name) = name.filter(|n| !is_none(n)) else {
        return Ok(None);
    };
    match name.to_ascii_uppercase().as_str() {
        "MD5" => Ok(Some(AuthProtocol::Md5)),
        "SHA" => Ok(Some(AuthProtocol::Sha1)),
        _ => Err(Error::InvalidProtocol {
            kind: ProtocolKind::Authentication,
            name: name.to_string(),
        }),
    }
}

/// Parse a privacy protocol name: `DES`, `3DES`, `AES128`, `AES192`,
/// `AES256` or none.
pub fn parse_priv_protocol(name: Option<&str>) -> Result<Option<PrivProtocol>> {
    let Some(name) = name.filter(|n| !is_none(n)) else {
        return Ok(None);
    };
    match name.to_ascii_uppercase().as_str() {
        "DES" => Ok(Some(PrivProtocol::Des)),
        "3DES" => Ok(Some(PrivProtocol::Des3)),
        "AES128" => Ok(Some(PrivProtocol::Aes128)),
        "AES192" => Ok(Some(PrivProtocol::Aes192)),
        "AES256" => Ok(Some(PrivProtocol::Aes256)),
        _ => Err(Error::InvalidProtocol {
            kind: ProtocolKind::Encryption,
            name: name.to_string(),
        }),
    }
}
