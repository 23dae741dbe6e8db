//! # SIP URIs
//!
//! A pragmatic `sip:` / `sips:` URI model
//! ([RFC 3261 Section 19.1](https://datatracker.ietf.org/doc/html/rfc3261#section-19.1)).
//! Other schemes (e.g. `tel:`) are kept opaque in `host`.
//!
//! ```rust
//! use sipconf_sip_core::types::uri::{Uri, Scheme};
//! use std::str::FromStr;
//!
//! let uri = Uri::from_str("sip:alice@127.0.0.1:5080;transport=udp").unwrap();
//! assert_eq!(uri.scheme, Scheme::Sip);
//! assert_eq!(uri.user.as_deref(), Some("alice"));
//! assert_eq!(uri.host, "127.0.0.1");
//! assert_eq!(uri.port, Some(5080));
//! assert_eq!(uri.to_string(), "sip:alice@127.0.0.1:5080;transport=udp");
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::common::{nom_error, semi_params};
use crate::types::param::{find_param, Param};

/// URI scheme
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scheme {
    /// sip:
    Sip,
    /// sips:
    Sips,
    /// tel:
    Tel,
    /// anything else
    Other(String),
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Sip => f.write_str("sip"),
            Scheme::Sips => f.write_str("sips"),
            Scheme::Tel => f.write_str("tel"),
            Scheme::Other(s) => f.write_str(s),
        }
    }
}

/// A parsed URI
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uri {
    /// Scheme
    pub scheme: Scheme,
    /// userinfo without the trailing `@`
    pub user: Option<String>,
    /// Host, IPv6 references keep their brackets; opaque part for non-SIP schemes
    pub host: String,
    /// Explicit port
    pub port: Option<u16>,
    /// `;uri-parameters`
    pub params: Vec<Param>,
    /// `?headers` part, unparsed
    pub headers: Option<String>,
}

impl Uri {
    /// Creates a `sip:` URI for a host and optional user
    pub fn sip(user: Option<&str>, host: impl Into<String>, port: Option<u16>) -> Self {
        Uri {
            scheme: Scheme::Sip,
            user: user.map(str::to_string),
            host: host.into(),
            port,
            params: Vec::new(),
            headers: None,
        }
    }

    /// Builds a `sip:` URI pointing at a socket address
    pub fn from_socket_addr(user: Option<&str>, addr: SocketAddr) -> Self {
        let host = match addr {
            SocketAddr::V4(v4) => v4.ip().to_string(),
            SocketAddr::V6(v6) => format!("[{}]", v6.ip()),
        };
        Uri::sip(user, host, Some(addr.port()))
    }

    /// `;transport=` parameter if present
    pub fn transport(&self) -> Option<&str> {
        find_param(&self.params, "transport").and_then(Param::value)
    }

    /// Resolves host and port to a socket address when the host is a literal IP
    ///
    /// The default port is 5060 for `sip:` and 5061 for `sips:`.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        let default_port = if self.scheme == Scheme::Sips { 5061 } else { 5060 };
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        let ip = host.parse().ok()?;
        Some(SocketAddr::new(ip, self.port.unwrap_or(default_port)))
    }
}

fn parse_host_port(input: &str, original: &str) -> Result<(String, Option<u16>)> {
    let invalid = || Error::InvalidUri(original.to_string());
    let (host, port) = if input.starts_with('[') {
        let end = input.find(']').ok_or_else(invalid)?;
        let host = &input[..=end];
        let rest = &input[end + 1..];
        match rest.strip_prefix(':') {
            Some(port) => (host, Some(port)),
            None if rest.is_empty() => (host, None),
            None => return Err(invalid()),
        }
    } else {
        match input.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (input, None),
        }
    };
    if host.is_empty() {
        return Err(invalid());
    }
    let port = port
        .map(|p| p.parse::<u16>().map_err(|_| invalid()))
        .transpose()?;
    Ok((host.to_string(), port))
}

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (scheme, rest) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidUri(s.to_string()))?;
        if scheme.is_empty() || !scheme.bytes().all(|c| c.is_ascii_alphanumeric() || b"+-.".contains(&c)) {
            return Err(Error::InvalidUri(s.to_string()));
        }
        let scheme = match scheme.to_ascii_lowercase().as_str() {
            "sip" => Scheme::Sip,
            "sips" => Scheme::Sips,
            "tel" => Scheme::Tel,
            other => Scheme::Other(other.to_string()),
        };

        if !matches!(scheme, Scheme::Sip | Scheme::Sips) {
            if rest.is_empty() {
                return Err(Error::InvalidUri(s.to_string()));
            }
            return Ok(Uri {
                scheme,
                user: None,
                host: rest.to_string(),
                port: None,
                params: Vec::new(),
                headers: None,
            });
        }

        let (rest, headers) = match rest.split_once('?') {
            Some((before, headers)) => (before, Some(headers.to_string())),
            None => (rest, None),
        };
        let (userhost, params) = match rest.find(';') {
            Some(idx) => {
                let (rem, params) =
                    semi_params(rest[idx..].as_bytes()).map_err(|e| nom_error("URI parameters", e))?;
                if !rem.is_empty() {
                    return Err(Error::InvalidUri(s.to_string()));
                }
                (&rest[..idx], params)
            }
            None => (rest, Vec::new()),
        };
        let (user, hostport) = match userhost.rsplit_once('@') {
            Some((user, hostport)) if !user.is_empty() => (Some(user.to_string()), hostport),
            Some(_) => return Err(Error::InvalidUri(s.to_string())),
            None => (None, userhost),
        };
        let (host, port) = parse_host_port(hostport, s)?;

        Ok(Uri {
            scheme,
            user,
            host,
            port,
            params,
            headers,
        })
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.scheme)?;
        if let Some(user) = &self.user {
            write!(f, "{}@", user)?;
        }
        f.write_str(&self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        for param in &self.params {
            write!(f, ";{}", param)?;
        }
        if let Some(headers) = &self.headers {
            write!(f, "?{}", headers)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_without_user() {
        let uri = Uri::from_str("sip:127.0.0.1:5060").unwrap();
        assert_eq!(uri.user, None);
        assert_eq!(uri.host, "127.0.0.1");
        assert_eq!(uri.port, Some(5060));
        assert_eq!(uri.socket_addr(), Some("127.0.0.1:5060".parse().unwrap()));
    }

    #[test]
    fn test_parse_ipv6_and_params() {
        let uri = Uri::from_str("sips:bob@[2001:db8::1]:5061;transport=tcp;lr").unwrap();
        assert_eq!(uri.scheme, Scheme::Sips);
        assert_eq!(uri.host, "[2001:db8::1]");
        assert_eq!(uri.port, Some(5061));
        assert_eq!(uri.transport(), Some("tcp"));
        assert_eq!(uri.to_string(), "sips:bob@[2001:db8::1]:5061;transport=tcp;lr");
    }

    #[test]
    fn test_default_port_and_hostname() {
        let uri = Uri::from_str("sip:example.com").unwrap();
        assert_eq!(uri.socket_addr(), None);
        let uri = Uri::from_str("sips:10.0.0.2").unwrap();
        assert_eq!(uri.socket_addr(), Some("10.0.0.2:5061".parse().unwrap()));
    }

    #[test]
    fn test_opaque_scheme() {
        let uri = Uri::from_str("tel:+1-201-555-0123").unwrap();
        assert_eq!(uri.scheme, Scheme::Tel);
        assert_eq!(uri.to_string(), "tel:+1-201-555-0123");
    }

    #[test]
    fn test_invalid_uris() {
        assert!(Uri::from_str("no-scheme").is_err());
        assert!(Uri::from_str("sip:").is_err());
        assert!(Uri::from_str("sip:host:notaport").is_err());
        assert!(Uri::from_str("sip:@host").is_err());
    }
}
