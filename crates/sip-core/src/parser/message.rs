//! Whole-message parsing and stream framing.

use std::str::{self, FromStr};

use bytes::Bytes;
use tracing::trace;

use crate::error::{Error, Result};
use crate::types::headers::{Header, HeaderName};
use crate::types::sip_message::Message;
use crate::types::sip_request::Request;
use crate::types::sip_response::Response;
use super::common::nom_error;
use super::request::parse_request_line;
use super::response::parse_status_line;

/// Largest message accepted from a stream transport
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Finds the end of the header section: index of the first body byte
fn find_head_end(data: &[u8]) -> Option<(usize, usize)> {
    let crlf = data.windows(4).position(|w| w == b"\r\n\r\n").map(|i| (i, i + 4));
    let lf = data.windows(2).position(|w| w == b"\n\n").map(|i| (i, i + 2));
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn skip_leading_crlf(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|&c| c != b'\r' && c != b'\n')
        .unwrap_or(data.len());
    &data[start..]
}

/// Splits the header section into logical lines, undoing folding
fn unfold_lines(head: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in head.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if raw.starts_with(' ') || raw.starts_with('\t') {
            if let Some(last) = lines.last_mut() {
                last.push(' ');
                last.push_str(raw.trim());
                continue;
            }
        }
        lines.push(raw.to_string());
    }
    lines
}

fn content_length(headers: &[Header]) -> Result<Option<usize>> {
    headers
        .iter()
        .find(|h| h.name == HeaderName::ContentLength)
        .map(|h| {
            h.value
                .trim()
                .parse::<usize>()
                .map_err(|_| Error::invalid_header("Content-Length", format!("not a number: {}", h.value)))
        })
        .transpose()
}

/// Parses one complete SIP message
///
/// Leading CRLFs (keep-alives) are skipped. The body is sized by
/// Content-Length when present: a short body is [`Error::IncompleteMessage`]
/// and surplus bytes are dropped. Without Content-Length the remainder is the body.
///
/// ```rust
/// use sipconf_sip_core::prelude::*;
///
/// let raw = b"SIP/2.0 422 Session Interval Too Small\r\n\
///             Via: SIP/2.0/UDP 127.0.0.1:5060;branch=z9hG4bK1\r\n\
///             Min-SE: 2000\r\n\
///             Content-Length: 0\r\n\r\n";
/// let message = parse_message(raw).unwrap();
/// let min_se = message.typed_header::<MinSE>().unwrap().unwrap();
/// assert_eq!(min_se.delta_seconds, 2000);
/// ```
pub fn parse_message(data: &[u8]) -> Result<Message> {
    let data = skip_leading_crlf(data);
    let (head_end, body_start) = find_head_end(data).ok_or_else(|| {
        Error::ParseError("Message header section is not terminated by an empty line".to_string())
    })?;
    let head = str::from_utf8(&data[..head_end])?;
    let mut lines = unfold_lines(head).into_iter();
    let start_line = lines
        .next()
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| Error::ParseError("Empty start line".to_string()))?;

    let headers = lines
        .filter(|l| !l.is_empty())
        .map(|l| Header::from_str(&l))
        .collect::<Result<Vec<_>>>()?;

    let available = &data[body_start..];
    let body = match content_length(&headers)? {
        Some(expected) if expected > available.len() => {
            return Err(Error::IncompleteMessage {
                expected,
                actual: available.len(),
            });
        }
        Some(expected) => Bytes::copy_from_slice(&available[..expected]),
        None => Bytes::copy_from_slice(available),
    };

    let message = if start_line.starts_with("SIP/") {
        let (_, (version, status, reason)) =
            parse_status_line(start_line.as_bytes()).map_err(|e| nom_error("status line", e))?;
        let reason = (reason != status.reason_phrase()).then_some(reason);
        Message::Response(Response {
            version,
            status,
            reason,
            headers,
            body,
        })
    } else {
        let (rem, (method, uri, version)) =
            parse_request_line(start_line.as_bytes()).map_err(|e| nom_error("request line", e))?;
        if !rem.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::ParseError(format!("Trailing characters in request line: {}", start_line)));
        }
        Message::Request(Request {
            method,
            uri,
            version,
            headers,
            body,
        })
    };
    trace!("Parsed {}", message.short_description());
    Ok(message)
}

/// Length of the first complete message in a stream buffer
///
/// Returns `Ok(None)` while the header section or body is still incomplete.
/// Stream transports require Content-Length; its absence is treated as 0.
/// A message larger than [`MAX_MESSAGE_SIZE`], declared or still unterminated,
/// is an [`Error::MessageTooLarge`].
pub fn message_length(buf: &[u8]) -> Result<Option<usize>> {
    let skipped = buf.len() - skip_leading_crlf(buf).len();
    let data = &buf[skipped..];
    let Some((head_end, body_start)) = find_head_end(data) else {
        if data.len() > MAX_MESSAGE_SIZE {
            return Err(Error::MessageTooLarge {
                size: data.len(),
                limit: MAX_MESSAGE_SIZE,
            });
        }
        return Ok(None);
    };
    let head = str::from_utf8(&data[..head_end])?;
    let mut length = 0usize;
    for line in unfold_lines(head).iter().skip(1) {
        if let Some((name, value)) = line.split_once(':') {
            if HeaderName::from_str(name).ok() == Some(HeaderName::ContentLength) {
                length = value.trim().parse::<usize>().map_err(|_| {
                    Error::invalid_header("Content-Length", format!("not a number: {}", value.trim()))
                })?;
            }
        }
    }
    let size = body_start.checked_add(length).unwrap_or(usize::MAX);
    if size > MAX_MESSAGE_SIZE {
        return Err(Error::MessageTooLarge {
            size,
            limit: MAX_MESSAGE_SIZE,
        });
    }
    let total = skipped + size;
    Ok((buf.len() >= total).then_some(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::headers::HeaderAccess;
    use crate::types::method::Method;
    use crate::types::status::StatusCode;

    const INVITE: &[u8] = b"INVITE sip:127.0.0.1:5060 SIP/2.0\r\n\
Via: SIP/2.0/UDP 127.0.0.1:5070;branch=z9hG4bKabc\r\n\
From: <sip:alice@127.0.0.1>;tag=1\r\n\
To: <sip:127.0.0.1:5060>\r\n\
Call-ID: call-1\r\n\
CSeq: 1 INVITE\r\n\
Session-Expires: 1000\r\n\
Subject: folded\r\n\
\x20line\r\n\
Content-Length: 4\r\n\
\r\n\
v=0\nEXTRA";

    #[test]
    fn test_parse_request_with_folding_and_surplus() {
        let message = parse_message(INVITE).unwrap();
        let request = message.as_request().unwrap();
        assert_eq!(request.method, Method::Invite);
        assert_eq!(request.body(), b"v=0\n");
        let subject = request.header(&HeaderName::Other("Subject".into())).unwrap();
        assert_eq!(subject.value, "folded line");
        assert_eq!(request.cseq().unwrap().seq, 1);
    }

    #[test]
    fn test_short_body_is_incomplete() {
        let raw = b"SIP/2.0 200 OK\r\nContent-Length: 10\r\n\r\nabc";
        assert_eq!(
            parse_message(raw),
            Err(Error::IncompleteMessage { expected: 10, actual: 3 })
        );
    }

    #[test]
    fn test_canonical_reason_not_stored() {
        let message = parse_message(b"\r\n\r\nSIP/2.0 422 Session Interval Too Small\r\n\r\n").unwrap();
        let response = message.as_response().unwrap();
        assert_eq!(response.status, StatusCode::SessionIntervalTooSmall);
        assert_eq!(response.reason, None);

        let message = parse_message(b"SIP/2.0 200 Fine Thanks\r\n\r\n").unwrap();
        assert_eq!(message.as_response().unwrap().reason_phrase(), "Fine Thanks");
    }

    #[test]
    fn test_malformed_messages() {
        assert!(parse_message(b"INVITE sip:a@b SIP/2.0\r\nVia SIP/2.0/UDP a\r\n\r\n").is_err());
        assert!(parse_message(b"INVITE sip:a@b SIP/2.0\r\n").is_err());
        assert!(parse_message(b"\r\n\r\n").is_err());
        assert!(parse_message(b"GARBAGE\r\n\r\n").is_err());
    }

    #[test]
    fn test_message_length_framing() {
        let raw = b"\r\nSIP/2.0 200 OK\r\nl: 3\r\n\r\nabcSIP/2.0";
        assert_eq!(message_length(raw).unwrap(), Some(raw.len() - 7));
        assert_eq!(message_length(&raw[..20]).unwrap(), None);
        assert_eq!(message_length(b"SIP/2.0 200 OK\r\nl: 3\r\n\r\nab").unwrap(), None);
        assert!(message_length(b"SIP/2.0 200 OK\r\nl: x\r\n\r\n").is_err());
    }

    #[test]
    fn test_message_length_rejects_oversized() {
        let huge = b"SIP/2.0 200 OK\r\nContent-Length: 18446744073709551615\r\n\r\n";
        assert!(matches!(
            message_length(huge),
            Err(Error::MessageTooLarge { size: usize::MAX, .. })
        ));

        let four_gb = b"SIP/2.0 200 OK\r\nContent-Length: 4294967296\r\n\r\n";
        assert!(matches!(message_length(four_gb), Err(Error::MessageTooLarge { .. })));

        let unterminated = vec![b'a'; MAX_MESSAGE_SIZE + 1];
        assert_eq!(
            message_length(&unterminated),
            Err(Error::MessageTooLarge {
                size: MAX_MESSAGE_SIZE + 1,
                limit: MAX_MESSAGE_SIZE,
            })
        );

        let at_limit = format!("SIP/2.0 200 OK\r\nl: {}\r\n\r\n", MAX_MESSAGE_SIZE - 100);
        assert_eq!(message_length(at_limit.as_bytes()).unwrap(), None);
    }
}
