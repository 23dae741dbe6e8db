// Message-level parser tests: real-world session-timer exchanges, compact
// forms, stream framing and robustness against arbitrary input.

use std::str::FromStr;

use proptest::prelude::*;
use sipconf_sip_core::{
    error::Error,
    parse_message, message_length,
    types::{
        headers::{HeaderAccess, HeaderName},
        min_se::MinSE,
        option_tag::{Require, Supported},
        session_expires::{Refresher, SessionExpires},
        status::StatusCode,
        method::Method,
        Message,
    },
};

const INVITE_WITH_TIMER: &str = "INVITE sip:127.0.0.1:5060 SIP/2.0\r\n\
Via: SIP/2.0/UDP 127.0.0.1:5070;rport;branch=z9hG4bKPj1a2b3c\r\n\
Max-Forwards: 70\r\n\
From: <sip:127.0.0.1:5070>;tag=a7d1\r\n\
To: <sip:127.0.0.1:5060>\r\n\
Contact: <sip:127.0.0.1:5070;ob>\r\n\
Call-ID: 4f3e2d1c\r\n\
CSeq: 9 INVITE\r\n\
Supported: replaces, 100rel, timer\r\n\
Session-Expires: 1000\r\n\
Min-SE: 100\r\n\
Content-Length: 0\r\n\r\n";

const RESPONSE_422: &str = "SIP/2.0 422 Session Interval Too Small\r\n\
Via: SIP/2.0/UDP 127.0.0.1:5070;rport;branch=z9hG4bKPj1a2b3c\r\n\
From: <sip:127.0.0.1:5070>;tag=a7d1\r\n\
To: <sip:127.0.0.1:5060>;tag=peer\r\n\
Call-ID: 4f3e2d1c\r\n\
CSeq: 9 INVITE\r\n\
Min-SE: 2000\r\n\
Content-Length: 0\r\n\r\n";

#[test]
fn test_invite_session_timer_headers() {
    let message = parse_message(INVITE_WITH_TIMER.as_bytes()).unwrap();
    let request = message.as_request().unwrap();
    assert_eq!(request.method, Method::Invite);

    let se = request.typed_header::<SessionExpires>().unwrap().unwrap();
    assert_eq!(se.delta_seconds, 1000);
    assert_eq!(se.refresher, None);
    assert_eq!(request.typed_header::<MinSE>().unwrap().unwrap().delta_seconds, 100);
    assert!(request.typed_header::<Supported>().unwrap().unwrap().contains("timer"));
    assert_eq!(request.first_via().unwrap().branch(), Some("z9hG4bKPj1a2b3c"));
    assert_eq!(request.cseq().unwrap().seq, 9);
}

#[test]
fn test_422_carries_min_se() {
    let message = parse_message(RESPONSE_422.as_bytes()).unwrap();
    let response = message.as_response().unwrap();
    assert_eq!(response.status, StatusCode::SessionIntervalTooSmall);
    assert_eq!(response.typed_header::<MinSE>().unwrap(), Some(MinSE::new(2000)));
    assert_eq!(response.to().unwrap().tag(), Some("peer"));
}

#[test]
fn test_compact_forms() {
    let raw = "SIP/2.0 200 OK\r\n\
v: SIP/2.0/UDP 127.0.0.1:5070;branch=z9hG4bK9\r\n\
f: <sip:a@127.0.0.1>;tag=1\r\n\
t: <sip:b@127.0.0.1>;tag=2\r\n\
i: c9\r\n\
CSeq: 10 INVITE\r\n\
k: timer\r\n\
x: 2000;refresher=uac\r\n\
l: 0\r\n\r\n";
    let message = parse_message(raw.as_bytes()).unwrap();
    let se = message.typed_header::<SessionExpires>().unwrap().unwrap();
    assert_eq!(se, SessionExpires::new(2000, Some(Refresher::Uac)));
    assert_eq!(message.call_id().unwrap().as_str(), "c9");
    assert!(message.has_header(&HeaderName::Supported));
    assert!(message.typed_header::<Require>().unwrap().is_none());

    // Serialization uses canonical names
    let text = message.to_string();
    assert!(text.contains("Session-Expires: 2000;refresher=uac\r\n"));
    assert!(text.contains("Call-ID: c9\r\n"));
}

#[test]
fn test_bad_session_expires_is_reported_on_access() {
    let raw = INVITE_WITH_TIMER.replace("Session-Expires: 1000", "Session-Expires: 1000;refresher=proxy");
    let message = parse_message(raw.as_bytes()).unwrap();
    assert!(matches!(
        message.typed_header::<SessionExpires>(),
        Err(Error::InvalidHeader { ref name, .. }) if name == "Session-Expires"
    ));
}

#[test]
fn test_reserialized_message_parses_identically() {
    let first = parse_message(INVITE_WITH_TIMER.as_bytes()).unwrap();
    let second = parse_message(&first.to_bytes()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_stream_framing_splits_back_to_back_messages() {
    let mut stream = Vec::new();
    stream.extend_from_slice(RESPONSE_422.as_bytes());
    stream.extend_from_slice(b"\r\n");
    stream.extend_from_slice(INVITE_WITH_TIMER.as_bytes());

    let first_len = message_length(&stream).unwrap().unwrap();
    assert_eq!(first_len, RESPONSE_422.len());
    let first = parse_message(&stream[..first_len]).unwrap();
    assert!(first.is_response());

    let rest = &stream[first_len..];
    let second_len = message_length(rest).unwrap().unwrap();
    assert_eq!(second_len, rest.len());
    assert!(matches!(parse_message(&rest[..second_len]).unwrap(), Message::Request(_)));
}

#[test]
fn test_content_length_header_parse_errors() {
    let raw = "SIP/2.0 200 OK\r\nContent-Length: lots\r\n\r\n";
    assert!(matches!(
        parse_message(raw.as_bytes()),
        Err(Error::InvalidHeader { ref name, .. }) if name == "Content-Length"
    ));
    assert_eq!(
        StatusCode::from_str("422").unwrap(),
        StatusCode::SessionIntervalTooSmall
    );
}

proptest! {
    #[test]
    fn parse_message_never_panics(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = parse_message(&data);
        let _ = message_length(&data);
    }

    #[test]
    fn session_expires_value_survives_a_message(delta in 0u32..=u32::MAX, refresher in prop_oneof![
        Just(None), Just(Some(Refresher::Uac)), Just(Some(Refresher::Uas))
    ]) {
        let se = SessionExpires::new(delta, refresher);
        let raw = INVITE_WITH_TIMER.replace("Session-Expires: 1000", &format!("Session-Expires: {}", se));
        let message = parse_message(raw.as_bytes()).unwrap();
        prop_assert_eq!(message.typed_header::<SessionExpires>().unwrap(), Some(se));
    }
}
