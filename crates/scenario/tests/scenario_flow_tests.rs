use std::sync::Arc;
use std::time::Duration;

use serial_test::serial;

use sipconf_scenario::{
    ExpectedTransaction, PeerTransport, Scenario, ScenarioConfig, ScenarioFailure, ScenarioOutcome, ScenarioPeer,
};
use sipconf_session_timer::{SessionTimerError, SessionTimerUac};
use sipconf_sip_core::builder::SimpleRequestBuilder;
use sipconf_sip_core::types::Refresher;
use sipconf_sip_transport::{bind_tcp, bind_udp};
use sipconf_transaction_core::{TimerSettings, TransactionManager};

const RETRY_AFTER_422: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/timer_retry_after_422.toml");

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn timers() -> TimerSettings {
    TimerSettings::default().with_t1(Duration::from_millis(20)).with_t2(Duration::from_millis(80))
}

fn peer_config() -> ScenarioConfig {
    ScenarioConfig::default()
        .with_timeout(Duration::from_secs(3))
        .with_timers(timers())
}

async fn ua_manager(transport: PeerTransport) -> TransactionManager {
    let addr = "127.0.0.1:0".parse().unwrap();
    match transport {
        PeerTransport::Udp => {
            let (transport, events) = bind_udp(addr).await.unwrap();
            TransactionManager::new(Arc::new(transport), events, timers())
        }
        PeerTransport::Tcp => {
            let (transport, events) = bind_tcp(addr).await.unwrap();
            TransactionManager::new(Arc::new(transport), events, timers())
        }
    }
}

/// Starts the peer, then a UA configured from the scenario's setup line
async fn play(
    scenario: Scenario,
    transport: PeerTransport,
) -> (ScenarioOutcome, Result<sipconf_session_timer::EstablishedSession, SessionTimerError>) {
    init_tracing();
    let mut peer = ScenarioPeer::bind(peer_config().with_transport(transport)).await.unwrap();
    let args = peer.setup_args(&scenario).unwrap();
    let peer_task = tokio::spawn(async move { peer.run(&scenario).await });

    let mut ua = SessionTimerUac::new(ua_manager(transport).await, args.session_timer_config().unwrap()).unwrap();
    let session = ua.invite(&args.target_uri().unwrap().unwrap()).await;
    (peer_task.await.unwrap().unwrap(), session)
}

#[tokio::test]
#[serial]
async fn test_retry_after_422_scenario_passes_over_udp() {
    let scenario = Scenario::from_file(RETRY_AFTER_422).unwrap();
    let (outcome, session) = play(scenario, PeerTransport::Udp).await;

    assert_eq!(outcome, ScenarioOutcome::Passed { steps: 2 });
    let session = session.unwrap();
    assert_eq!(session.retries, 1);
    let timer = session.timer.unwrap();
    assert_eq!(timer.session_expires, 2000);
    assert_eq!(timer.refresher, Refresher::Uac);
}

#[tokio::test]
#[serial]
async fn test_retry_after_422_scenario_passes_over_tcp() {
    let scenario = Scenario::from_file(RETRY_AFTER_422).unwrap();
    let (outcome, session) = play(scenario, PeerTransport::Tcp).await;
    assert!(outcome.is_passed(), "{}", outcome);
    assert_eq!(session.unwrap().timer.unwrap().session_expires, 2000);
}

#[tokio::test]
#[serial]
async fn test_wrong_session_expires_is_mismatch() {
    let mut scenario = Scenario::from_file(RETRY_AFTER_422).unwrap();
    scenario.setup = "--null-audio sip:127.0.0.1:$PORT --timer-min-se 100 --timer-se 1500".to_string();
    let (outcome, session) = play(scenario, PeerTransport::Udp).await;

    match outcome {
        ScenarioOutcome::Failed {
            step,
            title,
            failure: ScenarioFailure::Mismatch { expected, actual },
        } => {
            assert_eq!(step, 0);
            assert_eq!(title, "INVITE with SE too small");
            assert_eq!(expected, r"request matching /Session-Expires:\s*1000/");
            assert!(actual.starts_with("INVITE sip:127.0.0.1:"));
            assert!(actual.contains("Session-Expires: 1500\r\n"));
        }
        other => panic!("expected mismatch, got {}", other),
    }
    // The peer never answered
    assert!(session.unwrap_err().is_timeout());
}

#[tokio::test]
#[serial]
async fn test_unexpected_follow_up_is_mismatch() {
    let scenario = Scenario::new("Busy then BYE", "--null-audio sip:127.0.0.1:$PORT").with_transaction(
        ExpectedTransaction::new("INVITE rejected", 486)
            .with_include("^INVITE sip")
            .with_expect("^BYE sip"),
    );
    let (outcome, session) = play(scenario, PeerTransport::Udp).await;

    let failure = outcome.failure().cloned().unwrap();
    match failure {
        ScenarioFailure::Mismatch { expected, actual } => {
            assert_eq!(expected, "follow-up matching /^BYE sip/");
            assert!(actual.starts_with("ACK sip"));
        }
        other => panic!("expected mismatch, got {}", other),
    }
    match session.unwrap_err() {
        SessionTimerError::Rejected { status, .. } => assert_eq!(status.as_u16(), 486),
        other => panic!("expected rejection, got {}", other),
    }
}

#[tokio::test]
#[serial]
async fn test_no_request_is_timeout() {
    init_tracing();
    let scenario = Scenario::from_file(RETRY_AFTER_422).unwrap();
    let mut peer = ScenarioPeer::bind(peer_config().with_timeout(Duration::from_millis(200))).await.unwrap();

    let outcome = peer.run(&scenario).await.unwrap();
    match outcome {
        ScenarioOutcome::Failed { step, failure, .. } => {
            assert_eq!(step, 0);
            assert_eq!(failure, ScenarioFailure::Timeout {
                waiting_for: "request for 'INVITE with SE too small'".to_string(),
                after: Duration::from_millis(200),
            });
        }
        other => panic!("expected timeout, got {}", other),
    }
}

#[tokio::test]
#[serial]
async fn test_missing_ack_is_timeout() {
    init_tracing();
    let scenario = Scenario::from_file(RETRY_AFTER_422).unwrap();
    let mut peer = ScenarioPeer::bind(peer_config()).await.unwrap();
    let peer_addr = peer.local_addr();
    let peer_task = tokio::spawn(async move { peer.run(&scenario).await });

    // A UA that sends one INVITE and never ACKs
    let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let local = socket.local_addr().unwrap().to_string();
    let invite = SimpleRequestBuilder::invite(&format!("sip:{}", peer_addr)).unwrap()
        .via(&local, "UDP", "z9hG4bKnoack")
        .from(&format!("sip:ua@{}", local), Some("silent")).unwrap()
        .to(&format!("sip:{}", peer_addr), None).unwrap()
        .call_id("no-ack@127.0.0.1")
        .cseq(1)
        .supported(&["timer"])
        .session_expires(1000, None)
        .min_se(100)
        .build();
    socket.send_to(&invite.to_bytes(), peer_addr).await.unwrap();

    let outcome = peer_task.await.unwrap().unwrap();
    match outcome.failure() {
        Some(ScenarioFailure::Timeout { waiting_for, after }) => {
            assert_eq!(waiting_for, "ACK after 422");
            assert_eq!(*after, timers().timer_h());
        }
        other => panic!("expected ACK timeout, got {:?}", other),
    }

    // The 422 was retransmitted while the peer waited
    let mut buf = vec![0u8; 4096];
    let mut finals = 0;
    while let Ok(Ok((len, _))) = tokio::time::timeout(Duration::from_millis(50), socket.recv_from(&mut buf)).await {
        if String::from_utf8_lossy(&buf[..len]).starts_with("SIP/2.0 422") {
            finals += 1;
        }
    }
    assert!(finals >= 2);
}

#[tokio::test]
#[serial]
async fn test_unparseable_request_is_mismatch() {
    init_tracing();
    let scenario = Scenario::from_file(RETRY_AFTER_422).unwrap();
    let mut peer = ScenarioPeer::bind(peer_config()).await.unwrap();
    let peer_addr = peer.local_addr();
    let peer_task = tokio::spawn(async move { peer.run(&scenario).await });

    // Header line without a colon
    let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let garbled = format!(
        "INVITE sip:{} SIP/2.0\r\nVia: SIP/2.0/UDP {};branch=z9hG4bKgarbled\r\nSession-Expires 1000\r\n\r\n",
        peer_addr,
        socket.local_addr().unwrap()
    );
    socket.send_to(garbled.as_bytes(), peer_addr).await.unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(2), peer_task).await.unwrap().unwrap().unwrap();
    match outcome {
        ScenarioOutcome::Failed { step, failure, .. } => {
            assert_eq!(step, 0);
            assert!(!failure.is_timeout());
            match failure {
                ScenarioFailure::Mismatch { expected, actual } => {
                    assert_eq!(expected, "well-formed SIP request for 'INVITE with SE too small'");
                    assert!(actual.contains("Session-Expires 1000"), "{}", actual);
                }
                other => panic!("expected mismatch, got {}", other),
            }
        }
        other => panic!("expected failure, got {}", other),
    }
}

#[tokio::test]
async fn test_invalid_pattern_is_error() {
    let scenario = Scenario::new("bad", "").with_transaction(ExpectedTransaction::new("bad", 200).with_include("("));
    let mut peer = ScenarioPeer::bind(peer_config()).await.unwrap();
    assert!(matches!(
        peer.run(&scenario).await,
        Err(sipconf_scenario::ScenarioError::Pattern(_))
    ));
}
