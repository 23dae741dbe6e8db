use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serial_test::serial;

use sipconf_sip_core::prelude::{HeaderAccess, MinSE, Refresher, SessionExpires, Uri};
use sipconf_sip_transport::{bind_tcp, bind_udp};
use sipconf_session_timer::{
    Negotiation, SessionTimerConfig, SessionTimerError, SessionTimerUac, SessionTimerUas, TimerUsage,
};
use sipconf_transaction_core::{TimerSettings, TransactionManager};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn timers() -> TimerSettings {
    TimerSettings::default().with_t1(Duration::from_millis(20)).with_t2(Duration::from_millis(80))
}

async fn udp_manager() -> TransactionManager {
    init_tracing();
    let (transport, events) = bind_udp("127.0.0.1:0".parse().unwrap()).await.unwrap();
    TransactionManager::new(Arc::new(transport), events, timers())
}

async fn tcp_manager() -> TransactionManager {
    init_tracing();
    let (transport, events) = bind_tcp("127.0.0.1:0".parse().unwrap()).await.unwrap();
    TransactionManager::new(Arc::new(transport), events, timers())
}

fn target(addr: SocketAddr) -> Uri {
    Uri::from_socket_addr(None, addr)
}

fn uac_config() -> SessionTimerConfig {
    SessionTimerConfig::default().with_min_se(100).with_session_expires(1000)
}

fn uas_config() -> SessionTimerConfig {
    SessionTimerConfig::default().with_min_se(2000).with_session_expires(2000)
}

#[tokio::test]
#[serial]
async fn test_uac_retries_after_422_over_udp() {
    let uas_manager = udp_manager().await;
    let uas_addr = uas_manager.local_addr().unwrap();
    let mut uas = SessionTimerUas::new(uas_manager, uas_config()).unwrap();
    let server = tokio::spawn(async move { uas.accept_session(Duration::from_secs(2)).await });

    let mut uac = SessionTimerUac::new(udp_manager().await, uac_config()).unwrap();
    let session = uac.invite(&target(uas_addr)).await.unwrap();

    assert_eq!(session.retries, 1);
    assert_eq!(session.response.status_code(), 200);
    let timer = session.timer.unwrap();
    assert_eq!(timer.session_expires, 2000);
    assert_eq!(timer.refresher, Refresher::Uac);
    assert!(timer.is_local_refresher());
    assert_eq!(session.invite.cseq().unwrap().seq, 2);

    let exchanges = server.await.unwrap().unwrap();
    assert_eq!(exchanges.len(), 2);

    let first = &exchanges[0];
    assert_eq!(first.negotiation, Negotiation::TooSmall { min_se: 2000 });
    assert_eq!(first.request.require_header::<SessionExpires>().unwrap().delta_seconds, 1000);
    assert_eq!(first.response.require_header::<MinSE>().unwrap().delta_seconds, 2000);
    assert!(first.ack.to_string().starts_with("ACK sip"));

    let second = &exchanges[1];
    assert_eq!(second.request.require_header::<SessionExpires>().unwrap().delta_seconds, 2000);
    assert_eq!(second.request.require_header::<MinSE>().unwrap().delta_seconds, 2000);
    assert_eq!(second.request.call_id().unwrap(), first.request.call_id().unwrap());
    assert!(second.response.to_string().contains("Session-Expires: 2000;refresher=uac\r\n"));
    assert!(!second.timer().unwrap().is_local_refresher());
}

#[tokio::test]
#[serial]
async fn test_uac_retries_after_422_over_tcp() {
    let uas_manager = tcp_manager().await;
    let uas_addr = uas_manager.local_addr().unwrap();
    let mut uas = SessionTimerUas::new(uas_manager, uas_config()).unwrap();
    let server = tokio::spawn(async move { uas.accept_session(Duration::from_secs(2)).await });

    let mut uac = SessionTimerUac::new(tcp_manager().await, uac_config()).unwrap();
    let session = uac.invite(&target(uas_addr)).await.unwrap();
    assert_eq!(session.timer.unwrap().session_expires, 2000);
    assert_eq!(server.await.unwrap().unwrap().len(), 2);
}

#[tokio::test]
#[serial]
async fn test_acceptable_offer_needs_no_retry() {
    let uas_manager = udp_manager().await;
    let uas_addr = uas_manager.local_addr().unwrap();
    let mut uas = SessionTimerUas::new(uas_manager, SessionTimerConfig::default()).unwrap();
    let server = tokio::spawn(async move { uas.answer_invite(Duration::from_secs(2)).await });

    let config = uac_config().with_session_expires(1800);
    let mut uac = SessionTimerUac::new(udp_manager().await, config).unwrap();
    let session = uac.invite(&target(uas_addr)).await.unwrap();
    assert_eq!(session.retries, 0);
    assert_eq!(session.timer.unwrap().session_expires, 1800);

    let exchange = server.await.unwrap().unwrap();
    assert_eq!(exchange.timer().unwrap().refresher, Refresher::Uac);
}

#[tokio::test]
#[serial]
async fn test_inactive_uac_sends_no_timer_headers() {
    let uas_manager = udp_manager().await;
    let uas_addr = uas_manager.local_addr().unwrap();
    let mut uas = SessionTimerUas::new(uas_manager, uas_config()).unwrap();
    let server = tokio::spawn(async move { uas.answer_invite(Duration::from_secs(2)).await });

    let config = uac_config().with_usage(TimerUsage::Inactive);
    let mut uac = SessionTimerUac::new(udp_manager().await, config).unwrap();
    let session = uac.invite(&target(uas_addr)).await.unwrap();
    assert!(session.timer.is_none());

    let exchange = server.await.unwrap().unwrap();
    assert!(!exchange.request.has_header(&sipconf_sip_core::HeaderName::SessionExpires));
    assert_eq!(exchange.negotiation, Negotiation::Accept(None));
}

#[tokio::test]
#[serial]
async fn test_required_uas_rejects_inactive_uac() {
    let uas_manager = udp_manager().await;
    let uas_addr = uas_manager.local_addr().unwrap();
    let mut uas = SessionTimerUas::new(uas_manager, SessionTimerConfig::default().with_usage(TimerUsage::Required)).unwrap();
    let server = tokio::spawn(async move { uas.answer_invite(Duration::from_secs(2)).await });

    let config = uac_config().with_usage(TimerUsage::Inactive);
    let mut uac = SessionTimerUac::new(udp_manager().await, config).unwrap();
    let err = uac.invite(&target(uas_addr)).await.unwrap_err();
    match err {
        SessionTimerError::Rejected { status, .. } => assert_eq!(status.as_u16(), 421),
        other => panic!("expected rejection, got {}", other),
    }
    assert_eq!(server.await.unwrap().unwrap().negotiation, Negotiation::ExtensionRequired);
}

#[tokio::test]
#[serial]
async fn test_uac_times_out_without_peer() {
    let silent = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let mut uac = SessionTimerUac::new(udp_manager().await, uac_config()).unwrap();
    let err = uac.invite(&target(silent.local_addr().unwrap())).await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let result = SessionTimerUac::new(udp_manager().await, SessionTimerConfig::default().with_min_se(30));
    assert!(matches!(result, Err(SessionTimerError::InvalidConfig(_))));
}

#[tokio::test]
#[serial]
async fn test_retried_invite_rejected_again_fails_permanently() {
    let mut peer = udp_manager().await;
    let peer_addr = peer.local_addr().unwrap();
    // Each INVITE gets a 422 asking for more than was offered
    let server = tokio::spawn(async move {
        let mut offered = Vec::new();
        for min_se in [2000, 3000] {
            let incoming = peer.next_request(Duration::from_secs(2)).await.unwrap();
            offered.push(incoming.request.require_header::<SessionExpires>().unwrap().delta_seconds);
            let response = sipconf_sip_core::builder::SimpleResponseBuilder::response_from_request(
                &incoming.request,
                sipconf_sip_core::StatusCode::SessionIntervalTooSmall,
            )
            .to_tag("greedy")
            .min_se(min_se)
            .build();
            peer.send_response(&incoming.key, response).await.unwrap();
            peer.wait_for_ack(&incoming.key).await.unwrap();
        }
        offered
    });

    let mut uac = SessionTimerUac::new(udp_manager().await, uac_config()).unwrap();
    let err = uac.invite(&target(peer_addr)).await.unwrap_err();
    assert!(matches!(err, SessionTimerError::ProtocolViolation(_)), "{}", err);
    assert_eq!(server.await.unwrap(), vec![1000, 2000]);
}
