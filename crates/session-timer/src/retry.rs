//! UAC side of RFC 4028: answering 422 Session Interval Too Small

use tracing::{info, warn};

use sipconf_sip_core::types::{HeaderAccess, Method, MinSE, Request, Response, SessionExpires, Via};
use sipconf_transaction_core::utils::generate_branch;

use crate::config::SessionTimerConfig;
use crate::error::{Result, SessionTimerError};

/// Turns 422 responses into new INVITEs with a large enough interval
///
/// The retry goes out with a fresh branch and the next CSeq number, keeping
/// Call-ID, From tag and To. Only one 422 is answered: a 422 to the retried
/// INVITE, or one that does not raise the minimum above what was offered, is
/// a protocol violation. A 422 without Min-SE is malformed.
#[derive(Debug, Clone)]
pub struct RetryController {
    local_min_se: u32,
    attempts: u32,
}

impl RetryController {
    pub fn new(config: &SessionTimerConfig) -> Self {
        RetryController {
            local_min_se: config.min_se,
            attempts: 0,
        }
    }

    /// Retries sent so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Builds the INVITE that answers `response` to `sent`
    pub fn retry(&mut self, sent: &Request, response: &Response) -> Result<Request> {
        if response.status_code() != 422 {
            return Err(SessionTimerError::ProtocolViolation(format!(
                "expected 422, got {}",
                response.status_code()
            )));
        }
        let required = response
            .typed_header::<MinSE>()
            .map_err(|e| SessionTimerError::MalformedResponse(format!("unparseable Min-SE in 422: {}", e)))?
            .ok_or_else(|| SessionTimerError::MalformedResponse("422 response without Min-SE".to_string()))?
            .delta_seconds;

        let offered = sent.typed_header::<SessionExpires>()?;
        let offered_seconds = offered.as_ref().map_or(0, |se| se.delta_seconds);
        if required <= offered_seconds {
            warn!(required, offered = offered_seconds, "422 does not raise the session interval");
            return Err(SessionTimerError::ProtocolViolation(format!(
                "422 requires Min-SE {} but Session-Expires {} was offered",
                required, offered_seconds
            )));
        }

        if self.attempts > 0 {
            warn!(required, offered = offered_seconds, "Retried INVITE rejected again");
            return Err(SessionTimerError::ProtocolViolation(format!(
                "retried Session-Expires {} still rejected, Min-SE {} required",
                offered_seconds, required
            )));
        }
        self.attempts += 1;

        let session_expires = SessionExpires {
            delta_seconds: required.max(offered_seconds),
            ..offered.unwrap_or_else(|| SessionExpires::new(required, None))
        };
        let min_se = MinSE::new(self.local_min_se.max(required));

        let mut retry = sent.clone();
        let mut via = retry.first_via()?;
        via.set_branch(&generate_branch());
        retry.set_typed_header::<Via>(&via);
        let cseq = retry.cseq()?.next(Method::Invite);
        retry.set_typed_header(&cseq);
        retry.set_typed_header(&session_expires);
        retry.set_typed_header(&min_se);

        info!(
            attempt = self.attempts,
            session_expires = session_expires.delta_seconds,
            min_se = min_se.delta_seconds,
            "Retrying INVITE after 422"
        );
        Ok(retry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sipconf_sip_core::builder::{SimpleRequestBuilder, SimpleResponseBuilder};
    use sipconf_sip_core::types::{Refresher, StatusCode};

    fn invite(session_expires: u32) -> Request {
        SimpleRequestBuilder::invite("sip:127.0.0.1:5060")
            .unwrap()
            .via("127.0.0.1:5070", "UDP", "z9hG4bK-first")
            .from("sip:uac@127.0.0.1", Some("ftag"))
            .unwrap()
            .to("sip:127.0.0.1:5060", None)
            .unwrap()
            .call_id("retry-call")
            .cseq(1)
            .supported(&["timer"])
            .session_expires(session_expires, Some(Refresher::Uac))
            .min_se(100)
            .build()
    }

    fn too_small(request: &Request, min_se: Option<u32>) -> Response {
        let mut builder =
            SimpleResponseBuilder::response_from_request(request, StatusCode::SessionIntervalTooSmall).to_tag("ttag");
        if let Some(min_se) = min_se {
            builder = builder.min_se(min_se);
        }
        builder.build()
    }

    fn controller() -> RetryController {
        RetryController::new(&SessionTimerConfig::default().with_min_se(100).with_session_expires(1000))
    }

    #[test]
    fn test_retry_raises_interval() {
        let first = invite(1000);
        let retry = controller().retry(&first, &too_small(&first, Some(2000))).unwrap();

        let se = retry.require_header::<SessionExpires>().unwrap();
        assert_eq!(se.delta_seconds, 2000);
        assert_eq!(se.refresher, Some(Refresher::Uac));
        assert_eq!(retry.require_header::<MinSE>().unwrap().delta_seconds, 2000);
        assert_eq!(retry.cseq().unwrap().seq, 2);
        assert_eq!(retry.call_id().unwrap(), first.call_id().unwrap());
        assert_eq!(retry.from().unwrap().tag(), Some("ftag"));
        assert_eq!(retry.to().unwrap().tag(), None);
        assert_ne!(retry.first_via().unwrap().branch(), Some("z9hG4bK-first"));

        let text = retry.to_string();
        assert_eq!(text.matches("Session-Expires:").count(), 1);
        assert_eq!(text.matches("Min-SE:").count(), 1);
    }

    #[test]
    fn test_missing_min_se_is_malformed() {
        let first = invite(1000);
        let err = controller().retry(&first, &too_small(&first, None)).unwrap_err();
        assert!(matches!(err, SessionTimerError::MalformedResponse(_)));
    }

    #[test]
    fn test_rejecting_offered_minimum_is_violation() {
        let first = invite(2000);
        let err = controller().retry(&first, &too_small(&first, Some(2000))).unwrap_err();
        assert!(matches!(err, SessionTimerError::ProtocolViolation(_)));
    }

    #[test]
    fn test_second_422_fails_permanently() {
        let mut controller = controller();
        let first = invite(1000);
        let retried = controller.retry(&first, &too_small(&first, Some(2000))).unwrap();
        assert_eq!(controller.attempts(), 1);

        let err = controller.retry(&retried, &too_small(&retried, Some(3000))).unwrap_err();
        assert!(matches!(err, SessionTimerError::ProtocolViolation(_)));
        assert_eq!(controller.attempts(), 1);
    }
}
