//! INVITE client with RFC 4028 session timers

use tracing::{debug, info};

use sipconf_sip_core::builder::SimpleRequestBuilder;
use sipconf_sip_core::types::{
    HeaderAccess, Refresher, Request, Response, SessionExpires, Uri, TIMER_OPTION_TAG,
};
use sipconf_transaction_core::utils::{generate_branch, generate_call_id, generate_tag};
use sipconf_transaction_core::{create_ack_for_2xx, TransactionKey, TransactionManager};

use crate::config::{SessionTimerConfig, TimerUsage};
use crate::error::{Result, SessionTimerError};
use crate::refresh::SessionTimerSchedule;
use crate::retry::RetryController;

/// A session the UAC established
#[derive(Debug, Clone)]
pub struct EstablishedSession {
    pub call_id: String,
    pub local_tag: String,
    pub remote_tag: Option<String>,
    /// The INVITE that was accepted
    pub invite: Request,
    /// Its 2xx response
    pub response: Response,
    /// The ACK sent for the 2xx
    pub ack: Request,
    /// Negotiated session timer; `None` when timers are not in use
    pub timer: Option<SessionTimerSchedule>,
    /// 422 retries it took
    pub retries: u32,
}

/// Sends INVITEs and follows 422 responses until a session is established
#[derive(Debug)]
pub struct SessionTimerUac {
    transactions: TransactionManager,
    config: SessionTimerConfig,
    user: String,
}

impl SessionTimerUac {
    pub fn new(transactions: TransactionManager, config: SessionTimerConfig) -> Result<Self> {
        config.validate()?;
        Ok(SessionTimerUac {
            transactions,
            config,
            user: "sipconf".to_string(),
        })
    }

    /// User part of the From and Contact URIs
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn config(&self) -> &SessionTimerConfig {
        &self.config
    }

    pub fn transactions(&mut self) -> &mut TransactionManager {
        &mut self.transactions
    }

    /// The first INVITE of a call, with timer headers per the local policy
    pub fn build_invite(&self, target: &Uri, call_id: &str, local_tag: &str) -> Result<Request> {
        let local = self.transactions.local_addr()?;
        let local_uri = Uri::from_socket_addr(Some(&self.user), local).to_string();
        let mut builder = SimpleRequestBuilder::invite(&target.to_string())?
            .via(&local.to_string(), self.transactions.transport_name(), &generate_branch())
            .max_forwards(70)
            .from(&local_uri, Some(local_tag))?
            .to(&target.to_string(), None)?
            .contact(&local_uri)?
            .call_id(call_id)
            .cseq(1);
        if self.config.usage.is_enabled() {
            builder = builder.supported(&[TIMER_OPTION_TAG]);
            if self.config.usage == TimerUsage::Required {
                builder = builder.require(&[TIMER_OPTION_TAG]);
            }
            builder = builder
                .session_expires(self.config.session_expires, None)
                .min_se(self.config.min_se);
        }
        Ok(builder.build())
    }

    /// Establishes a session with `target`
    ///
    /// A 422 is answered through the [`RetryController`]; a 2xx is ACKed and
    /// its Session-Expires decides the refresh role. Any other final
    /// response is [`SessionTimerError::Rejected`].
    pub async fn invite(&mut self, target: &Uri) -> Result<EstablishedSession> {
        let destination = target
            .socket_addr()
            .ok_or_else(|| SessionTimerError::InvalidTarget(target.to_string()))?;
        let local = self.transactions.local_addr()?;
        let call_id = generate_call_id(&local.ip().to_string());
        let local_tag = generate_tag();
        let mut request = self.build_invite(target, &call_id, &local_tag)?;
        let mut retry = RetryController::new(&self.config);

        loop {
            let key = TransactionKey::from_request(&request, false)?;
            let response = self.transactions.send_request(request.clone(), destination).await?;
            debug!(status = response.status_code(), "INVITE answered");

            if response.status.is_success() {
                let ack = create_ack_for_2xx(&request, &response, &local.to_string(), &generate_branch())?;
                self.transactions.send_ack(&key, ack.clone()).await?;
                let timer = self.timer_from_2xx(&request, &response)?;
                info!(%call_id, ?timer, retries = retry.attempts(), "Session established");
                return Ok(EstablishedSession {
                    call_id,
                    local_tag,
                    remote_tag: response.to()?.tag().map(str::to_string),
                    invite: request,
                    response,
                    ack,
                    timer,
                    retries: retry.attempts(),
                });
            }

            if response.status_code() == 422 && self.config.usage.is_enabled() {
                request = retry.retry(&request, &response)?;
                continue;
            }

            return Err(SessionTimerError::Rejected {
                status: response.status,
                reason: response.reason_phrase().to_string(),
            });
        }
    }

    /// Session timer the UAC runs after `response` accepted `invite`
    ///
    /// The refresher parameter of the 2xx decides. A 2xx without
    /// Session-Expires means no timer unless the local policy is `Always`,
    /// in which case the UAC refreshes with its own offer.
    fn timer_from_2xx(&self, invite: &Request, response: &Response) -> Result<Option<SessionTimerSchedule>> {
        if !self.config.usage.is_enabled() {
            return Ok(None);
        }
        match response.typed_header::<SessionExpires>()? {
            Some(se) => {
                // A 2xx that names no refresher leaves the job with the UAC
                let refresher = se.refresher.unwrap_or(Refresher::Uac);
                Ok(Some(SessionTimerSchedule::new(se.delta_seconds, refresher, Refresher::Uac)))
            }
            None if self.config.usage == TimerUsage::Always => {
                let offered = invite
                    .typed_header::<SessionExpires>()?
                    .map_or(self.config.session_expires, |se| se.delta_seconds);
                Ok(Some(SessionTimerSchedule::new(offered, Refresher::Uac, Refresher::Uac)))
            }
            None => Ok(None),
        }
    }
}
