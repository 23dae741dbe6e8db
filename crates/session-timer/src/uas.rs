//! INVITE server with RFC 4028 session timers

use std::time::Duration;

use tracing::{info, warn};

use sipconf_sip_core::builder::SimpleResponseBuilder;
use sipconf_sip_core::types::{Header, HeaderAccess, HeaderName, Method, Refresher, Request, Response, StatusCode, Uri};
use sipconf_transaction_core::utils::generate_tag;
use sipconf_transaction_core::TransactionManager;

use crate::config::SessionTimerConfig;
use crate::error::Result;
use crate::negotiator::{Negotiation, SessionTimerNegotiator};
use crate::offer::SessionTimerOffer;
use crate::refresh::SessionTimerSchedule;

/// One INVITE the UAS answered
#[derive(Debug, Clone)]
pub struct UasExchange {
    pub request: Request,
    pub negotiation: Negotiation,
    pub response: Response,
    /// ACK that completed the exchange
    pub ack: Request,
}

impl UasExchange {
    /// The session timer this exchange established, seen from the UAS
    pub fn timer(&self) -> Option<SessionTimerSchedule> {
        self.negotiation
            .agreement()
            .map(|a| SessionTimerSchedule::new(a.session_expires, a.refresher, Refresher::Uas))
    }
}

/// Answers INVITEs through server transactions using a [`SessionTimerNegotiator`]
#[derive(Debug)]
pub struct SessionTimerUas {
    transactions: TransactionManager,
    negotiator: SessionTimerNegotiator,
    local_tag: String,
}

impl SessionTimerUas {
    pub fn new(transactions: TransactionManager, config: SessionTimerConfig) -> Result<Self> {
        config.validate()?;
        Ok(SessionTimerUas {
            transactions,
            negotiator: SessionTimerNegotiator::new(config),
            local_tag: generate_tag(),
        })
    }

    pub fn negotiator(&self) -> &SessionTimerNegotiator {
        &self.negotiator
    }

    pub fn transactions(&mut self) -> &mut TransactionManager {
        &mut self.transactions
    }

    /// Answers the next INVITE and waits for its ACK
    ///
    /// Non-INVITE requests arriving meanwhile are answered (200 for BYE,
    /// 405 otherwise) and skipped, as are messages that fail to parse. An
    /// INVITE with unparseable timer headers gets 400 and the error is returned.
    pub async fn answer_invite(&mut self, timeout: Duration) -> Result<UasExchange> {
        loop {
            let incoming = match self.transactions.next_request(timeout).await {
                Ok(incoming) => incoming,
                Err(e) if e.is_malformed() => {
                    warn!("Ignoring {}", e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            if incoming.request.method != Method::Invite {
                let status = if incoming.request.method == Method::Bye {
                    StatusCode::Ok
                } else {
                    StatusCode::MethodNotAllowed
                };
                warn!(method = %incoming.request.method, "Answering request outside an INVITE with {}", status);
                let mut builder = SimpleResponseBuilder::response_from_request(&incoming.request, status)
                    .to_tag(&self.local_tag);
                if status == StatusCode::MethodNotAllowed {
                    builder = builder.header(Header::text(HeaderName::Allow, "INVITE, ACK, BYE"));
                }
                self.transactions.send_response(&incoming.key, builder.build()).await?;
                continue;
            }

            let offer = match SessionTimerOffer::from_request(&incoming.request) {
                Ok(offer) => offer,
                Err(e) => {
                    let response = SimpleResponseBuilder::response_from_request(&incoming.request, StatusCode::BadRequest)
                        .to_tag(&self.local_tag)
                        .build();
                    self.transactions.send_response(&incoming.key, response).await?;
                    return Err(e);
                }
            };

            let negotiation = self.negotiator.negotiate(&offer);
            let mut response = self.negotiator.respond(&incoming.request, &negotiation, &self.local_tag);
            if let Negotiation::Accept(_) = negotiation {
                let contact = Uri::from_socket_addr(Some("sipconf"), self.transactions.local_addr()?);
                response.add_header(Header::text(HeaderName::Contact, format!("<{}>", contact)));
            }
            info!(
                session_expires = ?offer.session_expires,
                status = response.status_code(),
                "Answering INVITE"
            );
            self.transactions.send_response(&incoming.key, response.clone()).await?;
            let ack = self.transactions.wait_for_ack(&incoming.key).await?;

            return Ok(UasExchange {
                request: incoming.request,
                negotiation,
                response,
                ack,
            });
        }
    }

    /// Answers INVITEs until one is accepted, returning every exchange in order
    pub async fn accept_session(&mut self, timeout: Duration) -> Result<Vec<UasExchange>> {
        let mut exchanges = Vec::new();
        loop {
            let exchange = self.answer_invite(timeout).await?;
            let accepted = matches!(exchange.negotiation, Negotiation::Accept(_));
            exchanges.push(exchange);
            if accepted {
                return Ok(exchanges);
            }
        }
    }
}
