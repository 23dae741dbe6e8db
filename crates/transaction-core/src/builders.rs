//! ACK construction for INVITE client transactions

use sipconf_sip_core::types::{
    CSeq, Contact, Header, HeaderAccess, HeaderName, Method, Request, Response, TypedHeaderTrait, Via,
};

use crate::error::{Error, Result};

/// ACK for a non-2xx final response to `invite`
///
/// Part of the INVITE transaction: same Request-URI, top Via (and so branch),
/// Call-ID, From and Route set as the INVITE, the To of the response, and the
/// INVITE's CSeq number with method ACK.
pub fn create_ack_for_non2xx(invite: &Request, response: &Response) -> Result<Request> {
    if invite.method != Method::Invite {
        return Err(Error::InvalidRequest(format!("cannot ACK a {} request", invite.method)));
    }
    let mut ack = Request::new(Method::Ack, invite.uri.clone());
    let via = invite.first_via()?;
    let top = via
        .top()
        .cloned()
        .ok_or_else(|| Error::InvalidRequest("INVITE has an empty Via".to_string()))?;
    ack.add_header(Via(vec![top]).to_header());
    copy_headers(invite, &mut ack, &HeaderName::MaxForwards);
    copy_headers(invite, &mut ack, &HeaderName::From);
    copy_headers(response, &mut ack, &HeaderName::To);
    copy_headers(invite, &mut ack, &HeaderName::CallId);
    ack.add_header(CSeq::new(invite.cseq()?.seq, Method::Ack).to_header());
    copy_headers(invite, &mut ack, &HeaderName::Route);
    Ok(ack)
}

/// ACK for a 2xx response to `invite`
///
/// A transaction of its own: a fresh `branch`, Request-URI taken from the
/// 2xx Contact when present, and the dialog identifiers of the response.
pub fn create_ack_for_2xx(invite: &Request, response: &Response, sent_by: &str, branch: &str) -> Result<Request> {
    if invite.method != Method::Invite {
        return Err(Error::InvalidRequest(format!("cannot ACK a {} request", invite.method)));
    }
    let uri = match response.typed_header::<Contact>()? {
        Some(contact) => contact.uri.clone(),
        None => invite.uri.clone(),
    };
    let transport = invite
        .first_via()?
        .top()
        .map(|v| v.transport().to_string())
        .unwrap_or_else(|| "UDP".to_string());
    let (host, port) = match sent_by.rsplit_once(':').and_then(|(h, p)| p.parse::<u16>().ok().map(|p| (h, p))) {
        Some((host, port)) => (host, Some(port)),
        None => (sent_by, None),
    };

    let mut ack = Request::new(Method::Ack, uri);
    ack.add_header(Via::new(&transport, host, port, branch).to_header());
    ack.add_header(Header::text(HeaderName::MaxForwards, "70"));
    copy_headers(response, &mut ack, &HeaderName::From);
    copy_headers(response, &mut ack, &HeaderName::To);
    copy_headers(response, &mut ack, &HeaderName::CallId);
    ack.add_header(CSeq::new(response.cseq()?.seq, Method::Ack).to_header());
    Ok(ack)
}

fn copy_headers<M: HeaderAccess>(from: &M, to: &mut Request, name: &HeaderName) {
    for header in from.headers_named(name) {
        to.add_header(header.clone());
    }
}
