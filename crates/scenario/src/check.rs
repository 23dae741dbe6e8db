//! Regex assertions on received messages

use regex::{Regex, RegexBuilder};

use crate::error::Result;
use crate::outcome::ScenarioFailure;
use crate::scenario::ExpectedTransaction;

/// Compiled assertions of one expected transaction
///
/// Patterns are searched in the whole message text with `^`/`$` matching
/// at line boundaries.
#[derive(Debug, Clone)]
pub struct RequestCheck {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    expect: Option<Regex>,
}

fn compile(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).multi_line(true).build()?)
}

impl RequestCheck {
    pub fn compile(expected: &ExpectedTransaction) -> Result<Self> {
        Ok(RequestCheck {
            include: expected.include.iter().map(|p| compile(p)).collect::<Result<_>>()?,
            exclude: expected.exclude.iter().map(|p| compile(p)).collect::<Result<_>>()?,
            expect: expected.expect.as_deref().map(compile).transpose()?,
        })
    }

    /// Whether a follow-up message must be checked after the response
    pub fn expects_follow_up(&self) -> bool {
        self.expect.is_some()
    }

    /// Checks the request against the include and exclude patterns
    pub fn check_request(&self, text: &str) -> std::result::Result<(), ScenarioFailure> {
        if let Some(missing) = self.include.iter().find(|re| !re.is_match(text)) {
            return Err(mismatch(format!("request matching /{}/", missing), text));
        }
        if let Some(present) = self.exclude.iter().find(|re| re.is_match(text)) {
            return Err(mismatch(format!("request not matching /{}/", present), text));
        }
        Ok(())
    }

    /// Checks the message that followed the response
    pub fn check_follow_up(&self, text: &str) -> std::result::Result<(), ScenarioFailure> {
        match &self.expect {
            Some(re) if !re.is_match(text) => Err(mismatch(format!("follow-up matching /{}/", re), text)),
            _ => Ok(()),
        }
    }
}

fn mismatch(expected: String, actual: &str) -> ScenarioFailure {
    ScenarioFailure::Mismatch {
        expected,
        actual: actual.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScenarioError;

    const INVITE: &str = "INVITE sip:127.0.0.1:5070 SIP/2.0\r\n\
        Via: SIP/2.0/UDP 127.0.0.1:5080;branch=z9hG4bKabc\r\n\
        Supported: timer\r\n\
        Session-Expires: 1000\r\n\
        Min-SE: 100\r\n\
        Content-Length: 0\r\n\r\n";

    fn transaction() -> ExpectedTransaction {
        ExpectedTransaction::new("INVITE with SE too small", 422)
            .with_include(r"Session-Expires:\s*1000")
            .with_exclude(r"^Require:\s*timer")
            .with_expect("ACK sip")
    }

    #[test]
    fn test_request_passes() {
        let check = RequestCheck::compile(&transaction()).unwrap();
        assert!(check.check_request(INVITE).is_ok());
        assert!(check.expects_follow_up());
    }

    #[test]
    fn test_missing_include_is_mismatch() {
        let check = RequestCheck::compile(&transaction().with_include(r"Min-SE:\s*2000")).unwrap();
        match check.check_request(INVITE) {
            Err(ScenarioFailure::Mismatch { expected, actual }) => {
                assert_eq!(expected, r"request matching /Min-SE:\s*2000/");
                assert_eq!(actual, INVITE);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_present_exclude_is_mismatch() {
        let check = RequestCheck::compile(&transaction().with_exclude("^Min-SE")).unwrap();
        let failure = check.check_request(INVITE).unwrap_err();
        assert!(!failure.is_timeout());
        assert!(failure.to_string().starts_with("expected request not matching /^Min-SE/"));
    }

    #[test]
    fn test_follow_up() {
        let check = RequestCheck::compile(&transaction()).unwrap();
        assert!(check.check_follow_up("ACK sip:127.0.0.1:5070 SIP/2.0\r\n").is_ok());
        assert!(check.check_follow_up("BYE sip:127.0.0.1:5070 SIP/2.0\r\n").is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        let bad = ExpectedTransaction::new("bad", 200).with_include("Session-Expires:(");
        assert!(matches!(RequestCheck::compile(&bad), Err(ScenarioError::Pattern(_))));
    }
}
