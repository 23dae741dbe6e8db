//! Identifier generation and message extractors

use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use sipconf_sip_core::types::{HeaderAccess, Message};
use sipconf_sip_core::types::via::BRANCH_MAGIC_COOKIE;

/// A fresh RFC 3261 branch: magic cookie plus random suffix
pub fn generate_branch() -> String {
    format!("{}{}", BRANCH_MAGIC_COOKIE, random_token(16))
}

/// A fresh From/To tag
pub fn generate_tag() -> String {
    random_token(10)
}

/// A fresh Call-ID, `uuid@host`
pub fn generate_call_id(host: &str) -> String {
    format!("{}@{}", Uuid::new_v4().simple(), host)
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Top Via branch of any message
pub fn extract_branch(message: &Message) -> Option<String> {
    message.first_via().ok()?.branch().map(str::to_string)
}
