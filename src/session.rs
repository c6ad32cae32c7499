//! Session tags
//!
//! A session tag scopes records to one tab's lifetime. It is generated once, kept in the
//! ephemeral register, and stamped onto every record the tab saves.
//!
//! Format: `session_<unix-millis>_<12 alphanumeric chars>`

use std::fmt;

use chrono::{DateTime, Utc};
use log::warn;

use crate::constants::{
    generate_session_suffix, SESSION_TAG_KEY, SESSION_TAG_PREFIX, SESSION_TAG_SUFFIX_LEN,
};
use crate::error::{RegisterError, SessionTagError};
use crate::register::KeyValueRegister;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionTag(String);

impl SessionTag {
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    pub fn generate_at(now: DateTime<Utc>) -> Self {
        Self(format!(
            "{}{}_{}",
            SESSION_TAG_PREFIX,
            now.timestamp_millis(),
            generate_session_suffix()
        ))
    }

    /// Validate a tag read back from a register
    pub fn parse(raw: &str) -> Result<Self, SessionTagError> {
        if raw.is_empty() {
            return Err(SessionTagError::Missing);
        }
        let malformed = || SessionTagError::Malformed(raw.to_string());

        let rest = raw.strip_prefix(SESSION_TAG_PREFIX).ok_or_else(malformed)?;
        let (millis, suffix) = rest.split_once('_').ok_or_else(malformed)?;

        let millis: i64 = millis.parse().map_err(|_| malformed())?;
        if millis < 0 || DateTime::from_timestamp_millis(millis).is_none() {
            return Err(malformed());
        }
        if suffix.len() != SESSION_TAG_SUFFIX_LEN
            || !suffix.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(malformed());
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The generation time encoded in the tag
    pub fn created_at(&self) -> DateTime<Utc> {
        self.0
            .strip_prefix(SESSION_TAG_PREFIX)
            .and_then(|rest| rest.split_once('_'))
            .and_then(|(millis, _)| millis.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_default()
    }
}

impl fmt::Display for SessionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The current tab's session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub tag: SessionTag,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn from_tag(tag: SessionTag) -> Self {
        let created_at = tag.created_at();
        Self { tag, created_at }
    }
}

/// Read and validate the session tag held by the ephemeral register
pub fn read_session_tag(register: &dyn KeyValueRegister) -> Result<SessionTag, SessionTagError> {
    match register.get(SESSION_TAG_KEY)? {
        Some(raw) => SessionTag::parse(&raw),
        None => Err(SessionTagError::Missing),
    }
}

/// The current session, if the register holds a valid tag
pub fn current_session(register: &dyn KeyValueRegister) -> Option<Session> {
    match read_session_tag(register) {
        Ok(tag) => Some(Session::from_tag(tag)),
        Err(SessionTagError::Missing) => None,
        Err(e) => {
            warn!("Ignoring unusable session tag: {}", e);
            None
        }
    }
}

/// The current session, generating and storing a new tag when there is none
pub fn ensure_session(register: &dyn KeyValueRegister) -> Result<Session, RegisterError> {
    if let Some(session) = current_session(register) {
        return Ok(session);
    }
    let tag = SessionTag::generate();
    register.set(SESSION_TAG_KEY, tag.as_str())?;
    Ok(Session::from_tag(tag))
}

pub fn clear_session(register: &dyn KeyValueRegister) -> Result<(), RegisterError> {
    register.remove(SESSION_TAG_KEY)
}
