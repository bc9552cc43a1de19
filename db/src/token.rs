//! The QR payload grammar.
//!
//! Two shapes share the `curso` prefix and are told apart by separator:
//!
//! - kind-id, `usuario-<id>` / `curso-<id>`: durable badges and posters.
//!   Split on the first `-` only, so ids may themselves contain dashes.
//! - session, `curso:<course_id>:<epoch_millis>:<nonce>`: short-lived codes
//!   minted per session. Any `:` in the input commits to this shape; a
//!   malformed session token never falls back to the kind-id grammar.
//!
//! The codec is pure string work. Ids travel as strings and are resolved
//! against storage by the caller.

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

pub const PERSON_PREFIX: &str = "usuario";
pub const COURSE_PREFIX: &str = "curso";

const NONCE_LEN: usize = 8;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(&'static str),
    #[error("unrecognized token kind '{0}'")]
    UnrecognizedKind(String),
    #[error("session token carries a non-numeric timestamp")]
    BadTimestamp,
}

/// A successfully parsed QR payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedToken {
    Person {
        id: String,
    },
    Course {
        id: String,
    },
    Session {
        course_id: String,
        issued_at_ms: i64,
        nonce: String,
    },
}

pub fn encode_person(person_id: Uuid) -> String {
    format!("{PERSON_PREFIX}-{person_id}")
}

pub fn encode_course(course_id: Uuid) -> String {
    format!("{COURSE_PREFIX}-{course_id}")
}

pub fn encode_session(course_id: Uuid, issued_at: DateTime<Utc>, nonce: &str) -> String {
    format!(
        "{COURSE_PREFIX}:{course_id}:{}:{nonce}",
        issued_at.timestamp_millis()
    )
}

/// Eight base36 characters of session-token entropy.
pub fn nonce() -> String {
    let mut rng = rand::thread_rng();
    (0..NONCE_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

pub fn decode(raw: &str) -> Result<DecodedToken, TokenError> {
    let raw = raw.trim();
    if raw.contains(':') {
        return decode_session(raw);
    }

    let (kind, id) = raw
        .split_once('-')
        .ok_or(TokenError::Malformed("missing separator"))?;
    if id.is_empty() {
        return Err(TokenError::Malformed("empty id"));
    }
    match kind {
        PERSON_PREFIX => Ok(DecodedToken::Person { id: id.to_owned() }),
        COURSE_PREFIX => Ok(DecodedToken::Course { id: id.to_owned() }),
        other => Err(TokenError::UnrecognizedKind(other.to_owned())),
    }
}

fn decode_session(raw: &str) -> Result<DecodedToken, TokenError> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 4 {
        return Err(TokenError::Malformed("session token needs four segments"));
    }
    if parts[0] != COURSE_PREFIX {
        return Err(TokenError::Malformed("bad session prefix"));
    }
    if parts[1].is_empty() {
        return Err(TokenError::Malformed("empty id"));
    }
    if parts[3].is_empty() {
        return Err(TokenError::Malformed("empty nonce"));
    }
    let issued_at_ms: i64 = parts[2].parse().map_err(|_| TokenError::BadTimestamp)?;

    Ok(DecodedToken::Session {
        course_id: parts[1].to_owned(),
        issued_at_ms,
        nonce: parts[3].to_owned(),
    })
}
