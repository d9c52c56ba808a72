//! Visitor gate state machine for published pages.
//!
//! A page load starts in [`GateState::Loading`]. A cached session (the
//! `bp_session` cookie) moves the gate to `Authenticated` optimistically; the
//! remote session check then confirms or demotes it. Unauthenticated visitors
//! either see the sign-in prompt or, while a skip countdown is running, the
//! page content.
//!
//! Only the remote check can ask the caller to record a visit: the cached
//! session is client-controlled, so its user id drives rendering and nothing
//! else. A verified user is counted once per gate.

use serde::Serialize;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::domain::types::VisitSource;

pub const SESSION_COOKIE: &str = "bp_session";
pub const SKIP_COOKIE: &str = "bp_skip_until";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum GateState {
    Loading,
    Authenticated {
        user_id: Uuid,
    },
    PromptShown,
    Skipped {
        #[serde(with = "time::serde::timestamp")]
        until: OffsetDateTime,
    },
}

impl GateState {
    /// Whether the page content should be shown without the prompt overlay.
    pub fn shows_content(&self) -> bool {
        matches!(
            self,
            GateState::Authenticated { .. } | GateState::Skipped { .. }
        )
    }

    pub fn is_prompt(&self) -> bool {
        matches!(self, GateState::PromptShown)
    }
}

/// Session cached client-side in the `bp_session` cookie:
/// `<token>.<user_id>.<expires_unix>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSession {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: OffsetDateTime,
}

impl CachedSession {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.trim().splitn(3, '.');
        let token = parts.next().filter(|token| !token.is_empty())?;
        let user_id = parts.next().and_then(|value| Uuid::parse_str(value).ok())?;
        let expires = parts.next().and_then(|value| value.parse::<i64>().ok())?;
        let expires_at = OffsetDateTime::from_unix_timestamp(expires).ok()?;

        Some(Self {
            token: token.to_string(),
            user_id,
            expires_at,
        })
    }

    pub fn encode(&self) -> String {
        format!(
            "{}.{}.{}",
            self.token,
            self.user_id,
            self.expires_at.unix_timestamp()
        )
    }

    pub fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at > now
    }
}

/// Read the `bp_skip_until` cookie value (unix seconds).
pub fn parse_skip_until(raw: &str) -> Option<OffsetDateTime> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
}

pub fn skip_deadline(now: OffsetDateTime, window: Duration) -> OffsetDateTime {
    now + window
}

/// The unauthenticated sub-state for a given skip deadline.
pub fn unauthenticated_state(skip_until: Option<OffsetDateTime>, now: OffsetDateTime) -> GateState {
    match skip_until {
        Some(until) if until > now => GateState::Skipped { until },
        _ => GateState::PromptShown,
    }
}

/// Outcome of a gate transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: GateState,
    /// Whether `state` differs from the state before the transition.
    pub changed: bool,
    /// Set when a verified user should be counted.
    pub record_visit: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct VisitGate {
    state: GateState,
    counted: Option<Uuid>,
}

impl Default for VisitGate {
    fn default() -> Self {
        Self::new()
    }
}

impl VisitGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Loading,
            counted: None,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Apply the cached session. Only a fresh cached session changes state.
    pub fn observe_cached(
        &mut self,
        cached: Option<&CachedSession>,
        now: OffsetDateTime,
    ) -> Option<Transition> {
        match cached {
            Some(session) if session.is_fresh_at(now) => self.enter(
                GateState::Authenticated {
                    user_id: session.user_id,
                },
                false,
            ),
            _ => None,
        }
    }

    /// Apply the result of the remote session check.
    pub fn observe_remote(
        &mut self,
        verified_user: Option<Uuid>,
        skip_until: Option<OffsetDateTime>,
        now: OffsetDateTime,
    ) -> Option<Transition> {
        let next = match verified_user {
            Some(user_id) => GateState::Authenticated { user_id },
            None => unauthenticated_state(skip_until, now),
        };
        self.enter(next, true)
    }

    fn enter(&mut self, next: GateState, verified: bool) -> Option<Transition> {
        let record_visit = match next {
            GateState::Authenticated { user_id } if verified && self.counted != Some(user_id) => {
                self.counted = Some(user_id);
                Some(user_id)
            }
            GateState::Authenticated { .. } => None,
            _ => {
                self.counted = None;
                None
            }
        };

        let changed = next != self.state;
        if !changed && record_visit.is_none() {
            return None;
        }

        self.state = next;
        Some(Transition {
            state: next,
            changed,
            record_visit,
        })
    }
}

/// Where a visit came from, derived from the `src`/`qr` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitOrigin {
    pub source: VisitSource,
    pub qr_code_id: Option<Uuid>,
}

impl VisitOrigin {
    pub fn direct() -> Self {
        Self {
            source: VisitSource::Direct,
            qr_code_id: None,
        }
    }

    pub fn from_query(src: Option<&str>, qr: Option<&str>) -> Self {
        match src {
            Some("qr") => Self {
                source: VisitSource::QrScan,
                qr_code_id: qr.and_then(|value| Uuid::parse_str(value).ok()),
            },
            _ => Self::direct(),
        }
    }
}
