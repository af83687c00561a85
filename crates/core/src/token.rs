//! Ephemeral check-token issuing and validation.
//!
//! A [`CheckTokenRecord`] is a short-lived, action-scoped credential for one
//! activity, rendered client-side as a scannable code. Records live only in
//! a [`TokenStore`] -- a keyed store with per-entry TTL -- and are never
//! durably persisted. The token authenticates "a valid window for this
//! activity and action", not a specific user: the same code is presented by
//! every student in the room, and per-user idempotency is enforced one layer
//! up by the signup's signed-in/signed-out flags.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::CoreError;
use crate::status::SignAction;
use crate::types::{DbId, Timestamp};

/// TTL applied when the caller passes a non-positive window.
pub const DEFAULT_TTL_MINUTES: i64 = 5;

/// The stored shape of an issued check token.
///
/// `expires_at` is kept in the record even though the store already applies
/// a TTL to the entry, so validation does not depend on the store's clock.
#[derive(Debug, Clone, Serialize)]
pub struct CheckTokenRecord {
    pub token: String,
    pub activity_id: DbId,
    pub action: SignAction,
    pub expires_at: Timestamp,
}

impl CheckTokenRecord {
    /// Whether the record is past its validity window at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}

/// Keyed store with TTL semantics for check tokens.
///
/// The in-process [`InMemoryTokenStore`] is sufficient for a single
/// instance; a multi-instance deployment supplies a networked
/// implementation behind the same trait.
pub trait TokenStore: Send + Sync {
    /// Store a record under its token key.
    fn put(&self, record: CheckTokenRecord);

    /// Fetch the record for a token, if present.
    ///
    /// Implementations may return a record past its `expires_at`; the
    /// issuer distinguishes expired from absent so callers get the right
    /// error.
    fn get(&self, token: &str) -> Option<CheckTokenRecord>;
}

/// In-process expiring map.
///
/// Entries are evicted on [`purge_expired`](Self::purge_expired); `get`
/// deliberately returns stale entries so expiry surfaces as
/// [`CoreError::TokenExpired`] rather than a generic invalid-token failure.
#[derive(Default)]
pub struct InMemoryTokenStore {
    entries: Mutex<HashMap<String, CheckTokenRecord>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry past its expiry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.lock().expect("token store poisoned");
        let before = entries.len();
        entries.retain(|_, record| !record.is_expired(now));
        before - entries.len()
    }

    /// Number of live and stale entries currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("token store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TokenStore for InMemoryTokenStore {
    fn put(&self, record: CheckTokenRecord) {
        self.entries
            .lock()
            .expect("token store poisoned")
            .insert(record.token.clone(), record);
    }

    fn get(&self, token: &str) -> Option<CheckTokenRecord> {
        self.entries
            .lock()
            .expect("token store poisoned")
            .get(token)
            .cloned()
    }
}

/// Issues and validates check tokens against a [`TokenStore`].
#[derive(Clone)]
pub struct TokenIssuer {
    store: Arc<dyn TokenStore>,
}

impl TokenIssuer {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Issue a token for one activity and action, valid for `ttl_minutes`.
    ///
    /// A non-positive TTL falls back to [`DEFAULT_TTL_MINUTES`]. The token
    /// itself is a UUID v4 in simple form -- unguessable and opaque.
    pub fn issue(&self, activity_id: DbId, action: SignAction, ttl_minutes: i64) -> CheckTokenRecord {
        let effective_ttl = if ttl_minutes > 0 {
            ttl_minutes
        } else {
            DEFAULT_TTL_MINUTES
        };

        let record = CheckTokenRecord {
            token: Uuid::new_v4().simple().to_string(),
            activity_id,
            action,
            expires_at: Utc::now() + Duration::minutes(effective_ttl),
        };
        self.store.put(record.clone());

        tracing::debug!(
            activity_id,
            action = action.as_str(),
            expires_at = %record.expires_at,
            "Issued check token"
        );

        record
    }

    /// Validate a presented token for the expected action.
    ///
    /// Fails [`CoreError::TokenInvalid`] when the token is empty, unknown,
    /// or was issued for the other action; [`CoreError::TokenExpired`] when
    /// past its window. The record is NOT removed on success: one projected
    /// code must serve every student in the room until its natural expiry.
    pub fn consume(&self, token: &str, expected_action: SignAction) -> Result<CheckTokenRecord, CoreError> {
        if token.is_empty() {
            return Err(CoreError::TokenInvalid);
        }

        let record = self.store.get(token).ok_or(CoreError::TokenInvalid)?;

        if record.action != expected_action {
            return Err(CoreError::TokenInvalid);
        }
        if record.is_expired(Utc::now()) {
            return Err(CoreError::TokenExpired);
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn issuer_with_store() -> (TokenIssuer, Arc<InMemoryTokenStore>) {
        let store = Arc::new(InMemoryTokenStore::new());
        (TokenIssuer::new(Arc::clone(&store) as Arc<dyn TokenStore>), store)
    }

    #[test]
    fn issue_then_consume_roundtrip() {
        let (issuer, _store) = issuer_with_store();
        let issued = issuer.issue(42, SignAction::CheckIn, 5);

        let consumed = issuer.consume(&issued.token, SignAction::CheckIn).unwrap();
        assert_eq!(consumed.activity_id, 42);
        assert_eq!(consumed.action, SignAction::CheckIn);
        assert_eq!(consumed.expires_at, issued.expires_at);
    }

    #[test]
    fn token_is_reusable_until_expiry() {
        let (issuer, _store) = issuer_with_store();
        let issued = issuer.issue(1, SignAction::CheckOut, 5);

        // Many distinct callers present the same projected code.
        for _ in 0..10 {
            issuer.consume(&issued.token, SignAction::CheckOut).unwrap();
        }
    }

    #[test]
    fn action_mismatch_is_invalid_both_ways() {
        let (issuer, _store) = issuer_with_store();
        let check_in = issuer.issue(1, SignAction::CheckIn, 5);
        let check_out = issuer.issue(1, SignAction::CheckOut, 5);

        assert_matches!(
            issuer.consume(&check_in.token, SignAction::CheckOut),
            Err(CoreError::TokenInvalid)
        );
        assert_matches!(
            issuer.consume(&check_out.token, SignAction::CheckIn),
            Err(CoreError::TokenInvalid)
        );
    }

    #[test]
    fn unknown_or_empty_token_is_invalid() {
        let (issuer, _store) = issuer_with_store();
        assert_matches!(
            issuer.consume("nope", SignAction::CheckIn),
            Err(CoreError::TokenInvalid)
        );
        assert_matches!(
            issuer.consume("", SignAction::CheckIn),
            Err(CoreError::TokenInvalid)
        );
    }

    #[test]
    fn past_expiry_fails_expired_not_invalid() {
        let (issuer, store) = issuer_with_store();
        store.put(CheckTokenRecord {
            token: "stale".into(),
            activity_id: 7,
            action: SignAction::CheckIn,
            expires_at: Utc::now() - Duration::minutes(1),
        });

        assert_matches!(
            issuer.consume("stale", SignAction::CheckIn),
            Err(CoreError::TokenExpired)
        );
    }

    #[test]
    fn non_positive_ttl_falls_back_to_default() {
        let (issuer, _store) = issuer_with_store();
        let before = Utc::now();
        let issued = issuer.issue(1, SignAction::CheckIn, 0);

        let window = issued.expires_at - before;
        assert!(window >= Duration::minutes(DEFAULT_TTL_MINUTES - 1));
        assert!(window <= Duration::minutes(DEFAULT_TTL_MINUTES + 1));
    }

    #[test]
    fn purge_removes_only_stale_entries() {
        let (issuer, store) = issuer_with_store();
        issuer.issue(1, SignAction::CheckIn, 5);
        store.put(CheckTokenRecord {
            token: "stale".into(),
            activity_id: 1,
            action: SignAction::CheckIn,
            expires_at: Utc::now() - Duration::seconds(1),
        });

        assert_eq!(store.len(), 2);
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn tokens_are_unique_and_opaque() {
        let (issuer, _store) = issuer_with_store();
        let a = issuer.issue(1, SignAction::CheckIn, 5);
        let b = issuer.issue(1, SignAction::CheckIn, 5);
        assert_ne!(a.token, b.token);
        assert_eq!(a.token.len(), 32);
    }
}
