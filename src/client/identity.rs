//! # Identity Signal
//!
//! The authenticated identity (or its absence) as a replay-latest,
//! de-duplicated stream. Login and session handling live outside this crate;
//! they only push the resulting token into an [`IdentitySignal`].
//!
//! Consumers subscribe through [`IdentitySource`] and get a
//! `tokio::sync::watch::Receiver`, which always holds the latest value and
//! only wakes on real changes.

use std::fmt;
use tokio::sync::watch;

/// Opaque authenticated-session token
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Identity {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Tokens end up in logs through Debug, keep them short.
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "Identity({}…)", prefix)
    }
}

/// Source of the current and future identity
pub trait IdentitySource: Send + Sync {
    /// Subscribe to identity changes. The receiver starts at the latest value.
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}

/// Writable identity source
#[derive(Debug)]
pub struct IdentitySignal {
    tx: watch::Sender<Option<Identity>>,
}

impl IdentitySignal {
    pub fn new(initial: Option<Identity>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Start without an identity
    pub fn anonymous() -> Self {
        Self::new(None)
    }

    /// Publish a new identity. Returns `false` and wakes nobody when the
    /// value equals the current one.
    pub fn set(&self, identity: Option<Identity>) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == identity {
                false
            } else {
                *current = identity;
                true
            }
        });
        if changed {
            tracing::debug!("[Identity] identity changed, authorized={}", self.is_authorized());
        }
        changed
    }

    pub fn login(&self, token: impl Into<String>) -> bool {
        self.set(Some(Identity::new(token)))
    }

    pub fn logout(&self) -> bool {
        self.set(None)
    }

    pub fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    pub fn is_authorized(&self) -> bool {
        self.tx.borrow().is_some()
    }
}

impl Default for IdentitySignal {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl IdentitySource for IdentitySignal {
    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}
