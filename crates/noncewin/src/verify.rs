use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use subtle::ConstantTimeEq;

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::hash::{nonce_for_tick, KeyedHash};
use crate::hooks::{DefaultHooks, FailureObserver, NonceHooks, TracingObserver, VerifyFailed};
use crate::session::SessionSource;
use crate::tick::{checked_lifespan, tick_at, Window, TICKS_PER_NONCE_LIFE};

/// What a nonce was issued for. Hashed as text; `None` renders as `-1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Action {
    #[default]
    None,
    Named(String),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::None => f.write_str("-1"),
            Action::Named(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        Action::Named(s.to_owned())
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        Action::Named(s)
    }
}

impl From<i64> for Action {
    fn from(n: i64) -> Self {
        if n == -1 {
            Action::None
        } else {
            Action::Named(n.to_string())
        }
    }
}

/// Outcome of a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Issued in the current tick or up to four ticks ago.
    Fresh,
    /// Issued five to eight ticks ago. Callers such as autosave refresh these.
    Stale,
    Invalid,
}

impl Verdict {
    /// Host return value: `Some(1)`, `Some(2)`, or `None` for `false`.
    pub fn code(self) -> Option<u8> {
        match self {
            Verdict::Fresh => Some(1),
            Verdict::Stale => Some(2),
            Verdict::Invalid => None,
        }
    }

    pub fn is_valid(self) -> bool {
        self != Verdict::Invalid
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code() {
            Some(c) => write!(f, "{c}"),
            None => f.write_str("false"),
        }
    }
}

/// Tick clock and window verifier over injected hash, hooks, clock and observer.
///
/// Holds no mutable state; share it behind an `Arc` across request handlers.
#[derive(Debug, Clone)]
pub struct NonceVerifier<H, K = DefaultHooks, C = SystemClock, O = TracingObserver> {
    hasher: H,
    hooks: K,
    clock: C,
    observer: O,
}

impl<H: KeyedHash> NonceVerifier<H> {
    pub fn new(hasher: H) -> Self {
        Self {
            hasher,
            hooks: DefaultHooks,
            clock: SystemClock,
            observer: TracingObserver,
        }
    }
}

impl<H, K, C, O> NonceVerifier<H, K, C, O> {
    pub fn with_hooks<K2: NonceHooks>(self, hooks: K2) -> NonceVerifier<H, K2, C, O> {
        NonceVerifier {
            hasher: self.hasher,
            hooks,
            clock: self.clock,
            observer: self.observer,
        }
    }

    pub fn with_clock<C2: Clock>(self, clock: C2) -> NonceVerifier<H, K, C2, O> {
        NonceVerifier {
            hasher: self.hasher,
            hooks: self.hooks,
            clock,
            observer: self.observer,
        }
    }

    pub fn with_observer<O2: FailureObserver>(self, observer: O2) -> NonceVerifier<H, K, C, O2> {
        NonceVerifier {
            hasher: self.hasher,
            hooks: self.hooks,
            clock: self.clock,
            observer,
        }
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }
}

impl<H, K, C, O> NonceVerifier<H, K, C, O>
where
    H: KeyedHash,
    K: NonceHooks,
    C: Clock,
    O: FailureObserver,
{
    /// Current tick for `action`.
    ///
    /// Errors only when the lifespan hook reports a non-positive lifespan.
    pub fn tick(&self, action: &Action) -> Result<i64> {
        let lifespan = checked_lifespan(self.hooks.nonce_life(action), action)?;
        Ok(tick_at(self.clock.now_secs(), lifespan))
    }

    /// Acceptance window for `action` under the configured lifespan.
    pub fn window(&self, action: &Action) -> Result<Window> {
        Window::new(self.hooks.nonce_life(action), action)
    }

    /// Checks `nonce` against the current tick and the eight before it.
    ///
    /// Returns `Ok(Verdict::Invalid)` for an empty or non-matching nonce; only
    /// the latter notifies the observer. `"0"` counts as empty, as on the host.
    /// `Err` means misconfiguration.
    pub fn verify<S>(&self, nonce: &str, action: &Action, session: &S) -> Result<Verdict>
    where
        S: SessionSource + ?Sized,
    {
        if nonce.is_empty() || nonce == "0" {
            return Ok(Verdict::Invalid);
        }

        let user_id = session.user_id();
        let uid = if user_id == 0 {
            self.hooks.nonce_user_logged_out(user_id, action)
        } else {
            user_id
        };
        let token = session.session_token();
        let current = self.tick(action)?;

        // yes, ticks + 1: the scan covers one tick past the nominal lifespan
        for i in 0..=TICKS_PER_NONCE_LIFE {
            let candidate = current - i64::from(i);
            let expected = nonce_for_tick(&self.hasher, candidate, action, uid, &token);
            if bool::from(expected.as_bytes().ct_eq(nonce.as_bytes())) {
                let verdict = if i <= TICKS_PER_NONCE_LIFE / 2 {
                    Verdict::Fresh
                } else {
                    Verdict::Stale
                };
                tracing::debug!(%action, tick = candidate, age_ticks = i, %verdict, "nonce accepted");
                return Ok(verdict);
            }
        }

        let event = VerifyFailed {
            nonce,
            action,
            user_id,
            effective_uid: uid,
            session_token: &token,
        };
        let notified = panic::catch_unwind(AssertUnwindSafe(|| {
            self.observer.verification_failed(&event)
        }));
        if notified.is_err() {
            tracing::warn!(%action, "nonce failure observer panicked");
        }

        Ok(Verdict::Invalid)
    }
}
