use crate::tick::DAY_IN_SECONDS;
use crate::verify::Action;

/// Host filters consulted during tick computation and verification.
pub trait NonceHooks {
    /// Nonce lifespan in seconds for `action`. Must be positive.
    fn nonce_life(&self, _action: &Action) -> i64 {
        DAY_IN_SECONDS
    }

    /// Identity to bind when nobody is logged in. Only called with `uid == 0`.
    fn nonce_user_logged_out(&self, uid: u64, _action: &Action) -> u64 {
        uid
    }
}

/// Day-long lifespan, logged-out users stay uid 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl NonceHooks for DefaultHooks {}

impl<K: NonceHooks + ?Sized> NonceHooks for &K {
    fn nonce_life(&self, action: &Action) -> i64 {
        (**self).nonce_life(action)
    }
    fn nonce_user_logged_out(&self, uid: u64, action: &Action) -> u64 {
        (**self).nonce_user_logged_out(uid, action)
    }
}

impl<K: NonceHooks + ?Sized> NonceHooks for std::sync::Arc<K> {
    fn nonce_life(&self, action: &Action) -> i64 {
        (**self).nonce_life(action)
    }
    fn nonce_user_logged_out(&self, uid: u64, action: &Action) -> u64 {
        (**self).nonce_user_logged_out(uid, action)
    }
}

/// Context of a nonce that matched none of the scanned ticks.
#[derive(Debug, Clone, Copy)]
pub struct VerifyFailed<'a> {
    pub nonce: &'a str,
    pub action: &'a Action,
    /// The session's own user id, before any logged-out substitution.
    pub user_id: u64,
    /// The uid the nonce was checked against.
    pub effective_uid: u64,
    pub session_token: &'a str,
}

/// Fire-and-forget sink for failed verifications (rate limiting, alerting).
///
/// Called synchronously. A panicking observer is caught and logged by the
/// verifier and does not change the verdict.
pub trait FailureObserver {
    fn verification_failed(&self, event: &VerifyFailed<'_>);
}

impl<O: FailureObserver + ?Sized> FailureObserver for &O {
    fn verification_failed(&self, event: &VerifyFailed<'_>) {
        (**self).verification_failed(event)
    }
}

impl<O: FailureObserver + ?Sized> FailureObserver for std::sync::Arc<O> {
    fn verification_failed(&self, event: &VerifyFailed<'_>) {
        (**self).verification_failed(event)
    }
}

/// Logs failures at `warn`. Never logs the nonce or session token itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FailureObserver for TracingObserver {
    fn verification_failed(&self, ev: &VerifyFailed<'_>) {
        tracing::warn!(
            action = %ev.action,
            user_id = ev.user_id,
            effective_uid = ev.effective_uid,
            nonce_len = ev.nonce.len(),
            "nonce verification failed"
        );
    }
}
