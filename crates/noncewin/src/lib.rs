//! noncewin: time-bucketed anti-forgery nonces with a widened acceptance window.
//!
//! A nonce is valid for one lifespan plus one tick (24 - 27 hours with the
//! default day-long lifespan). Verdicts keep the host's two-band contract:
//! `1` for a nonce issued in the first half of the window, `2` afterwards.
pub mod clock;
pub mod config;
pub mod error;
pub mod hash;
pub mod hooks;
pub mod session;
pub mod tick;
pub mod verify;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigHooks, NonceConfig};
pub use error::{NonceError, Result};
pub use hash::{nonce_for_tick, KeyedHash, SaltedHmac, NONCE_PURPOSE};
pub use hooks::{DefaultHooks, FailureObserver, NonceHooks, TracingObserver, VerifyFailed};
pub use session::{SessionSource, StaticSession};
pub use tick::{Window, DAY_IN_SECONDS, TICKS_PER_NONCE_LIFE};
pub use verify::{Action, NonceVerifier, Verdict};
