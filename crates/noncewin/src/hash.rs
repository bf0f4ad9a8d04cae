use std::borrow::Cow;
use std::collections::HashMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{NonceError, Result};
use crate::verify::Action;

type HmacSha256 = Hmac<Sha256>;

/// Purpose label that namespaces nonce hashes away from other keyed uses.
pub const NONCE_PURPOSE: &str = "nonce";

/// Hex digits kept from the tail of the digest, of which the last two are dropped.
const TAIL_LEN: usize = 12;
pub const NONCE_LEN: usize = 10;

/// Deterministic keyed hash returning lowercase hex. Keys are scoped by `purpose`.
pub trait KeyedHash {
    fn keyed_hash(&self, message: &str, purpose: &str) -> String;
}

impl<H: KeyedHash + ?Sized> KeyedHash for &H {
    fn keyed_hash(&self, message: &str, purpose: &str) -> String {
        (**self).keyed_hash(message, purpose)
    }
}

impl<H: KeyedHash + ?Sized> KeyedHash for std::sync::Arc<H> {
    fn keyed_hash(&self, message: &str, purpose: &str) -> String {
        (**self).keyed_hash(message, purpose)
    }
}

/// HMAC-SHA256 keyed by a per-purpose secret.
///
/// A purpose without an explicit key gets `HMAC(master, purpose)`, so every
/// purpose has its own key even when only the master secret is configured.
/// The nonce key is derived once, up front.
#[derive(Clone)]
pub struct SaltedHmac {
    master: Vec<u8>,
    nonce_key: [u8; 32],
    purpose_keys: HashMap<String, Vec<u8>>,
}

impl std::fmt::Debug for SaltedHmac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaltedHmac")
            .field("purposes", &self.purpose_keys.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl SaltedHmac {
    pub fn new(master: impl Into<Vec<u8>>) -> Self {
        let master = master.into();
        Self {
            nonce_key: hmac_sha256(&master, NONCE_PURPOSE.as_bytes()),
            master,
            purpose_keys: HashMap::new(),
        }
    }

    /// Master secret from a hex string, e.g. the contents of a key file.
    pub fn from_hex(master_hex: &str) -> Result<Self> {
        let master = hex::decode(master_hex.trim())
            .map_err(|e| NonceError::Config(format!("master key is not hex: {e}")))?;
        if master.is_empty() {
            return Err(NonceError::Config("master key is empty".into()));
        }
        Ok(Self::new(master))
    }

    /// Pin the key used for one purpose (the host's key + salt pair).
    pub fn with_purpose_key(mut self, purpose: impl Into<String>, key: impl Into<Vec<u8>>) -> Self {
        self.purpose_keys.insert(purpose.into(), key.into());
        self
    }

    fn key_for(&self, purpose: &str) -> Cow<'_, [u8]> {
        match self.purpose_keys.get(purpose) {
            Some(k) => Cow::Borrowed(k.as_slice()),
            None if purpose == NONCE_PURPOSE => Cow::Borrowed(&self.nonce_key[..]),
            None => Cow::Owned(hmac_sha256(&self.master, purpose.as_bytes()).to_vec()),
        }
    }
}

impl KeyedHash for SaltedHmac {
    fn keyed_hash(&self, message: &str, purpose: &str) -> String {
        hex::encode(hmac_sha256(&self.key_for(purpose), message.as_bytes()))
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// The value a nonce must equal to be accepted at `tick`.
///
/// Hashes `"{tick}|{action}|{uid}|{session_token}"` under [`NONCE_PURPOSE`],
/// takes the last 12 characters of the digest and keeps the first 10 of those.
/// Digests shorter than 12 characters are sliced from their start.
pub fn nonce_for_tick<H: KeyedHash + ?Sized>(
    hasher: &H,
    tick: i64,
    action: &Action,
    uid: u64,
    session_token: &str,
) -> String {
    let digest = hasher.keyed_hash(&format!("{tick}|{action}|{uid}|{session_token}"), NONCE_PURPOSE);
    let chars: Vec<char> = digest.chars().collect();
    let start = chars.len().saturating_sub(TAIL_LEN);
    let end = (start + NONCE_LEN).min(chars.len());
    chars[start..end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);
    impl KeyedHash for Fixed {
        fn keyed_hash(&self, _m: &str, _p: &str) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn slices_tail_twelve_keeps_ten() {
        let h = Fixed("0000aaaaaaaaaabb");
        assert_eq!(nonce_for_tick(&h, 1, &Action::None, 0, ""), "aaaaaaaaaa");
    }

    #[test]
    fn short_digest_slices_from_start() {
        assert_eq!(nonce_for_tick(&Fixed("abcdef"), 1, &Action::None, 0, ""), "abcdef");
        assert_eq!(nonce_for_tick(&Fixed("0123456789a"), 1, &Action::None, 0, ""), "0123456789");
    }

    #[test]
    fn purposes_get_distinct_keys() {
        let h = SaltedHmac::new(b"master".to_vec());
        assert_ne!(h.keyed_hash("m", "nonce"), h.keyed_hash("m", "auth"));
        assert_eq!(h.keyed_hash("m", "nonce").len(), 64);
    }

    #[test]
    fn pinned_purpose_key_overrides_derivation() {
        let derived = SaltedHmac::new(b"master".to_vec());
        let pinned = derived.clone().with_purpose_key("nonce", b"key+salt".to_vec());
        assert_ne!(derived.keyed_hash("m", "nonce"), pinned.keyed_hash("m", "nonce"));
        assert_eq!(derived.keyed_hash("m", "auth"), pinned.keyed_hash("m", "auth"));
    }

    #[test]
    fn nonce_key_matches_on_demand_derivation() {
        let h = SaltedHmac::new(b"master".to_vec());
        let key = hmac_sha256(b"master", NONCE_PURPOSE.as_bytes());
        let want = hex::encode(hmac_sha256(&key, b"m"));
        assert_eq!(h.keyed_hash("m", NONCE_PURPOSE), want);
        assert_eq!(h.key_for(NONCE_PURPOSE).as_ref(), &key[..]);
        assert!(matches!(h.key_for(NONCE_PURPOSE), Cow::Borrowed(_)));
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(SaltedHmac::from_hex("zz").is_err());
        assert!(SaltedHmac::from_hex("").is_err());
        assert!(SaltedHmac::from_hex("00ff\n").is_ok());
    }

    #[test]
    fn debug_does_not_print_secrets() {
        let h = SaltedHmac::new(b"topsecret".to_vec());
        assert!(!format!("{h:?}").contains("topsecret"));
    }
}
