use std::sync::Arc;

use noncewin::{
    nonce_for_tick, Action, FixedClock, NonceVerifier, SaltedHmac, StaticSession, Verdict,
};

const BUCKET: u64 = 10_800;
// 157_408 * 10_800: the first second of a tick is T0 + 1
const T0: u64 = 1_700_006_400;
const TICK0: i64 = 157_408;

fn verifier(clock: Arc<FixedClock>) -> NonceVerifier<SaltedHmac, noncewin::DefaultHooks, Arc<FixedClock>> {
    NonceVerifier::new(SaltedHmac::new(b"band-test-master".to_vec())).with_clock(clock)
}

#[test]
fn tick_at_boundary_matches_fixture() {
    let clock = Arc::new(FixedClock::new(T0));
    let v = verifier(clock.clone());
    assert_eq!(v.tick(&Action::None).unwrap(), TICK0);
    clock.advance(1);
    assert_eq!(v.tick(&Action::None).unwrap(), TICK0 + 1);
}

#[test]
fn fresh_for_five_ticks_then_stale_for_four_then_invalid() {
    let clock = Arc::new(FixedClock::new(T0));
    let v = verifier(clock.clone());
    let session = StaticSession::new(3, "sess-abc");
    let action = Action::from("update-post_12");

    let nonce = nonce_for_tick(v.hasher(), TICK0, &action, 3, "sess-abc");
    assert_eq!(nonce.len(), 10);

    for k in 0..=10u64 {
        clock.set(T0 + k * BUCKET);
        let want = match k {
            0..=4 => Verdict::Fresh,
            5..=8 => Verdict::Stale,
            _ => Verdict::Invalid,
        };
        assert_eq!(
            v.verify(&nonce, &action, &session).unwrap(),
            want,
            "checked {k} ticks after issue"
        );
    }
}

#[test]
fn nonce_from_the_future_is_not_accepted() {
    let clock = Arc::new(FixedClock::new(T0));
    let v = verifier(clock);
    let session = StaticSession::new(3, "sess-abc");
    let nonce = nonce_for_tick(v.hasher(), TICK0 + 1, &Action::None, 3, "sess-abc");
    assert_eq!(v.verify(&nonce, &Action::None, &session).unwrap(), Verdict::Invalid);
}

#[test]
fn default_lifespan_is_valid_between_24_and_27_hours() {
    let clock = Arc::new(FixedClock::new(0));
    let v = verifier(clock.clone());
    let session = StaticSession::new(1, "s");
    let action = Action::from("edit");

    // issued on the first second of a tick: lasts almost 27 hours
    let issued = T0 + 1;
    clock.set(issued);
    let tick = v.tick(&action).unwrap();
    let nonce = nonce_for_tick(v.hasher(), tick, &action, 1, "s");

    clock.set(issued + 97_199);
    assert_eq!(v.verify(&nonce, &action, &session).unwrap(), Verdict::Stale);
    clock.set(issued + 97_200);
    assert_eq!(v.verify(&nonce, &action, &session).unwrap(), Verdict::Invalid);

    // issued on the last second of a tick: lasts exactly 24 hours
    let issued = T0 + BUCKET;
    clock.set(issued);
    assert_eq!(v.tick(&action).unwrap(), tick);
    clock.set(issued + 86_400);
    assert_eq!(v.verify(&nonce, &action, &session).unwrap(), Verdict::Stale);
    clock.set(issued + 86_401);
    assert_eq!(v.verify(&nonce, &action, &session).unwrap(), Verdict::Invalid);
}

#[test]
fn fresh_band_spans_twelve_to_fifteen_hours() {
    let clock = Arc::new(FixedClock::new(T0 + 1));
    let v = verifier(clock.clone());
    let session = StaticSession::new(1, "s");
    let nonce = nonce_for_tick(v.hasher(), TICK0 + 1, &Action::None, 1, "s");

    clock.set(T0 + 5 * BUCKET);
    assert_eq!(v.verify(&nonce, &Action::None, &session).unwrap(), Verdict::Fresh);
    clock.set(T0 + 5 * BUCKET + 1);
    assert_eq!(v.verify(&nonce, &Action::None, &session).unwrap(), Verdict::Stale);
}

#[test]
fn expected_value_is_deterministic_and_field_bound() {
    let h = SaltedHmac::new(b"k".to_vec());
    let a = Action::from("delete");
    let base = nonce_for_tick(&h, 42, &a, 5, "tok");
    assert_eq!(base, nonce_for_tick(&h, 42, &a, 5, "tok"));
    assert!(base.chars().all(|c| c.is_ascii_hexdigit()));

    assert_ne!(base, nonce_for_tick(&h, 43, &a, 5, "tok"));
    assert_ne!(base, nonce_for_tick(&h, 42, &Action::from("create"), 5, "tok"));
    assert_ne!(base, nonce_for_tick(&h, 42, &a, 6, "tok"));
    assert_ne!(base, nonce_for_tick(&h, 42, &a, 5, "tok2"));
    assert_ne!(base, nonce_for_tick(&SaltedHmac::new(b"k2".to_vec()), 42, &a, 5, "tok"));
}

#[test]
fn integer_and_sentinel_actions_hash_as_text() {
    let h = SaltedHmac::new(b"k".to_vec());
    assert_eq!(
        nonce_for_tick(&h, 1, &Action::from(-1), 0, ""),
        nonce_for_tick(&h, 1, &Action::None, 0, "")
    );
    assert_eq!(
        nonce_for_tick(&h, 1, &Action::from(17), 0, ""),
        nonce_for_tick(&h, 1, &Action::from("17"), 0, "")
    );
}
