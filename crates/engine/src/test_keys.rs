//! Shared RSA fixtures for unit tests; key generation is too slow to repeat.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::OnceLock;

use crate::keypair::{DEFAULT_KEY_BITS, KeyPair, generate};

pub fn alice() -> &'static KeyPair {
    static KEY: OnceLock<KeyPair> = OnceLock::new();
    KEY.get_or_init(|| generate(DEFAULT_KEY_BITS).expect("generate alice"))
}

pub fn bob() -> &'static KeyPair {
    static KEY: OnceLock<KeyPair> = OnceLock::new();
    KEY.get_or_init(|| generate(DEFAULT_KEY_BITS).expect("generate bob"))
}
