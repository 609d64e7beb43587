#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::OnceLock;

use {
    encfile_engine::{
        Credential, Engine, EngineError, KdfParams, MAX_CONTAINER_OVERHEAD, Method, PemKeyPair,
        generate_key_pair,
    },
    rstest::rstest,
};

const FAST: KdfParams = KdfParams {
    m_cost: 256,
    t_cost: 1,
    p_cost: 1,
};

fn engine() -> Engine {
    Engine::new(FAST).unwrap()
}

fn recipient() -> &'static PemKeyPair {
    static PAIR: OnceLock<PemKeyPair> = OnceLock::new();
    PAIR.get_or_init(|| generate_key_pair(2048).unwrap())
}

fn stranger() -> &'static PemKeyPair {
    static PAIR: OnceLock<PemKeyPair> = OnceLock::new();
    PAIR.get_or_init(|| generate_key_pair(2048).unwrap())
}

fn private_key(pair: &PemKeyPair) -> Credential {
    Credential::detect(pair.private_pem.as_str())
}

#[rstest]
#[case::text(b"hello world".as_slice())]
#[case::empty(b"".as_slice())]
#[case::binary(&[0u8, 1, 2])]
fn password_round_trip(#[case] plaintext: &[u8]) {
    let engine = engine();
    let bytes = engine.encrypt_symmetric(plaintext, "pw123").unwrap();
    assert_eq!(bytes[0], 0x01);

    let opened = engine
        .decrypt_auto(&bytes, &Credential::detect("pw123"))
        .unwrap();
    assert_eq!(opened, plaintext);
}

#[rstest]
#[case::text(b"hello world".as_slice())]
#[case::empty(b"".as_slice())]
#[case::binary(&[0u8, 1, 2])]
fn public_key_round_trip(#[case] plaintext: &[u8]) {
    let engine = engine();
    let bytes = engine
        .encrypt_hybrid(plaintext, &recipient().public_pem)
        .unwrap();
    assert_eq!(bytes[0], 0x02);

    let opened = engine
        .decrypt_auto(&bytes, &private_key(recipient()))
        .unwrap();
    assert_eq!(opened, plaintext);
}

#[test]
fn wrong_password_is_decryption_failure() {
    let engine = engine();
    let bytes = engine.encrypt_symmetric(b"hello world", "pw123").unwrap();
    assert!(matches!(
        engine.decrypt_auto(&bytes, &Credential::password("wrongpw")),
        Err(EngineError::DecryptionFailure)
    ));
}

#[test]
fn other_private_key_is_key_decryption_failure() {
    let engine = engine();
    let bytes = engine
        .encrypt_hybrid(b"\x00\x01\x02", &recipient().public_pem)
        .unwrap();
    assert!(matches!(
        engine.decrypt_auto(&bytes, &private_key(stranger())),
        Err(EngineError::KeyDecryptionFailure)
    ));
}

#[test]
fn password_against_hybrid_container_is_mismatch() {
    let engine = engine();
    let bytes = engine.encrypt_hybrid(b"x", &recipient().public_pem).unwrap();
    let err = engine
        .decrypt_auto(&bytes, &Credential::password("pw123"))
        .unwrap_err();
    assert_eq!(err.kind(), "credential_type_mismatch");
}

#[rstest]
#[case::empty(&[])]
#[case::tag_only(&[0x01])]
#[case::header_cut(&[0x01, 0x01, 0xAA])]
fn short_input_is_malformed(#[case] raw: &[u8]) {
    assert!(matches!(
        engine().decrypt_auto(raw, &Credential::password("pw")),
        Err(EngineError::MalformedContainer(_))
    ));
}

#[test]
fn unknown_tag_is_unsupported_method() {
    let mut bytes = engine().encrypt_symmetric(b"abc", "pw").unwrap();
    bytes[0] = 0x7f;
    assert!(matches!(
        engine().decrypt_auto(&bytes, &Credential::password("pw")),
        Err(EngineError::UnsupportedMethod(0x7f))
    ));
}

#[test]
fn every_byte_of_a_password_container_is_authenticated() {
    let engine = engine();
    let bytes = engine.encrypt_symmetric(b"hello world", "pw123").unwrap();
    let credential = Credential::password("pw123");

    for i in 0..bytes.len() {
        let mut tampered = bytes.clone();
        tampered[i] ^= 0x01;
        assert!(
            engine.decrypt_auto(&tampered, &credential).is_err(),
            "flip at byte {i} was accepted"
        );
    }
}

#[test]
fn every_byte_of_a_hybrid_container_is_authenticated() {
    let engine = engine();
    let bytes = engine
        .encrypt_hybrid(b"hello world", &recipient().public_pem)
        .unwrap();
    let credential = private_key(recipient());

    for i in 0..bytes.len() {
        let mut tampered = bytes.clone();
        tampered[i] ^= 0x80;
        assert!(
            engine.decrypt_auto(&tampered, &credential).is_err(),
            "flip at byte {i} was accepted"
        );
    }
}

#[test]
fn password_payload_and_tag_flips_are_decryption_failures() {
    let engine = engine();
    let plaintext = b"payload bytes";
    let bytes = engine.encrypt_symmetric(plaintext, "pw").unwrap();
    let credential = Credential::password("pw");
    let tail = plaintext.len() + 16;

    for i in bytes.len() - tail..bytes.len() {
        let mut tampered = bytes.clone();
        tampered[i] ^= 0x01;
        assert!(matches!(
            engine.decrypt_auto(&tampered, &credential),
            Err(EngineError::DecryptionFailure)
        ));
    }
}

#[test]
fn hybrid_payload_and_tag_flips_are_decryption_failures() {
    let engine = engine();
    let plaintext = b"payload bytes";
    let bytes = engine
        .encrypt_hybrid(plaintext, &recipient().public_pem)
        .unwrap();
    let credential = private_key(recipient());
    let tail = plaintext.len() + 16;

    for i in bytes.len() - tail..bytes.len() {
        for bit in [0x01u8, 0x80] {
            let mut tampered = bytes.clone();
            tampered[i] ^= bit;
            assert!(
                matches!(
                    engine.decrypt_auto(&tampered, &credential),
                    Err(EngineError::DecryptionFailure)
                ),
                "flip {bit:#04x} at byte {i}"
            );
        }
    }
}

#[test]
fn overhead_bound_covers_both_schemes() {
    let engine = engine();
    let plaintext = [7u8; 100];
    let sym = engine.encrypt_symmetric(&plaintext, "pw").unwrap();
    let hyb = engine
        .encrypt_hybrid(&plaintext, &recipient().public_pem)
        .unwrap();

    assert_eq!(sym.len() - plaintext.len(), 78);
    assert!(hyb.len() - plaintext.len() <= MAX_CONTAINER_OVERHEAD);
    // 16384-bit modulus: 2048-byte wrapped key.
    assert_eq!(MAX_CONTAINER_OVERHEAD, 2 + 24 + 2 + 2048 + 8 + 16);
}

#[test]
fn inspect_does_not_need_a_credential() {
    let engine = engine();
    let bytes = engine.encrypt_hybrid(b"abc", &recipient().public_pem).unwrap();
    let info = engine.inspect(&bytes).unwrap();
    assert_eq!(info.method, Method::Hybrid);
    assert_eq!(info.wrapped_key_len, Some(256));
    assert_eq!(info.ciphertext_len, 3);
}

#[test]
fn engine_is_shareable_across_threads() {
    let engine = engine();
    let public_pem = recipient().public_pem.as_str();
    let private = private_key(recipient());

    std::thread::scope(|s| {
        for i in 0..4u8 {
            let (engine, private) = (&engine, &private);
            s.spawn(move || {
                let msg = vec![i; 64];
                let sym = engine.encrypt_symmetric(&msg, "shared").unwrap();
                let hyb = engine.encrypt_hybrid(&msg, public_pem).unwrap();
                assert_eq!(
                    engine
                        .decrypt_auto(&sym, &Credential::password("shared"))
                        .unwrap(),
                    msg
                );
                assert_eq!(engine.decrypt_auto(&hyb, private).unwrap(), msg);
            });
        }
    });
}
