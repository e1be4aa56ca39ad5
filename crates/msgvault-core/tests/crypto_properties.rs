use proptest::prelude::*;

use msgvault_core::crypto::{decrypt, derive_key, encrypt, generate_salt};

proptest! {
    // Each case runs the full key derivation twice.
    #![proptest_config(ProptestConfig::with_cases(4))]

    #[test]
    fn derived_key_round_trips(
        passphrase in "[ -~]{0,32}",
        message in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let salt = generate_salt();
        let blob = encrypt(&derive_key(passphrase.as_bytes(), &salt), &message).unwrap();
        let opened = decrypt(&derive_key(passphrase.as_bytes(), &salt), &blob).unwrap();
        prop_assert_eq!(opened.as_slice(), message.as_slice());
    }
}
