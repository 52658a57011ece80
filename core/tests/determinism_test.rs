//! Property tests for digest determinism and sign/verify round trips

mod common;

use common::{config, StubAccount};
use proptest::prelude::*;
use serde::Serialize;
use signward_core::{
    build_root, build_signing_digest, Domain, MemoryAccount, Root, SigningOrchestrator,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
struct Payload {
    nonce: u64,
    flags: Vec<u8>,
    label: String,
    anchor: [u8; 32],
}

fn any_payload() -> impl Strategy<Value = Payload> {
    (
        any::<u64>(),
        prop::collection::vec(any::<u8>(), 0..96),
        "[a-z0-9]{0,24}",
        prop::array::uniform32(any::<u8>()),
    )
        .prop_map(|(nonce, flags, label, anchor)| Payload {
            nonce,
            flags,
            label,
            anchor,
        })
}

proptest! {
    #[test]
    fn signing_digest_is_deterministic(
        root in prop::array::uniform32(any::<u8>()),
        domain in prop::array::uniform32(any::<u8>()),
    ) {
        let first = build_signing_digest(&Root(root), &Domain(domain));
        let second = build_signing_digest(&Root(root), &Domain(domain));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn payload_root_is_deterministic(payload in any_payload()) {
        let first = build_root(&payload).unwrap();
        let second = build_root(&payload.clone()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn slices_of_other_lengths_are_rejected(len in (0usize..96).prop_filter("not 32", |l| *l != 32)) {
        let bytes = vec![0u8; len];
        prop_assert!(Root::try_from(bytes.as_slice()).is_err());
        prop_assert!(Domain::try_from(bytes.as_slice()).is_err());
    }

    #[test]
    fn manual_path_round_trips(
        payload in any_payload(),
        domain in prop::array::uniform32(any::<u8>()),
    ) {
        let orchestrator = SigningOrchestrator::new(config(&["pw"], Duration::from_secs(1)));
        let account = Arc::new(StubAccount::signer("prop").locked_with("pw"));
        let domain = Domain(domain);

        let signature = tokio_test::block_on(orchestrator.sign_payload(&account, &payload, &domain))
            .unwrap();

        prop_assert!(orchestrator.verify_payload(&*account, &payload, &domain, &signature).unwrap());
        prop_assert!(!account.is_unlocked_now());
    }

    #[test]
    fn memory_account_round_trips(
        payload in any_payload(),
        domain in prop::array::uniform32(any::<u8>()),
    ) {
        let orchestrator = SigningOrchestrator::default();
        let account = Arc::new(MemoryAccount::generate("prop"));
        let domain = Domain(domain);

        let signature = tokio_test::block_on(orchestrator.sign_payload(&account, &payload, &domain))
            .unwrap();

        prop_assert!(orchestrator.verify_payload(&*account, &payload, &domain, &signature).unwrap());
    }
}
