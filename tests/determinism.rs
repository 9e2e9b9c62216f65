use simdex::{
    HasherKind, ShingleConfig, Simhasher, SimhashConfig, fingerprint_text, tokenize,
};

fn simhasher(kind: HasherKind) -> Simhasher {
    Simhasher::new(&SimhashConfig::new().with_hasher(kind)).unwrap()
}

#[test]
fn fingerprints_equivalent_inputs_match() {
    let cfg = ShingleConfig::default();
    for kind in [HasherKind::Sha256, HasherKind::Xxh3] {
        let h = simhasher(kind);
        // Case, spacing and punctuation are scrubbed away.
        let a = fingerprint_text(" Hello   world!  ", &cfg, &h).unwrap();
        let b = fingerprint_text("hello WORLD", &cfg, &h).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn composed_and_decomposed_accents_match() {
    let cfg = ShingleConfig::default();
    let h = simhasher(HasherKind::Xxh3);
    let composed = fingerprint_text("Caf\u{00E9} au lait", &cfg, &h).unwrap();
    let decomposed = fingerprint_text("Cafe\u{0301} au lait", &cfg, &h).unwrap();
    assert_eq!(composed, decomposed);
}

#[test]
fn repeated_runs_are_identical() {
    let cfg = ShingleConfig::default();
    let text = "The quick brown fox jumps over the lazy dog";
    for kind in [HasherKind::Sha256, HasherKind::Xxh3] {
        let first = fingerprint_text(text, &cfg, &simhasher(kind)).unwrap();
        for _ in 0..5 {
            assert_eq!(fingerprint_text(text, &cfg, &simhasher(kind)).unwrap(), first);
        }
    }
}

#[test]
fn parallel_accumulation_matches_sequential() {
    let cfg = ShingleConfig::default();
    let text = "lorem ipsum dolor sit amet ".repeat(200);
    let features = tokenize(&text, &cfg).unwrap();

    let sequential = simhasher(HasherKind::Xxh3);
    let parallel = simhasher(HasherKind::Xxh3).with_parallel(true);
    assert_eq!(
        sequential.fingerprint(&features),
        parallel.fingerprint(&features)
    );
}

#[test]
fn seeds_change_xxh3_fingerprints() {
    let cfg = ShingleConfig::default();
    let text = "seeded fingerprints are only comparable under the same seed";
    let a = Simhasher::new(&SimhashConfig::new().with_seed(1)).unwrap();
    let b = Simhasher::new(&SimhashConfig::new().with_seed(2)).unwrap();
    assert_ne!(
        fingerprint_text(text, &cfg, &a).unwrap(),
        fingerprint_text(text, &cfg, &b).unwrap()
    );
}
