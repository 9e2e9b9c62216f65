use std::sync::Arc;

use simdex::{
    CanonicalError, ConfigLoadError, DedupEngine, FnHasher, Fingerprint, IndexConfig, IndexError, NearDupIndex,
    PerceptualError, PipelineError, ShingleConfig, SimdexConfig, Simhasher, SimhashConfig,
    fingerprint_text,
};

#[test]
fn zero_shingle_width_is_rejected_by_canonical_stage() {
    let simhasher = Simhasher::new(&SimhashConfig::default()).unwrap();
    let cfg = ShingleConfig::new().with_width(0);

    let result = fingerprint_text("some text", &cfg, &simhasher);
    assert!(matches!(
        result,
        Err(PipelineError::Canonical(CanonicalError::InvalidConfig(_)))
    ));
}

#[test]
fn invalid_width_bubbles_up_from_perceptual_stage() {
    let mut cfg = SimdexConfig::default();
    cfg.fingerprint.width_bits = 12;

    let result = DedupEngine::<u64>::new(&cfg);
    assert!(matches!(
        result,
        Err(PipelineError::Perceptual(PerceptualError::InvalidWidth { width_bits: 12 }))
    ));
}

#[test]
fn invalid_threshold_bubbles_up_from_index_stage() {
    let mut cfg = SimdexConfig::default();
    cfg.index.distance_threshold = 0;

    let result = DedupEngine::<u64>::new(&cfg);
    assert!(matches!(
        result,
        Err(PipelineError::Index(IndexError::InvalidConfig(_)))
    ));
}

#[test]
fn unsupported_config_version_is_rejected_by_engine() {
    let mut cfg = SimdexConfig::default();
    cfg.version = "7".to_string();

    let result = DedupEngine::<u64>::new(&cfg);
    assert!(matches!(
        result,
        Err(PipelineError::Config(ConfigLoadError::UnsupportedVersion(ref v))) if v == "7"
    ));

    let zeros = Arc::new(FnHasher::new("zeros", |_: &str, out: &mut [u8]| out.fill(0)));
    let result = DedupEngine::<u64>::with_hasher(&cfg, zeros);
    assert!(matches!(
        result,
        Err(PipelineError::Config(ConfigLoadError::UnsupportedVersion(_)))
    ));
}

#[test]
fn index_width_disagreeing_with_fingerprint_width_is_rejected_by_engine() {
    let mut cfg = SimdexConfig::default();
    cfg.index.width_bits = Some(128);

    let result = DedupEngine::<u64>::new(&cfg);
    assert!(matches!(
        result,
        Err(PipelineError::Config(ConfigLoadError::Validation(_)))
    ));

    let zeros = Arc::new(FnHasher::new("zeros", |_: &str, out: &mut [u8]| out.fill(0)));
    let result = DedupEngine::<u64>::with_hasher(&cfg, zeros);
    assert!(matches!(
        result,
        Err(PipelineError::Config(ConfigLoadError::Validation(_)))
    ));

    cfg.index.width_bits = Some(64);
    assert!(DedupEngine::<u64>::new(&cfg).is_ok());
}

#[test]
fn threshold_equal_to_width_is_allowed() {
    let cfg = IndexConfig::new().with_width_bits(8).with_distance_threshold(8);
    let mut idx: NearDupIndex<u8> = NearDupIndex::new(cfg).unwrap();
    let fp = Fingerprint::from_bytes(vec![0b1010_1010]).unwrap();
    idx.add(1, &fp).unwrap();

    // Every fingerprint of width 8 is within distance 8.
    let opposite = Fingerprint::from_bytes(vec![0b0101_0101]).unwrap();
    assert!(idx.near_duplicates(&opposite).unwrap().contains(&1));
}

#[test]
fn mismatched_widths_are_rejected_on_add_and_query() {
    let mut idx: NearDupIndex<u64> = NearDupIndex::new(IndexConfig::default()).unwrap();
    let narrow = Fingerprint::from_bytes(vec![0xAB; 4]).unwrap();

    let expected = IndexError::SizeMismatch {
        expected: 64,
        actual: 32,
    };
    assert_eq!(idx.add(1, &narrow), Err(expected.clone()));
    assert_eq!(idx.near_duplicates(&narrow), Err(expected.clone()));
    assert_eq!(idx.matches(&narrow), Err(expected.clone()));
    assert_eq!(idx.keys(&narrow), Err(expected));
    assert!(idx.is_empty());
}

#[test]
fn delete_with_mismatched_width_is_a_noop() {
    let mut idx: NearDupIndex<u64> = NearDupIndex::new(IndexConfig::default()).unwrap();
    let fp = Fingerprint::from_u64(0x1111);
    idx.add(1, &fp).unwrap();

    let wide = Fingerprint::from_bytes(vec![0u8; 16]).unwrap();
    assert!(!idx.delete(&1, &wide));
    assert_eq!(idx.entry_count(), 1);
}

#[test]
fn comparing_fingerprints_of_different_widths_fails() {
    let a = Fingerprint::from_u64(0);
    let b = Fingerprint::from_bytes(vec![0u8; 16]).unwrap();
    assert_eq!(
        a.distance(&b),
        Err(PerceptualError::SizeMismatch {
            left: 64,
            right: 128
        })
    );
}

#[test]
fn empty_fingerprint_bytes_are_rejected() {
    assert_eq!(
        Fingerprint::from_bytes(Vec::new()),
        Err(PerceptualError::EmptyFingerprint)
    );
}

#[test]
fn pipeline_error_messages_name_the_stage() {
    let err: PipelineError = CanonicalError::InvalidConfig("width must be >= 1".into()).into();
    assert!(err.to_string().contains("shingling"));

    let err: PipelineError = PerceptualError::InvalidWidth { width_bits: 7 }.into();
    assert!(err.to_string().contains("fingerprinting"));

    let err: PipelineError = ConfigLoadError::UnsupportedVersion("7".into()).into();
    assert!(err.to_string().contains("configuration"));
}
