use neurochord::harmony::chord::{Chord, Extension, Quality};
use neurochord::harmony::library::{ChordLibrary, LibraryFilter};
use neurochord::harmony::tension::{
    fifths_distance, TensionEngine, TensionWeights, TENSION_MAX,
};

#[test]
fn quality_ranking_orders_dissonance() {
    let mut engine = TensionEngine::new(TensionWeights::default());
    let t_maj = engine.tension(0, &Chord::new(0, Quality::Maj));
    let t_min = engine.tension(0, &Chord::new(0, Quality::Min));
    let t_dom7 = engine.tension(0, &Chord::new(0, Quality::Dom7));
    let t_dim = engine.tension(0, &Chord::new(0, Quality::Dim));
    assert!(t_maj < t_min);
    assert!(t_min < t_dom7);
    assert!(t_dom7 < t_dim);
}

#[test]
fn extensions_raise_tension_monotonically() {
    let mut engine = TensionEngine::new(TensionWeights::default());
    let triad = engine.tension(0, &Chord::new(0, Quality::Maj));
    let add9 = engine.tension(
        0,
        &Chord::new(0, Quality::Maj).with_extensions(&[Extension::Nine]),
    );
    let alt9 = engine.tension(
        0,
        &Chord::new(0, Quality::Maj).with_extensions(&[Extension::FlatNine]),
    );
    assert!(triad < add9);
    assert!(add9 < alt9);
}

#[test]
fn tension_is_bounded_over_the_full_library() {
    let library = ChordLibrary::build(&LibraryFilter {
        key_root: None,
        qualities: None,
        allow_altered: true,
    });
    let mut engine = TensionEngine::new(TensionWeights::new(5.0, 5.0, 5.0));
    for prev_root in 0..12u8 {
        for chord in library.iter() {
            let t = engine.tension(prev_root, chord);
            assert!((0.0..=TENSION_MAX).contains(&t), "{chord}: {t}");
        }
    }
}

#[test]
fn fifths_distance_metric_properties() {
    let mut max_seen = 0;
    for a in 0..12u8 {
        assert_eq!(fifths_distance(a, a), 0);
        for b in 0..12u8 {
            let d = fifths_distance(a, b);
            assert_eq!(d, fifths_distance(b, a));
            max_seen = max_seen.max(d);
        }
    }
    assert_eq!(max_seen, 6);
}

#[test]
fn worked_example_matches_by_hand_arithmetic() {
    // Weights (1.5, 1.0, 1.2), previous root C.
    let mut engine = TensionEngine::new(TensionWeights::new(1.5, 1.0, 1.2));

    // C maj, no extensions: all components zero.
    let c_maj = Chord::new(0, Quality::Maj);
    assert_eq!(engine.tension(0, &c_maj), 0.0);

    // F# dim with b9: 1.5*4 + 1.0*1 + 1.2*6 = 14.2, clamped to 10.
    let fs_dim = Chord::new(6, Quality::Dim).with_extensions(&[Extension::FlatNine]);
    assert_eq!(engine.tension(0, &fs_dim), TENSION_MAX);
}

#[test]
fn weight_replacement_discards_cached_tensions() {
    let mut engine = TensionEngine::new(TensionWeights::new(1.0, 1.0, 1.0));
    let chord = Chord::new(2, Quality::Min7);
    let before = engine.tension(0, &chord);
    engine.set_weights(TensionWeights::new(2.0, 1.0, 1.0));
    let after = engine.tension(0, &chord);
    assert!(after > before, "stale cached value was served: {before} vs {after}");
}
