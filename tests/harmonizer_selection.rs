use rand::rngs::SmallRng;
use rand::SeedableRng;

use neurochord::harmony::chord::{Chord, Quality};
use neurochord::harmony::harmonizer::Harmonizer;
use neurochord::harmony::tension::TensionWeights;

fn harmonizer(seed: u64) -> Harmonizer {
    Harmonizer::new(
        Some(0),
        TensionWeights::default(),
        4,
        SmallRng::seed_from_u64(seed),
    )
}

#[test]
fn every_selection_belongs_to_the_active_library() {
    let mut h = harmonizer(1);
    let mut prev = Chord::new(0, Quality::Maj);
    for step in 0..200 {
        let prob = (step as f32 * 0.13).sin().abs();
        let next = h.next(&prev, prob);
        assert!(h.library().contains(&next));
        prev = next;
    }
}

#[test]
fn selection_tracks_the_requested_tension() {
    let mut h = harmonizer(2);
    let prev = Chord::new(0, Quality::Maj);

    let mut low_sum = 0.0;
    let mut high_sum = 0.0;
    for _ in 0..50 {
        let low = h.next(&prev, 0.1);
        low_sum += h.tension(prev.root(), &low);
        let high = h.next(&prev, 0.9);
        high_sum += h.tension(prev.root(), &high);
    }
    assert!(
        low_sum < high_sum,
        "mean tension for low probability ({low_sum}) should undercut high ({high_sum})"
    );
}

#[test]
fn selection_varies_rather_than_repeating_one_chord() {
    let mut h = harmonizer(3);
    let prev = Chord::new(0, Quality::Maj);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..60 {
        seen.insert(format!("{}", h.next(&prev, 0.5)));
    }
    assert!(seen.len() > 1, "weighted draw should keep variety");
}

#[test]
fn preset_selection_stays_inside_the_new_library() {
    let mut h = harmonizer(4);
    h.apply_preset("consonant").unwrap();
    let mut prev = Chord::new(0, Quality::Maj);
    for _ in 0..50 {
        let next = h.next(&prev, 0.3);
        assert!(h.library().contains(&next));
        assert!(matches!(
            next.quality,
            Quality::Maj | Quality::Min | Quality::Sus2 | Quality::Sus4
        ));
        prev = next;
    }
}

#[test]
fn chromatic_preset_lifts_the_key_restriction() {
    let mut h = harmonizer(5);
    h.apply_preset("chromatic").unwrap();
    let roots: std::collections::HashSet<u8> = h.library().iter().map(|c| c.root()).collect();
    assert_eq!(roots.len(), 12);
}

#[test]
fn failed_preset_keeps_the_running_configuration() {
    let mut h = harmonizer(6);
    let len_before = h.library().len();
    let weights_before = h.weights();
    let err = h.apply_preset("glitch").unwrap_err();
    assert!(err.contains("glitch"));
    assert_eq!(h.library().len(), len_before);
    assert_eq!(h.weights(), weights_before);
}
