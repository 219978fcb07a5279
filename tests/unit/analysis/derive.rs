use super::*;

#[test]
fn flat_loudness_without_envelope() {
    let l = derive_loudness(&[], 2.0);
    assert_eq!(l.len(), 5);
    assert!(l.iter().all(|s| s.level_lufs == FLAT_LUFS));
    assert!((l[4].time - 1.6).abs() < 1e-12);
}

#[test]
fn loudness_tracks_envelope_spacing() {
    let l = derive_loudness(&[0.1, 0.9, 0.1, 0.9], 4.0);
    assert_eq!(l.len(), 4);
    assert_eq!(l[1].time, 1.0);
    assert!(l[1].level_lufs - l[0].level_lufs > 1.5);
}

#[test]
fn onsets_are_rising_peaks() {
    let o = derive_onsets(&[0.1, 0.9, 0.1, 0.9], 4.0);
    assert_eq!(o.len(), 2);
    assert_eq!(o[0].time, 1.0);
    assert_eq!(o[1].time, 3.0);
    assert!((o[0].strength - 0.9).abs() < 1e-12);
    assert!(o[0].frequency_hz > 4000.0 && o[0].frequency_hz < 8000.0);
}

#[test]
fn plateau_counts_once() {
    let o = derive_onsets(&[0.1, 0.5, 0.5, 0.2], 4.0);
    assert_eq!(o.len(), 1);
    assert_eq!(o[0].time, 1.0);
}

#[test]
fn short_song_is_a_single_intro() {
    let s = derive_sections(&[0.1, 0.9, 0.1, 0.9], 4.0);
    assert_eq!(s.len(), 1);
    assert_eq!(s[0].label, "intro");
    assert_eq!(s[0].time, 0.0);
}

#[test]
fn long_song_gets_boundaries_and_outro() {
    // 60s quiet, then 60s loud, then quiet again: two sharp energy changes.
    let mut energy = vec![0.1; 60];
    energy.extend(std::iter::repeat_n(0.9, 60));
    energy.extend(std::iter::repeat_n(0.1, 60));
    let s = derive_sections(&energy, 180.0);

    assert_eq!(s[0].label, "intro");
    assert_eq!(s.last().unwrap().label, "outro");
    assert!((s.last().unwrap().time - 175.0).abs() < 1e-9);
    assert!(s.windows(2).all(|w| w[0].time < w[1].time));
    assert!(s.len() >= 3);
    for w in s.windows(2).take(s.len() - 2) {
        assert!(w[1].time - w[0].time > 5.0 || w[0].time == 0.0);
    }
}
