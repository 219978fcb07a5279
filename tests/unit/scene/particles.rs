use super::*;
use crate::scene::palette::PaletteKind;

fn canvas() -> Canvas {
    Canvas {
        width: 640,
        height: 360,
    }
}

fn schedule(beats: &[f64], cap: usize, seed: u64) -> ParticleSchedule {
    ParticleSchedule::build(
        beats,
        &Palette::builtin(PaletteKind::Neon),
        canvas(),
        0.25,
        cap,
        seed,
    )
}

#[test]
fn bursts_are_three_to_eight_per_beat() {
    let s = schedule(&[0.0, 2.0, 4.0, 6.0], 1000, 11);
    for beat in [0.0, 2.0, 4.0, 6.0] {
        let n = s.spawns().iter().filter(|p| p.time == beat).count();
        assert!((3..=8).contains(&n), "beat {beat}: {n}");
    }
}

#[test]
fn same_seed_same_schedule() {
    let beats: Vec<f64> = (0..20).map(|k| k as f64 * 0.5).collect();
    assert_eq!(schedule(&beats, 64, 3), schedule(&beats, 64, 3));
    assert_ne!(schedule(&beats, 64, 3), schedule(&beats, 64, 4));
}

#[test]
fn cap_bounds_alive_particles() {
    let beats: Vec<f64> = (0..40).map(|k| k as f64 * 0.1).collect();
    let s = schedule(&beats, 10, 5);
    let mut t = 0.0;
    while t < 5.0 {
        assert!(s.alive_at(t).len() <= 10);
        t += 1.0 / 30.0;
    }
    assert!(schedule(&beats, 0, 5).spawns().is_empty());
}

#[test]
fn particles_fade_and_expire() {
    let s = schedule(&[1.0], 100, 9);
    assert!(s.alive_at(0.99).is_empty());
    let born = s.alive_at(1.0);
    assert!(!born.is_empty());
    assert!(born.iter().all(|p| p.life == 1.0));
    for p in s.alive_at(1.6) {
        assert!((p.life - 0.5).abs() < 1e-9);
    }
    assert!(s.alive_at(1.0 + PARTICLE_LIFETIME_SECS).is_empty());
}

#[test]
fn state_follows_ballistic_motion() {
    let spawn = ParticleSpawn {
        time: 0.0,
        x0: 100.0,
        y0: 100.0,
        vx: 10.0,
        vy: -20.0,
        size: 3.0,
        color: Rgba8::WHITE,
    };
    let p = spawn.state_at(0.5, 40.0, canvas()).unwrap();
    assert!((p.x - 105.0).abs() < 1e-12);
    assert!((p.y - (100.0 - 10.0 + 5.0)).abs() < 1e-12);
    assert!((p.life - (1.0 - 0.5 / 1.2)).abs() < 1e-12);

    let leaving = ParticleSpawn { vx: -1000.0, ..spawn };
    assert!(leaving.state_at(0.5, 0.0, canvas()).is_none());
}

#[test]
fn alive_at_is_independent_of_query_order() {
    let beats: Vec<f64> = (0..10).map(|k| k as f64 * 0.4).collect();
    let s = schedule(&beats, 256, 17);
    let late = s.alive_at(3.1);
    let _ = s.alive_at(0.2);
    assert_eq!(s.alive_at(3.1), late);
}
