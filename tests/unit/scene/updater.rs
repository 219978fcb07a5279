use super::*;
use crate::{animation::ease::Ease, mapping::event::CellCoord};

fn pulse(time: f64, cells: Vec<CellCoord>) -> GraphicsEvent {
    GraphicsEvent {
        time,
        duration: 0.18,
        kind: EventKind::Pulse {
            target_scale: 1.6,
            easing: Ease::OutCubic,
        },
        targets: Targets::Cells(cells),
    }
}

fn flash(time: f64, row: u32) -> GraphicsEvent {
    GraphicsEvent {
        time,
        duration: 0.12,
        kind: EventKind::Flash { target_alpha: 1.0 },
        targets: Targets::Row(row),
    }
}

fn wipe(time: f64, direction: WipeDirection) -> GraphicsEvent {
    GraphicsEvent {
        time,
        duration: 0.6,
        kind: EventKind::Wipe { direction },
        targets: Targets::All,
    }
}

fn swell_event(time: f64) -> GraphicsEvent {
    GraphicsEvent {
        time,
        duration: 0.4,
        kind: EventKind::Swell { target_scale: 1.1 },
        targets: Targets::All,
    }
}

fn state() -> SceneState {
    SceneState::neutral(8, 8)
}

#[test]
fn nothing_active_keeps_neutral() {
    let mut s = state();
    advance(&mut s, &EventList::new(vec![pulse(1.0, vec![CellCoord::new(0, 0)])]), 0.5);
    assert!(s.grid.cells().iter().all(|c| c.is_visually_neutral()));
    assert!(s.grid.cells().iter().all(|c| !c.is_animating && !c.is_flashing));
}

#[test]
fn events_starting_now_are_neutral_at_their_start() {
    let events = EventList::new(vec![
        pulse(0.0, vec![CellCoord::new(1, 1)]),
        flash(0.0, 2),
        wipe(0.0, WipeDirection::LeftToRight),
        swell_event(0.0),
    ]);
    let mut s = state();
    advance(&mut s, &events, 0.0);
    assert!(s.grid.cells().iter().all(|c| c.is_visually_neutral()));
    // Active, but at zero progress.
    assert!(s.grid.get(1, 1).unwrap().is_animating);
    assert!(s.grid.get(2, 0).unwrap().is_flashing);
}

#[test]
fn pulse_peaks_mid_event_on_targets_only() {
    let events = EventList::new(vec![pulse(1.0, vec![CellCoord::new(3, 4)])]);
    let mut s = state();
    // OutCubic reaches 0.5 at p = 1 - 0.5^(1/3).
    let p = 1.0 - 0.5f64.powf(1.0 / 3.0);
    advance(&mut s, &events, 1.0 + p * 0.18);
    let c = s.grid.get(3, 4).unwrap();
    assert!((c.current_scale - 1.6).abs() < 1e-6);
    assert_eq!(c.target_scale, 1.6);
    assert!(c.is_animating);
    assert_eq!(s.grid.get(3, 5).unwrap().current_scale, 1.0);
}

#[test]
fn pulse_relaxes_back_to_exact_one() {
    let events = EventList::new(vec![pulse(0.0, vec![CellCoord::new(0, 0)])]);
    let mut s = state();
    advance(&mut s, &events, 0.05);
    let peak = s.grid.get(0, 0).unwrap().current_scale;
    assert!(peak > 1.0);
    let mut prev = peak;
    let mut t = 0.2;
    for _ in 0..40 {
        advance(&mut s, &events, t);
        let now = s.grid.get(0, 0).unwrap().current_scale;
        assert!(now <= prev);
        prev = now;
        t += 1.0 / 30.0;
    }
    assert_eq!(prev, 1.0);
}

#[test]
fn flash_drives_brightness_not_alpha() {
    let events = EventList::new(vec![flash(2.0, 5)]);
    let mut s = state();
    advance(&mut s, &events, 2.06);
    for c in s.grid.cells() {
        if c.row == 5 {
            assert!((c.brightness - 1.0).abs() < 1e-9);
            assert!(c.is_flashing);
            assert!((c.flash_intensity - 0.5).abs() < 1e-9);
        } else {
            assert_eq!(c.brightness, 0.0);
            assert!(!c.is_flashing);
        }
        assert_eq!(c.current_alpha, 1.0);
    }
}

#[test]
fn wipe_front_sweeps_columns() {
    let events = EventList::new(vec![wipe(0.0, WipeDirection::LeftToRight)]);
    let mut s = state();
    // InOutCubic(0.5) = 0.5 -> front at column 4.
    advance(&mut s, &events, 0.3);
    for c in s.grid.cells() {
        assert_eq!(c.is_animating, c.col < 4, "col {}", c.col);
    }
    // Cells fully behind the front get sin(pi) = 0 bump.
    assert!((s.grid.get(0, 0).unwrap().current_scale - 1.0).abs() < 1e-9);
}

#[test]
fn wipe_front_sweeps_rows() {
    let events = EventList::new(vec![wipe(0.0, WipeDirection::TopToBottom)]);
    let mut s = state();
    advance(&mut s, &events, 0.3);
    for c in s.grid.cells() {
        assert_eq!(c.is_animating, c.row < 4);
    }
}

#[test]
fn wipe_leading_cell_gets_bump() {
    let events = EventList::new(vec![wipe(0.0, WipeDirection::LeftToRight)]);
    let mut s = state();
    // Front at 3.5: column 3 has local progress 0.5.
    let eased_target = 3.5 / 8.0;
    let p = (eased_target / 4.0f64).cbrt();
    advance(&mut s, &events, p * 0.6);
    let c = s.grid.get(0, 3).unwrap();
    assert!((c.current_scale - 1.2).abs() < 1e-6);
}

#[test]
fn swell_rises_and_falls_on_all_cells() {
    let events = EventList::new(vec![swell_event(1.0)]);
    let mut s = state();
    advance(&mut s, &events, 1.2);
    assert!(
        s.grid
            .cells()
            .iter()
            .all(|c| (c.current_scale - 1.1).abs() < 1e-9)
    );
}

#[test]
fn later_event_wins_on_shared_field() {
    // Pulse and swell both write scale at t=1.1; swell comes later in the list.
    let events = EventList::new(vec![pulse(1.0, vec![CellCoord::new(0, 0)]), swell_event(1.0)]);
    let mut s = state();
    advance(&mut s, &events, 1.09);
    let c = s.grid.get(0, 0).unwrap();
    let expected = swell(Ease::InOutCubic.apply(0.09 / 0.4), 1.1);
    assert!((c.current_scale - expected).abs() < 1e-12);
    assert_eq!(c.target_scale, 1.1);
}

#[test]
fn out_of_grid_targets_are_ignored() {
    let events = EventList::new(vec![
        pulse(0.0, vec![CellCoord::new(20, 20)]),
        flash(0.0, 99),
    ]);
    let mut s = state();
    advance(&mut s, &events, 0.05);
    assert!(s.grid.cells().iter().all(|c| c.is_visually_neutral()));
}

#[test]
fn scale_is_clamped() {
    let events = EventList::new(vec![GraphicsEvent {
        time: 0.0,
        duration: 1.0,
        kind: EventKind::Pulse {
            target_scale: 9.0,
            easing: Ease::Linear,
        },
        targets: Targets::All,
    }]);
    let mut s = state();
    advance(&mut s, &events, 0.5);
    assert!(s.grid.cells().iter().all(|c| c.current_scale == MAX_SCALE));
}
