//! Per-frame grid update.
//!
//! Each call first relaxes every cell toward neutral, then lets the events active at `frame_time`
//! overwrite the fields they drive. Events are applied in list order, so when two events write the
//! same field of the same cell the later one wins. Nothing is blended additively.

use std::f64::consts::PI;

use crate::{
    animation::ease::{swell, triangle},
    mapping::event::{EventKind, EventList, GraphicsEvent, Targets, WipeDirection},
    scene::{
        particles::ParticleSchedule,
        state::{CellState, Grid, SceneState},
    },
};

pub(crate) const SCALE_RELAX_RATE: f64 = 0.15;
pub(crate) const ALPHA_RELAX_RATE: f64 = 0.2;
pub(crate) const SNAP_EPSILON: f64 = 0.01;
pub(crate) const WIPE_BUMP: f64 = 0.2;
pub(crate) const MAX_SCALE: f64 = 2.0;

/// Advance the grid of `state` to `frame_time`.
pub fn advance(state: &mut SceneState, events: &EventList, frame_time: f64) {
    advance_grid(&mut state.grid, events, frame_time);
    state.time = frame_time;
}

/// Replace the particle list with the particles alive at `frame_time`.
pub fn integrate_particles(state: &mut SceneState, schedule: &ParticleSchedule, frame_time: f64) {
    state.particles = schedule.alive_at(frame_time);
}

pub(crate) fn advance_grid(grid: &mut Grid, events: &EventList, frame_time: f64) {
    for cell in grid.cells_mut() {
        relax(cell);
    }
    for event in events.active_at(frame_time) {
        apply(grid, event, frame_time);
    }
    for cell in grid.cells_mut() {
        clamp(cell);
    }
}

fn relax(cell: &mut CellState) {
    cell.current_scale = relax_toward_one(cell.current_scale, SCALE_RELAX_RATE);
    cell.current_alpha = relax_toward_one(cell.current_alpha, ALPHA_RELAX_RATE);
    cell.target_scale = 1.0;
    cell.target_alpha = 1.0;
    cell.brightness = 0.0;
    cell.flash_intensity = 0.0;
    cell.is_animating = false;
    cell.is_flashing = false;
}

fn relax_toward_one(v: f64, rate: f64) -> f64 {
    let next = v + (1.0 - v) * rate;
    if (next - 1.0).abs() < SNAP_EPSILON {
        1.0
    } else {
        next
    }
}

fn apply(grid: &mut Grid, event: &GraphicsEvent, frame_time: f64) {
    let Some(p) = event.progress(frame_time) else {
        return;
    };
    let eased = event.kind.easing().apply(p);

    match event.kind {
        EventKind::Pulse { target_scale, .. } => {
            let scale = triangle(eased, 1.0, target_scale);
            for_each_target(grid, &event.targets, |cell| {
                cell.current_scale = scale;
                cell.target_scale = target_scale;
                cell.is_animating = true;
            });
        }
        EventKind::Flash { target_alpha } => {
            let overlay = triangle(eased, 0.0, target_alpha);
            for_each_target(grid, &event.targets, |cell| {
                cell.brightness = overlay;
                cell.is_flashing = true;
                cell.flash_intensity = 1.0 - eased;
            });
        }
        EventKind::Wipe { direction } => {
            let span = match direction {
                WipeDirection::LeftToRight => grid.cols(),
                WipeDirection::TopToBottom => grid.rows(),
            };
            let front = eased * f64::from(span);
            for_each_target(grid, &event.targets, |cell| {
                let k = f64::from(match direction {
                    WipeDirection::LeftToRight => cell.col,
                    WipeDirection::TopToBottom => cell.row,
                });
                if k >= front {
                    return;
                }
                let local = (front - k).clamp(0.0, 1.0);
                cell.current_alpha = 1.0;
                cell.target_alpha = 1.0;
                cell.current_scale = 1.0 + WIPE_BUMP * (local * PI).sin();
                cell.is_animating = true;
            });
        }
        EventKind::Swell { target_scale } => {
            let scale = swell(eased, target_scale);
            for_each_target(grid, &event.targets, |cell| {
                cell.current_scale = scale;
                cell.target_scale = target_scale;
                cell.is_animating = true;
            });
        }
    }
}

fn for_each_target(grid: &mut Grid, targets: &Targets, mut f: impl FnMut(&mut CellState)) {
    match targets {
        Targets::All => grid.cells_mut().iter_mut().for_each(f),
        Targets::Row(row) => grid.row_mut(*row).iter_mut().for_each(f),
        Targets::Cells(cells) => {
            for c in cells {
                if let Some(cell) = grid.get_mut(c.row, c.col) {
                    f(cell);
                }
            }
        }
    }
}

fn clamp(cell: &mut CellState) {
    cell.current_scale = sanitize(cell.current_scale, 0.0, MAX_SCALE, 1.0);
    cell.current_alpha = sanitize(cell.current_alpha, 0.0, 1.0, 1.0);
    cell.brightness = sanitize(cell.brightness, 0.0, 1.0, 0.0);
    cell.flash_intensity = sanitize(cell.flash_intensity, 0.0, 1.0, 0.0);
}

fn sanitize(v: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    if v.is_finite() { v.clamp(lo, hi) } else { fallback }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/updater.rs"]
mod tests;
