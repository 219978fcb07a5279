//! Beat-spawned particles as a pure function of time.
//!
//! Every spawn is fixed up front from the beat list and the job seed, so the particles alive at any
//! timestamp can be computed without visiting earlier frames.

use std::f64::consts::TAU;

use crate::{
    foundation::{
        core::{Canvas, Point, Rgba8},
        math::derive_seed,
    },
    scene::{palette::Palette, state::Particle},
};

pub(crate) const PARTICLE_LIFETIME_SECS: f64 = 1.2;
pub(crate) const MIN_BURST: u64 = 3;
pub(crate) const MAX_BURST: u64 = 8;

const BURST_DOMAIN: u64 = 0x7061_7274;

/// Initial conditions of one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSpawn {
    pub time: f64,
    pub x0: f64,
    pub y0: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub color: Rgba8,
}

impl ParticleSpawn {
    /// State at `t`, or `None` before spawn, after fade-out, or once it has left `canvas`.
    ///
    /// A particle that leaves the frame stays removed even if gravity would carry it back in.
    pub fn state_at(&self, t: f64, gravity: f64, canvas: Canvas) -> Option<Particle> {
        let tau = t - self.time;
        if tau < 0.0 {
            return None;
        }
        let life = 1.0 - tau / PARTICLE_LIFETIME_SECS;
        if life <= 0.0 {
            return None;
        }
        let x = self.x0 + self.vx * tau;
        let y = self.y_at(tau, gravity);
        if !canvas.contains(Point::new(x, y)) {
            return None;
        }
        // x is linear in tau, so only the vertical apex can poke outside between spawn and now.
        if gravity != 0.0 {
            let apex = -self.vy / gravity;
            if apex > 0.0 && apex < tau && !canvas.contains(Point::new(x, self.y_at(apex, gravity)))
            {
                return None;
            }
        }
        Some(Particle {
            x,
            y,
            vx: self.vx,
            vy: self.vy + gravity * tau,
            life,
            size: self.size,
            color: self.color,
        })
    }

    fn y_at(&self, tau: f64, gravity: f64) -> f64 {
        self.y0 + self.vy * tau + 0.5 * gravity * tau * tau
    }
}

/// All particle spawns of one job, ascending by spawn time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleSchedule {
    spawns: Vec<ParticleSpawn>,
    gravity: f64,
    canvas: Option<Canvas>,
}

impl ParticleSchedule {
    /// Walk `beats` in order, spawning a 3..=8 particle burst per beat while fewer than `cap`
    /// particles are alive. A burst that would overshoot the cap is truncated.
    ///
    /// `gravity_rel` is expressed in frame heights per second squared.
    pub fn build(
        beats: &[f64],
        palette: &Palette,
        canvas: Canvas,
        gravity_rel: f64,
        cap: usize,
        seed: u64,
    ) -> Self {
        let mut schedule = Self {
            spawns: Vec::new(),
            gravity: gravity_rel * f64::from(canvas.height),
            canvas: Some(canvas),
        };
        if cap == 0 || canvas.width == 0 || canvas.height == 0 {
            return schedule;
        }

        for (beat_idx, &beat) in beats.iter().enumerate() {
            let alive = schedule.alive_count_at(beat);
            if alive >= cap {
                continue;
            }
            let burst_seed = derive_seed(seed, &[BURST_DOMAIN, beat_idx as u64]);
            let burst = MIN_BURST + burst_seed % (MAX_BURST - MIN_BURST + 1);
            let admitted = (burst as usize).min(cap - alive);
            for particle_idx in 0..admitted {
                let s = derive_seed(seed, &[beat_idx as u64, particle_idx as u64]);
                schedule.spawns.push(spawn(beat, s, palette, canvas));
            }
        }
        schedule
    }

    pub fn spawns(&self) -> &[ParticleSpawn] {
        &self.spawns
    }

    /// Particles alive at `t`, in spawn order.
    pub fn alive_at(&self, t: f64) -> Vec<Particle> {
        let Some(canvas) = self.canvas else {
            return Vec::new();
        };
        self.window(t)
            .iter()
            .filter_map(|s| s.state_at(t, self.gravity, canvas))
            .collect()
    }

    fn alive_count_at(&self, t: f64) -> usize {
        let Some(canvas) = self.canvas else {
            return 0;
        };
        self.window(t)
            .iter()
            .filter(|s| s.state_at(t, self.gravity, canvas).is_some())
            .count()
    }

    // Spawns in `(t - lifetime, t]`; nothing older can still be alive.
    fn window(&self, t: f64) -> &[ParticleSpawn] {
        let lo = self
            .spawns
            .partition_point(|s| s.time <= t - PARTICLE_LIFETIME_SECS);
        let hi = self.spawns.partition_point(|s| s.time <= t);
        &self.spawns[lo..hi.max(lo)]
    }
}

fn spawn(time: f64, seed: u64, palette: &Palette, canvas: Canvas) -> ParticleSpawn {
    let mut rng = fastrand::Rng::with_seed(seed);
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let unit = w.min(h);

    let x0 = w * (0.15 + 0.7 * rng.f64());
    let y0 = h * (0.25 + 0.5 * rng.f64());
    let angle = rng.f64() * TAU;
    let speed = unit * (0.08 + 0.22 * rng.f64());
    let lift = unit * 0.12;
    let size = (unit / 720.0) * (2.0 + 5.0 * rng.f64());
    let color = palette.cell(rng.usize(..palette.cells().len().max(1)));

    ParticleSpawn {
        time,
        x0,
        y0,
        vx: angle.cos() * speed,
        vy: angle.sin() * speed - lift,
        size,
        color,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/particles.rs"]
mod tests;
