use std::sync::Arc;

use crate::animation::ease::Ease;

/// Grid cell address.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct CellCoord {
    /// Row, 0 at the top.
    pub row: u32,
    /// Column, 0 at the left.
    pub col: u32,
}

impl CellCoord {
    /// Build a coordinate.
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Cells an event applies to.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Targets {
    /// Every cell of the grid.
    All,
    /// Every column of one row.
    Row(u32),
    /// Explicit cells (repeats allowed).
    Cells(Vec<CellCoord>),
}

impl Targets {
    /// `true` if `cell` is targeted.
    pub fn contains(&self, cell: CellCoord) -> bool {
        match self {
            Self::All => true,
            Self::Row(r) => cell.row == *r,
            Self::Cells(cells) => cells.contains(&cell),
        }
    }
}

/// Sweep direction of a wipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WipeDirection {
    /// Front sweeps across columns, left to right.
    #[serde(rename = "lr")]
    LeftToRight,
    /// Front sweeps across rows, top to bottom.
    #[serde(rename = "tb")]
    TopToBottom,
}

/// Type-specific event parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventKind {
    /// Beat pulse: triangular scale envelope up to `target_scale`.
    #[serde(rename_all = "camelCase")]
    Pulse {
        /// Peak scale.
        target_scale: f64,
        /// Progress easing.
        easing: Ease,
    },
    /// Onset flash: overlay alpha envelope up to `target_alpha`.
    #[serde(rename_all = "camelCase")]
    Flash {
        /// Peak overlay alpha.
        target_alpha: f64,
    },
    /// Section wipe: a front sweeping across the grid.
    Wipe {
        /// Sweep direction.
        direction: WipeDirection,
    },
    /// Loudness swell: `sin` rise-and-fall of scale on every cell.
    #[serde(rename_all = "camelCase")]
    Swell {
        /// Peak scale.
        target_scale: f64,
    },
}

impl EventKind {
    /// Easing applied to local progress.
    pub fn easing(&self) -> Ease {
        match self {
            Self::Pulse { easing, .. } => *easing,
            Self::Flash { .. } => Ease::Linear,
            Self::Wipe { .. } | Self::Swell { .. } => Ease::InOutCubic,
        }
    }

    /// Short type name (`pulse`, `flash`, `wipe`, `swell`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pulse { .. } => "pulse",
            Self::Flash { .. } => "flash",
            Self::Wipe { .. } => "wipe",
            Self::Swell { .. } => "swell",
        }
    }
}

/// One timed visual event produced by the mapper.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GraphicsEvent {
    /// Absolute start in seconds.
    pub time: f64,
    /// Length in seconds (> 0).
    pub duration: f64,
    /// Type and parameters.
    #[serde(flatten)]
    pub kind: EventKind,
    /// Affected cells.
    pub targets: Targets,
}

impl GraphicsEvent {
    /// Active iff `time <= t < time + duration`.
    pub fn is_active(&self, t: f64) -> bool {
        self.time <= t && t < self.time + self.duration
    }

    /// Local progress `(t - time) / duration` in `[0, 1)` while active.
    pub fn progress(&self, t: f64) -> Option<f64> {
        if !self.is_active(t) {
            return None;
        }
        Some(((t - self.time) / self.duration).clamp(0.0, 1.0))
    }

    /// End of the active window (exclusive).
    pub fn end(&self) -> f64 {
        self.time + self.duration
    }
}

/// Immutable, time-sorted event list shared by every worker of a job.
#[derive(Clone, Debug, Default)]
pub struct EventList {
    events: Arc<[GraphicsEvent]>,
    max_duration: f64,
}

impl EventList {
    /// Wrap a list already sorted by `time`.
    pub fn new(events: Vec<GraphicsEvent>) -> Self {
        let max_duration = events.iter().map(|e| e.duration).fold(0.0, f64::max);
        Self {
            events: events.into(),
            max_duration,
        }
    }

    /// All events in application order.
    pub fn as_slice(&self) -> &[GraphicsEvent] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// `true` if there are no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events active at `t`, in list order.
    pub fn active_at(&self, t: f64) -> impl Iterator<Item = &GraphicsEvent> + '_ {
        let lo_time = t - self.max_duration;
        let start = self.events.partition_point(|e| e.time < lo_time);
        let end = self.events.partition_point(|e| e.time <= t);
        self.events[start..end.max(start)]
            .iter()
            .filter(move |e| e.is_active(t))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/event.rs"]
mod tests;
