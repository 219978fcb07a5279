/// Monotonic reparameterization of linear progress `[0,1] -> [0,1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ease {
    Linear,
    OutCubic,
    InOutCubic,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

/// Triangular envelope: `1 -> peak` over the first half of `eased`, `peak -> 1` over the second.
pub fn triangle(eased: f64, from: f64, peak: f64) -> f64 {
    let e = eased.clamp(0.0, 1.0);
    let w = if e <= 0.5 { e / 0.5 } else { (1.0 - e) / 0.5 };
    from + (peak - from) * w
}

/// Smooth rise-and-fall: `1 + (peak - 1)·sin(eased·π)`.
pub fn swell(eased: f64, peak: f64) -> f64 {
    1.0 + (peak - 1.0) * (eased.clamp(0.0, 1.0) * std::f64::consts::PI).sin()
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
