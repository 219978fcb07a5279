//! Frequency to grid-row projection used by onset flashes.
//!
//! Frequencies are placed on a log axis spanning `100 Hz ..= 8 kHz`; low frequencies land on the
//! bottom row, high ones on the top row.

const LOW_HZ: f64 = 100.0;
const SPAN: f64 = 80.0;

/// Map a dominant frequency to a grid row in `0..rows`.
///
/// Non-positive and NaN frequencies read as "lowest" (bottom row); `+inf` reads as the top row.
pub fn frequency_to_row(frequency_hz: f64, rows: u32) -> u32 {
    if rows <= 1 {
        return 0;
    }
    let last = rows - 1;
    if frequency_hz.is_nan() || frequency_hz <= 0.0 {
        return last;
    }
    let octave = (frequency_hz / LOW_HZ).log10() / SPAN.log10();
    let v = ((1.0 - octave) * f64::from(last)).round();
    v.clamp(0.0, f64::from(last)) as u32
}
