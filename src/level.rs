//! Level conversions and display labels.
//!
//! ```text
//!     gain = 10^(dBFS / 20)
//!
//!     0 dBFS  →  1.0    (unity)
//!    -6 dBFS  →  0.501
//!   -20 dBFS  →  0.1
//!   -∞ dBFS  →  0.0
//! ```
//!
//! No special cases: very low levels simply underflow towards zero.

use alloc::format;
use alloc::string::String;

/// Convert a level in decibels relative to full scale to a linear gain.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

/// Label for an output level, e.g. `"-20 dBFS"`.
pub fn format_level(db: f32) -> String {
    // avoid printing "-0 dBFS"
    let db = if db == 0.0 { 0.0 } else { db };
    format!("{db} dBFS")
}

/// Label for a modulation rate, e.g. `"5.0 Hz"`.
pub fn format_rate(hz: f32) -> String {
    format!("{hz:.1} Hz")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unity_is_exact() {
        assert_eq!(db_to_gain(0.0), 1.0);
    }

    #[test]
    fn reference_points() {
        assert!((db_to_gain(-6.0) - 0.501_187).abs() < 1e-5);
        assert!((db_to_gain(-20.0) - 0.1).abs() < 1e-6);
        assert!((db_to_gain(6.0) - 1.995_262).abs() < 1e-5);
        assert!((db_to_gain(-60.0) - 0.001).abs() < 1e-7);
    }

    #[test]
    fn strictly_increasing() {
        let mut previous = db_to_gain(-120.0);
        let mut db = -119.5;
        while db <= 12.0 {
            let gain = db_to_gain(db);
            assert!(gain > previous, "not increasing at {db} dBFS");
            previous = gain;
            db += 0.5;
        }
    }

    #[test]
    fn minus_infinity_is_silence() {
        assert_eq!(db_to_gain(f32::NEG_INFINITY), 0.0);
        assert!(db_to_gain(-1000.0) >= 0.0);
    }

    #[test]
    fn labels() {
        assert_eq!(format_level(-20.0), "-20 dBFS");
        assert_eq!(format_level(-0.0), "0 dBFS");
        assert_eq!(format_level(-4.5), "-4.5 dBFS");
        assert_eq!(format_rate(5.0), "5.0 Hz");
        assert_eq!(format_rate(12.34), "12.3 Hz");
    }
}
