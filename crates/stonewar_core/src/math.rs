//! Fixed-point helpers for deterministic damage scaling.
//!
//! Damage is integral, but several rules scale it by a fraction (ranged
//! attacks, area splits, damage over time). Scaling goes through fixed-point
//! and floors toward negative infinity so that heals (negative damage) round
//! the same way on every platform.

use fixed::types::I32F32;

/// Fixed-point number type for all scaling math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Scale `amount` by `numerator / denominator`, flooring the result.
///
/// A zero denominator yields zero.
#[must_use]
pub fn scale_floor(amount: i32, numerator: i32, denominator: i32) -> i32 {
    if denominator == 0 {
        return 0;
    }
    let scaled = Fixed::from_num(amount) * Fixed::from_num(numerator) / Fixed::from_num(denominator);
    scaled.floor().to_num::<i32>()
}

/// Divide `amount` by `divisor`, flooring the result.
#[must_use]
pub fn div_floor(amount: i32, divisor: i32) -> i32 {
    scale_floor(amount, 1, divisor)
}

/// Triangular number `n (n + 1) / 2`.
#[must_use]
pub const fn triangular(n: u32) -> u32 {
    n * (n + 1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div_floor_positive() {
        assert_eq!(div_floor(10, 4), 2);
        assert_eq!(div_floor(12, 4), 3);
        assert_eq!(div_floor(3, 4), 0);
    }

    #[test]
    fn test_div_floor_negative_rounds_down() {
        assert_eq!(div_floor(-10, 4), -3);
        assert_eq!(div_floor(-12, 4), -3);
        assert_eq!(div_floor(-1, 3), -1);
    }

    #[test]
    fn test_scale_floor() {
        assert_eq!(scale_floor(100, 1, 4), 25);
        assert_eq!(scale_floor(7, 2, 3), 4);
        assert_eq!(scale_floor(5, 1, 0), 0);
    }

    #[test]
    fn test_triangular() {
        assert_eq!(triangular(0), 0);
        assert_eq!(triangular(1), 1);
        assert_eq!(triangular(4), 10);
    }
}
