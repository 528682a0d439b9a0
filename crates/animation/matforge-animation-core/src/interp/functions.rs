//! Interpolation helpers:
//! - lerp_f32 / lerp_array (component-wise linear)
//! - lerp_i32 / lerp_u8 (linear, truncated toward zero)

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Component-wise blend of fixed-size float arrays.
#[inline]
pub fn lerp_array<const N: usize>(a: [f32; N], b: [f32; N], t: f32) -> [f32; N] {
    std::array::from_fn(|i| lerp_f32(a[i], b[i], t))
}

/// Integer blend; the result is truncated toward zero.
#[inline]
pub fn lerp_i32(a: i32, b: i32, t: f32) -> i32 {
    lerp_f32(a as f32, b as f32, t) as i32
}

#[inline]
pub fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    lerp_f32(a as f32, b as f32, t) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_exact() {
        assert_eq!(lerp_array([1.0, 2.0, 3.0], [5.0, 6.0, 7.0], 0.0), [1.0, 2.0, 3.0]);
        assert_eq!(lerp_array([1.0, 2.0, 3.0], [5.0, 6.0, 7.0], 1.0), [5.0, 6.0, 7.0]);
    }

    #[test]
    fn integers_truncate() {
        assert_eq!(lerp_i32(0, 3, 0.5), 1);
        assert_eq!(lerp_i32(0, -3, 0.5), -1);
        assert_eq!(lerp_u8(0, 1, 0.99), 0);
        assert_eq!(lerp_u8(0, 1, 1.0), 1);
    }
}
