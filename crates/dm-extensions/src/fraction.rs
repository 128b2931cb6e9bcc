//! Ratio reduction for aspect-ratio CSS.

/// Reduce a fraction to its lowest terms.
///
/// A `0/0` fraction has no greatest common divisor and is returned unchanged.
///
/// # Examples
///
/// ```
/// use dm_extensions::reduce_fraction;
///
/// assert_eq!(reduce_fraction(480, 270), (16, 9));
/// assert_eq!(reduce_fraction(100, 100), (1, 1));
/// ```
#[must_use]
pub fn reduce_fraction(numerator: u32, denominator: u32) -> (u32, u32) {
    let divisor = gcd(numerator, denominator);
    if divisor == 0 {
        return (numerator, denominator);
    }
    (numerator / divisor, denominator / divisor)
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
