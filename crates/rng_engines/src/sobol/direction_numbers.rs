//! Joe–Kuo direction numbers (new-joe-kuo-6), dimensions 2 through 21.
//!
//! Each entry is `(s, a, m)`: the degree of the primitive polynomial, its
//! interior coefficients packed as bits, and the initial direction integers.
//! Dimension 1 is the van der Corput sequence and has no entry.

/// One row of the direction number table.
pub(crate) struct PrimitivePolynomial {
    pub(crate) degree: u32,
    pub(crate) coefficients: u32,
    pub(crate) initial: &'static [u64],
}

const fn row(
    degree: u32,
    coefficients: u32,
    initial: &'static [u64],
) -> PrimitivePolynomial {
    PrimitivePolynomial {
        degree,
        coefficients,
        initial,
    }
}

pub(crate) const JOE_KUO: [PrimitivePolynomial; 20] = [
    row(1, 0, &[1]),
    row(2, 1, &[1, 3]),
    row(3, 1, &[1, 3, 1]),
    row(3, 2, &[1, 1, 1]),
    row(4, 1, &[1, 1, 3, 3]),
    row(4, 4, &[1, 3, 5, 13]),
    row(5, 2, &[1, 1, 5, 5, 17]),
    row(5, 4, &[1, 1, 5, 5, 5]),
    row(5, 7, &[1, 1, 7, 11, 19]),
    row(5, 11, &[1, 1, 5, 1, 1]),
    row(5, 13, &[1, 1, 1, 3, 11]),
    row(5, 14, &[1, 3, 5, 5, 31]),
    row(6, 1, &[1, 3, 3, 9, 7, 49]),
    row(6, 13, &[1, 1, 1, 15, 21, 21]),
    row(6, 16, &[1, 3, 1, 13, 27, 49]),
    row(6, 19, &[1, 1, 1, 15, 7, 5]),
    row(6, 22, &[1, 3, 1, 15, 13, 25]),
    row(6, 25, &[1, 1, 5, 5, 19, 61]),
    row(7, 1, &[1, 3, 7, 11, 23, 15, 103]),
    row(7, 4, &[1, 3, 7, 13, 13, 15, 69]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_well_formed() {
        for (i, poly) in JOE_KUO.iter().enumerate() {
            assert_eq!(poly.initial.len(), poly.degree as usize, "row {}", i);
            assert!(poly.coefficients < (1 << poly.degree.saturating_sub(1)).max(1));
            for (k, &m) in poly.initial.iter().enumerate() {
                assert_eq!(m % 2, 1, "row {} m{} must be odd", i, k + 1);
                assert!(m < (1 << (k + 1)), "row {} m{} too large", i, k + 1);
            }
        }
    }
}
