//! Similarity measures over raw embedding slices.

/// Cosine similarity of two vectors.
///
/// Accumulates in `f64` so very small or very large components neither
/// underflow nor overflow. Returns `0.0` when the lengths differ, either
/// vector has zero norm, or the result is not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !score.is_finite() {
        return 0.0;
    }
    score as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_identical_vectors() {
        let v = [0.3, -1.2, 4.5, 0.01];
        assert!(approx(cosine_similarity(&v, &v), 1.0));
    }

    #[test]
    fn test_scaled_vector_is_identical_direction() {
        assert!(approx(cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]), 1.0));
    }

    #[test]
    fn test_orthogonal_vectors() {
        assert!(approx(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0));
    }

    #[test]
    fn test_opposite_vectors() {
        assert!(approx(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), -1.0));
    }

    #[test]
    fn test_symmetry() {
        let a = [0.2, 0.7, -0.1];
        let b = [0.9, -0.3, 0.4];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_length_mismatch_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_zero_norm_is_zero() {
        let zero = [0.0, 0.0, 0.0];
        let score = cosine_similarity(&zero, &[1.0, 2.0, 3.0]);
        assert_eq!(score, 0.0);
        assert!(!score.is_nan());
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_tiny_magnitude_identity() {
        let v = [1e-25, 1e-25];
        assert!(approx(cosine_similarity(&v, &v), 1.0));
        assert!(approx(cosine_similarity(&v, &[1e-25, -1e-25]), 0.0));
    }

    #[test]
    fn test_huge_magnitude_identity() {
        let v = [3e19, 3e19];
        let score = cosine_similarity(&v, &v);
        assert!(score.is_finite());
        assert!(approx(score, 1.0));
        assert!(approx(cosine_similarity(&v, &[-3e19, -3e19]), -1.0));
    }

    #[test]
    fn test_non_finite_input_is_zero() {
        assert_eq!(cosine_similarity(&[f32::INFINITY, 1.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[f32::NAN, 1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_empty_vectors_are_zero() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
