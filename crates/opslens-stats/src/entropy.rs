//! Shannon entropy over a probability distribution

/// Shannon entropy in bits, `-sum(p * log2(p))` over positive probabilities
///
/// Empty and single-event distributions carry no information and return 0.0.
pub fn shannon_entropy(probabilities: &[f64]) -> f64 {
    if probabilities.len() <= 1 {
        return 0.0;
    }

    probabilities
        .iter()
        .filter(|p| **p > 0.0)
        .map(|p| -p * p.log2())
        .sum()
}
