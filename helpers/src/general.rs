use std::cmp::Ordering;
use std::error::Error;
use std::fmt;

/// InputValueError is used if some simulation option or parameter does not fulfill the posed
/// requirements, e.g., by selecting more horses per race than the roster contains.
#[derive(Debug, Clone)]
pub struct InputValueError;

impl fmt::Display for InputValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid input value")
    }
}

impl Error for InputValueError {}

/// argsort returns the indices that would sort an array in ascending order. The sort is stable,
/// i.e. equal values keep their original order. Incomparable values (NaN) are treated as equal.
pub fn argsort<T: std::cmp::PartialOrd>(x: &[T]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..x.len()).collect();
    indices.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(Ordering::Equal));
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argsort_ascending_keeps_ties_in_order() {
        let x = [1200.0, 1000.0, 1200.0, 900.0];
        assert_eq!(argsort(&x), vec![3, 1, 0, 2]);
    }

    #[test]
    fn argsort_integers() {
        let x = [3, 7, 5];
        assert_eq!(argsort(&x), vec![0, 2, 1]);
    }

    #[test]
    fn argsort_empty() {
        let x: [f64; 0] = [];
        assert!(argsort(&x).is_empty());
    }
}
