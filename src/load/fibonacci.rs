use num_bigint::BigUint;

/// Deepest input the recursive implementation accepts.
pub const MAX_RECURSIVE_INPUT: u32 = 1000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FibonacciError {
    #[error("input {0} is too large for recursive fibonacci (limit {limit})", limit = MAX_RECURSIVE_INPUT)]
    InputTooLarge(u32),
}

/// Computes the nth Fibonacci number by naive double recursion.
///
/// The exponential call tree is the point: this burns CPU on purpose and must
/// not be memoized.
pub fn fibonacci(n: u32) -> Result<BigUint, FibonacciError> {
    if n > MAX_RECURSIVE_INPUT {
        return Err(FibonacciError::InputTooLarge(n));
    }
    Ok(naive(n))
}

fn naive(n: u32) -> BigUint {
    if n <= 1 {
        return BigUint::from(n);
    }
    naive(n - 1) + naive(n - 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        let cases = [(0u32, 0u64), (1, 1), (2, 1), (10, 55), (20, 6765)];
        for (n, expected) in cases {
            assert_eq!(fibonacci(n).unwrap(), BigUint::from(expected), "fib({})", n);
        }
    }

    #[test]
    fn repeated_calls_agree() {
        for n in 1..=25 {
            assert_eq!(fibonacci(n), fibonacci(n));
        }
    }

    #[test]
    fn recursion_cap_is_enforced() {
        assert_eq!(
            fibonacci(MAX_RECURSIVE_INPUT + 1),
            Err(FibonacciError::InputTooLarge(MAX_RECURSIVE_INPUT + 1))
        );
    }
}
