pub mod config;
pub mod constants;

/// True for finite values strictly greater than zero.
pub fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
