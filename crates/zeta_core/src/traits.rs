use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types the expression VM can evaluate over.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A real function of one variable that may fail at some points.
///
/// Returning `None` marks the point as unplottable (domain error, division
/// by zero, non-finite result); samplers skip such points.
pub trait UnivariateFunction {
    fn value_at(&self, x: f64) -> Option<f64>;
}

impl<F> UnivariateFunction for F
where
    F: Fn(f64) -> Option<f64>,
{
    fn value_at(&self, x: f64) -> Option<f64> {
        self(x)
    }
}
