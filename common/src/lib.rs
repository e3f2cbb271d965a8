//! Shared scalar type, index newtypes and the crate-wide error type.

mod error;
mod index;

pub use error::{AllocSpace, Error};
pub use index::{ElementId, MaterialId, QPoint};

/// The single real type shared by every buffer within one invocation.
pub trait Scalar: num_traits::Float + Send + Sync + Copy + std::fmt::Debug + Default + 'static {}

impl Scalar for f32 {}
impl Scalar for f64 {}
