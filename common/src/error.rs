use std::fmt;

/// Fatal error kinds. Absent collaborators and `E_m == 0` are normal
/// control flow, never constructed here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("shape mismatch: {what} expected length {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("allocation failed for {count} elements in {space:?}")]
    Allocation { count: usize, space: AllocSpace },

    #[error("evaluator {evaluator} failed for material {material}: {source}")]
    Evaluator {
        evaluator: &'static str,
        material: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("offline store append failed: {source}")]
    Store {
        #[source]
        source: std::io::Error,
    },
}

/// The memory space an allocation or pointer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocSpace {
    Host,
    Device,
}

impl fmt::Display for AllocSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocSpace::Host => write!(f, "host"),
            AllocSpace::Device => write!(f, "device"),
        }
    }
}
