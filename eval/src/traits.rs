use eos_common::Scalar;

/// The boxed error type every collaborator reports through. Object-safe
/// and uniform across heterogeneous evaluator implementations, so a
/// `Roster<Box<dyn EosEvaluator<V>>>` can hold different concrete
/// evaluators per material.
pub type EvalError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The expensive physics equation-of-state evaluator.
pub trait EosEvaluator<V: Scalar> {
    /// Computes physics outputs for `density.len()` samples.
    fn eval(
        &self,
        energy: &[V],
        density: &[V],
        pressure: &mut [V],
        sound_speed_sq: &mut [V],
        bulk_modulus: &mut [V],
        temperature: &mut [V],
    ) -> Result<(), EvalError>;

    /// Debug-only RMSE comparison against a prior surrogate result. Not
    /// called by the dispatch pipeline itself, a diagnostic hook an
    /// evaluator may choose to implement.
    #[cfg(feature = "surrogate-debug")]
    fn compute_rmse(&self, _surrogate: &[V], _physics: &[V]) -> Option<V> {
        None
    }
}

/// The cheap machine-learned approximation of the EOS. `inputs`/`outputs`
/// carry `I=2`/`O=4` feature slices in this system.
pub trait SurrogateEvaluator<V: Scalar> {
    fn eval(&self, inputs: &[&[V]], outputs: &mut [&mut [V]]) -> Result<(), EvalError>;
}

/// The uncertainty-quantification oracle producing an acceptance predicate
/// per sample. `acceptable[i] = true` means the surrogate answer is
/// acceptable here, skip physics.
pub trait UqCache<V: Scalar> {
    fn evaluate(&self, inputs: &[&[V]], acceptable: &mut [bool]) -> Result<(), EvalError>;
}
