//! Boundary: partition size forced to a tiny value. Stresses the
//! allocate/release discipline across many partitions and a short tail.
//! A separate integration test binary so the process-wide
//! partition-budget cache starts fresh.

use eos_core::{MaterialEvaluator, MaterialEvaluatorConfig};
use eos_eval::{EosEvaluator, EvalError, Slot};
use eos_tensor::{BlockTensor, Shape, SparseIndex};

struct IdentityEos;
impl EosEvaluator<f64> for IdentityEos {
    fn eval(
        &self,
        energy: &[f64],
        density: &[f64],
        pressure: &mut [f64],
        sound_speed_sq: &mut [f64],
        bulk_modulus: &mut [f64],
        temperature: &mut [f64],
    ) -> Result<(), EvalError> {
        pressure.copy_from_slice(density);
        sound_speed_sq.copy_from_slice(density);
        bulk_modulus.copy_from_slice(density);
        temperature.copy_from_slice(energy);
        Ok(())
    }
}

#[test]
fn tiny_partition_budget_still_covers_every_sample() {
    // bytes_per_sample for f64 with 2 inputs + 4 outputs, no reindex = 48;
    // a 64-byte budget forces `part == 1`, so N=6 spans six partitions.
    std::env::set_var("EOS_PARTITION_BUDGET_BYTES", "64");

    let shape = Shape::new(3, 2, 1);
    let density = BlockTensor::from_vec(shape, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let energy = BlockTensor::from_vec(shape, vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
    let mut pressure = BlockTensor::<f64>::zeroed(shape);
    let mut sound_speed_sq = BlockTensor::<f64>::zeroed(shape);
    let mut bulk_modulus = BlockTensor::<f64>::zeroed(shape);
    let mut temperature = BlockTensor::<f64>::zeroed(shape);

    let sparse = SparseIndex::new(&[2, 0, 1], 1);
    let config = MaterialEvaluatorConfig {
        materials: 1,
        elements: 2,
        qpts: 3,
        is_cpu: false,
        pack_sparse_mats: false,
    };

    let mut evaluator = MaterialEvaluator::new(
        config,
        vec![Slot::Present(Box::new(IdentityEos) as Box<dyn EosEvaluator<f64>>)],
        vec![Slot::Absent],
        vec![Slot::Absent],
        None,
    );

    evaluator
        .evaluate(
            &density,
            &energy,
            &sparse,
            &mut pressure,
            &mut sound_speed_sq,
            &mut bulk_modulus,
            &mut temperature,
        )
        .unwrap();

    assert_eq!(pressure.as_slice(), density.as_slice());
    assert_eq!(temperature.as_slice(), energy.as_slice());
}
