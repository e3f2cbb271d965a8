use serde::{Deserialize, Serialize};

/// Construction parameters, immutable for the lifetime of a
/// `MaterialEvaluator`. `serde`-derived so a caller that wants to load
/// these from TOML/JSON can, without this crate prescribing a config-file
/// format of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialEvaluatorConfig {
    /// `M`: number of materials.
    pub materials: u32,
    /// `E`: the mesh's maximum elements per material.
    pub elements: u32,
    /// `Q`: quadrature points per element, fixed per invocation.
    pub qpts: u32,
    /// Whether this invocation runs on CPU; sparse packing is only
    /// attempted when this is true.
    pub is_cpu: bool,
    /// Whether sparse packing is enabled at all.
    pub pack_sparse_mats: bool,
}

impl MaterialEvaluatorConfig {
    #[inline]
    pub fn per_material_len(&self) -> usize {
        self.elements as usize * self.qpts as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_material_len_is_e_times_q() {
        let cfg = MaterialEvaluatorConfig {
            materials: 3,
            elements: 4,
            qpts: 2,
            is_cpu: true,
            pack_sparse_mats: true,
        };
        assert_eq!(cfg.per_material_len(), 8);
    }

    /// Callers may load construction parameters from a JSON deployment
    /// manifest rather than hand-writing the struct.
    #[test]
    fn round_trips_through_json() {
        let cfg = MaterialEvaluatorConfig {
            materials: 2,
            elements: 8,
            qpts: 4,
            is_cpu: true,
            pack_sparse_mats: false,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: MaterialEvaluatorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
