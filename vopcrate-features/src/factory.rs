//! Construction of feature calculators by execution mode

use serde::{Deserialize, Serialize};
use vopcrate_core::Result;

use crate::backend::CpuSequentialBackend;
use crate::calculator::{FeatureCalculator, VopFeatureCalculator};
use crate::config::VopConfig;
use crate::parallel::{CpuParallelBackend, ThreadPoolConfig};

/// How the pipeline stages are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// One voxel after another on the calling thread
    Sequential,
    /// Across rayon's global thread pool
    #[default]
    Parallel,
}

/// Make a VOP feature calculator for the given execution mode
pub fn make_vop_feature_calculator(config: VopConfig, mode: ExecutionMode) -> Result<Box<dyn FeatureCalculator>> {
    let calculator: Box<dyn FeatureCalculator> = match mode {
        ExecutionMode::Sequential => Box::new(VopFeatureCalculator::new(CpuSequentialBackend, config)?),
        ExecutionMode::Parallel => Box::new(VopFeatureCalculator::new(CpuParallelBackend::new(), config)?),
    };
    Ok(calculator)
}

/// Make a parallel VOP feature calculator with its own thread pool
pub fn make_parallel_vop_feature_calculator(
    config: VopConfig,
    pool: &ThreadPoolConfig,
) -> Result<VopFeatureCalculator<CpuParallelBackend>> {
    VopFeatureCalculator::new(CpuParallelBackend::with_config(pool)?, config)
}
