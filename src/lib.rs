//! # VopCrate
//!
//! Rotation-invariant VOP appearance descriptors for voxels in reconstructed 3D scenes.
//!
//! This is the umbrella crate that provides convenient access to all VopCrate functionality.
//! You can use this crate to get everything in one place, or use individual crates for
//! more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Voxel locations, voxels, the read-only scene contract and a sparse hashed scene
//! - **Features**: The VOP descriptor pipeline with sequential and data-parallel backends
//!
//! ## Quick Start
//!
//! ```rust
//! use vopcrate::prelude::*;
//!
//! fn main() -> vopcrate::Result<()> {
//!     // A flat grey floor at z = 0
//!     let scene = SparseVoxelScene::from_fn(
//!         0.01,
//!         VoxelLocation::new(-8, -8, -3),
//!         VoxelLocation::new(8, 8, 3),
//!         |loc| Some(Voxel::observed(loc.z as f32 * 0.01, [128, 128, 128])),
//!     )?;
//!
//!     let config = VopConfig::default().with_patch_size(5).with_bin_count(8);
//!     let mut calculator = make_vop_feature_calculator(config, ExecutionMode::Parallel)?;
//!
//!     let locations = vec![VoxelLocation::new(0, 0, 0), VoxelLocation::new(1, 2, 0)];
//!     let features = calculator.calculate_features_to_vec(&locations, &scene)?;
//!     assert_eq!(features.len(), locations.len() * calculator.feature_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables core and features
//! - `features`: The VOP descriptor pipeline

// Re-export core functionality
pub use vopcrate_core::*;

// Re-export sub-crates
#[cfg(feature = "features")]
pub use vopcrate_features as features;

/// Convenient imports for common use cases
pub mod prelude {
    pub use vopcrate_core::*;

    #[cfg(feature = "features")]
    pub use vopcrate_features::*;
}
