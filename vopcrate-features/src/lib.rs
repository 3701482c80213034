//! # VopCrate Features
//!
//! Rotation-invariant VOP appearance descriptors for voxels.
//!
//! For each voxel in a batch this crate estimates a surface normal, samples a square
//! color patch in the voxel's tangent plane, aligns the patch to its dominant gradient
//! orientation, converts it to CIELab and appends the voxel's height. The stages run
//! through a [`VopBackend`], either sequentially or data-parallel with rayon.

pub mod config;
pub mod normals;
pub mod frames;
pub mod patches;
pub mod orientation;
pub mod color;
pub mod heights;
pub mod backend;
pub mod parallel;
pub mod calculator;
pub mod diagnostics;
pub mod factory;

// Re-export commonly used items
pub use config::*;
pub use normals::*;
pub use frames::*;
pub use patches::*;
pub use orientation::*;
pub use color::*;
pub use heights::*;
pub use backend::*;
pub use parallel::*;
pub use calculator::*;
pub use diagnostics::*;
pub use factory::*;
