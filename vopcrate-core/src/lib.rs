//! Core data structures and traits for vopcrate
//!
//! This crate provides the fundamental types shared by the VOP descriptor pipeline:
//! integer voxel locations, TSDF voxels, the read-only scene contract and a sparse
//! hashed scene implementation.

pub mod point;
pub mod voxel;
pub mod traits;
pub mod scene;
pub mod error;

pub use point::*;
pub use voxel::*;
pub use traits::*;
pub use scene::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
