//! Sparse hashed voxel scene

use std::collections::HashMap;

use crate::{point::VoxelLocation, traits::VoxelScene, voxel::Voxel, Error, Result};

/// A voxel scene backed by a hash map from voxel location to voxel
///
/// Only allocated voxels are stored; every other location reads as missing.
#[derive(Debug, Clone)]
pub struct SparseVoxelScene {
    voxel_size: f32,
    voxels: HashMap<VoxelLocation, Voxel>,
}

impl SparseVoxelScene {
    /// Create an empty scene with the given voxel size (world units)
    pub fn new(voxel_size: f32) -> Result<Self> {
        if !voxel_size.is_finite() || voxel_size <= 0.0 {
            return Err(Error::InvalidData(
                "voxel_size must be positive and finite".to_string()
            ));
        }

        Ok(Self {
            voxel_size,
            voxels: HashMap::new(),
        })
    }

    /// Fill every location in the inclusive box `[min, max]` for which `f` yields a voxel
    ///
    /// # Example
    /// ```rust
    /// use vopcrate_core::{SparseVoxelScene, Voxel, VoxelLocation, VoxelScene};
    ///
    /// fn main() -> vopcrate_core::Result<()> {
    ///     let scene = SparseVoxelScene::from_fn(
    ///         0.05,
    ///         VoxelLocation::new(0, 0, 0),
    ///         VoxelLocation::new(3, 3, 3),
    ///         |loc| Some(Voxel::observed(loc.z as f32 * 0.05, [200, 10, 10])),
    ///     )?;
    ///     assert_eq!(scene.len(), 64);
    ///     assert!(scene.lookup(&VoxelLocation::new(1, 2, 3)).is_some());
    ///     Ok(())
    /// }
    /// ```
    pub fn from_fn<F>(voxel_size: f32, min: VoxelLocation, max: VoxelLocation, mut f: F) -> Result<Self>
    where
        F: FnMut(VoxelLocation) -> Option<Voxel>,
    {
        if min.x > max.x || min.y > max.y || min.z > max.z {
            return Err(Error::InvalidData(format!(
                "empty scene bounds: min {:?} exceeds max {:?}",
                min, max
            )));
        }

        let mut scene = Self::new(voxel_size)?;
        for z in min.z..=max.z {
            for y in min.y..=max.y {
                for x in min.x..=max.x {
                    let location = VoxelLocation::new(x, y, z);
                    if let Some(voxel) = f(location) {
                        scene.insert(location, voxel);
                    }
                }
            }
        }

        Ok(scene)
    }

    /// Insert or replace the voxel at a location
    pub fn insert(&mut self, location: VoxelLocation, voxel: Voxel) -> Option<Voxel> {
        self.voxels.insert(location, voxel)
    }

    /// Number of allocated voxels
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }
}

impl VoxelScene for SparseVoxelScene {
    fn voxel_size(&self) -> f32 {
        self.voxel_size
    }

    fn lookup(&self, location: &VoxelLocation) -> Option<Voxel> {
        self.voxels.get(location).copied()
    }
}
