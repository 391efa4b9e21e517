#![warn(clippy::all)]
//! Algorithms that operate on point clouds.
//!
//! The data structures live in `wolke-core`; this crate contains the spatial operations over
//! them, from simple box filtering to voxel-grid downsampling.

// Algorithm to calculate the bounding box of the finite points of a cloud.
pub mod bounds;
// Concatenates an ordered sequence of clouds that share a field set.
pub mod concatenate;
// Filters a cloud down to the points inside an axis-aligned box.
pub mod crop;
// Voxel-grid downsampling with hashed bucketing.
pub mod voxel_grid;
