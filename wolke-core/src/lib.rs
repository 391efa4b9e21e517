#![warn(clippy::all)]

//! Core data structures for working with variable-schema point cloud data
//!
//! A [PointCloud](crate::containers::PointCloud) holds a variable number of 3D points, each
//! optionally carrying a normal vector, an RGB color and/or one or more fixed-dimension
//! descriptor vectors. Which of these channels a cloud carries is declared up front through a
//! [FieldSet](crate::layout::FieldSet) and stays fixed for the lifetime of the cloud.

pub extern crate nalgebra;

pub mod containers;
/// Error types shared by all point cloud operations
pub mod error;
/// Defines which per-point fields a point cloud carries
pub mod layout;
/// Useful mathematical tools when working with point cloud data
pub mod math;
