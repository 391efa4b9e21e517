use std::collections::HashMap;

use wolke_core::{
    containers::PointCloud,
    error::{Error, Result},
    layout::FieldSet,
    nalgebra::{DVector, Vector3},
};

use crate::bounds::calculate_bounds;

/// Downsamples `cloud` by averaging all points that fall into the same cell of an axis-aligned
/// grid with edge length `voxel_size`.
///
/// Points with a non-finite position are excluded entirely. Every surviving point is assigned to
/// the voxel `floor((position - min) / voxel_size)` per axis, where `min` is the per-axis
/// minimum over the finite positions. The output contains one point per occupied voxel:
///
/// - its position is the mean of the voxel's positions,
/// - its normal (if present) is the mean of the voxel's finite normals only; a point with a
///   non-finite normal still contributes to the position and color means,
/// - its color (if present) is the mean of all the voxel's colors,
/// - each descriptor (if present) is the mean of the voxel's finite descriptor columns only.
///
/// All means use f64 accumulation to limit round-off against the f32 element type. A voxel
/// without any finite normal (or descriptor) yields a non-finite mean for that field, like the
/// mean of an empty set. The order of the output points is unspecified.
///
/// Fails with [MissingFields](Error::MissingFields) if `cloud` does not carry positions, and
/// with [InvalidArgument](Error::InvalidArgument) unless `voxel_size > 0`.
pub fn voxelized_down_sample(cloud: &PointCloud, voxel_size: f64) -> Result<PointCloud> {
    cloud.require_fields(&FieldSet::new().with_positions())?;
    if voxel_size.is_nan() || voxel_size <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "voxel size must be positive, got {}",
            voxel_size
        )));
    }
    let lower = match calculate_bounds(cloud) {
        Some(bounds) => *bounds.min(),
        // No point has a finite position, so every point is excluded
        None => return PointCloud::new(0, cloud.fields().clone()),
    };

    let mut voxel_map: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
    for i in 0..cloud.size() {
        let position = cloud.position(i);
        if !position.iter().all(|c| c.is_finite()) {
            continue;
        }
        let key = (
            (f64::from(position.x - lower.x) / voxel_size).floor() as i64,
            (f64::from(position.y - lower.y) / voxel_size).floor() as i64,
            (f64::from(position.z - lower.z) / voxel_size).floor() as i64,
        );
        voxel_map.entry(key).or_default().push(i);
    }

    let mut down_sampled = PointCloud::new(voxel_map.len(), cloud.fields().clone())?;
    let descriptor_kinds = cloud.fields().descriptors().to_vec();

    let mut out_index = 0;
    for bucket in voxel_map.values() {
        let mut position_sum = Vector3::<f64>::zeros();
        let mut normal_sum = Vector3::<f64>::zeros();
        let mut color_sum = Vector3::<f64>::zeros();
        let mut normal_count = 0usize;
        let mut descriptor_sums: Vec<DVector<f64>> = descriptor_kinds
            .iter()
            .map(|kind| DVector::zeros(kind.dimension()))
            .collect();
        let mut descriptor_counts = vec![0usize; descriptor_kinds.len()];

        for &i in bucket {
            position_sum += cloud.position(i).cast::<f64>();
            if cloud.has_normals() {
                let normal = cloud.normals().column(i);
                if normal.iter().all(|c| c.is_finite()) {
                    normal_sum += normal.map(f64::from);
                    normal_count += 1;
                }
            }
            if cloud.has_colors() {
                color_sum += cloud.colors().column(i).map(f64::from);
            }
            for (k, kind) in descriptor_kinds.iter().enumerate() {
                let column = cloud.descriptors(kind).column(i);
                if column.iter().all(|c| c.is_finite()) {
                    descriptor_sums[k] += column.map(f64::from);
                    descriptor_counts[k] += 1;
                }
            }
        }

        let bucket_size = bucket.len() as f64;
        let mean_position = (position_sum / bucket_size).map(|c| c as f32);
        down_sampled.positions_mut().set_column(out_index, &mean_position);
        if cloud.has_normals() {
            let mean_normal = (normal_sum / normal_count as f64).map(|c| c as f32);
            down_sampled.normals_mut().set_column(out_index, &mean_normal);
        }
        if cloud.has_colors() {
            let mean_color = (color_sum / bucket_size).map(|c| c as u8);
            down_sampled.colors_mut().set_column(out_index, &mean_color);
        }
        for (k, kind) in descriptor_kinds.iter().enumerate() {
            let mean = (&descriptor_sums[k] / descriptor_counts[k] as f64).map(|c| c as f32);
            down_sampled.descriptors_mut(kind).set_column(out_index, &mean);
        }
        out_index += 1;
    }

    Ok(down_sampled)
}
