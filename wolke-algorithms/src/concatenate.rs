use wolke_core::{
    containers::PointCloud,
    error::{Error, Result},
};

/// Concatenates an ordered sequence of clouds into one cloud whose size is the sum of the
/// inputs' sizes and whose data is the inputs' data laid out contiguously in input order.
///
/// Fails with [InvalidArgument](Error::InvalidArgument) on an empty sequence and with
/// [FieldSetMismatch](Error::FieldSetMismatch) unless every cloud has exactly the first cloud's
/// field set.
pub fn concatenate(clouds: &[PointCloud]) -> Result<PointCloud> {
    if clouds.is_empty() {
        return Err(Error::InvalidArgument(
            "concatenate requires at least one input cloud".to_string(),
        ));
    }
    let fields = clouds[0].fields().clone();
    let mut total = clouds[0].size();
    for cloud in &clouds[1..] {
        cloud.require_exact_fields(&fields)?;
        total += cloud.size();
    }

    let mut merged = PointCloud::new_uninitialized(total, fields.clone())?;
    let mut offset = 0;
    for cloud in clouds {
        let count = cloud.size();
        if merged.has_positions() {
            merged
                .positions_mut()
                .columns_mut(offset, count)
                .copy_from(cloud.positions());
        }
        if merged.has_normals() {
            merged
                .normals_mut()
                .columns_mut(offset, count)
                .copy_from(cloud.normals());
        }
        if merged.has_colors() {
            merged
                .colors_mut()
                .columns_mut(offset, count)
                .copy_from(cloud.colors());
        }
        for kind in fields.descriptors() {
            merged
                .descriptors_mut(kind)
                .columns_mut(offset, count)
                .copy_from(cloud.descriptors(kind));
        }
        offset += count;
    }
    Ok(merged)
}
