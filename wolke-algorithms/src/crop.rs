use wolke_core::{
    containers::PointCloud,
    error::{Error, Result},
    layout::FieldSet,
    math::AABB,
    nalgebra::Vector3,
};

/// Returns a new cloud with the same field set as `cloud`, containing exactly the points whose
/// position lies within the closed box `[lower, upper]`, in their original relative order. All
/// other present fields are carried along per retained point. A point with a non-finite position
/// never lies within the box.
///
/// Fails with [MissingFields](Error::MissingFields) if `cloud` does not carry positions, and
/// with [InvalidArgument](Error::InvalidArgument) unless `lower <= upper` holds component-wise.
pub fn crop(cloud: &PointCloud, lower: &Vector3<f32>, upper: &Vector3<f32>) -> Result<PointCloud> {
    cloud.require_fields(&FieldSet::new().with_positions())?;
    if !(lower.x <= upper.x && lower.y <= upper.y && lower.z <= upper.z) {
        return Err(Error::InvalidArgument(format!(
            "crop: lower corner {:?} must be component-wise <= upper corner {:?}",
            lower, upper
        )));
    }
    let bounds = AABB::from_min_max_unchecked(*lower, *upper);

    let mut cropped = PointCloud::new_uninitialized(cloud.size(), cloud.fields().clone())?;
    let mut index = 0;
    for i in 0..cloud.size() {
        let position = cloud.position(i);
        if !bounds.contains(&position) {
            continue;
        }
        cropped.positions_mut().set_column(index, &position);
        if cloud.has_normals() {
            let normal = cloud.normals().column(i).into_owned();
            cropped.normals_mut().set_column(index, &normal);
        }
        if cloud.has_colors() {
            let color = cloud.colors().column(i).into_owned();
            cropped.colors_mut().set_column(index, &color);
        }
        for kind in cloud.fields().descriptors() {
            let descriptor = cloud.descriptors(kind).column(i).into_owned();
            cropped.descriptors_mut(kind).set_column(index, &descriptor);
        }
        index += 1;
    }
    cropped.resize(index);
    Ok(cropped)
}
