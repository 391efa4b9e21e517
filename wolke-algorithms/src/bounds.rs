use wolke_core::{containers::PointCloud, math::AABB};

/// Calculates the bounding box of the points in the given `cloud`. Only points whose position is
/// entirely finite participate; returns `None` if the cloud does not carry positions or no point
/// has a finite position.
pub fn calculate_bounds(cloud: &PointCloud) -> Option<AABB<f32>> {
    if !cloud.has_positions() {
        return None;
    }
    let mut bounds: Option<AABB<f32>> = None;
    for i in 0..cloud.size() {
        let position = cloud.position(i);
        if !position.iter().all(|c| c.is_finite()) {
            continue;
        }
        bounds = Some(match bounds {
            Some(current) => AABB::extend_with_point(&current, &position),
            None => AABB::from_min_max_unchecked(position, position),
        });
    }
    bounds
}
