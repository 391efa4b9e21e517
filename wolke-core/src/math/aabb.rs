use nalgebra::{Scalar, Vector3};

/// 3D axis-aligned bounding box
#[derive(Debug, Clone, Copy)]
pub struct AABB<T: Scalar + PartialOrd> {
    min: Vector3<T>,
    max: Vector3<T>,
}

impl<T: Scalar + PartialOrd + Copy> AABB<T> {
    /// Creates a new AABB from the given minimum and maximum coordinates. Panics if the minimum
    /// position is not less than or equal to the maximum position
    /// ```
    /// # use wolke_core::math::AABB;
    /// let bounds = AABB::from_min_max(nalgebra::Vector3::new(0.0, 0.0, 0.0), nalgebra::Vector3::new(1.0, 1.0, 1.0));
    /// ```
    pub fn from_min_max(min: Vector3<T>, max: Vector3<T>) -> Self {
        if min.x > max.x || min.y > max.y || min.z > max.z {
            panic!("AABB::from_min_max: Minimum position must be <= maximum position!");
        }
        Self { min, max }
    }

    /// Creates a new AABB from the given minimum and maximum coordinates. Similar to
    /// [from_min_max](AABB::from_min_max) but performs no checks that min <= max. If you know
    /// that min <= max, prefer this function over [from_min_max](AABB::from_min_max)
    pub fn from_min_max_unchecked(min: Vector3<T>, max: Vector3<T>) -> Self {
        Self { min, max }
    }

    /// Returns the minimum point of this AABB
    pub fn min(&self) -> &Vector3<T> {
        &self.min
    }

    /// Returns the maximum point of this AABB
    pub fn max(&self) -> &Vector3<T> {
        &self.max
    }

    /// Returns true if the given point is contained within this AABB. Points right on the
    /// boundary of this AABB (e.g. point.x == self.max.x or self.min.x) will return true as
    /// well. A point with a NaN coordinate is never contained.
    /// ```
    /// # use wolke_core::math::AABB;
    /// let bounds = AABB::from_min_max(nalgebra::Vector3::new(0.0, 0.0, 0.0), nalgebra::Vector3::new(1.0, 1.0, 1.0));
    /// assert!(bounds.contains(&nalgebra::Vector3::new(0.5, 0.5, 0.5)));
    /// assert!(!bounds.contains(&nalgebra::Vector3::new(0.5, 0.5, 1.5)));
    /// ```
    pub fn contains(&self, point: &Vector3<T>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Extends the given AABB so that it contains the given point.
    /// ```
    /// # use wolke_core::math::AABB;
    /// let bounds = AABB::from_min_max(nalgebra::Vector3::new(0.0, 0.0, 0.0), nalgebra::Vector3::new(1.0, 1.0, 1.0));
    /// let extended_bounds = AABB::extend_with_point(&bounds, &nalgebra::Vector3::new(2.0, 2.0, 2.0));
    /// assert_eq!(*extended_bounds.min(), nalgebra::Vector3::new(0.0, 0.0, 0.0));
    /// assert_eq!(*extended_bounds.max(), nalgebra::Vector3::new(2.0, 2.0, 2.0));
    /// ```
    pub fn extend_with_point(bounds: &AABB<T>, point: &Vector3<T>) -> AABB<T> {
        let min_x = if bounds.min.x < point.x {
            bounds.min.x
        } else {
            point.x
        };
        let min_y = if bounds.min.y < point.y {
            bounds.min.y
        } else {
            point.y
        };
        let min_z = if bounds.min.z < point.z {
            bounds.min.z
        } else {
            point.z
        };

        let max_x = if bounds.max.x > point.x {
            bounds.max.x
        } else {
            point.x
        };
        let max_y = if bounds.max.y > point.y {
            bounds.max.y
        } else {
            point.y
        };
        let max_z = if bounds.max.z > point.z {
            bounds.max.z
        } else {
            point.z
        };

        Self {
            min: Vector3::new(min_x, min_y, min_z),
            max: Vector3::new(max_x, max_y, max_z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_a_closed_box() {
        let bounds = AABB::from_min_max(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 2.0, 3.0));
        assert!(bounds.contains(&Vector3::new(0.0, 0.0, 0.0)));
        assert!(bounds.contains(&Vector3::new(1.0, 2.0, 3.0)));
        assert!(!bounds.contains(&Vector3::new(1.0, 2.0, 3.1)));
        assert!(!bounds.contains(&Vector3::new(-0.1, 0.0, 0.0)));
    }

    #[test]
    fn test_nan_is_never_contained() {
        let bounds = AABB::from_min_max(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        assert!(!bounds.contains(&Vector3::new(f32::NAN, 0.5, 0.5)));
    }

    #[test]
    #[should_panic]
    fn test_from_min_max_panics_on_inverted_corners() {
        let _ = AABB::from_min_max(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn test_extend_with_point() {
        let bounds = AABB::from_min_max(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let extended = AABB::extend_with_point(&bounds, &Vector3::new(-1.0, 0.5, 2.0));
        assert_eq!(*extended.min(), Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(*extended.max(), Vector3::new(1.0, 1.0, 2.0));
    }
}
