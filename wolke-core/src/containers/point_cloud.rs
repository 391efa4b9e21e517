use nalgebra::{DMatrix, DMatrixViewMut, Matrix3xX, MatrixViewMut3xX, Vector3};

use crate::error::{Error, Result};
use crate::layout::{DescriptorKind, FieldSet};

use super::Storage;

/// A point cloud with a declared, immutable set of per-point fields.
///
/// Every cloud carries 3D positions, normals, RGB colors and/or named descriptor vectors,
/// depending on the [FieldSet] it was constructed with. All present buffers share the same
/// column count, which is the cloud's size. The field set can only change through whole-cloud
/// replacement ([set_from](PointCloud::set_from) or [move_from](PointCloud::move_from)).
///
/// Field data is accessed through the typed accessors ([positions](PointCloud::positions),
/// [normals](PointCloud::normals), ...); requesting a field the cloud does not carry is a
/// programming error and panics.
#[derive(Debug)]
pub struct PointCloud {
    size: usize,
    fields: FieldSet,
    storage: Storage,
}

// Resolves the fields of a pair of point clouds against the requested fields. With the inherit
// sentinel, both clouds must have the exact same field set; otherwise both clouds must contain
// the requested fields.
fn resolve_pair_fields(a: &PointCloud, b: &PointCloud, fields: &FieldSet) -> Result<FieldSet> {
    if fields.is_inherit() {
        a.require_exact_fields(b.fields())?;
        Ok(a.fields().clone())
    } else {
        a.require_fields(fields)?;
        b.require_fields(fields)?;
        Ok(fields.clone())
    }
}

impl PointCloud {
    /// Default value for position, normal and descriptor entries
    pub const DEFAULT_VALUE: f32 = 0.0;
    /// Default RGB color (black)
    pub const DEFAULT_COLOR: [u8; 3] = [0, 0, 0];

    /// Creates a new PointCloud with `size` points carrying the given fields. All buffers are
    /// filled with the documented defaults ([DEFAULT_VALUE](PointCloud::DEFAULT_VALUE) and
    /// [DEFAULT_COLOR](PointCloud::DEFAULT_COLOR)). Fails if `fields` is empty or the inherit
    /// sentinel.
    pub fn new(size: usize, fields: FieldSet) -> Result<Self> {
        let mut cloud = Self::new_uninitialized(size, fields)?;
        cloud.set_default(0, size);
        Ok(cloud)
    }

    /// Like [new](PointCloud::new), but skips the default fill. The contents of all buffers are
    /// unspecified until the caller writes them.
    pub fn new_uninitialized(size: usize, fields: FieldSet) -> Result<Self> {
        if fields.is_empty() || fields.is_inherit() {
            return Err(Error::EmptyOrReservedFieldSet);
        }
        let storage = Storage::new(size, &fields);
        Ok(Self {
            size,
            fields,
            storage,
        })
    }

    /// Creates a new PointCloud of `other`'s size populated from `other`. With the inherit
    /// sentinel the new cloud copies `other`'s exact field set; otherwise it carries the
    /// requested fields, which `other` must contain.
    pub fn from_cloud(other: &PointCloud, fields: FieldSet) -> Result<Self> {
        let resolved = if fields.is_inherit() {
            other.fields().clone()
        } else {
            fields
        };
        let mut cloud = Self::new(other.size(), resolved.clone())?;
        cloud.set_from(other, &resolved, true)?;
        Ok(cloud)
    }

    /// Takes the contents out of this cloud without copying, leaving it as a valid cloud of
    /// size 0 with its original field set.
    pub fn take(&mut self) -> PointCloud {
        let mut taken = PointCloud::new_uninitialized(0, self.fields.clone())
            .expect("a constructed cloud always has a valid field set");
        std::mem::swap(self, &mut taken);
        taken
    }

    /// Transfers `other`'s storage into this cloud without copying. Fails with
    /// [FieldSetMismatch](Error::FieldSetMismatch) unless both clouds have the exact same field
    /// set, so a move can never silently change the receiver's fields. Afterwards `other` is a
    /// valid cloud of size 0 with its original field set.
    pub fn move_from(&mut self, other: &mut PointCloud) -> Result<()> {
        self.require_exact_fields(other.fields())?;
        self.size = other.size;
        std::mem::swap(&mut self.storage, &mut other.storage);
        debug_assert_eq!(self.storage.size(), self.size);
        other.resize_uninitialized(0);
        Ok(())
    }

    /// Returns the number of points in this cloud
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true if this cloud has no points
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the fields this cloud carries
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// Resizes this cloud to `new_size` points. Existing points in the overlapping prefix are
    /// preserved; when growing, the new columns are filled with the documented defaults.
    pub fn resize(&mut self, new_size: usize) {
        self.resize_impl(new_size, false);
    }

    /// Like [resize](PointCloud::resize), but leaves the contents of newly added columns
    /// unspecified.
    pub fn resize_uninitialized(&mut self, new_size: usize) {
        self.resize_impl(new_size, true);
    }

    /// Grows this cloud by `add_size` points, default-filling the new columns
    pub fn expand(&mut self, add_size: usize) {
        self.resize(self.size + add_size);
    }

    /// Like [expand](PointCloud::expand), but leaves the contents of the new columns unspecified
    pub fn expand_uninitialized(&mut self, add_size: usize) {
        self.resize_uninitialized(self.size + add_size);
    }

    fn resize_impl(&mut self, new_size: usize, skip_initialize: bool) {
        let old_size = self.size;
        self.size = new_size;
        self.storage.resize(new_size);
        debug_assert_eq!(self.storage.size(), new_size);
        if new_size > old_size && !skip_initialize {
            self.set_default(old_size, new_size - old_size);
        }
    }

    // Fills columns [start, start + num) of every present buffer with the defaults
    fn set_default(&mut self, start: usize, num: usize) {
        if self.fields.has_positions() {
            self.storage
                .positions_mut()
                .columns_mut(start, num)
                .fill(Self::DEFAULT_VALUE);
        }
        if self.fields.has_normals() {
            self.storage
                .normals_mut()
                .columns_mut(start, num)
                .fill(Self::DEFAULT_VALUE);
        }
        if self.fields.has_colors() {
            let default_color = Vector3::from(Self::DEFAULT_COLOR);
            for mut column in self
                .storage
                .colors_mut()
                .columns_mut(start, num)
                .column_iter_mut()
            {
                column.copy_from(&default_color);
            }
        }
        for buffer in self.storage.descriptors_mut() {
            buffer.columns_mut(start, num).fill(Self::DEFAULT_VALUE);
        }
    }

    /// Returns true if this cloud contains every field in `fields`. Passing the inherit
    /// sentinel is a programming error.
    pub fn has_fields(&self, fields: &FieldSet) -> bool {
        assert!(
            !fields.is_inherit(),
            "the inherit sentinel is not a queryable field set"
        );
        self.fields.contains(fields)
    }

    /// Fails with [MissingFields](Error::MissingFields) unless this cloud contains every field
    /// in `fields`
    pub fn require_fields(&self, fields: &FieldSet) -> Result<()> {
        if !self.has_fields(fields) {
            return Err(Error::MissingFields {
                expected: fields.clone(),
                actual: self.fields.clone(),
            });
        }
        Ok(())
    }

    /// Returns true if this cloud's field set is exactly equal to `fields`
    pub fn has_exact_fields(&self, fields: &FieldSet) -> bool {
        self.fields == *fields
    }

    /// Fails with [FieldSetMismatch](Error::FieldSetMismatch) unless this cloud's field set is
    /// exactly equal to `fields`
    pub fn require_exact_fields(&self, fields: &FieldSet) -> Result<()> {
        if !self.has_exact_fields(fields) {
            return Err(Error::FieldSetMismatch {
                expected: fields.clone(),
                actual: self.fields.clone(),
            });
        }
        Ok(())
    }

    /// Copies field data from `other` into this cloud.
    ///
    /// With the inherit sentinel, both clouds must have the exact same field set and every field
    /// is copied. With an explicit field set, both clouds must contain the requested fields and
    /// only those are copied; fields of this cloud outside the requested set are left untouched.
    ///
    /// If `allow_resize` is true this cloud is resized to `other`'s size first, otherwise the
    /// sizes must already match exactly. All validation happens before any mutation.
    pub fn set_from(&mut self, other: &PointCloud, fields: &FieldSet, allow_resize: bool) -> Result<()> {
        let resolved = resolve_pair_fields(self, other, fields)?;
        if allow_resize {
            self.resize(other.size());
        } else if self.size != other.size {
            return Err(Error::SizeMismatch {
                expected: other.size,
                actual: self.size,
            });
        }
        if resolved.has_positions() {
            self.storage.positions_mut().copy_from(other.positions());
        }
        if resolved.has_normals() {
            self.storage.normals_mut().copy_from(other.normals());
        }
        if resolved.has_colors() {
            self.storage.colors_mut().copy_from(other.colors());
        }
        for kind in resolved.descriptors() {
            let index = self.descriptor_index(kind);
            self.storage
                .descriptor_mut(index)
                .copy_from(other.descriptors(kind));
        }
        Ok(())
    }

    /// Returns true if this cloud carries positions
    pub fn has_positions(&self) -> bool {
        self.fields.has_positions()
    }

    /// Returns true if this cloud carries normals
    pub fn has_normals(&self) -> bool {
        self.fields.has_normals()
    }

    /// Returns true if this cloud carries colors
    pub fn has_colors(&self) -> bool {
        self.fields.has_colors()
    }

    /// Returns true if this cloud carries at least one descriptor kind
    pub fn has_descriptors(&self) -> bool {
        self.fields.has_descriptors()
    }

    /// Returns true if this cloud carries the given descriptor kind
    pub fn has_descriptor(&self, kind: &DescriptorKind) -> bool {
        self.fields.has_descriptor(kind)
    }

    /// Returns the position buffer, 3 rows and one column per point. Panics if this cloud does
    /// not carry positions.
    pub fn positions(&self) -> &Matrix3xX<f32> {
        assert!(self.has_positions(), "point cloud does not contain positions");
        self.storage.positions()
    }

    /// Returns a mutable view over the position buffer. Panics if this cloud does not carry
    /// positions.
    pub fn positions_mut(&mut self) -> MatrixViewMut3xX<'_, f32> {
        assert!(self.has_positions(), "point cloud does not contain positions");
        let buffer = self.storage.positions_mut();
        let ncols = buffer.ncols();
        buffer.columns_mut(0, ncols)
    }

    /// Returns the position of the point at `index`
    pub fn position(&self, index: usize) -> Vector3<f32> {
        self.positions().column(index).into_owned()
    }

    /// Returns the normal buffer, 3 rows and one column per point. Panics if this cloud does
    /// not carry normals.
    pub fn normals(&self) -> &Matrix3xX<f32> {
        assert!(self.has_normals(), "point cloud does not contain normals");
        self.storage.normals()
    }

    /// Returns a mutable view over the normal buffer. Panics if this cloud does not carry
    /// normals.
    pub fn normals_mut(&mut self) -> MatrixViewMut3xX<'_, f32> {
        assert!(self.has_normals(), "point cloud does not contain normals");
        let buffer = self.storage.normals_mut();
        let ncols = buffer.ncols();
        buffer.columns_mut(0, ncols)
    }

    /// Returns the RGB color buffer, 3 rows and one column per point. Panics if this cloud does
    /// not carry colors.
    pub fn colors(&self) -> &Matrix3xX<u8> {
        assert!(self.has_colors(), "point cloud does not contain colors");
        self.storage.colors()
    }

    /// Returns a mutable view over the RGB color buffer. Panics if this cloud does not carry
    /// colors.
    pub fn colors_mut(&mut self) -> MatrixViewMut3xX<'_, u8> {
        assert!(self.has_colors(), "point cloud does not contain colors");
        let buffer = self.storage.colors_mut();
        let ncols = buffer.ncols();
        buffer.columns_mut(0, ncols)
    }

    /// Returns the buffer of the given descriptor kind, `kind.dimension()` rows and one column
    /// per point. Panics if this cloud does not carry the kind.
    pub fn descriptors(&self, kind: &DescriptorKind) -> &DMatrix<f32> {
        self.storage.descriptor(self.descriptor_index(kind))
    }

    /// Returns a mutable view over the buffer of the given descriptor kind. Panics if this
    /// cloud does not carry the kind.
    pub fn descriptors_mut(&mut self, kind: &DescriptorKind) -> DMatrixViewMut<'_, f32> {
        let index = self.descriptor_index(kind);
        let buffer = self.storage.descriptor_mut(index);
        let ncols = buffer.ncols();
        buffer.columns_mut(0, ncols)
    }

    fn descriptor_index(&self, kind: &DescriptorKind) -> usize {
        self.fields
            .descriptors()
            .iter()
            .position(|k| k == kind)
            .unwrap_or_else(|| {
                panic!(
                    "point cloud does not contain descriptor kind {}",
                    kind.name()
                )
            })
    }
}

impl Clone for PointCloud {
    fn clone(&self) -> Self {
        Self::from_cloud(self, FieldSet::inherit())
            .expect("copying a constructed cloud cannot fail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::descriptors;
    use rand::{thread_rng, Rng};

    fn xyz_fields() -> FieldSet {
        FieldSet::new().with_positions()
    }

    fn full_fields() -> FieldSet {
        FieldSet::new()
            .with_positions()
            .with_normals()
            .with_colors()
            .with_descriptor(descriptors::CURVATURE)
    }

    fn random_cloud(size: usize, fields: FieldSet) -> PointCloud {
        let mut rng = thread_rng();
        let mut cloud = PointCloud::new(size, fields).unwrap();
        for i in 0..size {
            let position = Vector3::new(rng.gen_range(-10.0f32..10.0), rng.gen(), rng.gen());
            cloud.positions_mut().set_column(i, &position);
            if cloud.has_normals() {
                let normal = Vector3::new(rng.gen(), rng.gen(), rng.gen::<f32>());
                cloud.normals_mut().set_column(i, &normal);
            }
            if cloud.has_colors() {
                let color = Vector3::new(rng.gen(), rng.gen(), rng.gen::<u8>());
                cloud.colors_mut().set_column(i, &color);
            }
        }
        cloud
    }

    #[test]
    fn test_new_reports_size_and_field_presence() {
        let cloud = PointCloud::new(5, full_fields()).unwrap();
        assert_eq!(cloud.size(), 5);
        assert!(!cloud.is_empty());
        assert!(cloud.has_positions());
        assert!(cloud.has_normals());
        assert!(cloud.has_colors());
        assert!(cloud.has_descriptor(&descriptors::CURVATURE));
        assert!(!cloud.has_descriptor(&descriptors::SHOT));

        let bare = PointCloud::new(5, xyz_fields()).unwrap();
        assert!(!bare.has_normals());
        assert!(!bare.has_colors());
        assert!(!bare.has_descriptors());
    }

    #[test]
    fn test_new_fills_defaults() {
        let cloud = PointCloud::new(3, full_fields()).unwrap();
        for i in 0..3 {
            assert_eq!(cloud.position(i), Vector3::new(0.0, 0.0, 0.0));
            assert_eq!(
                cloud.colors().column(i).into_owned(),
                Vector3::from(PointCloud::DEFAULT_COLOR)
            );
        }
        assert!(cloud.normals().iter().all(|v| *v == 0.0));
        assert!(cloud
            .descriptors(&descriptors::CURVATURE)
            .iter()
            .all(|v| *v == 0.0));
    }

    #[test]
    fn test_new_rejects_empty_and_inherit_field_sets() {
        assert!(matches!(
            PointCloud::new(1, FieldSet::new()),
            Err(Error::EmptyOrReservedFieldSet)
        ));
        assert!(matches!(
            PointCloud::new(1, FieldSet::inherit()),
            Err(Error::EmptyOrReservedFieldSet)
        ));
    }

    #[test]
    fn test_zero_size_cloud_is_valid() {
        let cloud = PointCloud::new(0, xyz_fields()).unwrap();
        assert_eq!(cloud.size(), 0);
        assert!(cloud.is_empty());
        assert_eq!(cloud.positions().ncols(), 0);
    }

    #[test]
    fn test_shrink_preserves_prefix() {
        let cloud = random_cloud(6, xyz_fields());
        let expected: Vec<Vector3<f32>> = (0..4).map(|i| cloud.position(i)).collect();

        let mut shrunk = cloud;
        shrunk.resize(4);
        shrunk.resize(2);
        assert_eq!(shrunk.size(), 2);
        for i in 0..2 {
            assert_eq!(shrunk.position(i), expected[i]);
        }
    }

    #[test]
    fn test_grow_fills_new_columns_with_defaults() {
        let mut cloud = random_cloud(2, full_fields());
        cloud.resize(5);
        assert_eq!(cloud.size(), 5);
        for i in 2..5 {
            assert_eq!(cloud.position(i), Vector3::new(0.0, 0.0, 0.0));
            assert_eq!(
                cloud.normals().column(i).into_owned(),
                Vector3::new(0.0, 0.0, 0.0)
            );
            assert_eq!(
                cloud.colors().column(i).into_owned(),
                Vector3::from(PointCloud::DEFAULT_COLOR)
            );
            assert!(cloud
                .descriptors(&descriptors::CURVATURE)
                .column(i)
                .iter()
                .all(|v| *v == 0.0));
        }
    }

    #[test]
    fn test_expand_grows_by_the_given_amount() {
        let mut cloud = random_cloud(3, xyz_fields());
        let first = cloud.position(0);
        cloud.expand(2);
        assert_eq!(cloud.size(), 5);
        assert_eq!(cloud.position(0), first);
        assert_eq!(cloud.position(4), Vector3::new(0.0, 0.0, 0.0));

        cloud.expand_uninitialized(1);
        assert_eq!(cloud.size(), 6);
    }

    #[test]
    fn test_clone_copies_all_fields() {
        let cloud = random_cloud(4, full_fields());
        let copy = cloud.clone();
        assert_eq!(copy.size(), cloud.size());
        assert_eq!(copy.fields(), cloud.fields());
        assert_eq!(copy.positions(), cloud.positions());
        assert_eq!(copy.normals(), cloud.normals());
        assert_eq!(copy.colors(), cloud.colors());
        assert_eq!(
            copy.descriptors(&descriptors::CURVATURE),
            cloud.descriptors(&descriptors::CURVATURE)
        );
    }

    #[test]
    fn test_from_cloud_narrows_to_a_field_subset() {
        let cloud = random_cloud(4, full_fields());
        let narrowed = PointCloud::from_cloud(&cloud, xyz_fields()).unwrap();
        assert_eq!(narrowed.size(), 4);
        assert!(narrowed.has_positions());
        assert!(!narrowed.has_normals());
        assert_eq!(narrowed.positions(), cloud.positions());
    }

    #[test]
    fn test_from_cloud_fails_for_fields_the_source_lacks() {
        let cloud = random_cloud(4, xyz_fields());
        let result = PointCloud::from_cloud(&cloud, FieldSet::new().with_positions().with_normals());
        assert!(matches!(result, Err(Error::MissingFields { .. })));
    }

    #[test]
    fn test_take_leaves_a_valid_empty_cloud() {
        let mut cloud = random_cloud(3, full_fields());
        let expected = cloud.positions().clone();

        let taken = cloud.take();
        assert_eq!(taken.size(), 3);
        assert_eq!(*taken.positions(), expected);
        assert_eq!(cloud.size(), 0);
        assert_eq!(cloud.fields(), taken.fields());
        // The moved-from cloud must still be usable
        cloud.resize(2);
        assert_eq!(cloud.size(), 2);
    }

    #[test]
    fn test_move_from_requires_exact_fields() {
        let mut receiver = PointCloud::new(1, xyz_fields()).unwrap();
        let mut source = random_cloud(3, FieldSet::new().with_positions().with_colors());
        assert!(matches!(
            receiver.move_from(&mut source),
            Err(Error::FieldSetMismatch { .. })
        ));
        // The failed move must not have touched either cloud
        assert_eq!(receiver.size(), 1);
        assert_eq!(source.size(), 3);
    }

    #[test]
    fn test_move_from_transfers_storage_and_empties_the_source() {
        let fields = FieldSet::new().with_positions().with_colors();
        let mut receiver = PointCloud::new(1, fields.clone()).unwrap();
        let mut source = random_cloud(3, fields.clone());
        let expected = source.positions().clone();

        receiver.move_from(&mut source).unwrap();
        assert_eq!(receiver.size(), 3);
        assert_eq!(*receiver.positions(), expected);
        assert_eq!(source.size(), 0);
        assert_eq!(*source.fields(), fields);
    }

    #[test]
    fn test_set_from_with_inherit_requires_exact_fields() {
        let mut receiver = PointCloud::new(2, xyz_fields()).unwrap();
        let source = random_cloud(2, full_fields());
        assert!(matches!(
            receiver.set_from(&source, &FieldSet::inherit(), true),
            Err(Error::FieldSetMismatch { .. })
        ));
    }

    #[test]
    fn test_set_from_copies_only_the_requested_fields() {
        let mut receiver = random_cloud(3, full_fields());
        let untouched_normals = receiver.normals().clone();
        let source = random_cloud(3, full_fields());

        receiver.set_from(&source, &xyz_fields(), false).unwrap();
        assert_eq!(receiver.positions(), source.positions());
        assert_eq!(*receiver.normals(), untouched_normals);
    }

    #[test]
    fn test_set_from_without_resize_rejects_differing_sizes() {
        let mut receiver = random_cloud(2, xyz_fields());
        let before = receiver.positions().clone();
        let source = random_cloud(3, xyz_fields());

        let result = receiver.set_from(&source, &FieldSet::inherit(), false);
        assert!(matches!(
            result,
            Err(Error::SizeMismatch {
                expected: 3,
                actual: 2
            })
        ));
        // The receiver must be unchanged after the failed copy
        assert_eq!(receiver.size(), 2);
        assert_eq!(*receiver.positions(), before);
    }

    #[test]
    fn test_set_from_with_resize_adopts_the_source_size() {
        let mut receiver = PointCloud::new(1, xyz_fields()).unwrap();
        let source = random_cloud(4, xyz_fields());
        receiver.set_from(&source, &FieldSet::inherit(), true).unwrap();
        assert_eq!(receiver.size(), 4);
        assert_eq!(receiver.positions(), source.positions());
    }

    #[test]
    fn test_require_fields_reports_expected_and_actual() {
        let cloud = PointCloud::new(1, xyz_fields()).unwrap();
        let wanted = FieldSet::new().with_positions().with_normals();
        match cloud.require_fields(&wanted) {
            Err(Error::MissingFields { expected, actual }) => {
                assert_eq!(expected, wanted);
                assert_eq!(actual, xyz_fields());
            }
            other => panic!("expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn test_has_exact_fields() {
        let cloud = PointCloud::new(1, full_fields()).unwrap();
        assert!(cloud.has_exact_fields(&full_fields()));
        assert!(!cloud.has_exact_fields(&xyz_fields()));
        assert!(cloud.has_fields(&xyz_fields()));
    }

    #[test]
    #[should_panic(expected = "does not contain normals")]
    fn test_accessing_an_absent_field_panics() {
        let cloud = PointCloud::new(1, xyz_fields()).unwrap();
        let _ = cloud.normals();
    }

    #[test]
    #[should_panic(expected = "does not contain descriptor kind")]
    fn test_accessing_an_absent_descriptor_kind_panics() {
        let cloud = PointCloud::new(1, full_fields()).unwrap();
        let _ = cloud.descriptors(&descriptors::SHOT);
    }

    #[test]
    fn test_descriptor_buffer_shape_follows_the_kind() {
        let cloud = PointCloud::new(4, full_fields()).unwrap();
        let buffer = cloud.descriptors(&descriptors::CURVATURE);
        assert_eq!(buffer.nrows(), descriptors::CURVATURE.dimension());
        assert_eq!(buffer.ncols(), 4);
    }

    #[test]
    fn test_position_accessor_returns_single_columns() {
        let mut cloud = PointCloud::new(2, xyz_fields()).unwrap();
        cloud
            .positions_mut()
            .set_column(1, &Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(cloud.position(1), Vector3::new(1.0, 2.0, 3.0));
    }
}
