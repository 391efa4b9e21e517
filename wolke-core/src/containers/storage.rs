use nalgebra::{DMatrix, Matrix3xX};

use crate::layout::FieldSet;

/// Encapsulated storage for a point cloud's per-field buffers.
///
/// Only the buffers named by the field set exist; buffers for absent fields stay at zero
/// columns. This storage is not responsible for initializing default values, that is the
/// cloud's job.
#[derive(Debug)]
pub(crate) struct Storage {
    fields: FieldSet,
    size: usize,
    positions: Matrix3xX<f32>,
    normals: Matrix3xX<f32>,
    colors: Matrix3xX<u8>,
    // One buffer per descriptor kind, in the field set's kind order
    descriptors: Vec<DMatrix<f32>>,
}

impl Storage {
    pub fn new(size: usize, fields: &FieldSet) -> Self {
        let descriptors = fields
            .descriptors()
            .iter()
            .map(|kind| DMatrix::zeros(kind.dimension(), 0))
            .collect();
        let mut storage = Self {
            fields: fields.clone(),
            size: 0,
            positions: Matrix3xX::zeros(0),
            normals: Matrix3xX::zeros(0),
            colors: Matrix3xX::zeros(0),
            descriptors,
        };
        storage.resize(size);
        storage
    }

    /// Returns the size of the storage in points
    pub fn size(&self) -> usize {
        self.size
    }

    /// Changes the column count of every present buffer to `new_size`. Column data in the
    /// overlapping prefix is preserved; the contents of columns beyond the old size are
    /// unspecified until the cloud fills them.
    pub fn resize(&mut self, new_size: usize) {
        self.size = new_size;
        if self.fields.has_positions() {
            let old = std::mem::replace(&mut self.positions, Matrix3xX::zeros(0));
            self.positions = old.resize_horizontally(new_size, 0.0);
        }
        if self.fields.has_normals() {
            let old = std::mem::replace(&mut self.normals, Matrix3xX::zeros(0));
            self.normals = old.resize_horizontally(new_size, 0.0);
        }
        if self.fields.has_colors() {
            let old = std::mem::replace(&mut self.colors, Matrix3xX::zeros(0));
            self.colors = old.resize_horizontally(new_size, 0);
        }
        for buffer in &mut self.descriptors {
            let old = std::mem::replace(buffer, DMatrix::zeros(0, 0));
            *buffer = old.resize_horizontally(new_size, 0.0);
        }
        self.check_invariants();
    }

    pub fn positions(&self) -> &Matrix3xX<f32> {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut Matrix3xX<f32> {
        &mut self.positions
    }

    pub fn normals(&self) -> &Matrix3xX<f32> {
        &self.normals
    }

    pub fn normals_mut(&mut self) -> &mut Matrix3xX<f32> {
        &mut self.normals
    }

    pub fn colors(&self) -> &Matrix3xX<u8> {
        &self.colors
    }

    pub fn colors_mut(&mut self) -> &mut Matrix3xX<u8> {
        &mut self.colors
    }

    pub fn descriptor(&self, index: usize) -> &DMatrix<f32> {
        &self.descriptors[index]
    }

    pub fn descriptor_mut(&mut self, index: usize) -> &mut DMatrix<f32> {
        &mut self.descriptors[index]
    }

    pub fn descriptors_mut(&mut self) -> &mut [DMatrix<f32>] {
        &mut self.descriptors
    }

    // Every present buffer must have exactly one column per point
    fn check_invariants(&self) {
        if self.fields.has_positions() {
            assert_eq!(self.positions.ncols(), self.size);
        }
        if self.fields.has_normals() {
            assert_eq!(self.normals.ncols(), self.size);
        }
        if self.fields.has_colors() {
            assert_eq!(self.colors.ncols(), self.size);
        }
        assert_eq!(self.descriptors.len(), self.fields.descriptors().len());
        for (buffer, kind) in self.descriptors.iter().zip(self.fields.descriptors()) {
            assert_eq!(buffer.nrows(), kind.dimension());
            assert_eq!(buffer.ncols(), self.size);
        }
    }
}
