use std::fmt;

use itertools::Itertools;

/// A definition for a single descriptor kind of a point cloud. Descriptors are per-point numeric
/// feature vectors with a fixed dimensionality, e.g. a curvature estimate or a shape descriptor.
/// A descriptor kind is identified by a unique name together with its dimensionality. Descriptor
/// kinds can be grouped into two categories: predefined kinds (see the [descriptors] module) and
/// custom kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorKind {
    name: &'static str,
    dimension: usize,
}

impl DescriptorKind {
    /// Creates a new custom DescriptorKind with the given name and dimensionality
    /// ```
    /// # use wolke_core::layout::*;
    /// let custom_kind = DescriptorKind::custom("Embedding", 128);
    /// # assert_eq!(custom_kind.name(), "Embedding");
    /// # assert_eq!(custom_kind.dimension(), 128);
    /// ```
    pub const fn custom(name: &'static str, dimension: usize) -> Self {
        Self { name, dimension }
    }

    /// Returns the name of this DescriptorKind
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the dimensionality of this DescriptorKind, i.e. the number of rows that one of its
    /// per-point vectors occupies
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Module containing predefined descriptor kinds
pub mod descriptors {
    use super::DescriptorKind;

    /// Descriptor kind for a per-point curvature estimate
    pub const CURVATURE: DescriptorKind = DescriptorKind {
        name: "Curvature",
        dimension: 3,
    };

    /// Descriptor kind for Fast Point Feature Histograms
    pub const FPFH: DescriptorKind = DescriptorKind {
        name: "FPFH",
        dimension: 33,
    };

    /// Descriptor kind for the SHOT shape descriptor
    pub const SHOT: DescriptorKind = DescriptorKind {
        name: "SHOT",
        dimension: 352,
    };
}

const POSITIONS_BIT: u8 = 1 << 0;
const NORMALS_BIT: u8 = 1 << 1;
const COLORS_BIT: u8 = 1 << 2;
const INHERIT_BIT: u8 = 1 << 3;

/// Describes the set of per-point fields that a point cloud carries: positions, normals, colors
/// and any number of [DescriptorKind]s.
///
/// Two values of this type are reserved. The empty set (`FieldSet::new()` without any `with_*`
/// call) and the [inherit](FieldSet::inherit) sentinel are both rejected when constructing a
/// cloud; the latter is only meaningful as a request-time marker for operations that resolve
/// their field set from another cloud.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldSet {
    flags: u8,
    // Sorted by kind name so that equality is independent of insertion order
    descriptors: Vec<DescriptorKind>,
}

impl FieldSet {
    /// Creates a new empty FieldSet
    /// ```
    /// # use wolke_core::layout::*;
    /// let fields = FieldSet::new();
    /// assert!(fields.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            ..Default::default()
        }
    }

    /// Returns the reserved inherit sentinel. It stands for "use the other operand's field set"
    /// in operations that take a second cloud and is never a valid field set for a constructed
    /// cloud.
    /// ```
    /// # use wolke_core::layout::*;
    /// let fields = FieldSet::inherit();
    /// assert!(fields.is_inherit());
    /// ```
    pub fn inherit() -> Self {
        Self {
            flags: INHERIT_BIT,
            descriptors: Vec::new(),
        }
    }

    /// Adds 3D positions to this FieldSet
    /// ```
    /// # use wolke_core::layout::*;
    /// let fields = FieldSet::new().with_positions();
    /// assert!(fields.has_positions());
    /// ```
    pub fn with_positions(mut self) -> Self {
        self.flags |= POSITIONS_BIT;
        self
    }

    /// Adds 3D normals to this FieldSet
    pub fn with_normals(mut self) -> Self {
        self.flags |= NORMALS_BIT;
        self
    }

    /// Adds RGB colors to this FieldSet
    pub fn with_colors(mut self) -> Self {
        self.flags |= COLORS_BIT;
        self
    }

    /// Adds the given DescriptorKind to this FieldSet. Panics if a kind with the same name is
    /// already part of this FieldSet, or if the kind has zero dimensionality.
    /// ```
    /// # use wolke_core::layout::*;
    /// let fields = FieldSet::new().with_positions().with_descriptor(descriptors::CURVATURE);
    /// assert!(fields.has_descriptor(&descriptors::CURVATURE));
    /// # assert!(!fields.has_descriptor(&descriptors::SHOT));
    /// ```
    pub fn with_descriptor(mut self, kind: DescriptorKind) -> Self {
        assert!(
            kind.dimension() > 0,
            "Descriptor kind {} must have a positive dimensionality!",
            kind.name()
        );
        if self.descriptors.iter().any(|k| k.name() == kind.name()) {
            panic!(
                "Descriptor kind {} is already present in this FieldSet!",
                kind.name()
            );
        }
        let index = self
            .descriptors
            .iter()
            .position(|k| k.name() > kind.name())
            .unwrap_or(self.descriptors.len());
        self.descriptors.insert(index, kind);
        self
    }

    /// Returns true if this FieldSet contains no fields at all. The empty set is not a valid
    /// field set for a constructed cloud.
    pub fn is_empty(&self) -> bool {
        self.flags == 0 && self.descriptors.is_empty()
    }

    /// Returns true if this FieldSet is the reserved [inherit](FieldSet::inherit) sentinel
    pub fn is_inherit(&self) -> bool {
        (self.flags & INHERIT_BIT) != 0
    }

    /// Returns true if 3D positions are part of this FieldSet
    pub fn has_positions(&self) -> bool {
        (self.flags & POSITIONS_BIT) != 0
    }

    /// Returns true if 3D normals are part of this FieldSet
    pub fn has_normals(&self) -> bool {
        (self.flags & NORMALS_BIT) != 0
    }

    /// Returns true if RGB colors are part of this FieldSet
    pub fn has_colors(&self) -> bool {
        (self.flags & COLORS_BIT) != 0
    }

    /// Returns true if at least one descriptor kind is part of this FieldSet
    pub fn has_descriptors(&self) -> bool {
        !self.descriptors.is_empty()
    }

    /// Returns true if the given DescriptorKind is part of this FieldSet. A kind matches only if
    /// both its name and its dimensionality match.
    pub fn has_descriptor(&self, kind: &DescriptorKind) -> bool {
        self.descriptors.contains(kind)
    }

    /// Returns the descriptor kinds in this FieldSet, ordered by name
    pub fn descriptors(&self) -> &[DescriptorKind] {
        &self.descriptors
    }

    /// Returns true if every field in `other` is also part of this FieldSet
    /// ```
    /// # use wolke_core::layout::*;
    /// let fields = FieldSet::new().with_positions().with_normals();
    /// assert!(fields.contains(&FieldSet::new().with_positions()));
    /// assert!(!fields.contains(&FieldSet::new().with_colors()));
    /// ```
    pub fn contains(&self, other: &FieldSet) -> bool {
        (self.flags & other.flags) == other.flags
            && other
                .descriptors
                .iter()
                .all(|kind| self.descriptors.contains(kind))
    }

    /// Returns the union of this FieldSet and `other`. Panics if the two sets contain descriptor
    /// kinds that share a name but disagree on the dimensionality.
    /// ```
    /// # use wolke_core::layout::*;
    /// let a = FieldSet::new().with_positions();
    /// let b = FieldSet::new().with_colors().with_descriptor(descriptors::CURVATURE);
    /// let merged = a.union(&b);
    /// # assert!(merged.has_positions());
    /// # assert!(merged.has_colors());
    /// assert!(merged.has_descriptor(&descriptors::CURVATURE));
    /// ```
    pub fn union(&self, other: &FieldSet) -> FieldSet {
        let mut merged = self.clone();
        merged.flags |= other.flags;
        for kind in &other.descriptors {
            if merged.descriptors.contains(kind) {
                continue;
            }
            merged = merged.with_descriptor(*kind);
        }
        merged
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_inherit() {
            return write!(f, "(inherit)");
        }
        if self.is_empty() {
            return write!(f, "(none)");
        }
        let mut parts: Vec<String> = Vec::new();
        if self.has_positions() {
            parts.push("Positions".into());
        }
        if self.has_normals() {
            parts.push("Normals".into());
        }
        if self.has_colors() {
            parts.push("Colors".into());
        }
        for kind in &self.descriptors {
            parts.push(format!("{}({})", kind.name(), kind.dimension()));
        }
        write!(f, "({})", parts.iter().join(" | "))
    }
}
