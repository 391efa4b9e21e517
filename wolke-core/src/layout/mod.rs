mod field_set;

pub use field_set::*;
