//! Filter-set definitions and the document-bound query pipeline.

pub mod document;
pub mod filter_set;

// Re-export commonly used items
pub use document::{Document, DocumentFilterSet, DocumentFilterSetBuilder};
pub use filter_set::{
    ActiveFilter, FilterSet, FilterSetDefinition, FilterSetSchema, declared_filters,
};
