//! Domain types shared across the pipeline.

pub mod bar;

pub use bar::{is_ordered_series, Bar};
