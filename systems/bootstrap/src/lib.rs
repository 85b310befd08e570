#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Map sources that feed the world's grid index.
//!
//! Maps come either from TOML documents with an ASCII layout, collected in a
//! [`MapCatalog`], or from a rectangular [`CheckedGrid`] whose passability is
//! answered tile by tile by an [`ObstacleCheck`]. [`ScatterObstacles`] builds
//! the latter from a seed so generated maps are reproducible.

pub mod catalog;
pub mod document;
pub mod generate;

pub use catalog::MapCatalog;
pub use document::{ActorEntry, MapDocument};
pub use generate::{CheckedGrid, ObstacleCheck, ScatterObstacles};
