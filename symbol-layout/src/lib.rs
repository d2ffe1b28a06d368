//! Placement and labelling core of the synthetic symbol dataset generator.

pub mod annotation;
pub mod composite;
pub mod error;
pub mod geom;
pub mod placement;
pub mod scene;
pub mod taxonomy;

pub use annotation::Annotation;
pub use composite::{Sprite, composite};
pub use error::LayoutError;
pub use geom::{Region, overlaps};
pub use placement::{Occupancy, Placement};
pub use scene::{Asset, Library, Scene, SceneCfg, Skipped, Symbol};
pub use taxonomy::{Taxonomy, generalize};
