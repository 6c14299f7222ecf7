//! `catalog` crate — the primitive catalog shown in the editor palette.
//!
//! A primitive is a node type offered by the external execution engine. The
//! catalog resolves every type identifier once into a [`Primitive`] entry with
//! a tagged [`PrimitiveKind`] and an [`Appearance`], so rendering code never
//! compares raw strings.

pub mod error;
pub mod kind;
pub mod palette;
pub mod source;
pub mod mock;

pub use error::CatalogError;
pub use kind::{Appearance, Icon, PrimitiveKind};
pub use palette::{Catalog, Primitive, BASE_PRIMITIVES};
pub use source::{load_catalog, CatalogSource, StaticCatalogSource};
