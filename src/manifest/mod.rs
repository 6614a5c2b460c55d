//! Transaction manifest synthesis
//!
//! Manifests are modeled as a small typed instruction AST rather than
//! string templates, so validation (ratio sums, fee amounts, address kinds)
//! runs against structured data. Rendering to the ledger's textual
//! instruction language happens once, at the end.

pub mod builder;
pub mod templates;
pub mod value;

pub use builder::{Instruction, Manifest, ManifestBuilder};
pub use value::{format_value, ManifestValue};
