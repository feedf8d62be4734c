//! Signature catalog wiring.
//!
//! A catalog is a directory of JSON files (one per signature group) or a
//! single JSON document with the same nesting. `model` mirrors the files as
//! written, `index` validates them against `schema/signature_group.schema.json`
//! and compiles every pattern into a read-only [`Catalog`].

pub mod identity;
pub mod index;
pub mod model;

pub use identity::{GroupKind, SignatureName};
pub use index::{Catalog, NuxtCatalog};
pub use model::{DefinitionList, OneOrMany, SignatureDefinition};
