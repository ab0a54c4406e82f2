//! FanZone Gen - Fan Zone Definition Compiler
//!
//! Reads zone, fan, event and zone-condition YAML documents, resolves every
//! cross-reference between them and renders one static initializer table
//! for the fan control runtime.
//!
//! # Guarantees
//! 1. Every Name Resolves Or The Build Aborts
//! 2. Every Zone Has Fans
//! 3. Defaults Are Explicit In The IR
//! 4. Deterministic Output
//! 5. No Partial Output

pub mod catalog;
pub mod config;
pub mod documents;
pub mod error;
pub mod events;
pub mod group;
pub mod hashing;
pub mod ir;
pub mod pipeline;
pub mod render;
pub mod zones;

pub use catalog::{resolve, Catalogs, ConditionCatalog, Named};
pub use config::{GeneratorConfig, OUTPUT_FILE_NAME};
pub use error::{CatalogKind, GenError, Result};
pub use events::{build_signals, is_applicable, EventAssembler};
pub use group::expand;
pub use hashing::{canonical_json, compute_ir_digest, sha256_hex};
pub use ir::{Event, GuardedEvent, SetSpeedEvent, Zone, ZoneGroup, ZoneLayout};
pub use pipeline::{GenerationPipeline, GenerationReport, Inputs};
pub use render::render;
pub use zones::{select_fans, ZoneAssembler};

pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");
