// MovieLens to entity/relation interchange conversion
pub mod converter;
pub mod lookup;
pub mod record;
pub mod reporter;
pub mod schema;
pub mod sink;
pub mod source;

// Re-export core types for convenience
pub use converter::{
    ConversionError, ConversionOutcome, Converter, EntityStats, InputPaths, RelationStats,
    ENTITIES_FILE, RELATIONS_FILE,
};
pub use record::{EntityKind, EntityRecord, RelationRecord};
pub use reporter::{ConversionReport, ConversionReporter, ReportFormat};
pub use schema::{SchemaDescriptor, SchemaVariant};
