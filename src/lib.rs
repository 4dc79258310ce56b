//! BOM knowledge-graph core.
//!
//! Converts ERP bill-of-materials records into a semantic knowledge
//! graph, classifies items into the hydraulic-cylinder taxonomy, shapes
//! raw inference output into structured reports, and caches similarity
//! computations used for search.
//!
//! The typical flow: build the shared [`schema::Schema`] once, convert
//! records with [`convert::BomConverter`], classify the resulting
//! individuals with [`classify::classify`], hand the graph to an external
//! reasoner, and shape its output with [`reasoning::extract`]. Repeated
//! similarity lookups go through [`cache::SimilarityCache`] first.
//!
//! The web layer, persistence, and the inference algorithm itself are
//! external collaborators; this crate owns only the construction,
//! classification, and result-shaping logic.

pub mod cache;
pub mod classify;
pub mod config;
pub mod convert;
pub mod graph;
pub mod logging;
pub mod reasoning;
pub mod schema;

pub use cache::{
    CachePoolConfig, CacheStats, SearchHit, SearchResult, SimilarityCache, SimilarityCacheStats,
};
pub use classify::{
    apply_classification, classify, generate_suggestions, specs_from_node, validate_specs,
    ClassTag, ComponentSuggestion, SpecMap, SpecValidation, SuggestionCategory,
};
pub use config::CoreConfig;
pub use convert::{
    BomComponentRecord, BomConverter, ConversionSummary, MaterialRecord, NodeIndex,
};
pub use graph::{GraphNode, KnowledgeGraph, Namespace, NodeId, PropertyValue};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use reasoning::{
    extract, BomHierarchy, HierarchyComponent, InferredTriple, RawReasonerOutput, ReasoningReport,
    SubclassPair, ValidationIssue,
};
pub use schema::{default_taxonomy, Schema, SchemaBuilder, SchemaError};
