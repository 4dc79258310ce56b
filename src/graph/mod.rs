//! Typed knowledge-graph primitive shared by every other component.
//!
//! The graph is deliberately small: string-identified nodes carrying a set
//! of class-membership tags and an ordered property map of literal or
//! node-reference values. Axioms live in [`crate::schema`]; this module
//! only stores and upserts individuals.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

/// Base URI of the generic material/BOM namespace.
pub const MATERIAL_NS: &str = "http://erp.local/ontology/material#";
/// Base URI of the hydraulic-cylinder domain namespace.
pub const CYLINDER_NS: &str = "http://erp.local/ontology/hydraulic#";

static ID_SANITIZER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\-.]").expect("sanitizer pattern is valid"));

/// Replace whitespace and any character outside `[A-Za-z0-9_\-.]` with `_`
/// so an ERP code can be embedded in a node identifier.
pub fn sanitize_code(code: &str) -> String {
    ID_SANITIZER.replace_all(code.trim(), "_").into_owned()
}

/// The two identifier namespaces of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Generic material/BOM individuals.
    Material,
    /// Hydraulic-cylinder domain individuals.
    Cylinder,
}

impl Namespace {
    pub fn base_uri(self) -> &'static str {
        match self {
            Namespace::Material => MATERIAL_NS,
            Namespace::Cylinder => CYLINDER_NS,
        }
    }

    /// Build a namespace-qualified node identifier from a raw local name.
    /// The local name is sanitized; the namespace prefix never is.
    pub fn qualify(self, local: &str) -> NodeId {
        NodeId(format!("{}{}", self.base_uri(), sanitize_code(local)))
    }
}

/// URI-like node identifier, globally unique within its namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Local name without the namespace prefix, when the id carries one.
    pub fn local_name(&self) -> &str {
        self.0
            .rsplit_once('#')
            .map(|(_, local)| local)
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A property value: either a literal or a reference to another node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Literal(String),
    NodeRef(NodeId),
}

impl PropertyValue {
    pub fn literal(value: impl Into<String>) -> Self {
        PropertyValue::Literal(value.into())
    }

    pub fn node_ref(id: NodeId) -> Self {
        PropertyValue::NodeRef(id)
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            PropertyValue::Literal(s) => Some(s),
            PropertyValue::NodeRef(_) => None,
        }
    }

    pub fn as_node_ref(&self) -> Option<&NodeId> {
        match self {
            PropertyValue::NodeRef(id) => Some(id),
            PropertyValue::Literal(_) => None,
        }
    }
}

/// A graph individual: type tags plus an ordered property map.
#[derive(Debug, Clone)]
pub struct GraphNode {
    id: NodeId,
    types: BTreeSet<String>,
    properties: IndexMap<String, Vec<PropertyValue>>,
}

impl GraphNode {
    fn new(id: NodeId) -> Self {
        Self {
            id,
            types: BTreeSet::new(),
            properties: IndexMap::new(),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }

    pub fn has_type(&self, class_name: &str) -> bool {
        self.types.contains(class_name)
    }

    /// Attach a class-membership tag. A node may carry one tag per taxonomy
    /// dimension plus any number of structural types.
    pub fn add_type(&mut self, class_name: impl Into<String>) {
        self.types.insert(class_name.into());
    }

    /// Replace the value of a single-valued (functional) property.
    pub fn set_value(&mut self, property: impl Into<String>, value: PropertyValue) {
        self.properties.insert(property.into(), vec![value]);
    }

    /// Append to a multi-valued property, skipping values already present
    /// so re-conversion of the same record stays idempotent.
    pub fn append_value(&mut self, property: impl Into<String>, value: PropertyValue) {
        let values = self.properties.entry(property.into()).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    pub fn values(&self, property: &str) -> &[PropertyValue] {
        self.properties
            .get(property)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first_literal(&self, property: &str) -> Option<&str> {
        self.values(property).first().and_then(PropertyValue::as_literal)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }
}

/// In-memory node store. Nodes are created on first reference and mutated
/// on every later conversion pass; they are never deleted.
#[derive(Debug, Default)]
pub struct KnowledgeGraph {
    nodes: IndexMap<NodeId, GraphNode>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch-or-create the node with the given identifier.
    pub fn ensure_node(&mut self, id: NodeId) -> &mut GraphNode {
        self.nodes
            .entry(id.clone())
            .or_insert_with(|| GraphNode::new(id))
    }

    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut GraphNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_disallowed_characters() {
        assert_eq!(sanitize_code("AB 12/34"), "AB_12_34");
        assert_eq!(sanitize_code("  X-1.2_Y  "), "X-1.2_Y");
        assert_eq!(sanitize_code("Ø50×100"), "_50_100");
    }

    #[test]
    fn qualify_prefixes_and_sanitizes() {
        let id = Namespace::Material.qualify("A B");
        assert_eq!(id.as_str(), "http://erp.local/ontology/material#A_B");
        assert_eq!(id.local_name(), "A_B");
    }

    #[test]
    fn ensure_node_upserts_without_duplicates() {
        let mut graph = KnowledgeGraph::new();
        let id = Namespace::Material.qualify("M1");
        graph.ensure_node(id.clone()).add_type("Material");
        graph.ensure_node(id.clone()).add_type("MasterItem");

        assert_eq!(graph.len(), 1);
        let node = graph.node(&id).unwrap();
        assert!(node.has_type("Material"));
        assert!(node.has_type("MasterItem"));
    }

    #[test]
    fn set_value_replaces_previous_value() {
        let mut graph = KnowledgeGraph::new();
        let id = Namespace::Cylinder.qualify("C1");
        let node = graph.ensure_node(id);
        node.set_value("boreDiameter", PropertyValue::literal("050"));
        node.set_value("boreDiameter", PropertyValue::literal("063"));

        assert_eq!(node.values("boreDiameter").len(), 1);
        assert_eq!(node.first_literal("boreDiameter"), Some("063"));
    }

    #[test]
    fn append_value_deduplicates() {
        let mut graph = KnowledgeGraph::new();
        let master = Namespace::Material.qualify("M1");
        let component = Namespace::Material.qualify("C1");
        let node = graph.ensure_node(master);
        node.append_value("uses", PropertyValue::node_ref(component.clone()));
        node.append_value("uses", PropertyValue::node_ref(component));

        assert_eq!(node.values("uses").len(), 1);
    }
}
