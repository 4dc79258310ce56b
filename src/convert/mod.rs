//! Maps ERP bill-of-materials records onto graph individuals.
//!
//! Conversion is idempotent: node identity is derived from the sanitized
//! item code through a caller-supplied code→node index, so re-running a
//! conversion updates the existing individuals instead of duplicating
//! them. Malformed input never aborts a conversion; affected fields are
//! skipped with a log line.

use crate::graph::{GraphNode, KnowledgeGraph, Namespace, NodeId, PropertyValue};
use crate::schema::{classes, properties, Schema};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;

/// Item-code prefixes that mark a hydraulic-cylinder master item.
const CYLINDER_CODE_PREFIXES: [char; 2] = ['3', '4'];
/// Minimum master-code length for positional feature extraction.
const CYLINDER_CODE_MIN_LEN: usize = 15;

/// Positional windows (start, end) into a qualifying master code.
const SERIES_WINDOW: (usize, usize) = (2, 4);
const TYPE_WINDOW: (usize, usize) = (4, 5);
const BORE_WINDOW: (usize, usize) = (5, 8);
const STROKE_WINDOW: (usize, usize) = (10, 14);
const ROD_END_WINDOW: (usize, usize) = (14, 15);

/// Window into a component code consulted against both lookup tables.
const COMPONENT_FEATURE_WINDOW: (usize, usize) = (2, 5);

/// Component-code window → installation type, attached to the master item.
const INSTALLATION_CODES: &[(&str, &str)] = &[
    ("201", "CA"),
    ("202", "CB"),
    ("203", "FA"),
    ("206", "TC"),
    ("207", "LA"),
    ("208", "LB"),
];

/// Component-code window → shaft-end join, attached to the master item.
/// Consulted independently of [`INSTALLATION_CODES`] over the same window;
/// the key sets are disjoint today and no precedence is defined between
/// the two tables.
const SHAFT_END_JOIN_CODES: &[(&str, &str)] = &[("209", "Y"), ("210", "I"), ("211", "Pin")];

/// ERP master/material record.
#[derive(Debug, Clone)]
pub struct MaterialRecord {
    pub code: String,
    pub name: Option<String>,
    pub spec: Option<String>,
}

/// One component row of a BOM structure.
#[derive(Debug, Clone)]
pub struct BomComponentRecord {
    pub code: String,
    pub sequence: u32,
    pub effective_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub quantity: f64,
    pub characteristic_code: Option<String>,
}

/// Caller-owned code→node index that makes re-conversion hit the same
/// individuals.
pub type NodeIndex = HashMap<String, NodeId>;

/// What one `convert_bom_structure` pass touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub master: NodeId,
    pub components: usize,
    pub relations: usize,
    pub features_extracted: bool,
}

/// Stateless converter; all mutation goes through the graph handed in.
pub struct BomConverter {
    schema: Arc<Schema>,
}

impl BomConverter {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }

    /// Create or update the Material node for a record. Code, name, and
    /// spec land as datatype properties; a later record wins on name/spec.
    pub fn convert_material(
        &self,
        graph: &mut KnowledgeGraph,
        index: &mut NodeIndex,
        record: &MaterialRecord,
    ) -> NodeId {
        let id = self.ensure_material_node(graph, index, &record.code);
        let node = graph.ensure_node(id.clone());
        if let Some(name) = &record.name {
            node.set_value(properties::MATERIAL_NAME, PropertyValue::literal(name));
        }
        if let Some(spec) = &record.spec {
            node.set_value(properties::MATERIAL_SPEC, PropertyValue::literal(spec));
        }
        id
    }

    /// Convert one master and its component list into graph structure:
    /// master typing and positional features, one BOM-relation node per
    /// component, forward and inverse usage edges, and the master-side
    /// installation / shaft-end-join lookups.
    pub fn convert_bom_structure(
        &self,
        graph: &mut KnowledgeGraph,
        index: &mut NodeIndex,
        master_code: &str,
        characteristic_code: Option<&str>,
        components: &[BomComponentRecord],
    ) -> ConversionSummary {
        let master_id = self.ensure_material_node(graph, index, master_code);
        {
            let master = graph.ensure_node(master_id.clone());
            master.add_type(classes::MASTER_ITEM);
            if let Some(code) = characteristic_code {
                master.set_value(properties::CHARACTERISTIC_CODE, PropertyValue::literal(code));
            }
        }

        let features_extracted = self.extract_master_features(graph, &master_id, master_code);

        let mut relations = 0;
        for component in components {
            self.convert_component(graph, index, &master_id, master_code, component);
            relations += 1;
        }

        ConversionSummary {
            master: master_id,
            components: components.len(),
            relations,
            features_extracted,
        }
    }

    /// Positional feature extraction for qualifying cylinder codes:
    /// series `[2,4)`, type `[4,5)`, bore `[5,8)`, stroke `[10,14)`,
    /// rod end `[14,15)`. Non-qualifying codes are left untouched.
    fn extract_master_features(
        &self,
        graph: &mut KnowledgeGraph,
        master_id: &NodeId,
        master_code: &str,
    ) -> bool {
        if !is_cylinder_code(master_code) {
            tracing::debug!(code = master_code, "code does not qualify for feature extraction");
            return false;
        }

        let master = graph.ensure_node(master_id.clone());
        let windows = [
            (properties::SERIES, SERIES_WINDOW),
            (properties::CYLINDER_TYPE, TYPE_WINDOW),
            (properties::BORE_DIAMETER, BORE_WINDOW),
            (properties::STROKE_LENGTH, STROKE_WINDOW),
            (properties::ROD_END_TYPE, ROD_END_WINDOW),
        ];
        for (property, (start, end)) in windows {
            match code_window(master_code, start, end) {
                Some(value) => {
                    self.write(master, property, PropertyValue::literal(value));
                }
                None => {
                    tracing::warn!(
                        code = master_code,
                        property,
                        "code too short for positional window, skipping"
                    );
                }
            }
        }
        true
    }

    fn convert_component(
        &self,
        graph: &mut KnowledgeGraph,
        index: &mut NodeIndex,
        master_id: &NodeId,
        master_code: &str,
        component: &BomComponentRecord,
    ) {
        let component_id = self.ensure_material_node(graph, index, &component.code);
        graph
            .ensure_node(component_id.clone())
            .add_type(classes::COMPONENT_ITEM);

        let relation_id = Namespace::Material.qualify(&format!(
            "Bom_{}_{}",
            master_code, component.code
        ));
        {
            let relation = graph.ensure_node(relation_id.clone());
            relation.add_type(classes::BOM_RELATION);
            relation.set_value(
                properties::EFFECTIVE_DATE,
                PropertyValue::literal(iso_date(component.effective_date)),
            );
            relation.set_value(
                properties::EXPIRY_DATE,
                PropertyValue::literal(iso_date(component.expiry_date)),
            );
            relation.set_value(
                properties::QUANTITY,
                PropertyValue::literal(component.quantity.to_string()),
            );
            relation.set_value(
                properties::SEQUENCE,
                PropertyValue::literal(component.sequence.to_string()),
            );
            if let Some(code) = &component.characteristic_code {
                relation.set_value(properties::CHARACTERISTIC_CODE, PropertyValue::literal(code));
            }
            relation.append_value(
                properties::HAS_COMPONENT_ITEM,
                PropertyValue::node_ref(component_id.clone()),
            );
        }

        {
            let master = graph.ensure_node(master_id.clone());
            master.append_value(properties::HAS_BOM, PropertyValue::node_ref(relation_id));
            master.append_value(
                properties::USES,
                PropertyValue::node_ref(component_id.clone()),
            );
        }
        graph.ensure_node(component_id.clone()).append_value(
            properties::IS_USED_IN,
            PropertyValue::node_ref(master_id.clone()),
        );

        // Both lookup tables read the same component-code window and both
        // attach onto the master, not the component.
        if let Some(window) = code_window(
            &component.code,
            COMPONENT_FEATURE_WINDOW.0,
            COMPONENT_FEATURE_WINDOW.1,
        ) {
            let master = graph.ensure_node(master_id.clone());
            if let Some(installation) = lookup(INSTALLATION_CODES, &window) {
                self.write(
                    master,
                    properties::INSTALLATION_TYPE,
                    PropertyValue::literal(installation),
                );
            }
            if let Some(join) = lookup(SHAFT_END_JOIN_CODES, &window) {
                self.write(
                    master,
                    properties::SHAFT_END_JOIN,
                    PropertyValue::literal(join),
                );
            }
        }
    }

    /// Fetch-or-create a Material node for a code, registering it in the
    /// caller's index. Placeholders carry only the code until
    /// `convert_material` fills name/spec.
    fn ensure_material_node(
        &self,
        graph: &mut KnowledgeGraph,
        index: &mut NodeIndex,
        code: &str,
    ) -> NodeId {
        let id = index
            .entry(code.to_string())
            .or_insert_with(|| Namespace::Material.qualify(code))
            .clone();
        let node = graph.ensure_node(id.clone());
        node.add_type(classes::MATERIAL);
        node.set_value(properties::MATERIAL_CODE, PropertyValue::literal(code));
        id
    }

    /// Route a write through the schema: functional properties replace,
    /// everything else appends (with duplicate suppression).
    fn write(&self, node: &mut GraphNode, property: &str, value: PropertyValue) {
        if self.schema.is_functional(property) {
            node.set_value(property, value);
        } else {
            node.append_value(property, value);
        }
    }
}

/// A master code qualifies for positional extraction when it is at least
/// 15 characters and starts with the cylinder prefix `3` or `4`.
fn is_cylinder_code(code: &str) -> bool {
    code.chars().count() >= CYLINDER_CODE_MIN_LEN
        && code
            .chars()
            .next()
            .map(|first| CYLINDER_CODE_PREFIXES.contains(&first))
            .unwrap_or(false)
}

/// Character window `[start, end)` of a code, `None` when the code is too
/// short.
fn code_window(code: &str, start: usize, end: usize) -> Option<String> {
    let chars: Vec<char> = code.chars().collect();
    if chars.len() < end {
        return None;
    }
    Some(chars[start..end].iter().collect())
}

fn lookup(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, value)| *value)
}

/// ISO-8601 date literal (`yyyy-MM-dd`).
fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::default_taxonomy;

    fn converter() -> BomConverter {
        BomConverter::new(Arc::new(default_taxonomy().build().unwrap()))
    }

    fn component(code: &str, sequence: u32) -> BomComponentRecord {
        BomComponentRecord {
            code: code.to_string(),
            sequence,
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
            quantity: 2.0,
            characteristic_code: Some("CH01".to_string()),
        }
    }

    #[test]
    fn positional_extraction_follows_literal_offsets() {
        let code = "3011212000" // indices 0..10, series "11", type "2", bore "120"
            .to_string()
            + "0450" // stroke, indices 10..14
            + "Y" // rod end, index 14
            + "7"; // filler, total length 16
        assert_eq!(code.len(), 16);

        let converter = converter();
        let mut graph = KnowledgeGraph::new();
        let mut index = NodeIndex::new();
        let summary = converter.convert_bom_structure(&mut graph, &mut index, &code, None, &[]);
        assert!(summary.features_extracted);

        let master = graph.node(&summary.master).unwrap();
        assert_eq!(master.first_literal(properties::SERIES), Some("11"));
        assert_eq!(master.first_literal(properties::CYLINDER_TYPE), Some("2"));
        assert_eq!(master.first_literal(properties::BORE_DIAMETER), Some("120"));
        assert_eq!(master.first_literal(properties::STROKE_LENGTH), Some("0450"));
        assert_eq!(master.first_literal(properties::ROD_END_TYPE), Some("Y"));
    }

    #[test]
    fn short_or_foreign_codes_skip_extraction() {
        let converter = converter();
        let mut graph = KnowledgeGraph::new();
        let mut index = NodeIndex::new();

        let short = converter.convert_bom_structure(&mut graph, &mut index, "30112", None, &[]);
        assert!(!short.features_extracted);

        let foreign =
            converter.convert_bom_structure(&mut graph, &mut index, "9011212000 0450Y", None, &[]);
        assert!(!foreign.features_extracted);
        let master = graph.node(&foreign.master).unwrap();
        assert_eq!(master.first_literal(properties::BORE_DIAMETER), None);
    }

    #[test]
    fn conversion_is_idempotent() {
        let converter = converter();
        let mut graph = KnowledgeGraph::new();
        let mut index = NodeIndex::new();
        let components = [component("CP201-7A", 10), component("XX209B", 20)];

        let first = converter.convert_bom_structure(
            &mut graph,
            &mut index,
            "3011212000 0450Y7",
            Some("K01"),
            &components,
        );
        let nodes_after_first = graph.len();
        let second = converter.convert_bom_structure(
            &mut graph,
            &mut index,
            "3011212000 0450Y7",
            Some("K01"),
            &components,
        );

        assert_eq!(first.master, second.master);
        assert_eq!(graph.len(), nodes_after_first);
        let master = graph.node(&first.master).unwrap();
        assert_eq!(master.values(properties::HAS_BOM).len(), 2);
        assert_eq!(master.values(properties::USES).len(), 2);
    }

    #[test]
    fn component_links_carry_dates_and_inverse_edge() {
        let converter = converter();
        let mut graph = KnowledgeGraph::new();
        let mut index = NodeIndex::new();
        let summary = converter.convert_bom_structure(
            &mut graph,
            &mut index,
            "4011206300 0100I",
            None,
            &[component("CP000-1", 10)],
        );

        let master = graph.node(&summary.master).unwrap();
        let relation_id = master.values(properties::HAS_BOM)[0]
            .as_node_ref()
            .unwrap()
            .clone();
        let relation = graph.node(&relation_id).unwrap();
        assert!(relation.has_type(classes::BOM_RELATION));
        assert_eq!(
            relation.first_literal(properties::EFFECTIVE_DATE),
            Some("2024-01-01")
        );
        assert_eq!(
            relation.first_literal(properties::EXPIRY_DATE),
            Some("2030-12-31")
        );
        assert_eq!(relation.first_literal(properties::QUANTITY), Some("2"));
        assert_eq!(relation.first_literal(properties::CHARACTERISTIC_CODE), Some("CH01"));

        let component_id = index.get("CP000-1").unwrap();
        let component_node = graph.node(component_id).unwrap();
        assert!(component_node.has_type(classes::COMPONENT_ITEM));
        assert_eq!(
            component_node.values(properties::IS_USED_IN)[0].as_node_ref(),
            Some(&summary.master)
        );
    }

    #[test]
    fn shaft_end_and_installation_windows_are_independent() {
        // Window [2,5) of "CP201-7A" is "201" (installation CA); of
        // "XX209B" it is "209" (shaft-end join Y). Both attach to the
        // master; the tables' key sets are disjoint, so no precedence
        // rule exists between them.
        let converter = converter();
        let mut graph = KnowledgeGraph::new();
        let mut index = NodeIndex::new();
        let summary = converter.convert_bom_structure(
            &mut graph,
            &mut index,
            "3011212000 0450Y7",
            None,
            &[component("CP201-7A", 10), component("XX209B", 20)],
        );

        let master = graph.node(&summary.master).unwrap();
        assert_eq!(master.first_literal(properties::INSTALLATION_TYPE), Some("CA"));
        assert_eq!(master.first_literal(properties::SHAFT_END_JOIN), Some("Y"));

        let component_node = graph.node(index.get("CP201-7A").unwrap()).unwrap();
        assert_eq!(component_node.first_literal(properties::INSTALLATION_TYPE), None);
    }

    #[test]
    fn convert_material_fills_placeholder() {
        let converter = converter();
        let mut graph = KnowledgeGraph::new();
        let mut index = NodeIndex::new();

        // Referenced as a component first: placeholder with code only.
        converter.convert_bom_structure(
            &mut graph,
            &mut index,
            "3011212000 0450Y7",
            None,
            &[component("CP201-7A", 10)],
        );
        let placeholder_id = index.get("CP201-7A").unwrap().clone();
        assert_eq!(
            graph.node(&placeholder_id).unwrap().first_literal(properties::MATERIAL_NAME),
            None
        );

        let id = converter.convert_material(
            &mut graph,
            &mut index,
            &MaterialRecord {
                code: "CP201-7A".to_string(),
                name: Some("Front attachment kit".to_string()),
                spec: Some("CA/7A".to_string()),
            },
        );
        assert_eq!(id, placeholder_id);
        let node = graph.node(&id).unwrap();
        assert_eq!(
            node.first_literal(properties::MATERIAL_NAME),
            Some("Front attachment kit")
        );
        assert_eq!(node.first_literal(properties::MATERIAL_SPEC), Some("CA/7A"));
    }

    #[test]
    fn whitespace_in_codes_is_sanitized_in_identifiers() {
        let converter = converter();
        let mut graph = KnowledgeGraph::new();
        let mut index = NodeIndex::new();
        let summary =
            converter.convert_bom_structure(&mut graph, &mut index, "3011212000 0450Y7", None, &[]);
        assert!(!summary.master.as_str().contains(' '));
        assert!(summary.master.as_str().ends_with("3011212000_0450Y7"));
    }
}
