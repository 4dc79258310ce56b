// =============================================================================
// Conversion → Classification Pipeline Tests
// =============================================================================
// End-to-end flow over the public API: build the shared schema, convert a
// BOM structure, classify the master from its extracted specification,
// and cross-check the result against the schema's disjointness axioms.

use bom_ontology::classify::{
    apply_classification, classify, generate_suggestions, specs_from_node, validate_specs,
    ClassTag,
};
use bom_ontology::convert::{BomComponentRecord, BomConverter, MaterialRecord, NodeIndex};
use bom_ontology::graph::KnowledgeGraph;
use bom_ontology::schema::{classes, Schema};
use chrono::NaiveDate;

// 16-character synthetic cylinder code:
//   series [2,4) = "11", type [4,5) = "2", bore [5,8) = "120",
//   stroke [10,14) = "0450", rod end [14,15) = "Y".
const MASTER_CODE: &str = "30112120000450Y7";

fn component(code: &str, sequence: u32) -> BomComponentRecord {
    BomComponentRecord {
        code: code.to_string(),
        sequence,
        effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        expiry_date: NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
        quantity: 1.0,
        characteristic_code: None,
    }
}

#[test]
fn full_pipeline_from_records_to_taxonomy() {
    let schema = Schema::shared().expect("shared schema builds");
    let converter = BomConverter::new(schema.clone());
    let mut graph = KnowledgeGraph::new();
    let mut index = NodeIndex::new();

    converter.convert_material(
        &mut graph,
        &mut index,
        &MaterialRecord {
            code: MASTER_CODE.to_string(),
            name: Some("Hydraulic cylinder 120/450".to_string()),
            spec: Some("HC-120-450".to_string()),
        },
    );

    // Window [2,5) of "CP203FA" is "203", which attaches installation
    // type "FA" onto the master.
    let summary = converter.convert_bom_structure(
        &mut graph,
        &mut index,
        MASTER_CODE,
        Some("K01"),
        &[component("CP203FA", 10), component("BARREL-120", 20)],
    );
    assert_eq!(summary.components, 2);
    assert!(summary.features_extracted);

    let master = graph.node(&summary.master).expect("master node exists");
    let specs = specs_from_node(master);
    assert_eq!(specs.get("bore").map(String::as_str), Some("120"));
    assert_eq!(specs.get("installationType").map(String::as_str), Some("FA"));

    let validation = validate_specs(&specs);
    assert!(validation.valid, "errors: {:?}", validation.errors);
    assert!(validation.warnings.is_empty(), "warnings: {:?}", validation.warnings);

    let tags = classify(&specs);
    let expected = [
        ClassTag::HydraulicCylinder,
        ClassTag::LargeBore,
        ClassTag::LongStroke,
        ClassTag::HeavyDuty,
        ClassTag::YokeRodEnd,
        ClassTag::FrontAttachment,
    ];
    for tag in expected {
        assert!(tags.contains(&tag), "missing {tag}");
    }
    assert_eq!(tags.len(), expected.len());

    let master_id = summary.master.clone();
    apply_classification(&mut graph, &master_id, &tags);
    let master = graph.node(&master_id).unwrap();
    assert!(master.has_type(classes::HYDRAULIC_CYLINDER));
    assert!(master.has_type(classes::LARGE_BORE));
    assert!(master.has_type(classes::HEAVY_DUTY_CYLINDER));

    // No pair of attached types may violate a declared disjointness.
    let types: Vec<&str> = master.types().collect();
    for a in &types {
        for b in &types {
            assert!(
                a == b || !schema.are_disjoint(a, b),
                "{a} and {b} are disjoint but both attached"
            );
        }
    }
}

#[test]
fn reconversion_updates_instead_of_duplicating() {
    let schema = Schema::shared().unwrap();
    let converter = BomConverter::new(schema);
    let mut graph = KnowledgeGraph::new();
    let mut index = NodeIndex::new();
    let components = [component("CP203FA", 10)];

    let first =
        converter.convert_bom_structure(&mut graph, &mut index, MASTER_CODE, None, &components);
    let node_count = graph.len();

    let second =
        converter.convert_bom_structure(&mut graph, &mut index, MASTER_CODE, None, &components);

    assert_eq!(first.master, second.master);
    assert_eq!(graph.len(), node_count, "no new nodes on re-conversion");

    let master = graph.node(&first.master).unwrap();
    assert_eq!(master.values("hasBom").len(), 1, "no duplicate relation edges");
    assert_eq!(master.values("uses").len(), 1);
}

#[test]
fn suggestions_from_converted_specs() {
    let schema = Schema::shared().unwrap();
    let converter = BomConverter::new(schema);
    let mut graph = KnowledgeGraph::new();
    let mut index = NodeIndex::new();
    let summary = converter.convert_bom_structure(&mut graph, &mut index, MASTER_CODE, None, &[]);

    let specs = specs_from_node(graph.node(&summary.master).unwrap());
    let suggestions = generate_suggestions(&specs);
    assert!(!suggestions.is_empty());

    let codes: Vec<&str> = suggestions.iter().map(|s| s.code.as_str()).collect();
    assert!(codes.contains(&"PST11120-RF"), "heavy-duty series adds a reinforced piston");
    assert!(codes.contains(&"SLB11120-STD"), "bore 120 adds a buffer seal");
}
