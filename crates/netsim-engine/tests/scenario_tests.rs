use netsim_engine::prelude::*;
use netsim_engine::mapper::{node_element, to_tree_node};
use netsim_engine::{
    clone_element_in_scenario, remove_element_from_scenario, update_element_in_scenario,
    ValidationError,
};
use netsim_model::{AppDeployment, DocumentFormat};
use netsim_test_utils::{
    add, element, element_of, id_of, populated_scenario, sample_document, sample_scenario,
};
use pretty_assertions::assert_eq;

#[test]
fn every_kind_round_trips_through_update() {
    let mut tree = sample_scenario();
    let table = parse_scenario(&tree).table;
    let names: Vec<String> = table
        .iter()
        .map(|(name, _)| name.to_string())
        .filter(|name| name != "demo")
        .collect();
    assert_eq!(names.len(), 16);

    for name in names {
        let before = element_of(&tree, &name);
        update_element_in_scenario(&mut tree, &before).unwrap();
        assert_eq!(element_of(&tree, &name), before, "{name}");
    }
}

#[test]
fn populated_elements_round_trip_through_mapper() {
    let mut tree = populated_scenario();
    let table = parse_scenario(&tree).table;
    let names: Vec<String> = table
        .iter()
        .map(|(name, _)| name.to_string())
        .filter(|name| name != "demo")
        .collect();
    assert_eq!(names.len(), 15);

    for name in names {
        let before = element_of(&tree, &name);
        let kind = before.kind().unwrap();
        let node = to_tree_node(kind, &before.id(), &before).unwrap();
        let mut after = node_element(&node, kind);
        after.set(Field::Parent, before.parent().into_owned());
        assert_eq!(after, before, "{name}");

        update_element_in_scenario(&mut tree, &before).unwrap();
        assert_eq!(element_of(&tree, &name), before, "{name}");
    }

    let cell = element_of(&tree, "operator-cell");
    assert_eq!(cell.text(Field::CellularMcc), "001");
    assert_eq!(cell.text(Field::CellularDefaultCellId), "1a2b3c4d5");
    assert_eq!(element_of(&tree, "poa-wifi-1").text(Field::PoaMacId), "0a1b2c3d4e5f");
    assert!(element_of(&tree, "cn-1").flag(Field::DnLadn));

    let ue = element_of(&tree, "ue-1");
    assert_eq!(ue.text(Field::GeoEopMode), "LOOP");
    assert_eq!(ue.float(Field::GeoVelocity), Some(12.5));
    assert_eq!(ue.text(Field::WirelessType), "wifi,5g");
    assert!(!ue.text(Field::GeoPath).is_empty());

    let app = element_of(&tree, "edge-app-1");
    assert_eq!(app.text(Field::EnvVar), "MODE=edge,LOG=debug");
    assert_eq!(app.text(Field::CmdArgs), "-c,run");
    assert_eq!(app.int(Field::MemoryMax), Some(512));
    assert_eq!(app.text(Field::PlacementId), "node-a");
    assert_eq!(element_of(&tree, "ue-app-1").text(Field::ChartGroup), "ue-group");
    assert_eq!(
        element_of(&tree, "cloud-app-1").text(Field::EgressSvcMap),
        "svc:grp:10.0.0.1:80:UDP"
    );

    let scenario = tree.to_scenario();
    let reimported = ScenarioTree::from_scenario(scenario).unwrap();
    assert_eq!(element_of(&reimported, "edge-app-1"), app);
    let key = reimported.key_of_name("ue-app-1").unwrap();
    let Some(netsim_engine::Node::Process(process)) = reimported.node(key) else {
        panic!("expected a process");
    };
    assert!(matches!(process.deployment, AppDeployment::UserChart(_)));
}

#[test]
fn rename_cascades_to_implicit_children() {
    let mut tree = sample_scenario();
    let mut op = element_of(&tree, "operator-1");
    op.set(Field::Name, "operator-2");
    update_element_in_scenario(&mut tree, &op).unwrap();

    for gone in ["operator-1", "operator-1-COMMON", "operator-1-COMMON-DEFAULT"] {
        assert!(!tree.contains_name(gone), "{gone}");
    }
    let zone = tree.key_of_name("operator-2-COMMON").unwrap();
    assert_eq!(tree.node(zone).unwrap().id(), "operator-2-COMMON");
    assert!(tree.contains_id("operator-2-COMMON-DEFAULT"));

    assert_eq!(element_of(&tree, "cn-1").parent(), "operator-2");
    assert_eq!(element_of(&tree, "zone-1").parent(), "operator-2");
}

#[test]
fn rename_onto_existing_name_changes_nothing() {
    let mut tree = sample_scenario();
    let before = tree.to_scenario();
    let mut zone = element_of(&tree, "zone-1");
    zone.set(Field::Name, "poa-1");
    let err = update_element_in_scenario(&mut tree, &zone).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateName(_)));
    assert_eq!(tree.to_scenario(), before);
}

#[test]
fn renaming_a_node_to_the_scenario_name_is_rejected() {
    let mut editor = ScenarioEditor::new(sample_scenario(), EngineConfig::default());
    let before = editor.tree().to_scenario();

    let mut zone = element_of(editor.tree(), "zone-1");
    zone.set(Field::Name, "demo");
    let err = editor.update(&zone).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateName(ref name) if name == "demo"), "{err}");

    assert_eq!(editor.tree().to_scenario(), before);
    assert!(editor.tree().contains_name("zone-1"));
    assert_eq!(editor.tree().net_char().unwrap().latency, 50);
}

#[test]
fn clone_copies_subtree_independently() {
    let mut tree = sample_scenario();
    let table = parse_scenario(&tree).table;
    let source = Element::new().with(Field::Name, "zone-1");
    clone_element_in_scenario(&mut tree, &source, &table).unwrap();

    for name in [
        "zone-1-copy",
        "zone-1-copy-DEFAULT",
        "poa-1-copy",
        "ue-1-copy",
        "ue-app-1-copy",
        "edge-app-1-copy",
    ] {
        assert!(tree.contains_name(name), "{name}");
    }
    assert_eq!(element_of(&tree, "poa-1-copy").parent(), "zone-1-copy");
    assert_ne!(id_of(&tree, "poa-1-copy"), id_of(&tree, "poa-1"));

    let mut copy = element_of(&tree, "poa-1-copy");
    copy.set(Field::GeoRadius, 500);
    update_element_in_scenario(&mut tree, &copy).unwrap();
    assert_eq!(element_of(&tree, "poa-1").int(Field::GeoRadius), None);
    assert_eq!(element_of(&tree, "poa-1-copy").int(Field::GeoRadius), Some(500));
}

#[test]
fn second_clone_gets_numbered_suffix() {
    let mut tree = sample_scenario();
    for expected in ["edge-1-copy", "edge-1-copy2"] {
        let table = parse_scenario(&tree).table;
        let source = Element::new().with(Field::Name, "edge-1");
        let id = clone_element_in_scenario(&mut tree, &source, &table).unwrap();
        assert_eq!(tree.find_node_by_id(&id).unwrap().name(), expected);
    }
}

#[test]
fn external_port_conflict_is_rejected_by_editor() {
    let mut editor = ScenarioEditor::new(sample_scenario(), EngineConfig::default());
    let app = |name: &str, port: i64| {
        element(NodeKind::EdgeApp, name, "edge-1")
            .with(Field::Port, 8080)
            .with(Field::ExtPort, port)
    };
    editor.add(&app("server-a", 32000)).unwrap();

    let err = editor.add(&app("server-b", 32000)).unwrap_err();
    match err {
        EngineError::Validation(ValidationError::PortConflict { element, other, ports }) => {
            assert_eq!(element, "server-b");
            assert_eq!(other, "server-a");
            assert_eq!(ports, "32000");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!editor.tree().contains_name("server-b"));

    editor.add(&app("server-b", 32001)).unwrap();
    assert!(editor.validate().is_empty());
}

#[test]
fn external_port_conflict_is_rejected_on_update() {
    let mut editor = ScenarioEditor::new(sample_scenario(), EngineConfig::default());
    let app = |name: &str, parent: &str, port: i64| {
        element(NodeKind::EdgeApp, name, parent)
            .with(Field::Port, 8080)
            .with(Field::ExtPort, port)
    };
    editor.add(&app("server-a", "edge-1", 32000)).unwrap();
    editor.add(&app("server-b", "fog-1", 32001)).unwrap();

    let mut server_b = element_of(editor.tree(), "server-b");
    server_b.set(Field::ExtPort, 32000);
    let err = editor.update(&server_b).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("server-a") && message.contains("server-b"), "{message}");
    assert_eq!(element_of(editor.tree(), "server-b").int(Field::ExtPort), Some(32001));

    server_b.set(Field::ExtPort, 32001);
    editor.update(&server_b).unwrap();
}

#[test]
fn clone_keeping_an_external_port_is_rejected() {
    let mut editor = ScenarioEditor::new(sample_scenario(), EngineConfig::default());
    let server = element(NodeKind::EdgeApp, "srv", "edge-1")
        .with(Field::Port, 8080)
        .with(Field::ExtPort, 31000);
    editor.add(&server).unwrap();
    let before = editor.tree().len();

    let err = editor
        .clone_element(&Element::new().with(Field::Name, "srv"))
        .unwrap_err();
    match err {
        EngineError::Validation(ValidationError::PortConflict { element, other, ports }) => {
            assert_eq!(element, "srv-copy");
            assert_eq!(other, "srv");
            assert_eq!(ports, "31000");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(editor.tree().len(), before);
    assert!(!editor.tree().contains_name("srv-copy"));
    assert!(editor.validate().is_empty());
}

#[test]
fn clone_name_over_the_length_limit_is_rejected() {
    let mut editor = ScenarioEditor::new(sample_scenario(), EngineConfig::default());
    let long = "e".repeat(30);
    editor.add(&element(NodeKind::Edge, &long, "zone-1")).unwrap();
    let before = editor.tree().len();

    let err = editor
        .clone_element(&Element::new().with(Field::Name, long.as_str()))
        .unwrap_err();
    assert!(
        matches!(
            err,
            EngineError::Validation(ValidationError::FieldErrors { field: Field::Name, .. })
        ),
        "{err}"
    );
    assert_eq!(editor.tree().len(), before);

    // a short name for the copy's root is accepted
    let source = id_of(editor.tree(), &long);
    let id = editor
        .clone_element(
            &Element::new()
                .with(Field::Id, source.as_str())
                .with(Field::Name, "edge-short"),
        )
        .unwrap();
    assert_eq!(editor.tree().find_node_by_id(&id).unwrap().name(), "edge-short");
    assert!(editor.validate().is_empty());
}

#[test]
fn removing_physical_location_removes_its_processes() {
    let mut tree = sample_scenario();
    add(&mut tree, NodeKind::EdgeApp, "edge-app-2", "edge-1");
    let before = tree.len();
    let ids = ["edge-1", "edge-app-1", "edge-app-2"].map(|n| id_of(&tree, n));

    let edge = element_of(&tree, "edge-1");
    let removed = remove_element_from_scenario(&mut tree, &edge).unwrap();
    assert_eq!(removed, ids.to_vec());
    assert_eq!(tree.len(), before - 3);
    for id in &ids {
        assert!(get_element(&tree, id).is_none());
    }

    // names are free again
    add(&mut tree, NodeKind::Edge, "edge-1", "zone-1");
}

#[test]
fn removing_unknown_or_implicit_fails() {
    let mut tree = sample_scenario();
    let ghost = Element::new().with(Field::Name, "ghost");
    assert!(remove_element_from_scenario(&mut tree, &ghost)
        .unwrap_err()
        .is_not_found());
    let implicit = Element::new().with(Field::Name, "zone-1-DEFAULT");
    assert!(matches!(
        remove_element_from_scenario(&mut tree, &implicit),
        Err(EngineError::NotEditable(_))
    ));
}

#[test]
fn document_round_trip_preserves_tree() {
    let tree = sample_scenario();
    for format in [DocumentFormat::Json, DocumentFormat::Yaml] {
        let text = sample_document(format);
        let parsed = Scenario::parse(&text, format).unwrap();
        let imported = ScenarioTree::from_scenario(parsed).unwrap();
        assert_eq!(imported.len(), tree.len());
        assert_eq!(
            imported.to_scenario().deployment.domains.len(),
            tree.to_scenario().deployment.domains.len()
        );
        assert_eq!(element_of(&imported, "ue-1").parent(), "poa-1");
        assert!(validate_scenario_ok(&imported));
    }
}

#[test]
fn import_fills_missing_ids_and_rejects_duplicate_names() {
    let tree = sample_scenario();
    let json = tree.to_scenario().to_json().unwrap();

    let ue_id = id_of(&tree, "ue-1");
    let blanked = json.replace(&format!("\"id\": \"{ue_id}\""), "\"id\": \"\"");
    let imported = ScenarioTree::from_scenario(Scenario::from_json(&blanked).unwrap()).unwrap();
    let new_id = id_of(&imported, "ue-1");
    assert!(!new_id.is_empty());
    assert_ne!(new_id, ue_id);

    let duplicated = json.replace("\"name\": \"ue-1\"", "\"name\": \"fog-1\"");
    let err = ScenarioTree::from_scenario(Scenario::from_json(&duplicated).unwrap()).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateName(name) if name == "fog-1"));
}

fn get_element(tree: &ScenarioTree, id: &str) -> Option<Element> {
    netsim_engine::get_element_from_scenario(tree, id)
}

fn validate_scenario_ok(tree: &ScenarioTree) -> bool {
    netsim_engine::validate_scenario(tree).is_empty()
}

mod properties {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    proptest! {
        #[test]
        fn names_stay_unique_across_adds(names in prop::collection::vec("[a-c]{1,2}", 1..12)) {
            let mut tree = sample_scenario();
            let mut seen = HashSet::new();
            for name in &names {
                let result = netsim_engine::add_element_to_scenario(
                    &mut tree,
                    &element(NodeKind::Zone, name, "operator-1"),
                );
                if seen.insert(name.clone()) {
                    prop_assert!(result.is_ok());
                } else {
                    prop_assert!(matches!(result, Err(EngineError::DuplicateName(_))));
                }
            }
            let table = parse_scenario(&tree).table;
            prop_assert_eq!(table.len(), 17 + seen.len());
        }

        #[test]
        fn clone_names_never_collide(rounds in 1usize..6) {
            let mut tree = sample_scenario();
            for _ in 0..rounds {
                let table = parse_scenario(&tree).table;
                let source = Element::new().with(Field::Name, "fog-1");
                clone_element_in_scenario(&mut tree, &source, &table).unwrap();
            }
            let table = parse_scenario(&tree).table;
            prop_assert_eq!(table.len(), 17 + rounds * 2);
        }
    }
}
