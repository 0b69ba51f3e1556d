//! Property tests for termination, idempotence and repair convergence

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use slotgraph_core::{InstantiateOptions, ObjectGraph};
use slotgraph_document::{DocId, Document, SlotDef, SlotPath};
use slotgraph_store::MemoryStore;
use slotgraph_test_utils::{door_catalog, extends, instance_doc, linked_to, type_doc, with_slot};
use std::future::Future;

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn cells_path() -> SlotPath {
    "children.cells".parse().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Arbitrary parent pointers, cycles included, never exceed the bound
    #[test]
    fn chain_length_is_bounded(
        parents in prop::collection::vec(0usize..8, 1..8),
        start in 0usize..8,
        max_depth in 0usize..10,
    ) {
        let count = parents.len();
        let docs: Vec<Document> = parents
            .iter()
            .enumerate()
            .map(|(index, parent)| extends(type_doc(&format!("t{index}")), &format!("t{}", parent % count)))
            .collect();
        let graph = ObjectGraph::new(MemoryStore::with_documents(docs));

        let chain = block_on(graph.type_chain(&DocId::type_id(&format!("t{}", start % count)), max_depth));
        prop_assert!(chain.len() <= max_depth + 1);
        prop_assert!(chain.len() <= count);
        prop_assert!(!chain.is_empty());
    }

    /// A second put with unchanged slots leaves every child as it was
    #[test]
    fn put_instance_is_idempotent_for_children(panels in 0usize..6) {
        let store = MemoryStore::with_documents(door_catalog());
        let graph = ObjectGraph::new(store.clone());

        let panel_ids: Vec<Value> = (0..panels).map(|i| json!(format!("inst:panel{i}"))).collect();
        for i in 0..panels {
            store.insert_raw(instance_doc(&format!("panel{i}"), "panel"));
        }
        let door = instance_doc("door", "door")
            .with_path(&"children.panels".parse().unwrap(), Value::Array(panel_ids));

        let stored = block_on(graph.put_instance(door)).unwrap();
        let after_first = store.snapshot();
        block_on(graph.put_instance(stored)).unwrap();
        let after_second = store.snapshot();

        for (first, second) in after_first.iter().zip(&after_second) {
            if first.id != DocId::instance_id("door") {
                prop_assert_eq!(first, second);
            }
        }
        for i in 0..panels {
            let panel = store.peek(&DocId::instance_id(&format!("panel{i}"))).unwrap();
            prop_assert_eq!(panel.parent, Some(DocId::instance_id("door")));
        }
    }

    /// Random forward references and stale back-references converge after repair
    #[test]
    fn repair_then_validate_is_clean(
        claims in prop::collection::vec(prop::collection::vec(0usize..6, 0..4), 1..4),
        stale in prop::collection::vec(prop::option::of(0usize..6), 6),
    ) {
        let row = with_slot(type_doc("row"), "children.cells", SlotDef::new("type:cell").array());
        let store = MemoryStore::with_documents(vec![row, type_doc("cell")]);

        for (index, parent) in stale.iter().enumerate() {
            let cell = instance_doc(&format!("c{index}"), "cell");
            let cell = match parent {
                Some(parent) => linked_to(cell, &format!("r{parent}"), "children.cells"),
                None => cell,
            };
            store.insert_raw(cell);
        }
        for (index, cells) in claims.iter().enumerate() {
            let ids: Vec<Value> = cells.iter().map(|c| json!(format!("inst:c{c}"))).collect();
            store.insert_raw(instance_doc(&format!("r{index}"), "row").with_path(&cells_path(), Value::Array(ids)));
        }

        let graph = ObjectGraph::new(store);
        let stats = block_on(graph.repair_parent_links()).unwrap();
        prop_assert_eq!(stats.errors, 0);
        prop_assert!(block_on(graph.validate_parent_links()).unwrap().is_empty());
        prop_assert!(block_on(graph.repair_parent_links()).unwrap().is_clean());
    }

    /// Every templated child links back to the root through its slot
    #[test]
    fn array_template_cardinality(names in prop::collection::vec("[a-z]{1,6}", 0..6)) {
        let template: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();
        let def: SlotDef = serde_json::from_value(json!({
            "type": "type:cell",
            "array": true,
            "template": template
        }))
        .unwrap();
        let store = MemoryStore::with_documents(vec![
            with_slot(type_doc("row"), "children.cells", def),
            type_doc("cell"),
        ]);
        let graph = ObjectGraph::new(store);

        let tree = block_on(graph.create_instance_from_type(
            DocId::instance_id("r"),
            &DocId::type_id("row"),
            Map::new(),
            InstantiateOptions::preview(),
        ))
        .unwrap();

        prop_assert_eq!(tree.children().len(), names.len());
        for child in tree.children() {
            prop_assert_eq!(child.parent.as_ref(), Some(&DocId::instance_id("r")));
            prop_assert_eq!(child.parent_slot.as_deref(), Some("children.cells"));
        }
    }
}
