//! Structural CRUD on a scenario tree
//!
//! Every mutation checks names and ids up front and only then touches the
//! arena, so a failed call leaves the tree unchanged.

use std::collections::{HashMap, HashSet};

use netsim_model::{
    AppDeployment, Connectivity, ConnectivityModel, Level, NetChar, NetCharScope, NodeKind,
};

use crate::config::EngineConfig;
use crate::element::{Element, Field};
use crate::error::{EngineError, Result};
use crate::flatten::ElementTable;
use crate::id;
use crate::mapper;
use crate::tree::{self, Node, NodeKey, ScenarioTree, Slot};
use crate::validate::ValidationError;

/// New scenario with the PUBLIC domain and its implicit children
///
/// # Errors
/// `DuplicateName` if `name` collides with the implicit public nodes
pub fn create_new_scenario(name: &str) -> Result<ScenarioTree> {
    let mut tree = ScenarioTree::new(name);
    tree.set_deployment(
        NetChar::defaults_for(NetCharScope::InterDomain),
        Connectivity {
            model: ConnectivityModel::Open,
        },
    );
    let public = tree::public_domain();
    let chain = implicit_chain(Level::Domain, public.name());
    insert_with_chain(&mut tree, Slot::Root, public, chain)?;
    tracing::info!(scenario = %name, "created scenario");
    Ok(tree)
}

/// Element view of the node with `id`; `None` when absent or implicit
#[must_use]
pub fn get_element_from_scenario(tree: &ScenarioTree, id: &str) -> Option<Element> {
    mapper::to_element(tree, id)
}

/// Insert a new node described by `element`, returning its id
///
/// # Errors
/// - `UnknownType` when the type is missing or is the scenario
/// - `ParentNotFound` / `InvalidParent` / `NoAttachPoint` for a bad parent
/// - `DuplicateName` when the name (or an implicit child's) is taken
pub fn add_element_to_scenario(tree: &mut ScenarioTree, element: &Element) -> Result<String> {
    add_element_with(tree, element, &EngineConfig::default())
}

pub(crate) fn add_element_with(
    tree: &mut ScenarioTree,
    element: &Element,
    config: &EngineConfig,
) -> Result<String> {
    let kind = element_kind(element)?;
    if kind == NodeKind::Scenario {
        return Err(EngineError::UnknownType(kind.label().to_string()));
    }
    let name = element.name().trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::MissingName.into());
    }

    let parent_name = element.parent().trim().to_string();
    let stated = if kind == NodeKind::DistantCloud {
        Slot::Root
    } else {
        let slot = tree
            .find_parent_slot_by_name(&parent_name)
            .ok_or_else(|| EngineError::ParentNotFound(parent_name.clone()))?;
        let parent_kind = tree.kind_of(slot);
        if !parent_kind.is_some_and(|p| kind.accepts_parent(p)) {
            return Err(EngineError::InvalidParent {
                kind,
                parent: parent_name,
            });
        }
        slot
    };
    let slot = tree.resolve_attach_point(stated, kind.level())?;

    let id = id::new_id_with(
        tree,
        &mut rand::rng(),
        config.max_id_attempts,
        &HashSet::new(),
    )?;
    let node = mapper::to_tree_node(kind, &id, element)?;
    let chain = implicit_chain(kind.level(), &name);
    insert_with_chain(tree, slot, node, chain)?;

    tracing::info!(%kind, %name, %id, parent = ?tree.name_of(slot), "added element");
    Ok(id)
}

/// Overwrite an existing node, or the scenario root, from `element`
///
/// Renaming a domain or zone renames its implicit children to match.
///
/// # Errors
/// - `NotFound` when no node has the element's id
/// - `NotEditable` for implicit nodes
/// - `TypeMismatch` when the element type differs from the node's
/// - `DuplicateName` when a new name is taken
pub fn update_element_in_scenario(tree: &mut ScenarioTree, element: &Element) -> Result<()> {
    update_element_with(tree, element)
}

pub(crate) fn update_element_with(tree: &mut ScenarioTree, element: &Element) -> Result<()> {
    let targets_root = match element.kind() {
        Some(kind) => kind == NodeKind::Scenario,
        None => element.id().trim() == tree.name(),
    };
    if targets_root {
        mapper::apply_scenario(tree, element);
        tracing::info!(scenario = %tree.name(), "updated scenario deployment");
        return Ok(());
    }

    let id = element.id().trim().to_string();
    let key = tree
        .key_of_id(&id)
        .ok_or_else(|| EngineError::NotFound(id.clone()))?;
    let (actual, old_name) = {
        let node = tree
            .node(key)
            .ok_or_else(|| EngineError::NotFound(id.clone()))?;
        let actual = node
            .kind()
            .ok_or_else(|| EngineError::NotEditable(node.name().to_string()))?;
        (actual, node.name().to_string())
    };
    let requested = element_kind(element)?;
    if requested != actual {
        return Err(EngineError::TypeMismatch {
            name: old_name,
            actual,
            requested,
        });
    }
    let new_name = element.name().trim().to_string();
    if new_name.is_empty() {
        return Err(ValidationError::MissingName.into());
    }

    let renames = if new_name == old_name {
        Vec::new()
    } else {
        rename_plan(tree, key, &new_name)?
    };

    for (k, name, implicit) in &renames {
        tree.rename(*k, name)?;
        if *implicit {
            tree.reassign_id(*k, name)?;
        }
    }
    if let Some(node) = tree.node_mut(key) {
        mapper::update_node(node, element);
    }

    tracing::info!(kind = %actual, name = %new_name, %id, renamed = renames.len(), "updated element");
    Ok(())
}

/// Renames for a node and its implicit chain, checked against the tree
fn rename_plan(
    tree: &ScenarioTree,
    key: NodeKey,
    new_name: &str,
) -> Result<Vec<(NodeKey, String, bool)>> {
    let mut plan = vec![(key, new_name.to_string(), false)];
    let mut current = key;
    let mut current_name = new_name.to_string();
    while let Some(child) = tree.implicit_child(Slot::Node(current)) {
        let suffix = tree
            .level_of(Slot::Node(current))
            .and_then(Level::implicit_child_suffix)
            .unwrap_or_default();
        current_name = format!("{current_name}{suffix}");
        plan.push((child, current_name.clone(), true));
        current = child;
    }
    for (k, name, implicit) in &plan {
        if tree.contains_name(name) {
            return Err(EngineError::DuplicateName(name.clone()));
        }
        if *implicit && tree.contains_id(name) && tree.key_of_id(name) != Some(*k) {
            return Err(EngineError::DuplicateId(name.clone()));
        }
    }
    tracing::debug!(count = plan.len(), "cascading rename");
    Ok(plan)
}

/// Deep-copy a node's subtree next to it, returning the new root's id
///
/// The source is found by the element's id, or by its name when the id is
/// blank. The copy's root takes the element's name when it is free; other
/// names get a unique suffix. When the element carries a type, the copy's
/// root attributes come from the element.
///
/// # Errors
/// - `NotFound` when the source is absent
/// - `NotEditable` for the scenario root and implicit nodes
/// - `TypeMismatch` when the element type differs from the source's
pub fn clone_element_in_scenario(
    tree: &mut ScenarioTree,
    element: &Element,
    table: &ElementTable,
) -> Result<String> {
    clone_element_with(tree, element, table, &EngineConfig::default())
}

struct ClonePlan {
    old: NodeKey,
    id: String,
    node: Node,
}

pub(crate) fn clone_element_with(
    tree: &mut ScenarioTree,
    element: &Element,
    table: &ElementTable,
    config: &EngineConfig,
) -> Result<String> {
    let source = find_clone_source(tree, element)?;
    let source_node = tree
        .node(source)
        .ok_or_else(|| EngineError::NotFound(element.id().into_owned()))?;
    let kind = source_node
        .kind()
        .ok_or_else(|| EngineError::NotEditable(source_node.name().to_string()))?;
    let source_name = source_node.name().to_string();
    let parent = tree
        .parent_of(source)
        .ok_or_else(|| EngineError::NotFound(source_name.clone()))?;

    let mut reserved_names: HashSet<String> = HashSet::new();
    let mut reserved_ids: HashSet<String> = HashSet::new();
    let mut new_names: HashMap<NodeKey, String> = HashMap::new();
    let mut plan = Vec::new();
    let mut rng = rand::rng();

    for old in tree.subtree(source) {
        let Some(node) = tree.node(old) else {
            continue;
        };
        let is_root = old == source;
        let taken = |n: &str, reserved: &HashSet<String>| {
            table.contains_name(n) || tree.contains_name(n) || reserved.contains(n)
        };

        let name = if is_root {
            let requested = element.name().trim().to_string();
            if !requested.is_empty() && requested != source_name && !taken(&requested, &reserved_names) {
                requested
            } else {
                unique_name(&source_name, &config.clone_suffix, |n| taken(n, &reserved_names))
            }
        } else if node.is_implicit() {
            let parent_key = match tree.parent_of(old) {
                Some(Slot::Node(k)) => k,
                _ => return Err(EngineError::NotEditable(node.name().to_string())),
            };
            let parent_name = new_names
                .get(&parent_key)
                .cloned()
                .ok_or_else(|| EngineError::NotFound(node.name().to_string()))?;
            let suffix = tree
                .level_of(Slot::Node(parent_key))
                .and_then(Level::implicit_child_suffix)
                .unwrap_or_default();
            let name = format!("{parent_name}{suffix}");
            if taken(&name, &reserved_names) {
                return Err(EngineError::DuplicateName(name));
            }
            name
        } else {
            unique_name(node.name(), &config.clone_suffix, |n| taken(n, &reserved_names))
        };

        let id = if node.is_implicit() {
            if tree.contains_id(&name) || reserved_ids.contains(&name) {
                return Err(EngineError::DuplicateId(name));
            }
            name.clone()
        } else {
            id::new_id_with(tree, &mut rng, config.max_id_attempts, &reserved_ids)?
        };

        let mut copy = if is_root && element.kind().is_some() {
            let requested = element_kind(element)?;
            if requested != kind {
                return Err(EngineError::TypeMismatch {
                    name: source_name,
                    actual: kind,
                    requested,
                });
            }
            mapper::to_tree_node(kind, &id, element)?
        } else {
            node.clone()
        };
        *copy.id_mut() = id.clone();
        *copy.name_mut() = name.clone();
        if !is_root {
            clear_exposed_ports(&mut copy);
        }

        reserved_names.insert(name.clone());
        reserved_ids.insert(id.clone());
        new_names.insert(old, name);
        plan.push(ClonePlan { old, id, node: copy });
    }

    let mut new_keys: HashMap<NodeKey, NodeKey> = HashMap::new();
    let mut root_id = String::new();
    for step in plan {
        let slot = if step.old == source {
            parent
        } else {
            match tree.parent_of(step.old) {
                Some(Slot::Node(p)) => new_keys
                    .get(&p)
                    .copied()
                    .map(Slot::Node)
                    .ok_or_else(|| EngineError::NotFound(step.id.clone()))?,
                _ => parent,
            }
        };
        if step.old == source {
            root_id.clone_from(&step.id);
        }
        let key = tree.attach(slot, step.node)?;
        new_keys.insert(step.old, key);
    }

    tracing::info!(%kind, source = %source_name, id = %root_id, nodes = new_keys.len(), "cloned element");
    Ok(root_id)
}

fn find_clone_source(tree: &ScenarioTree, element: &Element) -> Result<NodeKey> {
    let id = element.id().trim().to_string();
    if id == tree.name() {
        return Err(EngineError::NotEditable(id));
    }
    let key = if id.is_empty() {
        tree.key_of_name(element.name().trim())
    } else {
        tree.key_of_id(&id)
    };
    key.ok_or_else(|| {
        EngineError::NotFound(if id.is_empty() {
            element.name().into_owned()
        } else {
            id
        })
    })
}

/// Drop externally exposed ports from a copied process
fn clear_exposed_ports(node: &mut Node) {
    let Node::Process(process) = node else {
        return;
    };
    match &mut process.deployment {
        AppDeployment::External(ext) => {
            ext.ingress_service_map.clear();
            ext.egress_service_map.clear();
        }
        AppDeployment::Container(c) => {
            if let Some(svc) = &mut c.service_config {
                for port in &mut svc.ports {
                    port.external_port = None;
                }
            }
        }
        AppDeployment::UserChart(_) => {}
    }
}

/// First of `<base><suffix>`, `<base><suffix>2`, ... that is not taken
pub fn unique_name(base: &str, suffix: &str, taken: impl Fn(&str) -> bool) -> String {
    let first = format!("{base}{suffix}");
    if !taken(&first) {
        return first;
    }
    (2u64..)
        .map(|n| format!("{first}{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or(first)
}

/// Remove the node named by `element` and its subtree, returning removed ids
///
/// # Errors
/// `NotFound` when no node has that name, `NotEditable` for the root and
/// implicit nodes
pub fn remove_element_from_scenario(
    tree: &mut ScenarioTree,
    element: &Element,
) -> Result<Vec<String>> {
    let name = element.name().trim().to_string();
    if name == tree.name() {
        return Err(EngineError::NotEditable(name));
    }
    let key = tree
        .key_of_name(&name)
        .ok_or_else(|| EngineError::NotFound(name.clone()))?;
    if tree.node(key).is_some_and(Node::is_implicit) {
        return Err(EngineError::NotEditable(name));
    }
    let removed = tree.detach(key);
    tracing::info!(%name, removed = removed.len(), "removed element");
    Ok(removed)
}

fn element_kind(element: &Element) -> Result<NodeKind> {
    element
        .kind()
        .ok_or_else(|| EngineError::UnknownType(element.text(Field::Type).into_owned()))
}

/// Implicit nodes created under a new node at `level`
fn implicit_chain(level: Level, name: &str) -> Vec<Node> {
    let mut chain = Vec::new();
    let mut level = level;
    let mut name = name.to_string();
    while let Some(child) = tree::implicit_child_for(level, &name) {
        level = child.level();
        name = child.name().to_string();
        chain.push(child);
    }
    chain
}

fn insert_with_chain(
    tree: &mut ScenarioTree,
    slot: Slot,
    node: Node,
    chain: Vec<Node>,
) -> Result<NodeKey> {
    for n in std::iter::once(&node).chain(&chain) {
        if tree.contains_name(n.name()) {
            return Err(EngineError::DuplicateName(n.name().to_string()));
        }
        if tree.contains_id(n.id()) {
            return Err(EngineError::DuplicateId(n.id().to_string()));
        }
    }
    let key = tree.attach(slot, node)?;
    let mut parent = key;
    for child in chain {
        parent = tree.attach(Slot::Node(parent), child)?;
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::parse_scenario;
    use pretty_assertions::assert_eq;

    fn el(kind: NodeKind, name: &str, parent: &str) -> Element {
        Element::blank(kind)
            .with(Field::Name, name)
            .with(Field::Parent, parent)
    }

    fn sample() -> ScenarioTree {
        let mut tree = create_new_scenario("demo").unwrap();
        add_element_to_scenario(&mut tree, &el(NodeKind::Operator, "op-a", "demo")).unwrap();
        add_element_to_scenario(&mut tree, &el(NodeKind::Zone, "zone-1", "op-a")).unwrap();
        add_element_to_scenario(&mut tree, &el(NodeKind::Poa, "poa-1", "zone-1")).unwrap();
        tree
    }

    #[test]
    fn new_scenario_has_public_chain() {
        let tree = create_new_scenario("demo").unwrap();
        assert!(tree.contains_id("PUBLIC"));
        assert!(tree.contains_id("PUBLIC-COMMON"));
        assert!(tree.contains_id("PUBLIC-COMMON-DEFAULT"));
        assert_eq!(tree.connectivity().unwrap().model, ConnectivityModel::Open);
        assert_eq!(tree.net_char().unwrap().latency, 50);
    }

    #[test]
    fn add_domain_creates_implicit_children() {
        let tree = sample();
        assert!(tree.contains_name("op-a-COMMON"));
        assert!(tree.contains_name("op-a-COMMON-DEFAULT"));
        assert!(tree.contains_name("zone-1-DEFAULT"));
        let d = tree.key_of_name("op-a").unwrap();
        let zone = tree.implicit_child(Slot::Node(d)).unwrap();
        assert_eq!(tree.node(zone).unwrap().id(), "op-a-COMMON");
    }

    #[test]
    fn edge_under_operator_lands_in_default_location() {
        let mut tree = sample();
        let id =
            add_element_to_scenario(&mut tree, &el(NodeKind::Edge, "edge-1", "op-a")).unwrap();
        let key = tree.key_of_id(&id).unwrap();
        let parent = tree.parent_of(key).unwrap();
        assert_eq!(tree.name_of(parent), Some("op-a-COMMON-DEFAULT"));
    }

    #[test]
    fn dc_ignores_stated_parent() {
        let mut tree = sample();
        let id =
            add_element_to_scenario(&mut tree, &el(NodeKind::DistantCloud, "cloud", "op-a"))
                .unwrap();
        let key = tree.key_of_id(&id).unwrap();
        let parent = tree.parent_of(key).unwrap();
        assert_eq!(tree.name_of(parent), Some("PUBLIC-COMMON-DEFAULT"));
        assert_eq!(tree.visible_parent(key), Slot::Root);
    }

    #[test]
    fn add_rejects_bad_parents() {
        let mut tree = sample();
        let err = add_element_to_scenario(&mut tree, &el(NodeKind::Ue, "ue-1", "missing"))
            .unwrap_err();
        assert!(matches!(err, EngineError::ParentNotFound(_)));
        assert!(err.is_not_found());

        let err =
            add_element_to_scenario(&mut tree, &el(NodeKind::Ue, "ue-1", "zone-1")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParent { .. }));

        let err = add_element_to_scenario(&mut tree, &el(NodeKind::Poa, "poa-1", "zone-1"))
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateName(_)));
    }

    #[test]
    fn add_domain_with_colliding_implicit_name_is_atomic() {
        let mut tree = sample();
        add_element_to_scenario(&mut tree, &el(NodeKind::Zone, "op-b-COMMON", "op-a")).unwrap();
        let before = tree.len();
        let err = add_element_to_scenario(&mut tree, &el(NodeKind::Operator, "op-b", "demo"))
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateName(n) if n == "op-b-COMMON"));
        assert_eq!(tree.len(), before);
        assert!(!tree.contains_name("op-b"));
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let mut tree = sample();
        let e = el(NodeKind::Zone, "zone-x", "op-a").with(Field::Id, "nope");
        assert!(matches!(
            update_element_in_scenario(&mut tree, &e),
            Err(EngineError::NotFound(_))
        ));
    }

    #[test]
    fn update_type_mismatch() {
        let mut tree = sample();
        let id = tree.key_of_name("zone-1").map(|k| tree.node(k).unwrap().id().to_string()).unwrap();
        let e = el(NodeKind::Poa, "zone-1", "op-a").with(Field::Id, id.as_str());
        assert!(matches!(
            update_element_in_scenario(&mut tree, &e),
            Err(EngineError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn update_implicit_is_not_editable() {
        let mut tree = sample();
        let e = el(NodeKind::Zone, "renamed", "op-a").with(Field::Id, "op-a-COMMON");
        assert!(matches!(
            update_element_in_scenario(&mut tree, &e),
            Err(EngineError::NotEditable(_))
        ));
    }

    #[test]
    fn update_scenario_deployment() {
        let mut tree = sample();
        let mut e = get_element_from_scenario(&tree, "demo").unwrap();
        e.set(Field::ConnectivityModel, "PDU");
        e.set(
            Field::net_char(NetCharScope::InterDomain, crate::element::NetCharAttr::Latency),
            80,
        );
        update_element_in_scenario(&mut tree, &e).unwrap();
        assert_eq!(tree.connectivity().unwrap().model, ConnectivityModel::Pdu);
        assert_eq!(tree.net_char().unwrap().latency, 80);
    }

    #[test]
    fn zone_rename_cascades_to_default() {
        let mut tree = sample();
        let id = tree.node(tree.key_of_name("zone-1").unwrap()).unwrap().id().to_string();
        let mut e = get_element_from_scenario(&tree, &id).unwrap();
        e.set(Field::Name, "zone-2");
        update_element_in_scenario(&mut tree, &e).unwrap();
        assert!(tree.contains_name("zone-2-DEFAULT"));
        assert!(tree.contains_id("zone-2-DEFAULT"));
        assert!(!tree.contains_name("zone-1-DEFAULT"));
        assert_eq!(tree.find_node_by_id(&id).unwrap().name(), "zone-2");
        // poa-1 still hangs under the renamed default location
        let poa = tree.key_of_name("poa-1").unwrap();
        assert_eq!(tree.name_of(tree.parent_of(poa).unwrap()), Some("zone-2-DEFAULT"));
    }

    #[test]
    fn clone_names_and_ids() {
        let mut tree = sample();
        let table = parse_scenario(&tree).table;
        let src = tree.node(tree.key_of_name("zone-1").unwrap()).unwrap().id().to_string();
        let e = Element::new()
            .with(Field::Id, src.as_str())
            .with(Field::Name, "zone-9");
        let id = clone_element_in_scenario(&mut tree, &e, &table).unwrap();
        assert_ne!(id, src);
        assert_eq!(tree.find_node_by_id(&id).unwrap().name(), "zone-9");
        assert!(tree.contains_name("zone-9-DEFAULT"));
        assert!(tree.contains_name("poa-1-copy"));
    }

    #[test]
    fn clone_derives_root_name_when_taken() {
        let mut tree = sample();
        let table = parse_scenario(&tree).table;
        let e = Element::new().with(Field::Name, "poa-1");
        clone_element_in_scenario(&mut tree, &e, &table).unwrap();
        assert!(tree.contains_name("poa-1-copy"));
        clone_element_in_scenario(&mut tree, &e, &table).unwrap();
        assert!(tree.contains_name("poa-1-copy2"));
    }

    #[test]
    fn clone_rejects_implicit_and_root() {
        let mut tree = sample();
        let table = parse_scenario(&tree).table;
        let e = Element::new().with(Field::Id, "PUBLIC");
        assert!(matches!(
            clone_element_in_scenario(&mut tree, &e, &table),
            Err(EngineError::NotEditable(_))
        ));
        let e = Element::new().with(Field::Id, "demo");
        assert!(matches!(
            clone_element_in_scenario(&mut tree, &e, &table),
            Err(EngineError::NotEditable(_))
        ));
    }

    #[test]
    fn remove_by_name() {
        let mut tree = sample();
        let removed = remove_element_from_scenario(&mut tree, &el(NodeKind::Zone, "zone-1", ""))
            .unwrap();
        assert_eq!(removed.len(), 3);
        assert!(!tree.contains_name("poa-1"));
        assert!(matches!(
            remove_element_from_scenario(&mut tree, &el(NodeKind::Zone, "zone-1", "")),
            Err(EngineError::NotFound(_))
        ));
        assert!(matches!(
            remove_element_from_scenario(&mut tree, &el(NodeKind::Zone, "op-a-COMMON", "")),
            Err(EngineError::NotEditable(_))
        ));
    }

    #[test]
    fn unique_name_sequence() {
        let taken = ["a-copy", "a-copy2"];
        assert_eq!(unique_name("a", "-copy", |n| taken.contains(&n)), "a-copy3");
        assert_eq!(unique_name("b", "-copy", |n| taken.contains(&n)), "b-copy");
    }
}
