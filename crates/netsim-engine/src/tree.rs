//! Arena-backed scenario tree
//!
//! Nodes live in a [`SlotMap`] with parent/children index lists. Ids and
//! names are indexed for O(1) lookup. Domains and zones keep an explicit
//! link to their implicit COMMON/DEFAULT child, and the root links to the
//! PUBLIC domain, so renames never depend on string conventions.
//!
//! The nested [`Scenario`] document is only the import/export format.

use std::collections::HashMap;

use netsim_model::{
    Connectivity, Domain, DomainAttrs, DomainType, Level, NetChar, NetworkLocation,
    NetworkLocationAttrs, NetworkLocationType, NodeKind, PhysicalLocation, PhysicalLocationAttrs,
    Process, Scenario, Zone, ZoneAttrs, ZoneType,
};
use slotmap::{new_key_type, SlotMap};

use crate::error::{EngineError, Result};
use crate::id;

new_key_type! {
    /// Arena key of a tree node
    pub struct NodeKey;
}

/// Attributes of one node, tagged by level
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Domain(DomainAttrs),
    Zone(ZoneAttrs),
    NetworkLocation(NetworkLocationAttrs),
    PhysicalLocation(PhysicalLocationAttrs),
    Process(Process),
}

impl Node {
    /// Unique id
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Domain(a) => &a.id,
            Self::Zone(a) => &a.id,
            Self::NetworkLocation(a) => &a.id,
            Self::PhysicalLocation(a) => &a.id,
            Self::Process(a) => &a.id,
        }
    }

    /// Unique name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Domain(a) => &a.name,
            Self::Zone(a) => &a.name,
            Self::NetworkLocation(a) => &a.name,
            Self::PhysicalLocation(a) => &a.name,
            Self::Process(a) => &a.name,
        }
    }

    pub(crate) fn id_mut(&mut self) -> &mut String {
        match self {
            Self::Domain(a) => &mut a.id,
            Self::Zone(a) => &mut a.id,
            Self::NetworkLocation(a) => &mut a.id,
            Self::PhysicalLocation(a) => &mut a.id,
            Self::Process(a) => &mut a.id,
        }
    }

    pub(crate) fn name_mut(&mut self) -> &mut String {
        match self {
            Self::Domain(a) => &mut a.name,
            Self::Zone(a) => &mut a.name,
            Self::NetworkLocation(a) => &mut a.name,
            Self::PhysicalLocation(a) => &mut a.name,
            Self::Process(a) => &mut a.name,
        }
    }

    /// Tree level
    #[must_use]
    pub fn level(&self) -> Level {
        match self {
            Self::Domain(_) => Level::Domain,
            Self::Zone(_) => Level::Zone,
            Self::NetworkLocation(_) => Level::NetworkLocation,
            Self::PhysicalLocation(_) => Level::PhysicalLocation,
            Self::Process(_) => Level::Process,
        }
    }

    /// Editable kind; `None` for PUBLIC, COMMON and DEFAULT nodes
    #[must_use]
    pub fn kind(&self) -> Option<NodeKind> {
        match self {
            Self::Domain(a) => a.kind.kind(),
            Self::Zone(a) => a.kind.kind(),
            Self::NetworkLocation(a) => a.kind.kind(),
            Self::PhysicalLocation(a) => Some(a.kind.kind()),
            Self::Process(a) => Some(a.kind.kind()),
        }
    }

    /// Whether this is an implicit node
    #[inline]
    #[must_use]
    pub fn is_implicit(&self) -> bool {
        self.kind().is_none()
    }

    /// netChar bundle, if any
    #[must_use]
    pub fn net_char(&self) -> Option<&NetChar> {
        match self {
            Self::Domain(a) => a.net_char.as_ref(),
            Self::Zone(a) => a.net_char.as_ref(),
            Self::NetworkLocation(a) => a.net_char.as_ref(),
            Self::PhysicalLocation(a) => a.net_char.as_ref(),
            Self::Process(a) => a.net_char.as_ref(),
        }
    }
}

/// Arena entry
#[derive(Debug, Clone)]
pub struct TreeNode {
    node: Node,
    parent: Slot,
    children: Vec<NodeKey>,
    implicit_child: Option<NodeKey>,
}

impl TreeNode {
    /// Node attributes
    #[inline]
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Structural parent
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Slot {
        self.parent
    }

    /// Ordered children
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Implicit COMMON/DEFAULT child
    #[inline]
    #[must_use]
    pub fn implicit_child(&self) -> Option<NodeKey> {
        self.implicit_child
    }
}

/// Position that can own children: the root or a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Root,
    Node(NodeKey),
}

/// In-memory scenario
#[derive(Debug, Clone)]
pub struct ScenarioTree {
    name: String,
    version: Option<String>,
    scenario_id: Option<String>,
    description: Option<String>,
    net_char: Option<NetChar>,
    connectivity: Option<Connectivity>,
    domains: Vec<NodeKey>,
    public_domain: Option<NodeKey>,
    nodes: SlotMap<NodeKey, TreeNode>,
    ids: HashMap<String, NodeKey>,
    names: HashMap<String, NodeKey>,
}

impl ScenarioTree {
    /// Empty tree with no domains
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            scenario_id: None,
            description: None,
            net_char: None,
            connectivity: None,
            domains: Vec::new(),
            public_domain: None,
            nodes: SlotMap::with_key(),
            ids: HashMap::new(),
            names: HashMap::new(),
        }
    }

    /// Build the arena from a nested document
    ///
    /// Missing ids are filled with fresh ones.
    ///
    /// # Errors
    /// Returns `DuplicateId`/`DuplicateName` when the document breaks
    /// uniqueness
    pub fn from_scenario(scenario: Scenario) -> Result<Self> {
        let mut tree = Self::new(scenario.name);
        tree.version = scenario.version;
        tree.scenario_id = scenario.id;
        tree.description = scenario.description;
        tree.net_char = scenario.deployment.net_char;
        tree.connectivity = scenario.deployment.connectivity;

        for domain in scenario.deployment.domains {
            let d = tree.import(Slot::Root, Node::Domain(domain.attrs))?;
            for zone in domain.zones {
                let z = tree.import(Slot::Node(d), Node::Zone(zone.attrs))?;
                for nl in zone.network_locations {
                    let n = tree.import(Slot::Node(z), Node::NetworkLocation(nl.attrs))?;
                    for pl in nl.physical_locations {
                        let p = tree.import(Slot::Node(n), Node::PhysicalLocation(pl.attrs))?;
                        for process in pl.processes {
                            tree.import(Slot::Node(p), Node::Process(process))?;
                        }
                    }
                }
            }
        }
        tracing::debug!(scenario = %tree.name, nodes = tree.len(), "imported scenario");
        Ok(tree)
    }

    fn import(&mut self, parent: Slot, mut node: Node) -> Result<NodeKey> {
        if node.id().is_empty() {
            *node.id_mut() = id::new_id(self)?;
        }
        self.attach(parent, node)
    }

    /// Rebuild the nested document
    #[must_use]
    pub fn to_scenario(&self) -> Scenario {
        let mut scenario = Scenario::named(self.name.clone());
        scenario.version.clone_from(&self.version);
        scenario.id.clone_from(&self.scenario_id);
        scenario.description.clone_from(&self.description);
        scenario.deployment.net_char.clone_from(&self.net_char);
        scenario.deployment.connectivity = self.connectivity;
        scenario.deployment.domains = self
            .domains
            .iter()
            .filter_map(|k| self.export_domain(*k))
            .collect();
        scenario
    }

    fn export_domain(&self, key: NodeKey) -> Option<Domain> {
        let entry = self.nodes.get(key)?;
        let Node::Domain(attrs) = &entry.node else {
            return None;
        };
        Some(Domain {
            attrs: attrs.clone(),
            zones: entry
                .children
                .iter()
                .filter_map(|k| self.export_zone(*k))
                .collect(),
        })
    }

    fn export_zone(&self, key: NodeKey) -> Option<Zone> {
        let entry = self.nodes.get(key)?;
        let Node::Zone(attrs) = &entry.node else {
            return None;
        };
        Some(Zone {
            attrs: attrs.clone(),
            network_locations: entry
                .children
                .iter()
                .filter_map(|k| self.export_network_location(*k))
                .collect(),
        })
    }

    fn export_network_location(&self, key: NodeKey) -> Option<NetworkLocation> {
        let entry = self.nodes.get(key)?;
        let Node::NetworkLocation(attrs) = &entry.node else {
            return None;
        };
        Some(NetworkLocation {
            attrs: attrs.clone(),
            physical_locations: entry
                .children
                .iter()
                .filter_map(|k| self.export_physical_location(*k))
                .collect(),
        })
    }

    fn export_physical_location(&self, key: NodeKey) -> Option<PhysicalLocation> {
        let entry = self.nodes.get(key)?;
        let Node::PhysicalLocation(attrs) = &entry.node else {
            return None;
        };
        Some(PhysicalLocation {
            attrs: attrs.clone(),
            processes: entry
                .children
                .iter()
                .filter_map(|k| match self.nodes.get(*k).map(|e| &e.node) {
                    Some(Node::Process(p)) => Some(p.clone()),
                    _ => None,
                })
                .collect(),
        })
    }

    /// Scenario name (also the root element's id)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Deployment netChar
    #[inline]
    #[must_use]
    pub fn net_char(&self) -> Option<&NetChar> {
        self.net_char.as_ref()
    }

    /// Deployment connectivity
    #[inline]
    #[must_use]
    pub fn connectivity(&self) -> Option<Connectivity> {
        self.connectivity
    }

    pub(crate) fn set_deployment(&mut self, net_char: NetChar, connectivity: Connectivity) {
        self.net_char = Some(net_char);
        self.connectivity = Some(connectivity);
    }

    /// Top-level domains in order
    #[inline]
    #[must_use]
    pub fn domains(&self) -> &[NodeKey] {
        &self.domains
    }

    /// The PUBLIC domain, if present
    #[inline]
    #[must_use]
    pub fn public_domain(&self) -> Option<NodeKey> {
        self.public_domain
    }

    /// Number of nodes below the root
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root has no descendants
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Arena entry
    #[inline]
    #[must_use]
    pub fn get(&self, key: NodeKey) -> Option<&TreeNode> {
        self.nodes.get(key)
    }

    /// Node attributes
    #[inline]
    #[must_use]
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key).map(|e| &e.node)
    }

    pub(crate) fn node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key).map(|e| &mut e.node)
    }

    /// Key of the node with this id
    #[inline]
    #[must_use]
    pub fn key_of_id(&self, id: &str) -> Option<NodeKey> {
        self.ids.get(id).copied()
    }

    /// Key of the node with this name
    #[inline]
    #[must_use]
    pub fn key_of_name(&self, name: &str) -> Option<NodeKey> {
        self.names.get(name).copied()
    }

    /// Node with this id
    #[must_use]
    pub fn find_node_by_id(&self, id: &str) -> Option<&Node> {
        self.key_of_id(id).and_then(|k| self.node(k))
    }

    /// Slot that a node naming `parent_name` as its parent attaches to
    ///
    /// The scenario name resolves to the root. Processes cannot own
    /// children and never match.
    #[must_use]
    pub fn find_parent_slot_by_name(&self, parent_name: &str) -> Option<Slot> {
        if parent_name == self.name {
            return Some(Slot::Root);
        }
        let key = self.key_of_name(parent_name)?;
        match self.node(key)?.level() {
            Level::Process => None,
            _ => Some(Slot::Node(key)),
        }
    }

    /// Whether any node uses this id
    #[inline]
    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    /// Whether the root or any node uses this name
    #[inline]
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        name == self.name || self.names.contains_key(name)
    }

    /// Level of a slot
    #[must_use]
    pub fn level_of(&self, slot: Slot) -> Option<Level> {
        match slot {
            Slot::Root => Some(Level::Scenario),
            Slot::Node(k) => self.node(k).map(Node::level),
        }
    }

    /// Editable kind of a slot
    #[must_use]
    pub fn kind_of(&self, slot: Slot) -> Option<NodeKind> {
        match slot {
            Slot::Root => Some(NodeKind::Scenario),
            Slot::Node(k) => self.node(k).and_then(Node::kind),
        }
    }

    /// Name of a slot
    #[must_use]
    pub fn name_of(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Root => Some(&self.name),
            Slot::Node(k) => self.node(k).map(Node::name),
        }
    }

    /// Id of a slot; the root's id is its name
    #[must_use]
    pub fn id_of(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Root => Some(&self.name),
            Slot::Node(k) => self.node(k).map(Node::id),
        }
    }

    /// Children of a slot
    #[must_use]
    pub fn children(&self, slot: Slot) -> &[NodeKey] {
        match slot {
            Slot::Root => &self.domains,
            Slot::Node(k) => self.nodes.get(k).map_or(&[], |e| e.children.as_slice()),
        }
    }

    /// Implicit child of a slot
    #[must_use]
    pub fn implicit_child(&self, slot: Slot) -> Option<NodeKey> {
        match slot {
            Slot::Root => self.public_domain,
            Slot::Node(k) => self.nodes.get(k).and_then(|e| e.implicit_child),
        }
    }

    /// Structural parent of a node
    #[must_use]
    pub fn parent_of(&self, key: NodeKey) -> Option<Slot> {
        self.nodes.get(key).map(|e| e.parent)
    }

    /// Nearest ancestor that is shown to users
    ///
    /// Implicit ancestors are skipped; the root is returned once the
    /// PUBLIC domain or the top is reached.
    #[must_use]
    pub fn visible_parent(&self, key: NodeKey) -> Slot {
        let mut slot = self.parent_of(key).unwrap_or(Slot::Root);
        while let Slot::Node(k) = slot {
            match self.nodes.get(k) {
                Some(entry) if entry.node.is_implicit() => slot = entry.parent,
                Some(_) => return slot,
                None => return Slot::Root,
            }
        }
        slot
    }

    /// Descend implicit links from `slot` until reaching the level above `level`
    ///
    /// # Errors
    /// `NoAttachPoint` when the slot is already too deep or an implicit
    /// link is missing
    pub fn resolve_attach_point(&self, slot: Slot, level: Level) -> Result<Slot> {
        let target = level.parent().ok_or_else(|| self.no_attach_point(slot, level))?;
        let mut current = slot;
        loop {
            let current_level = self
                .level_of(current)
                .ok_or_else(|| self.no_attach_point(slot, level))?;
            if current_level == target {
                return Ok(current);
            }
            if current_level > target {
                return Err(self.no_attach_point(slot, level));
            }
            let next = self
                .implicit_child(current)
                .ok_or_else(|| self.no_attach_point(slot, level))?;
            tracing::debug!(from = ?current_level, "descending to implicit child");
            current = Slot::Node(next);
        }
    }

    fn no_attach_point(&self, slot: Slot, level: Level) -> EngineError {
        EngineError::NoAttachPoint {
            level,
            parent: self.name_of(slot).unwrap_or_default().to_string(),
        }
    }

    /// All nodes, top-down and left-to-right
    #[must_use]
    pub fn depth_first(&self) -> Vec<NodeKey> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for key in &self.domains {
            self.collect_subtree(*key, &mut out);
        }
        out
    }

    /// A node and its descendants, top-down
    #[must_use]
    pub fn subtree(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        self.collect_subtree(key, &mut out);
        out
    }

    fn collect_subtree(&self, key: NodeKey, out: &mut Vec<NodeKey>) {
        let Some(entry) = self.nodes.get(key) else {
            return;
        };
        out.push(key);
        for child in &entry.children {
            self.collect_subtree(*child, out);
        }
    }

    /// Append a node under `parent`
    ///
    /// An implicit node becomes the parent's implicit child when the
    /// parent has none yet.
    ///
    /// # Errors
    /// `DuplicateId`/`DuplicateName` on collisions, `NotFound` for a
    /// stale parent key
    pub(crate) fn attach(&mut self, parent: Slot, node: Node) -> Result<NodeKey> {
        if self.contains_id(node.id()) {
            return Err(EngineError::DuplicateId(node.id().to_string()));
        }
        if self.contains_name(node.name()) {
            return Err(EngineError::DuplicateName(node.name().to_string()));
        }
        if let Slot::Node(p) = parent {
            if !self.nodes.contains_key(p) {
                return Err(EngineError::NotFound(format!("{p:?}")));
            }
        }

        let id = node.id().to_string();
        let name = node.name().to_string();
        let implicit = node.is_implicit();
        let key = self.nodes.insert(TreeNode {
            node,
            parent,
            children: Vec::new(),
            implicit_child: None,
        });
        self.ids.insert(id, key);
        self.names.insert(name, key);

        match parent {
            Slot::Root => {
                self.domains.push(key);
                if implicit && self.public_domain.is_none() {
                    self.public_domain = Some(key);
                }
            }
            Slot::Node(p) => {
                if let Some(entry) = self.nodes.get_mut(p) {
                    entry.children.push(key);
                    if implicit && entry.implicit_child.is_none() {
                        entry.implicit_child = Some(key);
                    }
                }
            }
        }
        Ok(key)
    }

    /// Remove a node and its subtree, returning the removed ids top-down
    pub(crate) fn detach(&mut self, key: NodeKey) -> Vec<String> {
        let Some(parent) = self.parent_of(key) else {
            return Vec::new();
        };
        match parent {
            Slot::Root => {
                self.domains.retain(|k| *k != key);
                if self.public_domain == Some(key) {
                    self.public_domain = None;
                }
            }
            Slot::Node(p) => {
                if let Some(entry) = self.nodes.get_mut(p) {
                    entry.children.retain(|k| *k != key);
                    if entry.implicit_child == Some(key) {
                        entry.implicit_child = None;
                    }
                }
            }
        }

        let mut removed = Vec::new();
        for k in self.subtree(key) {
            if let Some(entry) = self.nodes.remove(k) {
                self.ids.remove(entry.node.id());
                self.names.remove(entry.node.name());
                removed.push(entry.node.id().to_string());
            }
        }
        removed
    }

    /// Change a node's name, keeping the name index in sync
    pub(crate) fn rename(&mut self, key: NodeKey, new_name: &str) -> Result<()> {
        let old = self
            .node(key)
            .map(|n| n.name().to_string())
            .ok_or_else(|| EngineError::NotFound(new_name.to_string()))?;
        if old == new_name {
            return Ok(());
        }
        if self.contains_name(new_name) {
            return Err(EngineError::DuplicateName(new_name.to_string()));
        }
        self.names.remove(&old);
        self.names.insert(new_name.to_string(), key);
        if let Some(node) = self.node_mut(key) {
            *node.name_mut() = new_name.to_string();
        }
        Ok(())
    }

    /// Change a node's id, keeping the id index in sync
    pub(crate) fn reassign_id(&mut self, key: NodeKey, new_id: &str) -> Result<()> {
        let old = self
            .node(key)
            .map(|n| n.id().to_string())
            .ok_or_else(|| EngineError::NotFound(new_id.to_string()))?;
        if old == new_id {
            return Ok(());
        }
        if self.contains_id(new_id) {
            return Err(EngineError::DuplicateId(new_id.to_string()));
        }
        self.ids.remove(&old);
        self.ids.insert(new_id.to_string(), key);
        if let Some(node) = self.node_mut(key) {
            *node.id_mut() = new_id.to_string();
        }
        Ok(())
    }
}

/// Attributes of an implicit COMMON zone
#[must_use]
pub fn common_zone(domain_name: &str) -> Node {
    let name = format!("{domain_name}{}", netsim_model::COMMON_SUFFIX);
    Node::Zone(ZoneAttrs {
        id: name.clone(),
        name,
        kind: ZoneType::Common,
        net_char: None,
        meta: None,
    })
}

/// Attributes of an implicit DEFAULT network location
#[must_use]
pub fn default_network_location(zone_name: &str) -> Node {
    let name = format!("{zone_name}{}", netsim_model::DEFAULT_SUFFIX);
    Node::NetworkLocation(NetworkLocationAttrs {
        id: name.clone(),
        name,
        kind: NetworkLocationType::Default,
        net_char: None,
        geo_data: None,
        poa_4g_config: None,
        poa_5g_config: None,
        poa_wifi_config: None,
    })
}

/// Attributes of the PUBLIC domain
#[must_use]
pub fn public_domain() -> Node {
    Node::Domain(DomainAttrs {
        id: netsim_model::PUBLIC_DOMAIN_NAME.to_string(),
        name: netsim_model::PUBLIC_DOMAIN_NAME.to_string(),
        kind: DomainType::Public,
        net_char: None,
        cellular_domain_config: None,
    })
}

/// Implicit child node for a parent at `level` named `parent_name`
#[must_use]
pub fn implicit_child_for(level: Level, parent_name: &str) -> Option<Node> {
    match level {
        Level::Domain => Some(common_zone(parent_name)),
        Level::Zone => Some(default_network_location(parent_name)),
        _ => None,
    }
}
