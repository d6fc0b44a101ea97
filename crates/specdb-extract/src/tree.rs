//! The materialized entity tree.
//!
//! An arena of labeled nodes owned by a single [`Tree`]. Entities and
//! association links are tagged with an [`EntityKind`]; category roots (the
//! attachment points for schema-top entities) and the synthetic root are
//! untagged. Properties are set once, at creation, from a single source row;
//! an absent key means the source value was NULL, there are no null-valued
//! entries.

use std::collections::BTreeMap;

use crate::kind::{EntityKind, IdRule};
use crate::value::Value;

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: Option<EntityKind>,
    category: Option<&'static str>,
    properties: BTreeMap<&'static str, Value>,
    refs: BTreeMap<&'static str, NodeId>,
}

impl Node {
    fn new(parent: Option<NodeId>) -> Self {
        Node {
            parent,
            children: Vec::new(),
            kind: None,
            category: None,
            properties: BTreeMap::new(),
            refs: BTreeMap::new(),
        }
    }
}

/// A rooted, labeled tree of materialized entities.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a tree holding only the synthetic untagged root.
    pub fn new() -> Self {
        Tree {
            nodes: vec![Node::new(None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn push(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Add an untagged category root under the synthetic root.
    pub fn add_category(&mut self, name: &'static str) -> NodeId {
        let root = self.root();
        let mut node = Node::new(Some(root));
        node.category = Some(name);
        self.push(root, node)
    }

    /// Add an entity (or reference) node under `parent`.
    pub fn add_entity(&mut self, parent: NodeId, kind: EntityKind) -> NodeId {
        let mut node = Node::new(Some(parent));
        node.kind = Some(kind);
        self.push(parent, node)
    }

    /// Store a property. Expected to be called only while the node is being
    /// built from its source row; properties are never overwritten later.
    pub fn set(&mut self, id: NodeId, key: &'static str, value: Value) {
        self.nodes[id.0].properties.insert(key, value);
    }

    /// Look up a property. `None` means the source value was NULL or the
    /// key was never part of the field map.
    pub fn get(&self, id: NodeId, key: &str) -> Option<&Value> {
        self.nodes[id.0].properties.get(key)
    }

    /// Point a reference slot at another node (association targets,
    /// scenario → test-area links).
    pub fn set_ref(&mut self, id: NodeId, tag: &'static str, target: NodeId) {
        self.nodes[id.0].refs.insert(tag, target);
    }

    /// Resolve a reference slot by tag.
    pub fn reference(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.nodes[id.0].refs.get(tag).copied()
    }

    /// All reference slots of a node, in tag order.
    pub fn references(&self, id: NodeId) -> impl Iterator<Item = (&'static str, NodeId)> + '_ {
        self.nodes[id.0].refs.iter().map(|(t, n)| (*t, *n))
    }

    /// All properties of a node, in key order.
    pub fn properties(&self, id: NodeId) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.nodes[id.0].properties.iter().map(|(k, v)| (*k, v))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn kind(&self, id: NodeId) -> Option<EntityKind> {
        self.nodes[id.0].kind
    }

    /// The node's label: its entity-kind tag, or the category name for the
    /// untagged attachment points.
    pub fn tag(&self, id: NodeId) -> Option<&'static str> {
        let node = &self.nodes[id.0];
        node.kind.map(EntityKind::tag).or(node.category)
    }

    /// Category roots directly under the synthetic root, with their names.
    pub fn categories(&self) -> impl Iterator<Item = (&'static str, NodeId)> + '_ {
        self.children(self.root())
            .iter()
            .filter_map(|&c| self.nodes[c.0].category.map(|name| (name, c)))
    }

    /// The deterministic, parent-chain-derived display name of a node.
    ///
    /// Computed on demand, never stored. Properties are immutable after
    /// construction, so repeated calls always agree.
    pub fn unique_id(&self, id: NodeId) -> String {
        let node = &self.nodes[id.0];
        let Some(kind) = node.kind else {
            return node.category.unwrap_or("").to_string();
        };
        match kind.id_rule() {
            IdRule::Prop(key) => self.prop_string(id, key),
            IdRule::ParentProp(key) => {
                format!(
                    "{}-{}",
                    self.parent_unique_id(id),
                    self.prop_string(id, key)
                )
            }
            IdRule::ParentPropTail(key) => {
                let prop = self.prop_string(id, key);
                let tail = prop.rsplit('-').next().unwrap_or(&prop);
                format!("{}-{}", self.parent_unique_id(id), tail)
            }
            IdRule::Pair(a, b) => {
                format!("{}-{}", self.prop_string(id, a), self.prop_string(id, b))
            }
            IdRule::Reference => {
                let target = self
                    .nodes[id.0]
                    .refs
                    .values()
                    .next()
                    .map(|&t| self.unique_id(t))
                    .unwrap_or_default();
                format!("{}={}", self.parent_unique_id(id), target)
            }
        }
    }

    fn parent_unique_id(&self, id: NodeId) -> String {
        self.nodes[id.0]
            .parent
            .map(|p| self.unique_id(p))
            .unwrap_or_default()
    }

    fn prop_string(&self, id: NodeId, key: &str) -> String {
        self.get(id, key).map(Value::to_string).unwrap_or_default()
    }

    /// All node ids in creation order, the synthetic root included.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}
