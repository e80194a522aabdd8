use crate::quantity::magnitude_of;
use crate::Error;
use serde_json::Value;
use std::fmt;

/// The kind of a JSON value, with `true` and `false` as distinct kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Number,
    Object,
    Array,
    True,
    False,
    Null,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::String => "String",
            Kind::Number => "Number",
            Kind::Object => "Object",
            Kind::Array => "Array",
            Kind::True => "True",
            Kind::False => "False",
            Kind::Null => "Null",
        })
    }
}

/// The value carried by a [`Node`]. Only strings, numbers and arrays carry a
/// payload; object members and array elements are child nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeValue {
    String(String),
    Number(f64),
    Object,
    Array(usize),
    True,
    False,
    Null,
}

impl NodeValue {
    pub fn kind(&self) -> Kind {
        match self {
            NodeValue::String(_) => Kind::String,
            NodeValue::Number(_) => Kind::Number,
            NodeValue::Object => Kind::Object,
            NodeValue::Array(_) => Kind::Array,
            NodeValue::True => Kind::True,
            NodeValue::False => Kind::False,
            NodeValue::Null => Kind::Null,
        }
    }
}

/// Index of a node inside its [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// One JSON value of a document, located by its dotted path.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    path: String,
    value: NodeValue,
    parent: Option<NodeId>,
    children: Option<Vec<NodeId>>,
    has_permit_rule: bool,
}

impl Node {
    /// Dot-joined object keys and array indices from the root. The root's
    /// path is empty.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &NodeValue {
        &self.value
    }

    pub fn kind(&self) -> Kind {
        self.value.kind()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids in document order, or `None` for scalar kinds.
    pub fn children(&self) -> Option<&[NodeId]> {
        self.children.as_deref()
    }

    /// Whether a `Permitted` check matched this node or one of its
    /// descendants during the last evaluation.
    pub fn has_permit_rule(&self) -> bool {
        self.has_permit_rule
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            NodeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            NodeValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn array_len(&self) -> Option<usize> {
        match self.value {
            NodeValue::Array(len) => Some(len),
            _ => None,
        }
    }

    /// The numeric magnitude of a number, or of a string holding a quantity
    /// such as `"750m"`.
    pub fn magnitude(&self) -> Option<f64> {
        magnitude_of(self.as_f64(), self.as_str())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            NodeValue::String(s) => write!(f, "{}={:?}", self.path, s),
            NodeValue::Number(n) => write!(f, "{}={}", self.path, n),
            NodeValue::Object | NodeValue::Null => write!(f, "{}=({})", self.path, self.kind()),
            NodeValue::Array(len) => write!(f, "{}=({}[{}])", self.path, self.kind(), len),
            NodeValue::True | NodeValue::False => write!(f, "{}={}", self.path, self.kind()),
        }
    }
}

/// A JSON document as an arena of typed nodes.
///
/// Nodes are stored in depth-first pre-order, so the root is always the
/// first node. Ownership runs from the arena to every node; parent links are
/// plain indices.
#[derive(Clone, Debug, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Builds the tree for a decoded JSON value.
    ///
    /// ```
    /// use jsoncheck::{Kind, Tree};
    /// use serde_json::json;
    ///
    /// let tree = Tree::from_value(&json!({ "a": [true, null] })).unwrap();
    ///
    /// let mut paths = vec![];
    /// tree.for_each_node(|_, node| paths.push(format!("{}", node)));
    /// assert_eq!(vec!["=(Object)", "a=(Array[2])", "a.0=True", "a.1=(Null)"], paths);
    /// assert_eq!(Kind::Object, tree.node(tree.root()).kind());
    /// ```
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        let mut tree = Tree { nodes: vec![] };
        tree.scan_value(None, String::new(), value)?;
        Ok(tree)
    }

    fn scan_value(
        &mut self,
        parent: Option<NodeId>,
        path: String,
        value: &Value,
    ) -> Result<NodeId, Error> {
        let node_value = match value {
            Value::String(s) => NodeValue::String(s.clone()),
            Value::Number(n) => match n.as_f64() {
                Some(n) => NodeValue::Number(n),
                None => return Err(Error::Number { path }),
            },
            Value::Bool(true) => NodeValue::True,
            Value::Bool(false) => NodeValue::False,
            Value::Null => NodeValue::Null,
            Value::Object(_) => NodeValue::Object,
            Value::Array(arr) => NodeValue::Array(arr.len()),
        };

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            path,
            value: node_value,
            parent,
            children: None,
            has_permit_rule: false,
        });

        let children = match value {
            Value::Object(obj) => {
                let mut children = Vec::with_capacity(obj.len());
                for (key, sub_value) in obj {
                    let path = self.child_path(id, key);
                    children.push(self.scan_value(Some(id), path, sub_value)?);
                }
                Some(children)
            }
            Value::Array(arr) => {
                let mut children = Vec::with_capacity(arr.len());
                for (i, sub_value) in arr.iter().enumerate() {
                    let path = self.child_path(id, &i.to_string());
                    children.push(self.scan_value(Some(id), path, sub_value)?);
                }
                Some(children)
            }
            _ => None,
        };

        self.nodes[id.0].children = children;
        Ok(id)
    }

    fn child_path(&self, parent: NodeId, token: &str) -> String {
        let parent_path = &self.nodes[parent.0].path;
        if parent_path.is_empty() {
            token.to_owned()
        } else {
            format!("{}.{}", parent_path, token)
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Number of nodes, root included. A tree always has at least one node.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates over the parent chain of `id`, nearest first, excluding `id`
    /// itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).parent, move |&p| self.node(p).parent)
    }

    /// Visits every node depth-first, parents before their children.
    pub fn for_each_node<F: FnMut(NodeId, &Node)>(&self, mut f: F) {
        self.visit_pre(self.root(), &mut f);
    }

    /// Visits every node depth-first, children before their parents.
    pub fn for_each_node_reverse<F: FnMut(NodeId, &Node)>(&self, mut f: F) {
        self.visit_post(self.root(), &mut f);
    }

    fn visit_pre<F: FnMut(NodeId, &Node)>(&self, id: NodeId, f: &mut F) {
        let node = self.node(id);
        f(id, node);
        for &child in node.children().unwrap_or_default() {
            self.visit_pre(child, f);
        }
    }

    fn visit_post<F: FnMut(NodeId, &Node)>(&self, id: NodeId, f: &mut F) {
        let node = self.node(id);
        for &child in node.children().unwrap_or_default() {
            self.visit_post(child, f);
        }
        f(id, node);
    }

    /// Marks `id` and every ancestor up to the root as permitted.
    pub(crate) fn permit(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(id) = current {
            let node = &mut self.nodes[id.0];
            if node.has_permit_rule {
                // Ancestors of a permitted node are already permitted.
                return;
            }
            node.has_permit_rule = true;
            current = node.parent;
        }
    }

    pub(crate) fn clear_permits(&mut self) {
        for node in &mut self.nodes {
            node.has_permit_rule = false;
        }
    }
}
