use serde::{Deserialize, Serialize};

/// Read-only view of one node of a configuration tree.
///
/// Loaders only depend on this trait, so any tree reader can feed them.
pub trait ConfigNode: Sized {
    /// The node's key. Array members are keyed `"0"`, `"1"`, ...
    fn id(&self) -> &str;

    /// Returns `true` for `{ }` and `[ ]` nodes.
    fn is_compound(&self) -> bool;

    /// The value of a leaf node.
    fn string_value(&self) -> Option<&str>;

    /// Children of a compound node, in source order. Empty for leaves.
    fn children(&self) -> &[Self];

    /// First child with the given id.
    fn child(&self, id: &str) -> Option<&Self> {
        self.children().iter().find(|c| c.id() == id)
    }

    /// A leaf value, or every leaf value of a compound, in order.
    ///
    /// Lets `key "a"` and `key [ "a" "b" ]` be read the same way.
    fn string_list(&self) -> Vec<&str> {
        match self.string_value() {
            Some(value) => vec![value],
            None => self
                .children()
                .iter()
                .filter_map(Self::string_value)
                .collect(),
        }
    }
}

/// The value held by a [`ConfNode`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfValue {
    String(String),
    Compound(Vec<ConfNode>),
    Array(Vec<ConfNode>),
}

/// A node of a parsed configuration tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfNode {
    pub id: String,
    pub value: ConfValue,
    /// Line the node was (last) defined on; 0 for synthesized nodes.
    pub line: u32,
}

impl ConfNode {
    pub fn leaf(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: ConfValue::String(value.into()),
            line: 0,
        }
    }

    pub fn compound(id: impl Into<String>, children: Vec<ConfNode>) -> Self {
        Self {
            id: id.into(),
            value: ConfValue::Compound(children),
            line: 0,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self.value, ConfValue::Array(_))
    }

    /// Walk a path of child ids.
    pub fn lookup<'a>(&self, path: impl IntoIterator<Item = &'a str>) -> Option<&ConfNode> {
        path.into_iter().try_fold(self, |node, id| node.child(id))
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<ConfNode>> {
        match &mut self.value {
            ConfValue::Compound(children) | ConfValue::Array(children) => Some(children),
            ConfValue::String(_) => None,
        }
    }
}

impl ConfigNode for ConfNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_compound(&self) -> bool {
        !matches!(self.value, ConfValue::String(_))
    }

    fn string_value(&self) -> Option<&str> {
        match &self.value {
            ConfValue::String(value) => Some(value),
            _ => None,
        }
    }

    fn children(&self) -> &[Self] {
        match &self.value {
            ConfValue::Compound(children) | ConfValue::Array(children) => children,
            ConfValue::String(_) => &[],
        }
    }
}
