use std::collections::BTreeMap;

use serde::Serialize;

/// Element name written for vacant slots when a document is serialized.
pub const PLACEHOLDER_NAME: &str = "placeholder";

/// Index of an element inside the [`Document`] that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("document element count should fit in u32"))
    }

    pub fn id(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Why [`Document::enter_element`] could not enter a child slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnterError {
    /// Positions start at 1.
    InvalidPosition,
    /// The slot already holds an element with this other name.
    Occupied(String),
}

/// A child position. Slots are created vacant to fill gaps in sparse
/// positions and are filled once a field names the element that belongs there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Slot {
    Vacant,
    Element(NodeId),
}

impl Slot {
    #[must_use]
    pub fn is_vacant(self) -> bool {
        matches!(self, Self::Vacant)
    }

    #[must_use]
    pub fn element(self) -> Option<NodeId> {
        match self {
            Self::Vacant => None,
            Self::Element(id) => Some(id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Element {
    name: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Slot>,
    parent: Option<NodeId>,
}

impl Element {
    fn new(name: &str, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            parent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn children(&self) -> &[Slot] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// A node handed out by lookups: either an element or one of its attributes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum NodeRef {
    Element(NodeId),
    Attribute { owner: NodeId, name: String },
}

impl NodeRef {
    pub fn attribute(owner: NodeId, name: &str) -> Self {
        Self::Attribute {
            owner,
            name: name.to_string(),
        }
    }

    /// The element itself, or the element owning the attribute.
    #[must_use]
    pub fn element(&self) -> NodeId {
        match self {
            Self::Element(id) | Self::Attribute { owner: id, .. } => *id,
        }
    }
}

/// A single-rooted element tree stored as an arena.
///
/// Elements are never freed; detached elements simply become unreachable
/// from the root. [`NodeId`]s are only meaningful for the document that
/// issued them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new(root_name: &str) -> Self {
        Self {
            elements: vec![Element::new(root_name, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    pub fn element(&self, id: NodeId) -> &Element {
        &self.elements[id.index()]
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.element(id).name()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.element(id).parent()
    }

    pub fn children(&self, id: NodeId) -> &[Slot] {
        self.element(id).children()
    }

    /// Filled child slots of `id`, in order.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).iter().filter_map(|slot| slot.element())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).attribute(name)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: String) {
        self.elements[id.index()]
            .attributes
            .insert(name.to_string(), value);
    }

    /// 1-based position of `id` among all child slots of its parent.
    ///
    /// The root, and any detached element, is at position 1.
    pub fn position(&self, id: NodeId) -> usize {
        self.parent(id)
            .and_then(|parent| {
                self.children(parent)
                    .iter()
                    .position(|slot| *slot == Slot::Element(id))
            })
            .map_or(1, |index| index + 1)
    }

    /// Append a new element under `parent`, always in a fresh slot.
    pub fn append_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = self.alloc(name, parent);
        self.elements[parent.index()]
            .children
            .push(Slot::Element(id));
        id
    }

    /// Append a vacant slot under `parent`.
    pub fn append_vacant(&mut self, parent: NodeId) {
        self.elements[parent.index()].children.push(Slot::Vacant);
    }

    /// Enter the child of `parent` at 1-based `position`, creating it if needed.
    ///
    /// Missing slots up to `position` are added vacant, and a vacant slot at
    /// `position` is filled with a new element named `name`. A slot already
    /// holding an element with another name is left untouched.
    pub fn enter_element(
        &mut self,
        parent: NodeId,
        name: &str,
        position: usize,
    ) -> Result<NodeId, EnterError> {
        let index = position.checked_sub(1).ok_or(EnterError::InvalidPosition)?;
        let children = &mut self.elements[parent.index()].children;
        if children.len() <= index {
            children.resize(index + 1, Slot::Vacant);
        }

        let slot = children[index];
        match slot {
            Slot::Vacant => {
                let id = self.alloc(name, parent);
                self.elements[parent.index()].children[index] = Slot::Element(id);
                Ok(id)
            }
            Slot::Element(existing) if self.name(existing) == name => Ok(existing),
            Slot::Element(existing) => Err(EnterError::Occupied(self.name(existing).to_string())),
        }
    }

    /// Find the child of `parent` at 1-based `position` if it is an element named `name`.
    pub fn find_element(&self, parent: NodeId, name: &str, position: usize) -> Option<NodeId> {
        let slot = self.children(parent).get(position.checked_sub(1)?)?;
        slot.element().filter(|child| self.name(*child) == name)
    }

    /// First child element of `parent` named `name`.
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.child_elements(parent)
            .find(|child| self.name(*child) == name)
    }

    /// Remove `id` from its parent's slots. Returns `false` for the root or
    /// an element that was already detached.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.elements[id.index()].parent.take() else {
            return false;
        };
        self.elements[parent.index()]
            .children
            .retain(|slot| *slot != Slot::Element(id));
        true
    }

    /// Every element reachable from the root, in document order.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            let children: Vec<NodeId> = self.child_elements(id).collect();
            stack.extend(children.into_iter().rev());
        }
        order
    }

    fn alloc(&mut self, name: &str, parent: NodeId) -> NodeId {
        let id = NodeId::new(self.elements.len());
        self.elements.push(Element::new(name, Some(parent)));
        id
    }
}
