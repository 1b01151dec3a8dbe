//! DOM Tree (arena-based allocation)

use crate::{DomError, InternedString, Node, NodeId, QualName, StringInterner};

/// Arena-based DOM tree
///
/// Node 0 is always the document node. Nodes are never freed; `remove`
/// only detaches them, so `NodeId`s handed out stay valid for the life of
/// the tree.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    interner: StringInterner,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            interner: StringInterner::new(),
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn interner_mut(&mut self) -> &mut StringInterner {
        &mut self.interner
    }

    /// Resolve an interned name
    pub fn resolve(&self, s: InternedString) -> &str {
        self.interner.get(s)
    }

    /// Add a detached node to the arena
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let local = self.interner.intern(tag);
        self.push(Node::element(QualName::local(local)))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Node::comment(text.to_string()))
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check(parent)?;
        self.check(child)?;
        if child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(DomError::Cycle { parent, child });
        }

        self.remove(child);

        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;

        Ok(())
    }

    /// Detach a node (and its subtree) from its parent
    pub fn remove(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(id.index()) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Iterate direct children
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        let first = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        std::iter::successors(Some(first).filter(|c| c.is_valid()), move |&c| {
            Some(self.nodes[c.index()].next_sibling).filter(|n| n.is_valid())
        })
        .map(move |c| (c, &self.nodes[c.index()]))
    }

    /// Iterate all descendants of `id` in document (pre-)order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Descendants { tree: self, scope: id, next }
    }

    /// Iterate ancestors of `id`, nearest first, excluding `id`
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let parent = self.get(id).map(|n| n.parent).unwrap_or(NodeId::NONE);
        std::iter::successors(Some(parent).filter(|p| p.is_valid()), move |&p| {
            Some(self.nodes[p.index()].parent).filter(|n| n.is_valid())
        })
    }

    /// Parent, if it is an element (the document node does not count)
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.get(id)?.parent;
        self.get(parent)?.is_element().then_some(parent)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Lowercase local tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        let elem = self.get(id)?.as_element()?;
        Some(self.resolve(elem.name.local))
    }

    /// Get an attribute by name
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let name = self.interner.lookup(name)?;
        self.get(id)?.as_element()?.get_attr(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        let Some(name) = self.interner.lookup(name) else {
            return false;
        };
        self.get(id)
            .and_then(Node::as_element)
            .is_some_and(|e| e.has_attr(name))
    }

    /// Set (or replace) an attribute
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let local = self.interner.intern(name);
        let is_id = name == "id";
        let id_value = is_id.then(|| self.interner.intern(value));

        let elem = self.element_mut(id)?;
        elem.set_attr(QualName::local(local), value.to_string());
        if is_id {
            elem.id = id_value;
        }
        Ok(())
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let Some(local) = self.interner.lookup(name) else {
            return Ok(None);
        };
        let elem = self.element_mut(id)?;
        if name == "id" {
            elem.id = None;
        }
        Ok(elem.remove_attr(local))
    }

    /// Attribute names of an element, in source order
    pub fn attribute_names(&self, id: NodeId) -> Vec<&str> {
        self.attributes(id).map(|(name, _)| name).collect()
    }

    /// Attribute (name, value) pairs of an element, in source order
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.get(id)
            .and_then(Node::as_element)
            .into_iter()
            .flat_map(|e| e.attrs.iter())
            .map(move |a| (self.resolve(a.name.local), a.value.as_str()))
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|d| self.nodes[d.index()].as_text())
            .collect()
    }

    /// Descendant elements of `scope` carrying attribute `name`, in document order
    pub fn elements_with_attribute(&self, scope: NodeId, name: &str) -> Vec<NodeId> {
        let Some(name) = self.interner.lookup(name) else {
            return Vec::new();
        };
        self.descendants(scope)
            .filter(|&d| {
                self.nodes[d.index()]
                    .as_element()
                    .is_some_and(|e| e.has_attr(name))
            })
            .collect()
    }

    /// Current value of a form control
    pub fn element_value(&self, id: NodeId) -> Option<&str> {
        let elem = self.get(id)?.as_element()?;
        match &elem.value {
            Some(v) => Some(v.as_str()),
            None => self.get_attribute(id, "value"),
        }
    }

    /// Overwrite the current value (the `value` attribute is not touched)
    pub fn set_element_value(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?.value = Some(value.to_string());
        Ok(())
    }

    fn check(&self, id: NodeId) -> Result<(), DomError> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(DomError::InvalidNode(id))
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut crate::ElementData, DomError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(DomError::InvalidNode(id))?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order iterator over a subtree, following sibling links
pub struct Descendants<'a> {
    tree: &'a DomTree,
    scope: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        if !current.is_valid() {
            return None;
        }

        let node = &self.tree.nodes[current.index()];
        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            // Climb until a node with a next sibling, without leaving the scope
            let mut cursor = current;
            loop {
                if cursor == self.scope {
                    break NodeId::NONE;
                }
                let n = &self.tree.nodes[cursor.index()];
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                cursor = n.parent;
                if !cursor.is_valid() {
                    break NodeId::NONE;
                }
            }
        };

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descendants_document_order() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        let c = tree.create_element("c");
        let after = tree.create_element("after");

        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, a).unwrap();
        tree.append_child(a, b).unwrap();
        tree.append_child(div, c).unwrap();
        tree.append_child(tree.root(), after).unwrap();

        let order: Vec<_> = tree.descendants(div).collect();
        assert_eq!(order, vec![a, b, c]);
    }

    #[test]
    fn test_descendants_of_leaf_is_empty() {
        let mut tree = DomTree::new();
        let leaf = tree.create_element("input");
        let sibling = tree.create_element("span");
        tree.append_child(tree.root(), leaf).unwrap();
        tree.append_child(tree.root(), sibling).unwrap();

        assert_eq!(tree.descendants(leaf).count(), 0);
    }

    #[test]
    fn test_append_rejects_cycle() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("div");
        let inner = tree.create_element("div");
        tree.append_child(tree.root(), outer).unwrap();
        tree.append_child(outer, inner).unwrap();

        assert_eq!(
            tree.append_child(inner, outer),
            Err(DomError::Cycle { parent: inner, child: outer })
        );
    }

    #[test]
    fn test_parent_element_skips_document() {
        let mut tree = DomTree::new();
        let script = tree.create_element("script");
        tree.append_child(tree.root(), script).unwrap();

        assert_eq!(tree.parent_element(script), None);
    }

    #[test]
    fn test_element_value_falls_back_to_attribute() {
        let mut tree = DomTree::new();
        let input = tree.create_element("input");
        tree.set_attribute(input, "value", "initial").unwrap();
        assert_eq!(tree.element_value(input), Some("initial"));

        tree.set_element_value(input, "typed").unwrap();
        assert_eq!(tree.element_value(input), Some("typed"));
        assert_eq!(tree.get_attribute(input, "value"), Some("initial"));
    }

    #[test]
    fn test_set_attribute_on_text_fails() {
        let mut tree = DomTree::new();
        let text = tree.create_text("hello");
        assert_eq!(
            tree.set_attribute(text, "idx", "x"),
            Err(DomError::NotAnElement(text))
        );
    }
}
