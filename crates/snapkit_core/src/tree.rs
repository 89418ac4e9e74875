//! In-memory element tree
//!
//! [`SnapTree`] owns elements in a generational slot map. Removing an element
//! invalidates its [`ElementId`] for good, which is what lets the change
//! detector hold ids as weak handles.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::error::TreeError;
use crate::geometry::{Point, Rect, Size};
use crate::provider::{ScrollMetrics, StyleAndGeometryProvider};
use crate::style::SnapStyle;

new_key_type! {
    pub struct ElementId;
}

struct ElementNode {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    style: SnapStyle,
    /// Border box relative to the parent's padding box, before scrolling
    frame: Rect,
    scroll: Point,
    /// Overrides the scroll extent derived from children
    content_size: Option<Size>,
}

/// A document of positioned, styled elements
#[derive(Default)]
pub struct SnapTree {
    nodes: SlotMap<ElementId, ElementNode>,
    root: Option<ElementId>,
    names: FxHashMap<String, ElementId>,
    reverse: FxHashMap<ElementId, String>,
}

impl std::fmt::Debug for SnapTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapTree")
            .field("nodes", &self.nodes.len())
            .field("root", &self.root)
            .field("names", &self.names)
            .finish()
    }
}

impl SnapTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the root element; it becomes the document's scrolling element
    ///
    /// Replaces (and drops) any previous root.
    pub fn create_root(&mut self, frame: Rect, style: SnapStyle) -> ElementId {
        if let Some(old) = self.root.take() {
            self.remove(old);
        }
        let id = self.insert(None, frame, style);
        self.root = Some(id);
        id
    }

    /// Append a child at the end of `parent`'s children
    pub fn append_child(
        &mut self,
        parent: ElementId,
        frame: Rect,
        style: SnapStyle,
    ) -> Result<ElementId, TreeError> {
        if !self.nodes.contains_key(parent) {
            return Err(TreeError::DeadParent);
        }
        let id = self.insert(Some(parent), frame, style);
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(id);
        }
        Ok(id)
    }

    fn insert(&mut self, parent: Option<ElementId>, frame: Rect, style: SnapStyle) -> ElementId {
        self.nodes.insert(ElementNode {
            parent,
            children: Vec::new(),
            style,
            frame,
            scroll: Point::ZERO,
            content_size: None,
        })
    }

    /// Remove an element and its whole subtree
    ///
    /// Returns false if `id` was already dead.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let Some(parent) = self.nodes.get(id).map(|n| n.parent) else {
            return false;
        };
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|child| *child != id);
        }
        if self.root == Some(id) {
            self.root = None;
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
            }
            if let Some(name) = self.reverse.remove(&current) {
                self.names.remove(&name);
            }
        }
        true
    }

    /// Attach a lookup name (last registration wins)
    pub fn set_name(&mut self, id: ElementId, name: impl Into<String>) {
        let name = name.into();
        if let Some(old) = self.reverse.remove(&id) {
            if self.names.get(&old) == Some(&id) {
                self.names.remove(&old);
            }
        }
        if let Some(previous) = self.names.insert(name.clone(), id) {
            if previous != id {
                tracing::warn!("Duplicate element name registered: {}", name);
                self.reverse.remove(&previous);
            }
        }
        self.reverse.insert(id, name);
    }

    pub fn by_name(&self, name: &str) -> Option<ElementId> {
        self.names.get(name).copied()
    }

    pub fn name(&self, id: ElementId) -> Option<&str> {
        self.reverse.get(&id).map(String::as_str)
    }

    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn set_style(&mut self, id: ElementId, style: SnapStyle) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.style = style;
        }
    }

    pub fn set_frame(&mut self, id: ElementId, frame: Rect) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.frame = frame;
        }
    }

    /// Fix the scroll extent instead of deriving it from children
    pub fn set_content_size(&mut self, id: ElementId, size: Size) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.content_size = Some(size);
        }
    }

    /// Scroll to an offset, clamped to the scrollable range
    ///
    /// Returns the offset actually applied.
    pub fn set_scroll_offset(&mut self, id: ElementId, offset: Point) -> Point {
        let Some(metrics) = self.scroll_metrics(id) else {
            return Point::ZERO;
        };
        let clamped = Point::new(
            offset.x.clamp(0.0, metrics.max_scroll_left()),
            offset.y.clamp(0.0, metrics.max_scroll_top()),
        );
        if let Some(node) = self.nodes.get_mut(id) {
            node.scroll = clamped;
        }
        clamped
    }

    pub fn scroll_by(&mut self, id: ElementId, dx: f32, dy: f32) -> Point {
        let current = self.nodes.get(id).map(|n| n.scroll).unwrap_or_default();
        self.set_scroll_offset(id, Point::new(current.x + dx, current.y + dy))
    }

    fn client_size(node: &ElementNode) -> Size {
        let border = node.style.border;
        Size::new(
            (node.frame.width() - border.left - border.right).max(0.0),
            (node.frame.height() - border.top - border.bottom).max(0.0),
        )
    }
}

impl StyleAndGeometryProvider for SnapTree {
    fn is_alive(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id)?.parent
    }

    fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut stack: Vec<ElementId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    fn style(&self, id: ElementId) -> Option<SnapStyle> {
        self.nodes.get(id).map(|n| n.style)
    }

    fn bounding_rect(&self, id: ElementId) -> Option<Rect> {
        let node = self.nodes.get(id)?;
        let mut rect = node.frame;
        let mut parent = node.parent;
        while let Some(parent_id) = parent {
            let p = self.nodes.get(parent_id)?;
            rect = rect.offset(
                p.frame.x() + p.style.border.left - p.scroll.x,
                p.frame.y() + p.style.border.top - p.scroll.y,
            );
            parent = p.parent;
        }
        Some(rect)
    }

    fn scroll_metrics(&self, id: ElementId) -> Option<ScrollMetrics> {
        let node = self.nodes.get(id)?;
        let client = Self::client_size(node);
        let content = node.content_size.unwrap_or_else(|| {
            node.children
                .iter()
                .filter_map(|child| self.nodes.get(*child))
                .fold(Size::ZERO, |acc, child| {
                    Size::new(
                        acc.width.max(child.frame.right()),
                        acc.height.max(child.frame.bottom()),
                    )
                })
        });
        Some(ScrollMetrics {
            scroll_left: node.scroll.x,
            scroll_top: node.scroll.y,
            scroll_width: content.width.max(client.width),
            scroll_height: content.height.max(client.height),
            client_width: client.width,
            client_height: client.height,
        })
    }

    fn scrolling_element(&self) -> Option<ElementId> {
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Edges;

    fn strip() -> (SnapTree, ElementId, Vec<ElementId>) {
        let mut tree = SnapTree::new();
        let root = tree.create_root(Rect::new(0.0, 0.0, 200.0, 100.0), SnapStyle::default());
        let children = (0..3)
            .map(|i| {
                tree.append_child(
                    root,
                    Rect::new(i as f32 * 200.0, 0.0, 200.0, 100.0),
                    SnapStyle::default(),
                )
                .unwrap()
            })
            .collect();
        (tree, root, children)
    }

    #[test]
    fn test_scroll_metrics_from_children() {
        let (tree, root, _) = strip();
        let metrics = tree.scroll_metrics(root).unwrap();
        assert_eq!(metrics.scroll_width, 600.0);
        assert_eq!(metrics.client_width, 200.0);
        assert_eq!(metrics.max_scroll_left(), 400.0);
        assert_eq!(metrics.max_scroll_top(), 0.0);
    }

    #[test]
    fn test_bounding_rect_follows_scroll() {
        let (mut tree, root, children) = strip();
        assert_eq!(tree.bounding_rect(children[1]).unwrap().left(), 200.0);

        let applied = tree.set_scroll_offset(root, Point::new(205.0, 50.0));
        assert_eq!(applied, Point::new(205.0, 0.0));
        assert_eq!(tree.bounding_rect(children[1]).unwrap().left(), -5.0);
    }

    #[test]
    fn test_scroll_offset_is_clamped() {
        let (mut tree, root, _) = strip();
        assert_eq!(tree.scroll_by(root, 1000.0, 0.0).x, 400.0);
        assert_eq!(tree.scroll_by(root, -2000.0, 0.0).x, 0.0);
    }

    #[test]
    fn test_border_shifts_children() {
        let mut tree = SnapTree::new();
        let root = tree.create_root(
            Rect::new(10.0, 10.0, 100.0, 100.0),
            SnapStyle::default().with_border(Edges::all(5.0)),
        );
        let child = tree
            .append_child(root, Rect::new(0.0, 0.0, 20.0, 20.0), SnapStyle::default())
            .unwrap();
        assert_eq!(
            tree.bounding_rect(child),
            Some(Rect::new(15.0, 15.0, 20.0, 20.0))
        );
        assert_eq!(tree.scroll_metrics(root).unwrap().client_width, 90.0);
    }

    #[test]
    fn test_descendants_in_document_order() {
        let mut tree = SnapTree::new();
        let root = tree.create_root(Rect::new(0.0, 0.0, 10.0, 10.0), SnapStyle::default());
        let a = tree.append_child(root, Rect::ZERO, SnapStyle::default()).unwrap();
        let a1 = tree.append_child(a, Rect::ZERO, SnapStyle::default()).unwrap();
        let b = tree.append_child(root, Rect::ZERO, SnapStyle::default()).unwrap();
        assert_eq!(tree.descendants(root), vec![a, a1, b]);
        assert_eq!(tree.ancestors(a1).as_slice(), &[a, root]);
    }

    #[test]
    fn test_remove_invalidates_subtree() {
        let mut tree = SnapTree::new();
        let root = tree.create_root(Rect::ZERO, SnapStyle::default());
        let a = tree.append_child(root, Rect::ZERO, SnapStyle::default()).unwrap();
        let a1 = tree.append_child(a, Rect::ZERO, SnapStyle::default()).unwrap();
        tree.set_name(a1, "inner");

        assert!(tree.remove(a));
        assert!(!tree.is_alive(a));
        assert!(!tree.is_alive(a1));
        assert_eq!(tree.by_name("inner"), None);
        assert!(tree.children(root).is_empty());
        assert!(!tree.remove(a));

        assert_eq!(
            tree.append_child(a, Rect::ZERO, SnapStyle::default()),
            Err(TreeError::DeadParent)
        );
        // a freshly inserted element never reuses the dead id
        let fresh = tree.append_child(root, Rect::ZERO, SnapStyle::default()).unwrap();
        assert_ne!(fresh, a);
        assert!(!tree.is_alive(a));
    }

    #[test]
    fn test_rename_drops_previous_name() {
        let (mut tree, root, children) = strip();
        tree.set_name(children[0], "first");
        tree.set_name(children[0], "leading");
        assert_eq!(tree.by_name("first"), None);
        assert_eq!(tree.by_name("leading"), Some(children[0]));
        assert_eq!(tree.name(children[0]), Some("leading"));

        // taking over another element's name leaves that element unnamed
        tree.set_name(root, "leading");
        assert_eq!(tree.by_name("leading"), Some(root));
        assert_eq!(tree.name(children[0]), None);
    }
}
