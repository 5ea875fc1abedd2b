#![forbid(unsafe_code)]

//! The page surface an overlay mutates.
//!
//! [`Document`] is the narrow slice of a DOM the overlay needs: element
//! lookup, tree surgery, class lists, inline styles, attributes, focus, and
//! scrollbar measurement. Browser hosts implement it over `web-sys`; headless
//! hosts and tests use [`MemoryDocument`].
//!
//! # Invariants
//!
//! - An element has at most one parent; inserting an attached element moves
//!   it (never clones).
//! - `children()` is in document order and `placement()` reflects it.
//! - Detaching an element that holds focus (or contains the focused element)
//!   clears focus.
//!
//! # Failure Modes
//!
//! - Operations on unknown element ids are no-ops (getters return `None` or
//!   empty values).
//! - Inserting an element into itself or its own subtree is ignored.

use std::collections::BTreeMap;
use std::fmt;

/// Opaque handle to an element owned by a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    /// Wrap a host-specific raw id.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an element sits in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub parent: ElementId,
    pub index: usize,
    /// The sibling immediately after the element, if any.
    pub next_sibling: Option<ElementId>,
}

/// Tags that are focusable without a `tabindex`.
const FOCUSABLE_TAGS: &[&str] = &["button", "input", "select", "textarea"];

/// Classes that mark page chrome pinned to the viewport.
pub const FIXED_CLASSES: &[&str] = &["fixed-header", "fixed-sidebar"];

/// Mutable view of a page tree.
pub trait Document {
    /// The document element (`html`).
    fn root(&self) -> ElementId;

    /// The `body` element.
    fn body(&self) -> ElementId;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> ElementId;

    /// Look up an attached element by its `id` attribute.
    fn find_by_id(&self, id: &str) -> Option<ElementId>;

    /// Lower-case tag name.
    fn tag(&self, el: ElementId) -> Option<String>;

    fn parent(&self, el: ElementId) -> Option<ElementId>;

    /// Children in document order.
    fn children(&self, el: ElementId) -> Vec<ElementId>;

    /// Insert `child` under `parent` at `index` (clamped), moving it if attached elsewhere.
    fn insert_child(&mut self, parent: ElementId, index: usize, child: ElementId);

    /// Remove `el` from its parent. The element stays valid and can be re-inserted.
    fn detach(&mut self, el: ElementId);

    /// Whether `el` is connected to [`Document::root`].
    fn is_attached(&self, el: ElementId) -> bool;

    fn classes(&self, el: ElementId) -> Vec<String>;
    fn add_class(&mut self, el: ElementId, class: &str);
    fn remove_class(&mut self, el: ElementId, class: &str);
    /// Replace the whole class list.
    fn set_classes(&mut self, el: ElementId, classes: &[String]);

    /// Inline style property value.
    fn style(&self, el: ElementId, property: &str) -> Option<String>;
    /// Set (`Some`) or remove (`None`) an inline style property.
    fn set_style(&mut self, el: ElementId, property: &str, value: Option<&str>);

    fn attribute(&self, el: ElementId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str);
    fn remove_attribute(&mut self, el: ElementId, name: &str);

    fn text(&self, el: ElementId) -> String;
    fn set_text(&mut self, el: ElementId, text: &str);
    /// Replace the element's children with parsed markup.
    fn set_markup(&mut self, el: ElementId, markup: &str);

    fn active_element(&self) -> Option<ElementId>;
    /// Move focus to `el`. Returns `false` when the element cannot take focus.
    fn focus(&mut self, el: ElementId) -> bool;

    /// Width of the page's vertical scrollbar in logical pixels.
    ///
    /// May be expensive (real hosts create and measure a scratch element).
    fn scrollbar_width(&mut self) -> f32;

    // --- Provided ---

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.insert_child(parent, usize::MAX, child);
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.classes(el).iter().any(|c| c == class)
    }

    fn placement(&self, el: ElementId) -> Option<Placement> {
        let parent = self.parent(el)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&c| c == el)?;
        Some(Placement {
            parent,
            index,
            next_sibling: siblings.get(index + 1).copied(),
        })
    }

    /// Matches `button, [href], input, select, textarea, [tabindex]:not([tabindex="-1"])`.
    fn is_focusable(&self, el: ElementId) -> bool {
        let Some(tag) = self.tag(el) else {
            return false;
        };
        FOCUSABLE_TAGS.contains(&tag.as_str())
            || self.attribute(el, "href").is_some()
            || self
                .attribute(el, "tabindex")
                .is_some_and(|t| t.trim() != "-1")
    }

    /// Attached elements pinned to the viewport, in document order: inline
    /// `position: fixed`, or one of [`FIXED_CLASSES`].
    fn fixed_elements(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(self.root()).into_iter().rev().collect();
        while let Some(el) = stack.pop() {
            let pinned = self
                .style(el, "position")
                .is_some_and(|p| p.trim().eq_ignore_ascii_case("fixed"));
            if pinned || FIXED_CLASSES.iter().any(|c| self.has_class(el, c)) {
                out.push(el);
            }
            stack.extend(self.children(el).into_iter().rev());
        }
        out
    }

    /// Focusable descendants of `container` in document order.
    fn focusable_descendants(&self, container: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(container).into_iter().rev().collect();
        while let Some(el) = stack.pop() {
            if self.is_focusable(el) {
                out.push(el);
            }
            stack.extend(self.children(el).into_iter().rev());
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
    attributes: BTreeMap<String, String>,
    text: String,
}

/// Arena-backed [`Document`] for tests and short-lived headless hosts.
///
/// `set_markup` does not parse: it stores the markup as the element's text
/// and drops existing children, which is enough to observe what was inserted.
///
/// Nodes are never freed. Detached elements stay valid for re-insertion, so
/// an id can never be recycled and the arena grows with every
/// `create_element`. Each open overlay allocates a handful of nodes; hosts
/// that open overlays indefinitely should implement [`Document`] over their
/// real page instead.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    root: ElementId,
    body: ElementId,
    active: Option<ElementId>,
    scrollbar_width: f32,
    measurements: usize,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// An empty `html > body` document with a 15px scrollbar.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: ElementId(0),
            body: ElementId(0),
            active: None,
            scrollbar_width: 15.0,
            measurements: 0,
        };
        doc.root = doc.alloc("html");
        doc.body = doc.alloc("body");
        doc.insert_child(doc.root, 0, doc.body);
        doc
    }

    /// Override the simulated scrollbar width.
    #[must_use]
    pub fn with_scrollbar_width(mut self, width: f32) -> Self {
        self.scrollbar_width = width;
        self
    }

    /// How many times [`Document::scrollbar_width`] was called.
    pub fn measurements(&self) -> usize {
        self.measurements
    }

    /// Create a `tag` element and append it to `parent`.
    pub fn append(&mut self, parent: ElementId, tag: &str) -> ElementId {
        let el = self.create_element(tag);
        self.append_child(parent, el);
        el
    }

    /// Create a `tag` element with an `id` attribute and append it to `parent`.
    pub fn append_with_id(&mut self, parent: ElementId, tag: &str, id: &str) -> ElementId {
        let el = self.append(parent, tag);
        self.set_attribute(el, "id", id);
        el
    }

    /// Attached elements carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<ElementId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&el| self.has_class(el, class))
            .collect()
    }

    /// Attached elements with tag `tag`, in document order.
    pub fn find_by_tag(&self, tag: &str) -> Vec<ElementId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&el| self.node(el).is_some_and(|n| n.tag == tag))
            .collect()
    }

    /// All descendants of `el` in document order (excluding `el`).
    pub fn descendants(&self, el: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(el).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Indented dump of the attached tree: tags, classes, attributes,
    /// styles, and text. Element ids are omitted, so two documents with the
    /// same structure produce the same outline.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(self.root, 0, &mut out);
        out
    }

    fn write_outline(&self, el: ElementId, depth: usize, out: &mut String) {
        use fmt::Write as _;
        let Some(node) = self.node(el) else {
            return;
        };
        let _ = write!(out, "{:indent$}<{}", "", node.tag, indent = depth * 2);
        if !node.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", node.classes.join(" "));
        }
        for (name, value) in &node.attributes {
            let _ = write!(out, " {name}=\"{value}\"");
        }
        if !node.styles.is_empty() {
            let styles: Vec<String> = node.styles.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            let _ = write!(out, " style=\"{}\"", styles.join("; "));
        }
        out.push('>');
        if !node.text.is_empty() {
            let _ = write!(out, " {:?}", node.text);
        }
        out.push('\n');
        for &child in &node.children {
            self.write_outline(child, depth + 1, out);
        }
    }

    fn alloc(&mut self, tag: &str) -> ElementId {
        let id = ElementId(self.nodes.len() as u64);
        self.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            ..Node::default()
        });
        id
    }

    fn node(&self, el: ElementId) -> Option<&Node> {
        self.nodes.get(el.0 as usize)
    }

    fn node_mut(&mut self, el: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(el.0 as usize)
    }

    fn is_ancestor_or_self(&self, candidate: ElementId, el: ElementId) -> bool {
        let mut cursor = Some(el);
        while let Some(current) = cursor {
            if current == candidate {
                return true;
            }
            cursor = self.node(current).and_then(|n| n.parent);
        }
        false
    }
}

impl Document for MemoryDocument {
    fn root(&self) -> ElementId {
        self.root
    }

    fn body(&self) -> ElementId {
        self.body
    }

    fn create_element(&mut self, tag: &str) -> ElementId {
        self.alloc(tag)
    }

    fn find_by_id(&self, id: &str) -> Option<ElementId> {
        self.descendants(self.root).into_iter().find(|&el| {
            self.node(el)
                .and_then(|n| n.attributes.get("id"))
                .is_some_and(|v| v == id)
        })
    }

    fn tag(&self, el: ElementId) -> Option<String> {
        self.node(el).map(|n| n.tag.clone())
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.node(el).and_then(|n| n.parent)
    }

    fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.node(el).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn insert_child(&mut self, parent: ElementId, index: usize, child: ElementId) {
        if self.node(parent).is_none() || self.node(child).is_none() {
            return;
        }
        if self.is_ancestor_or_self(child, parent) {
            return;
        }
        self.detach(child);
        if let Some(p) = self.node_mut(parent) {
            let at = index.min(p.children.len());
            p.children.insert(at, child);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent);
        }
    }

    fn detach(&mut self, el: ElementId) {
        let Some(parent) = self.node(el).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|&c| c != el);
        }
        if let Some(n) = self.node_mut(el) {
            n.parent = None;
        }
        if let Some(active) = self.active
            && self.is_ancestor_or_self(el, active)
        {
            self.active = None;
        }
    }

    fn is_attached(&self, el: ElementId) -> bool {
        self.is_ancestor_or_self(self.root, el)
    }

    fn classes(&self, el: ElementId) -> Vec<String> {
        self.node(el).map(|n| n.classes.clone()).unwrap_or_default()
    }

    fn add_class(&mut self, el: ElementId, class: &str) {
        if class.is_empty() {
            return;
        }
        if let Some(n) = self.node_mut(el)
            && !n.classes.iter().any(|c| c == class)
        {
            n.classes.push(class.to_owned());
        }
    }

    fn remove_class(&mut self, el: ElementId, class: &str) {
        if let Some(n) = self.node_mut(el) {
            n.classes.retain(|c| c != class);
        }
    }

    fn set_classes(&mut self, el: ElementId, classes: &[String]) {
        if let Some(n) = self.node_mut(el) {
            n.classes = classes.to_vec();
        }
    }

    fn style(&self, el: ElementId, property: &str) -> Option<String> {
        self.node(el).and_then(|n| n.styles.get(property).cloned())
    }

    fn set_style(&mut self, el: ElementId, property: &str, value: Option<&str>) {
        if let Some(n) = self.node_mut(el) {
            match value {
                Some(v) if !v.is_empty() => {
                    n.styles.insert(property.to_owned(), v.to_owned());
                }
                _ => {
                    n.styles.remove(property);
                }
            }
        }
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.node(el).and_then(|n| n.attributes.get(name).cloned())
    }

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) {
        if let Some(n) = self.node_mut(el) {
            n.attributes.insert(name.to_owned(), value.to_owned());
        }
    }

    fn remove_attribute(&mut self, el: ElementId, name: &str) {
        if let Some(n) = self.node_mut(el) {
            n.attributes.remove(name);
        }
    }

    fn text(&self, el: ElementId) -> String {
        self.node(el).map(|n| n.text.clone()).unwrap_or_default()
    }

    fn set_text(&mut self, el: ElementId, text: &str) {
        if let Some(n) = self.node_mut(el) {
            n.text = text.to_owned();
        }
    }

    fn set_markup(&mut self, el: ElementId, markup: &str) {
        for child in self.children(el) {
            self.detach(child);
        }
        self.set_text(el, markup);
    }

    fn active_element(&self) -> Option<ElementId> {
        self.active.filter(|&el| self.is_attached(el))
    }

    fn focus(&mut self, el: ElementId) -> bool {
        if !self.is_attached(el) || !(el == self.body || self.is_focusable(el)) {
            return false;
        }
        self.active = Some(el);
        true
    }

    fn scrollbar_width(&mut self) -> f32 {
        self.measurements += 1;
        self.scrollbar_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_document_has_body_under_root() {
        let doc = MemoryDocument::new();
        assert_eq!(doc.parent(doc.body()), Some(doc.root()));
        assert!(doc.is_attached(doc.body()));
    }

    #[test]
    fn insert_moves_instead_of_cloning() {
        let mut doc = MemoryDocument::new();
        let a = doc.append(doc.body(), "div");
        let b = doc.append(doc.body(), "div");
        let child = doc.append(a, "span");

        doc.append_child(b, child);
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), vec![child]);
        assert_eq!(doc.parent(child), Some(b));
    }

    #[test]
    fn placement_reports_index_and_next_sibling() {
        let mut doc = MemoryDocument::new();
        let first = doc.append(doc.body(), "p");
        let second = doc.append(doc.body(), "p");
        let third = doc.append(doc.body(), "p");

        let placement = doc.placement(second).unwrap();
        assert_eq!(placement.parent, doc.body());
        assert_eq!(placement.index, 1);
        assert_eq!(placement.next_sibling, Some(third));
        assert_eq!(doc.placement(third).unwrap().next_sibling, None);
        assert_eq!(doc.placement(first).unwrap().index, 0);
    }

    #[test]
    fn insert_into_own_subtree_is_ignored() {
        let mut doc = MemoryDocument::new();
        let outer = doc.append(doc.body(), "div");
        let inner = doc.append(outer, "div");
        doc.append_child(inner, outer);
        assert_eq!(doc.parent(outer), Some(doc.body()));
    }

    #[test]
    fn find_by_id_ignores_detached_elements() {
        let mut doc = MemoryDocument::new();
        let panel = doc.append_with_id(doc.body(), "section", "panel");
        assert_eq!(doc.find_by_id("panel"), Some(panel));
        doc.detach(panel);
        assert_eq!(doc.find_by_id("panel"), None);
    }

    #[test]
    fn focusable_selector() {
        let mut doc = MemoryDocument::new();
        let root = doc.append(doc.body(), "div");
        let button = doc.append(root, "button");
        let plain_link = doc.append(root, "a");
        let link = doc.append(root, "a");
        doc.set_attribute(link, "href", "/x");
        let skipped = doc.append(root, "div");
        doc.set_attribute(skipped, "tabindex", "-1");
        let nested_parent = doc.append(root, "div");
        let tabbable = doc.append(nested_parent, "span");
        doc.set_attribute(tabbable, "tabindex", "0");
        let input = doc.append(root, "input");

        assert!(!doc.is_focusable(plain_link));
        assert_eq!(
            doc.focusable_descendants(root),
            vec![button, link, tabbable, input]
        );
    }

    #[test]
    fn detaching_focused_subtree_clears_focus() {
        let mut doc = MemoryDocument::new();
        let wrapper = doc.append(doc.body(), "div");
        let button = doc.append(wrapper, "button");
        assert!(doc.focus(button));
        assert_eq!(doc.active_element(), Some(button));
        doc.detach(wrapper);
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn focus_rejects_non_focusable() {
        let mut doc = MemoryDocument::new();
        let div = doc.append(doc.body(), "div");
        assert!(!doc.focus(div));
        assert!(doc.focus(doc.body()));
    }

    #[test]
    fn style_none_or_empty_removes() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        doc.set_style(body, "overflow", Some("hidden"));
        assert_eq!(doc.style(body, "overflow").as_deref(), Some("hidden"));
        doc.set_style(body, "overflow", Some(""));
        assert_eq!(doc.style(body, "overflow"), None);
    }

    #[test]
    fn class_list_is_a_set_in_insertion_order() {
        let mut doc = MemoryDocument::new();
        let el = doc.append(doc.body(), "div");
        doc.add_class(el, "a");
        doc.add_class(el, "b");
        doc.add_class(el, "a");
        assert_eq!(doc.classes(el), vec!["a".to_owned(), "b".to_owned()]);
        doc.remove_class(el, "a");
        assert!(!doc.has_class(el, "a"));
    }

    #[test]
    fn markup_replaces_children() {
        let mut doc = MemoryDocument::new();
        let el = doc.append(doc.body(), "div");
        let _child = doc.append(el, "span");
        doc.set_markup(el, "<p>hi</p>");
        assert!(doc.children(el).is_empty());
        assert_eq!(doc.text(el), "<p>hi</p>");
    }

    #[test]
    fn scrollbar_measurements_are_counted() {
        let mut doc = MemoryDocument::new().with_scrollbar_width(17.0);
        assert_eq!(doc.scrollbar_width(), 17.0);
        assert_eq!(doc.measurements(), 1);
    }

    #[test]
    fn fixed_elements_match_inline_position_and_chrome_classes() {
        let mut doc = MemoryDocument::new();
        let header = doc.append(doc.body(), "header");
        doc.add_class(header, "fixed-header");
        let main = doc.append(doc.body(), "main");
        let pinned = doc.append(main, "div");
        doc.set_style(pinned, "position", Some("fixed"));
        let sticky = doc.append(main, "div");
        doc.set_style(sticky, "position", Some("sticky"));
        let aside = doc.append(doc.body(), "aside");
        doc.add_class(aside, "fixed-sidebar");
        let stray = doc.create_element("div");
        doc.add_class(stray, "fixed-header");

        assert_eq!(doc.fixed_elements(), vec![header, pinned, aside]);
    }

    #[test]
    fn detached_elements_keep_their_slot() {
        let mut doc = MemoryDocument::new();
        let panel = doc.append_with_id(doc.body(), "div", "panel");
        doc.detach(panel);
        let fresh = doc.create_element("div");
        assert_ne!(fresh, panel);
        doc.append_child(doc.body(), panel);
        assert_eq!(doc.find_by_id("panel"), Some(panel));
    }

    proptest! {
        #[test]
        fn moves_keep_parent_and_child_links_consistent(
            ops in proptest::collection::vec((0usize..8, 0usize..8, 0usize..4), 1..60)
        ) {
            let mut doc = MemoryDocument::new();
            let body = doc.body();
            let els: Vec<ElementId> = (0..8).map(|_| doc.append(body, "div")).collect();
            for (child, parent, index) in ops {
                if child == parent {
                    doc.detach(els[child]);
                } else {
                    doc.insert_child(els[parent], index, els[child]);
                }
                for &el in &els {
                    let holders: Vec<ElementId> = std::iter::once(body)
                        .chain(els.iter().copied())
                        .filter(|&p| doc.children(p).contains(&el))
                        .collect();
                    prop_assert!(holders.len() <= 1);
                    prop_assert_eq!(holders.first().copied(), doc.parent(el));
                }
            }
        }
    }

    #[test]
    fn outline_ignores_detached_nodes_and_ids() {
        let mut a = MemoryDocument::new();
        let el = a.append_with_id(a.body(), "div", "panel");
        a.add_class(el, "card");
        a.set_style(el, "display", Some("none"));
        a.set_text(el, "hi");

        let mut b = MemoryDocument::new();
        let stray = b.create_element("span");
        b.set_text(stray, "detached");
        let el = b.append_with_id(b.body(), "div", "panel");
        b.add_class(el, "card");
        b.set_style(el, "display", Some("none"));
        b.set_text(el, "hi");

        assert_eq!(a.outline(), b.outline());
        assert!(a.outline().contains("<div class=\"card\" id=\"panel\" style=\"display: none\"> \"hi\""));
    }
}
