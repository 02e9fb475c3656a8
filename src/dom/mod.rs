//! Mutable HTML document.
//!
//! Pages are held as a `scraper::Html` tree. Node handles are the tree's own
//! `ego_tree` ids, so parent walks for event bubbling read straight from the
//! tree. Queries use `scraper::Selector` and output goes through html5ever's
//! serializer. Replaced subtrees stay in the arena but are detached, so a
//! stale `NodeId` never dangles; it simply stops being reachable from
//! [`Document::root`].

mod fragment;
mod style;

use ego_tree::NodeRef;
use html5ever::{ns, Attribute, LocalName, QualName};
use scraper::node::{Element, Text};
use scraper::{ElementRef, Html, Node, StrTendril};

pub use ego_tree::NodeId;
pub use scraper::Selector;

/// A CSS selector that failed to parse.
#[derive(Debug, thiserror::Error)]
#[error("invalid selector {selector:?}: {message}")]
pub struct SelectorError {
    pub selector: String,
    pub message: String,
}

/// Parse a CSS selector group.
pub fn parse_selector(selector: &str) -> Result<Selector, SelectorError> {
    Selector::parse(selector).map_err(|e| SelectorError {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            html: Html::new_document(),
        }
    }

    /// Parse a complete HTML document.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    pub fn root(&self) -> NodeId {
        self.html.tree.root().id()
    }

    fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(id)
    }

    fn element_ref(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.node(id).and_then(ElementRef::wrap)
    }

    /// Local tag name of an element.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element_ref(id).map(|el| el.value().name())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent().map(|p| p.id())
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|node| node.children().map(|c| c.id()).collect())
            .unwrap_or_default()
    }

    /// Iterate over the ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|node| node.ancestors())
            .map(|node| node.id())
    }

    /// Elements attached to the tree that match `selector`, in document order.
    pub fn select(&self, selector: &Selector) -> Vec<NodeId> {
        self.html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| selector.matches(el))
            .map(|el| el.id())
            .collect()
    }

    /// Parse `selector` and run [`Document::select`].
    pub fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let selector = parse_selector(selector)?;
        Ok(self.select(&selector))
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element_ref(id).and_then(|el| el.attr(name))
    }

    /// Set an attribute on an element, keeping the others in place.
    /// Non-element nodes are left alone.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(mut node) = self.html.tree.get_mut(id) else {
            return;
        };
        let Node::Element(element) = node.value() else {
            return;
        };

        let mut replaced = false;
        let mut attrs: Vec<Attribute> = element
            .attrs
            .iter()
            .map(|(qual, current)| {
                let is_target = qual.prefix.is_none() && &*qual.local == name;
                replaced |= is_target;
                Attribute {
                    name: qual.clone(),
                    value: if is_target {
                        StrTendril::from_slice(value)
                    } else {
                        current.clone()
                    },
                }
            })
            .collect();
        if !replaced {
            attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(name)),
                value: StrTendril::from_slice(value),
            });
        }

        // Rebuilt so the cached id and class lists follow the new attributes.
        let tag = element.name.clone();
        *element = Element::new(tag, attrs);
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        self.node(id)
            .map(|node| {
                node.descendants()
                    .filter_map(|n| n.value().as_text())
                    .map(|text| &**text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Replace all children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.detach_children(id);
        if text.is_empty() {
            return;
        }
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.append(Node::Text(Text {
                text: StrTendril::from_slice(text),
            }));
        }
    }

    /// Replace all children of an element with nodes parsed from `html`.
    ///
    /// The markup is parsed in the element's own context, so table rows
    /// land inside a `<tbody>` the way `innerHTML` would place them.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        let Some(context) = self.element_ref(id).map(|el| el.value().name.clone()) else {
            return;
        };
        let parsed = fragment::parse_in_context(html, context);

        self.detach_children(id);
        let grafted = self.html.tree.extend_tree(parsed.tree).id();
        let wrapper = self
            .html
            .tree
            .get(grafted)
            .and_then(|root| root.children().find(|c| c.value().is_element()))
            .map(|w| w.id());

        if let (Some(wrapper), Some(mut target)) = (wrapper, self.html.tree.get_mut(id)) {
            target.reparent_from_id_append(wrapper);
        }
    }

    /// Serialize the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        match self.element_ref(id) {
            Some(el) => el.inner_html(),
            None if id == self.root() => self.html(),
            None => String::new(),
        }
    }

    /// Serialize `id` including its own tag.
    pub fn outer_html(&self, id: NodeId) -> String {
        self.element_ref(id)
            .map(|el| el.html())
            .unwrap_or_default()
    }

    /// Serialize the whole document.
    pub fn html(&self) -> String {
        self.html.html()
    }

    /// Read one property from an element's inline `style` attribute.
    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        self.attr(id, "style")
            .and_then(|style| style::get_property(style, property))
    }

    /// Set one property in an element's inline `style` attribute, keeping the rest.
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) {
        let current = self.attr(id, "style").unwrap_or_default();
        let updated = style::set_property(current, property, value);
        self.set_attr(id, "style", &updated);
    }

    fn detach_children(&mut self, id: NodeId) {
        for child in self.children(id) {
            if let Some(mut node) = self.html.tree.get_mut(child) {
                node.detach();
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
