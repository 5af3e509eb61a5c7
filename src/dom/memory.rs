//! In-memory page model
//!
//! A small arena DOM with scripted dialogs and a log of every observable
//! side effect. Listeners run along the bubbling path. If the event is not
//! cancelled, the default action runs afterwards, as a browser would do.

use std::{
    collections::{BTreeMap, VecDeque},
    fmt,
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Dialogs, Document, ElementId, Event, EventKind, Listener, Selector};
use crate::error::BehaviorError;

/// Observable side effect recorded by a [`MemoryPage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum PageEffect {
    Alert { message: String },
    Confirm { message: String, accepted: bool },
    ClassAdded { element: ElementId, class: String },
    ClassRemoved { element: ElementId, class: String },
    TextChanged { element: ElementId, text: String },
    DisplayChanged { element: ElementId, display: String },
    FormSubmitted { form: ElementId, programmatic: bool },
    Navigated { href: String },
}

/// Result of dispatching one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub default_prevented: bool,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    tag: String,
    attrs: BTreeMap<String, String>,
    /// Value typed into a control, overriding its markup default
    value: Option<String>,
    text: String,
}

struct Registration {
    target: ElementId,
    kind: EventKind,
    listener: Arc<dyn Listener>,
}

/// Deterministic stand-in for a rendered page.
pub struct MemoryPage {
    nodes: Vec<Node>,
    listeners: Vec<Registration>,
    confirm_responses: VecDeque<bool>,
    default_confirm_response: bool,
    effects: Vec<PageEffect>,
}

impl fmt::Debug for MemoryPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPage")
            .field("elements", &self.nodes.len())
            .field("listeners", &self.listeners.len())
            .field("pending_confirm_responses", &self.confirm_responses.len())
            .field("effects", &self.effects.len())
            .finish()
    }
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    /// Create an empty page containing only `<body>`
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                tag: "body".to_string(),
                attrs: BTreeMap::new(),
                value: None,
                text: String::new(),
            }],
            listeners: Vec::new(),
            confirm_responses: VecDeque::new(),
            default_confirm_response: true,
            effects: Vec::new(),
        }
    }

    pub fn body(&self) -> ElementId {
        ElementId(0)
    }

    /// Append an element to `<body>`
    pub fn append(&mut self, tag: &str, attrs: &[(&str, &str)]) -> ElementId {
        self.create(self.body(), tag, attrs)
    }

    /// Append an element under `parent`
    pub fn append_to(
        &mut self,
        parent: ElementId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<ElementId, BehaviorError> {
        self.node(parent)?;
        Ok(self.create(parent, tag, attrs))
    }

    fn create(&mut self, parent: ElementId, tag: &str, attrs: &[(&str, &str)]) -> ElementId {
        let id = ElementId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            tag: tag.to_ascii_lowercase(),
            attrs: attrs
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            value: None,
            text: String::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Replace the text of an element, as the server would have rendered it
    pub fn set_text(&mut self, element: ElementId, text: &str) -> Result<(), BehaviorError> {
        self.node_mut(element)?.text = text.to_string();
        Ok(())
    }

    /// Type a value into a control
    pub fn set_value(&mut self, element: ElementId, value: &str) -> Result<(), BehaviorError> {
        self.node_mut(element)?.value = Some(value.to_string());
        Ok(())
    }

    /// Queue the answer for the next confirmation dialog
    pub fn enqueue_confirm_response(&mut self, accepted: bool) {
        self.confirm_responses.push_back(accepted);
    }

    /// Answer used once the queue of scripted responses is empty
    pub fn set_default_confirm_response(&mut self, accepted: bool) {
        self.default_confirm_response = accepted;
    }

    pub fn effects(&self) -> &[PageEffect] {
        &self.effects
    }

    pub fn take_effects(&mut self) -> Vec<PageEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn alerts(&self) -> Vec<String> {
        self.effects
            .iter()
            .filter_map(|effect| match effect {
                PageEffect::Alert { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Submitted forms with their `programmatic` flag, in order
    pub fn submitted_forms(&self) -> Vec<(ElementId, bool)> {
        self.effects
            .iter()
            .filter_map(|effect| match effect {
                PageEffect::FormSubmitted { form, programmatic } => Some((*form, *programmatic)),
                _ => None,
            })
            .collect()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.effects
            .iter()
            .filter_map(|effect| match effect {
                PageEffect::Navigated { href } => Some(href.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// User click on an element
    pub fn click(&mut self, element: ElementId) -> Result<DispatchOutcome, BehaviorError> {
        self.dispatch(element, EventKind::Click)
    }

    /// User-initiated submission of a form, firing its submit event
    pub fn request_submit(&mut self, form: ElementId) -> Result<DispatchOutcome, BehaviorError> {
        self.dispatch(form, EventKind::Submit)
    }

    /// Run listeners from `target` up through its ancestors, then the
    /// default action unless a listener cancelled it.
    pub fn dispatch(
        &mut self,
        target: ElementId,
        kind: EventKind,
    ) -> Result<DispatchOutcome, BehaviorError> {
        self.node(target)?;
        let mut event = Event::new(kind, target);

        for current in self.ancestors_inclusive(target) {
            let listeners: Vec<Arc<dyn Listener>> = self
                .listeners
                .iter()
                .filter(|registration| registration.target == current && registration.kind == kind)
                .map(|registration| Arc::clone(&registration.listener))
                .collect();

            event.set_current_target(current);
            for listener in listeners {
                listener.handle(self, &mut event)?;
            }
        }

        let default_prevented = event.default_prevented();
        debug!(
            "Dispatched {} on {} (default prevented: {})",
            kind.as_str(),
            target,
            default_prevented
        );
        if !default_prevented {
            self.run_default_action(target, kind)?;
        }

        Ok(DispatchOutcome { default_prevented })
    }

    fn run_default_action(&mut self, target: ElementId, kind: EventKind) -> Result<(), BehaviorError> {
        match kind {
            EventKind::Submit => {
                if self.is_tag(target, "form") {
                    self.effects.push(PageEffect::FormSubmitted {
                        form: target,
                        programmatic: false,
                    });
                }
            }
            EventKind::Click => {
                for element in self.ancestors_inclusive(target) {
                    if self.is_tag(element, "a") {
                        if let Some(href) = self.attribute(element, "href") {
                            self.effects.push(PageEffect::Navigated { href });
                            return Ok(());
                        }
                    }
                    if self.is_submit_button(element) {
                        if let Some(form) = self.owning_form(element) {
                            self.dispatch(form, EventKind::Submit)?;
                        }
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    fn is_submit_button(&self, element: ElementId) -> bool {
        let kind = self
            .attribute(element, "type")
            .map(|kind| kind.to_ascii_lowercase());
        if self.is_tag(element, "button") {
            return matches!(kind.as_deref(), None | Some("submit"));
        }
        self.is_tag(element, "input") && matches!(kind.as_deref(), Some("submit") | Some("image"))
    }

    fn owning_form(&self, element: ElementId) -> Option<ElementId> {
        self.ancestors_inclusive(element)
            .into_iter()
            .skip(1)
            .find(|ancestor| self.is_tag(*ancestor, "form"))
    }

    fn ancestors_inclusive(&self, element: ElementId) -> Vec<ElementId> {
        let mut path = Vec::new();
        let mut current = Some(element);
        while let Some(id) = current {
            path.push(id);
            current = self.nodes.get(id.0).and_then(|node| node.parent);
        }
        path
    }

    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = match self.nodes.get(root.0) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    fn matches(&self, element: ElementId, selector: &Selector) -> bool {
        let node = &self.nodes[element.0];
        let classes: Vec<&str> = node
            .attrs
            .get("class")
            .map(|class| class.split_whitespace().collect())
            .unwrap_or_default();
        selector.matches(&node.tag, &classes)
    }

    fn is_tag(&self, element: ElementId, tag: &str) -> bool {
        self.nodes
            .get(element.0)
            .map(|node| node.tag == tag)
            .unwrap_or(false)
    }

    fn node(&self, element: ElementId) -> Result<&Node, BehaviorError> {
        self.nodes
            .get(element.0)
            .ok_or(BehaviorError::UnknownElement(element))
    }

    fn node_mut(&mut self, element: ElementId) -> Result<&mut Node, BehaviorError> {
        self.nodes
            .get_mut(element.0)
            .ok_or(BehaviorError::UnknownElement(element))
    }

    fn select_value(&self, select: ElementId) -> String {
        let options: Vec<ElementId> = self
            .descendants(select)
            .into_iter()
            .filter(|id| self.is_tag(*id, "option"))
            .collect();
        let chosen = options
            .iter()
            .find(|id| self.nodes[id.0].attrs.contains_key("selected"))
            .or_else(|| options.first());
        chosen
            .map(|id| {
                let node = &self.nodes[id.0];
                node.attrs
                    .get("value")
                    .cloned()
                    .unwrap_or_else(|| node.text.clone())
            })
            .unwrap_or_default()
    }
}

impl Document for MemoryPage {
    fn query_all(&self, selector: &Selector) -> Vec<ElementId> {
        let mut all = vec![self.body()];
        all.extend(self.descendants(self.body()));
        all.into_iter()
            .filter(|id| self.matches(*id, selector))
            .collect()
    }

    fn query_within(&self, root: ElementId, selector: &Selector) -> Vec<ElementId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.matches(*id, selector))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        std::iter::once(self.body())
            .chain(self.descendants(self.body()))
            .find(|element| self.nodes[element.0].attrs.get("id").map(String::as_str) == Some(id))
    }

    fn has_attribute(&self, element: ElementId, name: &str) -> bool {
        self.nodes
            .get(element.0)
            .map(|node| node.attrs.contains_key(name))
            .unwrap_or(false)
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.nodes
            .get(element.0)
            .and_then(|node| node.attrs.get(name).cloned())
    }

    fn value(&self, element: ElementId) -> String {
        let Some(node) = self.nodes.get(element.0) else {
            return String::new();
        };
        if let Some(value) = &node.value {
            return value.clone();
        }
        match node.tag.as_str() {
            "input" => node.attrs.get("value").cloned().unwrap_or_default(),
            "textarea" => node.text.clone(),
            "select" => self.select_value(element),
            _ => String::new(),
        }
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.nodes
            .get(element.0)
            .and_then(|node| node.attrs.get("class"))
            .map(|classes| classes.split_whitespace().any(|name| name == class))
            .unwrap_or(false)
    }

    fn add_class(&mut self, element: ElementId, class: &str) -> Result<(), BehaviorError> {
        if self.has_class(element, class) {
            return Ok(());
        }
        let node = self.node_mut(element)?;
        let classes = node.attrs.entry("class".to_string()).or_default();
        if !classes.is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
        self.effects.push(PageEffect::ClassAdded {
            element,
            class: class.to_string(),
        });
        Ok(())
    }

    fn remove_class(&mut self, element: ElementId, class: &str) -> Result<(), BehaviorError> {
        if !self.has_class(element, class) {
            self.node(element)?;
            return Ok(());
        }
        let node = self.node_mut(element)?;
        if let Some(classes) = node.attrs.get_mut("class") {
            *classes = classes
                .split_whitespace()
                .filter(|name| *name != class)
                .collect::<Vec<_>>()
                .join(" ");
        }
        self.effects.push(PageEffect::ClassRemoved {
            element,
            class: class.to_string(),
        });
        Ok(())
    }

    fn text_content(&self, element: ElementId) -> String {
        self.nodes
            .get(element.0)
            .map(|node| node.text.clone())
            .unwrap_or_default()
    }

    fn set_text_content(&mut self, element: ElementId, text: &str) -> Result<(), BehaviorError> {
        let node = self.node_mut(element)?;
        node.text = text.to_string();
        let removed = std::mem::take(&mut node.children);
        for child in removed {
            self.nodes[child.0].parent = None;
        }
        self.effects.push(PageEffect::TextChanged {
            element,
            text: text.to_string(),
        });
        Ok(())
    }

    fn inline_display(&self, element: ElementId) -> Option<String> {
        self.attribute(element, "style")
            .and_then(|style| parse_inline_display(&style))
    }

    fn set_inline_display(
        &mut self,
        element: ElementId,
        display: &str,
    ) -> Result<(), BehaviorError> {
        let node = self.node_mut(element)?;
        let style = node.attrs.get("style").cloned().unwrap_or_default();
        node.attrs
            .insert("style".to_string(), with_display(&style, display));
        self.effects.push(PageEffect::DisplayChanged {
            element,
            display: display.to_string(),
        });
        Ok(())
    }

    fn next_element_sibling(&self, element: ElementId) -> Option<ElementId> {
        let parent = self.nodes.get(element.0)?.parent?;
        let siblings = &self.nodes[parent.0].children;
        let position = siblings.iter().position(|id| *id == element)?;
        siblings.get(position + 1).copied()
    }

    fn submit_form(&mut self, form: ElementId) -> Result<(), BehaviorError> {
        self.node(form)?;
        self.effects.push(PageEffect::FormSubmitted {
            form,
            programmatic: true,
        });
        Ok(())
    }

    fn add_listener(
        &mut self,
        target: ElementId,
        kind: EventKind,
        listener: Arc<dyn Listener>,
    ) -> Result<(), BehaviorError> {
        self.node(target)?;
        self.listeners.push(Registration {
            target,
            kind,
            listener,
        });
        Ok(())
    }
}

impl Dialogs for MemoryPage {
    fn alert(&mut self, message: &str) {
        debug!("alert: {}", message);
        self.effects.push(PageEffect::Alert {
            message: message.to_string(),
        });
    }

    fn confirm(&mut self, message: &str) -> bool {
        let accepted = self
            .confirm_responses
            .pop_front()
            .unwrap_or(self.default_confirm_response);
        debug!("confirm: {} -> {}", message, accepted);
        self.effects.push(PageEffect::Confirm {
            message: message.to_string(),
            accepted,
        });
        accepted
    }
}

/// JSON description of a rendered page body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageFixture {
    #[serde(default)]
    pub body: Vec<NodeFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeFixture {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeFixture>,
}

impl MemoryPage {
    pub fn from_fixture(fixture: &PageFixture) -> Self {
        let mut page = Self::new();
        let body = page.body();
        for node in &fixture.body {
            page.build(body, node);
        }
        page
    }

    fn build(&mut self, parent: ElementId, fixture: &NodeFixture) {
        let attrs: Vec<(&str, &str)> = fixture
            .attrs
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        let id = self.create(parent, &fixture.tag, &attrs);
        if let Some(text) = &fixture.text {
            self.nodes[id.0].text = text.clone();
        }
        for child in &fixture.children {
            self.build(id, child);
        }
    }
}

fn parse_inline_display(style: &str) -> Option<String> {
    style
        .split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .filter(|(property, _)| property.trim().eq_ignore_ascii_case("display"))
        .map(|(_, value)| value.trim().to_string())
        .last()
}

fn with_display(style: &str, display: &str) -> String {
    let mut declarations: Vec<String> = style
        .split(';')
        .map(str::trim)
        .filter(|declaration| !declaration.is_empty())
        .filter(|declaration| {
            declaration
                .split_once(':')
                .map(|(property, _)| !property.trim().eq_ignore_ascii_case("display"))
                .unwrap_or(true)
        })
        .map(str::to_string)
        .collect();
    declarations.push(format!("display: {display}"));
    declarations.join("; ")
}
