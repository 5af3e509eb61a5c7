//! Capability interface between page behaviors and the host page
//!
//! Behaviors only see the page through [`Document`] and [`Dialogs`]. The
//! in-memory [`memory::MemoryPage`] backs tests and the simulator, and
//! `web::WebPage` backs a real browser on `wasm32`.

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::{fmt, sync::Arc};

use serde::Serialize;

use crate::error::BehaviorError;

/// Opaque handle to an element owned by a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ElementId(pub(crate) usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element #{}", self.0)
    }
}

/// The small selector vocabulary the behaviors need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Tag(String),
    AnyTag(Vec<String>),
    Class(String),
}

impl Selector {
    pub fn tag(name: &str) -> Self {
        Self::Tag(name.to_string())
    }

    pub fn any_tag(names: &[&str]) -> Self {
        Self::AnyTag(names.iter().map(|name| name.to_string()).collect())
    }

    pub fn class(name: &str) -> Self {
        Self::Class(name.to_string())
    }

    /// Check a tag name and class list against this selector
    pub fn matches(&self, tag: &str, classes: &[&str]) -> bool {
        match self {
            Self::Tag(name) => tag.eq_ignore_ascii_case(name),
            Self::AnyTag(names) => names.iter().any(|name| tag.eq_ignore_ascii_case(name)),
            Self::Class(name) => classes.iter().any(|class| class == name),
        }
    }

    /// CSS form of the selector, for hosts with a native query engine
    pub fn to_css(&self) -> String {
        match self {
            Self::Tag(name) => name.clone(),
            Self::AnyTag(names) => names.join(", "),
            Self::Class(name) => format!(".{name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Submit,
    Click,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Click => "click",
        }
    }
}

/// A dispatched event as seen by a listener.
#[derive(Debug, Clone)]
pub struct Event {
    kind: EventKind,
    target: ElementId,
    current_target: ElementId,
    default_prevented: bool,
}

impl Event {
    pub fn new(kind: EventKind, target: ElementId) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            default_prevented: false,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn target(&self) -> ElementId {
        self.target
    }

    /// The element whose listener is currently running
    pub fn current_target(&self) -> ElementId {
        self.current_target
    }

    pub(crate) fn set_current_target(&mut self, element: ElementId) {
        self.current_target = element;
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Element queries and mutations.
pub trait Document {
    /// All matching elements in document order
    fn query_all(&self, selector: &Selector) -> Vec<ElementId>;

    /// Matching descendants of `root` in document order (`root` excluded)
    fn query_within(&self, root: ElementId, selector: &Selector) -> Vec<ElementId>;

    fn element_by_id(&self, id: &str) -> Option<ElementId>;

    fn has_attribute(&self, element: ElementId, name: &str) -> bool;

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    /// Current value of a form control, empty for anything else
    fn value(&self, element: ElementId) -> String;

    fn has_class(&self, element: ElementId, class: &str) -> bool;

    fn add_class(&mut self, element: ElementId, class: &str) -> Result<(), BehaviorError>;

    fn remove_class(&mut self, element: ElementId, class: &str) -> Result<(), BehaviorError>;

    fn text_content(&self, element: ElementId) -> String;

    fn set_text_content(&mut self, element: ElementId, text: &str) -> Result<(), BehaviorError>;

    /// Inline `display` style, `None` when not set
    fn inline_display(&self, element: ElementId) -> Option<String>;

    fn set_inline_display(&mut self, element: ElementId, display: &str)
        -> Result<(), BehaviorError>;

    fn next_element_sibling(&self, element: ElementId) -> Option<ElementId>;

    /// Submit a form directly. No submit event is fired, so submit
    /// listeners are bypassed.
    fn submit_form(&mut self, form: ElementId) -> Result<(), BehaviorError>;

    fn add_listener(
        &mut self,
        target: ElementId,
        kind: EventKind,
        listener: Arc<dyn Listener>,
    ) -> Result<(), BehaviorError>;
}

/// Blocking user dialogs.
pub trait Dialogs {
    fn alert(&mut self, message: &str);

    fn confirm(&mut self, message: &str) -> bool;
}

/// Everything a behavior may touch.
pub trait Page: Document + Dialogs {}

impl<T: Document + Dialogs + ?Sized> Page for T {}

/// An event handler registered against a page element.
pub trait Listener: Send + Sync {
    fn handle(&self, page: &mut dyn Page, event: &mut Event) -> Result<(), BehaviorError>;
}
