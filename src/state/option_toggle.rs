//! Show/hide toggling of question option panels

use std::sync::Mutex;

use tracing::debug;

use crate::{
    dom::{Document, ElementId, Event, Listener, Page},
    error::BehaviorError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Hidden,
}

impl Visibility {
    /// Read the initial state from an inline `display` value.
    ///
    /// Only an explicit non-`none` value counts as shown; an unset value is
    /// hidden.
    pub fn from_inline_display(display: Option<&str>) -> Self {
        match display.map(str::trim) {
            Some(value) if !value.is_empty() && !value.eq_ignore_ascii_case("none") => {
                Self::Shown
            }
            _ => Self::Hidden,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Shown => Self::Hidden,
            Self::Hidden => Self::Shown,
        }
    }

    pub fn css_display(self) -> &'static str {
        match self {
            Self::Shown => "block",
            Self::Hidden => "none",
        }
    }
}

/// Click listener flipping the panel that follows a toggle button
#[derive(Debug)]
pub struct OptionToggle {
    button: ElementId,
    panel: ElementId,
    visibility: Mutex<Visibility>,
}

impl OptionToggle {
    /// Bind `button` to its next sibling and settle the panel's initial
    /// state, writing it back so the page and the toggle agree.
    pub fn bind(page: &mut dyn Page, button: ElementId) -> Result<Self, BehaviorError> {
        let panel = Self::panel_for(&*page, button)?;
        let visibility = Visibility::from_inline_display(page.inline_display(panel).as_deref());
        if page.inline_display(panel).is_none() {
            page.set_inline_display(panel, visibility.css_display())?;
        }
        Ok(Self {
            button,
            panel,
            visibility: Mutex::new(visibility),
        })
    }

    /// Locate the panel without touching the page
    pub fn panel_for<D: Document + ?Sized>(
        page: &D,
        button: ElementId,
    ) -> Result<ElementId, BehaviorError> {
        page.next_element_sibling(button)
            .ok_or(BehaviorError::MissingOptionsPanel { button })
    }

    pub fn button(&self) -> ElementId {
        self.button
    }

    pub fn panel(&self) -> ElementId {
        self.panel
    }

    pub fn visibility(&self) -> Visibility {
        match self.visibility.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl Listener for OptionToggle {
    fn handle(&self, page: &mut dyn Page, _event: &mut Event) -> Result<(), BehaviorError> {
        let mut visibility = self
            .visibility
            .lock()
            .map_err(|e| BehaviorError::Host(format!("Failed to lock toggle state: {}", e)))?;

        let next = visibility.toggled();
        page.set_inline_display(self.panel, next.css_display())?;
        *visibility = next;
        debug!("{} toggled {} to {:?}", self.button, self.panel, next);
        Ok(())
    }
}
