//! Confirmation before destructive delete actions

use tracing::info;

use crate::{
    dom::{ElementId, Event, Listener, Page},
    error::BehaviorError,
};

/// Click listener that cancels the delete unless the user confirms
#[derive(Debug, Clone)]
pub struct DeleteGuard {
    button: ElementId,
    message: String,
}

impl DeleteGuard {
    pub fn new(button: ElementId, message: &str) -> Self {
        Self {
            button,
            message: message.to_string(),
        }
    }
}

impl Listener for DeleteGuard {
    fn handle(&self, page: &mut dyn Page, event: &mut Event) -> Result<(), BehaviorError> {
        if !page.confirm(&self.message) {
            info!("Delete via {} declined", self.button);
            event.prevent_default();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{memory::MemoryPage, EventKind};

    #[test]
    fn declining_cancels_the_click() {
        let mut page = MemoryPage::new();
        let button = page.append("button", &[("class", "delete-btn")]);
        page.enqueue_confirm_response(false);
        let guard = DeleteGuard::new(button, "Are you sure you want to delete this item?");

        let mut event = Event::new(EventKind::Click, button);
        guard.handle(&mut page, &mut event).unwrap();
        assert!(event.default_prevented());
    }

    #[test]
    fn accepting_leaves_the_click_alone() {
        let mut page = MemoryPage::new();
        let button = page.append("button", &[("class", "delete-btn")]);
        page.enqueue_confirm_response(true);
        let guard = DeleteGuard::new(button, "Delete?");

        let mut event = Event::new(EventKind::Click, button);
        guard.handle(&mut page, &mut event).unwrap();
        assert!(!event.default_prevented());
    }
}
