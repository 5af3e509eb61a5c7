//! Page initialization: discover the markup hooks and register listeners

use std::sync::Arc;

use tracing::info;

use super::{CountdownSession, DeleteGuard, FormGuard, OptionToggle};
use crate::{
    dom::{ElementId, EventKind, Page, Selector},
    error::BehaviorError,
    markup::Markup,
};

/// What [`attach`] wired up on a page
#[derive(Debug)]
pub struct Attachment {
    pub forms: Vec<ElementId>,
    /// Toggle buttons paired with their option panels
    pub toggles: Vec<(ElementId, ElementId)>,
    pub delete_buttons: Vec<ElementId>,
    /// The quiz countdown, not yet started
    pub timer: Option<CountdownSession>,
}

/// Attach all four behaviors to a rendered page.
///
/// Every hook is discovered and checked before the first listener is
/// registered, so a configuration error leaves the page untouched.
pub fn attach(page: &mut dyn Page, markup: &Markup) -> Result<Attachment, BehaviorError> {
    let forms = page.query_all(&Selector::tag("form"));
    let toggle_buttons = page.query_all(&Selector::class(&markup.toggle_class));
    let delete_buttons = page.query_all(&Selector::class(&markup.delete_class));

    let mut toggles = Vec::with_capacity(toggle_buttons.len());
    for button in &toggle_buttons {
        toggles.push((*button, OptionToggle::panel_for(&*page, *button)?));
    }
    let timer = CountdownSession::discover(&*page, markup)?;

    for form in &forms {
        page.add_listener(
            *form,
            EventKind::Submit,
            Arc::new(FormGuard::new(*form, markup.clone())),
        )?;
    }
    for button in &toggle_buttons {
        let toggle = OptionToggle::bind(page, *button)?;
        page.add_listener(*button, EventKind::Click, Arc::new(toggle))?;
    }
    for button in &delete_buttons {
        page.add_listener(
            *button,
            EventKind::Click,
            Arc::new(DeleteGuard::new(*button, &markup.delete_confirmation)),
        )?;
    }

    info!(
        "Attached page behaviors: {} form(s), {} toggle(s), {} delete button(s), timer: {}",
        forms.len(),
        toggles.len(),
        delete_buttons.len(),
        timer
            .as_ref()
            .map(|session| session.duration().to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    Ok(Attachment {
        forms,
        toggles,
        delete_buttons,
        timer,
    })
}
