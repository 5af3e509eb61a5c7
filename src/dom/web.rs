//! Browser binding over `web-sys`
//!
//! `WebPage` hands out [`ElementId`]s for the DOM elements it has seen and
//! maps them back on every call. Listeners and the countdown become
//! `wasm-bindgen` closures owned by the page for its whole lifetime.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    sync::Arc,
};

use js_sys::Function;
use tracing::{error, warn};
use wasm_bindgen::{prelude::*, JsCast};
use web_sys::{
    Element, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, NodeList, Window,
};

use super::{Dialogs, Document, ElementId, Event, EventKind, Listener, Selector};
use crate::{
    error::BehaviorError,
    markup::Markup,
    state::{attach, CountdownSession},
};

const TICK_MS: i32 = 1000;

fn host_error(value: JsValue) -> BehaviorError {
    BehaviorError::Host(format!("{:?}", value))
}

/// The live page as seen through `window.document`
#[derive(Clone)]
pub struct WebPage {
    window: Window,
    document: web_sys::Document,
    elements: Rc<RefCell<Vec<Element>>>,
}

impl WebPage {
    pub fn new() -> Result<Self, BehaviorError> {
        let window = web_sys::window().ok_or_else(|| BehaviorError::Host("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| BehaviorError::Host("window has no document".into()))?;
        Ok(Self {
            window,
            document,
            elements: Rc::new(RefCell::new(Vec::new())),
        })
    }

    fn intern(&self, element: Element) -> ElementId {
        let mut elements = self.elements.borrow_mut();
        if let Some(index) = elements.iter().position(|known| *known == element) {
            return ElementId(index);
        }
        elements.push(element);
        ElementId(elements.len() - 1)
    }

    fn element(&self, id: ElementId) -> Option<Element> {
        self.elements.borrow().get(id.0).cloned()
    }

    fn require(&self, id: ElementId) -> Result<Element, BehaviorError> {
        self.element(id).ok_or(BehaviorError::UnknownElement(id))
    }

    fn require_html(&self, id: ElementId) -> Result<HtmlElement, BehaviorError> {
        self.require(id)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| BehaviorError::Host(format!("{id} is not an HTML element")))
    }

    fn collect(&self, list: Result<NodeList, JsValue>) -> Vec<ElementId> {
        let list = match list {
            Ok(list) => list,
            Err(e) => {
                warn!("querySelectorAll failed: {:?}", e);
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.intern(element))
            .collect()
    }
}

impl Document for WebPage {
    fn query_all(&self, selector: &Selector) -> Vec<ElementId> {
        self.collect(self.document.query_selector_all(&selector.to_css()))
    }

    fn query_within(&self, root: ElementId, selector: &Selector) -> Vec<ElementId> {
        match self.element(root) {
            Some(root) => self.collect(root.query_selector_all(&selector.to_css())),
            None => Vec::new(),
        }
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.document
            .get_element_by_id(id)
            .map(|element| self.intern(element))
    }

    fn has_attribute(&self, element: ElementId, name: &str) -> bool {
        self.element(element)
            .map(|element| element.has_attribute(name))
            .unwrap_or(false)
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.element(element)?.get_attribute(name)
    }

    fn value(&self, element: ElementId) -> String {
        let Some(element) = self.element(element) else {
            return String::new();
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            String::new()
        }
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.element(element)
            .map(|element| element.class_list().contains(class))
            .unwrap_or(false)
    }

    fn add_class(&mut self, element: ElementId, class: &str) -> Result<(), BehaviorError> {
        self.require(element)?
            .class_list()
            .add_1(class)
            .map_err(host_error)
    }

    fn remove_class(&mut self, element: ElementId, class: &str) -> Result<(), BehaviorError> {
        self.require(element)?
            .class_list()
            .remove_1(class)
            .map_err(host_error)
    }

    fn text_content(&self, element: ElementId) -> String {
        self.element(element)
            .and_then(|element| element.text_content())
            .unwrap_or_default()
    }

    fn set_text_content(&mut self, element: ElementId, text: &str) -> Result<(), BehaviorError> {
        self.require(element)?.set_text_content(Some(text));
        Ok(())
    }

    fn inline_display(&self, element: ElementId) -> Option<String> {
        let element = self.element(element)?.dyn_into::<HtmlElement>().ok()?;
        element
            .style()
            .get_property_value("display")
            .ok()
            .filter(|display| !display.is_empty())
    }

    fn set_inline_display(
        &mut self,
        element: ElementId,
        display: &str,
    ) -> Result<(), BehaviorError> {
        self.require_html(element)?
            .style()
            .set_property("display", display)
            .map_err(host_error)
    }

    fn next_element_sibling(&self, element: ElementId) -> Option<ElementId> {
        self.element(element)?
            .next_element_sibling()
            .map(|sibling| self.intern(sibling))
    }

    fn submit_form(&mut self, form: ElementId) -> Result<(), BehaviorError> {
        self.require(form)?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| BehaviorError::Host(format!("{form} is not a form")))?
            .submit()
            .map_err(host_error)
    }

    fn add_listener(
        &mut self,
        target: ElementId,
        kind: EventKind,
        listener: Arc<dyn Listener>,
    ) -> Result<(), BehaviorError> {
        let element = self.require(target)?;
        let page = self.clone();

        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |web_event: web_sys::Event| {
            let mut page = page.clone();
            let origin = web_event
                .target()
                .and_then(|origin| origin.dyn_into::<Element>().ok())
                .map(|origin| page.intern(origin))
                .unwrap_or(target);

            let mut event = Event::new(kind, origin);
            event.set_current_target(target);
            if let Err(e) = listener.handle(&mut page, &mut event) {
                error!("{} listener on {} failed: {}", kind.as_str(), target, e);
            }
            if event.default_prevented() {
                web_event.prevent_default();
            }
        });

        element
            .add_event_listener_with_callback(
                kind.as_str(),
                closure.as_ref().unchecked_ref::<Function>(),
            )
            .map_err(host_error)?;
        closure.forget();
        Ok(())
    }
}

impl Dialogs for WebPage {
    fn alert(&mut self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            warn!("alert failed: {:?}", e);
        }
    }

    fn confirm(&mut self, message: &str) -> bool {
        match self.window.confirm_with_message(message) {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("confirm failed, treating as declined: {:?}", e);
                false
            }
        }
    }
}

/// Run `session` on `setInterval`, clearing the interval once it finishes
pub fn start_web_timer(
    page: &WebPage,
    mut session: CountdownSession,
    period_ms: i32,
) -> Result<(), BehaviorError> {
    session.start();
    let interval: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
    let window = page.window.clone();
    let mut tick_page = page.clone();
    let slot = Rc::clone(&interval);

    let closure = Closure::<dyn FnMut()>::new(move || {
        let finished = match session.tick(&mut tick_page) {
            Ok(_) => session.status().is_finished(),
            Err(e) => {
                error!("Quiz timer tick failed: {}", e);
                session.cancel();
                true
            }
        };
        if finished {
            if let Some(handle) = slot.take() {
                tick_page.window.clear_interval_with_handle(handle);
            }
        }
    });

    let handle = window
        .set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref::<Function>(),
            period_ms,
        )
        .map_err(host_error)?;
    interval.set(Some(handle));
    closure.forget();
    Ok(())
}

fn init(mut page: WebPage) -> Result<(), BehaviorError> {
    let attachment = attach(&mut page, &Markup::default())?;
    if let Some(session) = attachment.timer {
        start_web_timer(&page, session, TICK_MS)?;
    }
    Ok(())
}

/// Attach the behaviors once the DOM is ready
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let page = WebPage::new().map_err(|e| JsValue::from_str(&e.to_string()))?;

    if page.document.ready_state() == "loading" {
        let document = page.document.clone();
        let on_ready = Closure::once(move || {
            if let Err(e) = init(page) {
                error!("Failed to attach quiz page behaviors: {}", e);
            }
        });
        document.add_event_listener_with_callback(
            "DOMContentLoaded",
            on_ready.as_ref().unchecked_ref::<Function>(),
        )?;
        on_ready.forget();
        return Ok(());
    }

    init(page).map_err(|e| JsValue::from_str(&e.to_string()))
}
