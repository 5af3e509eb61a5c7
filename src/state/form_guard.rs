//! Required-field validation for form submission

use tracing::{debug, info};

use crate::{
    dom::{ElementId, Event, Listener, Page, Selector},
    error::BehaviorError,
    markup::Markup,
};

const CONTROL_TAGS: [&str; 3] = ["input", "textarea", "select"];

/// Result of one validation pass over a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub invalid_controls: Vec<ElementId>,
}

/// Check every required control of `form`.
///
/// Controls whose trimmed value is empty get the invalid class; every other
/// control has it cleared. One alert is shown when anything failed.
pub fn validate_form(
    page: &mut dyn Page,
    form: ElementId,
    markup: &Markup,
) -> Result<ValidationReport, BehaviorError> {
    let controls = page.query_within(form, &Selector::any_tag(&CONTROL_TAGS));
    let mut invalid_controls = Vec::new();

    for control in controls {
        if page.has_attribute(control, &markup.required_attribute)
            && page.value(control).trim().is_empty()
        {
            page.add_class(control, &markup.invalid_class)?;
            invalid_controls.push(control);
        } else {
            page.remove_class(control, &markup.invalid_class)?;
        }
    }

    let valid = invalid_controls.is_empty();
    if !valid {
        info!(
            "Blocking submission of {}: {} required field(s) empty",
            form,
            invalid_controls.len()
        );
        page.alert(&markup.missing_fields_message);
    }

    Ok(ValidationReport {
        valid,
        invalid_controls,
    })
}

/// Submit listener that cancels submission of incomplete forms
#[derive(Debug, Clone)]
pub struct FormGuard {
    form: ElementId,
    markup: Markup,
}

impl FormGuard {
    pub fn new(form: ElementId, markup: Markup) -> Self {
        Self { form, markup }
    }
}

impl Listener for FormGuard {
    fn handle(&self, page: &mut dyn Page, event: &mut Event) -> Result<(), BehaviorError> {
        let report = validate_form(page, self.form, &self.markup)?;
        if report.valid {
            debug!("{} passed validation", self.form);
        } else {
            event.prevent_default();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{memory::MemoryPage, Document, EventKind};
    use pretty_assertions::assert_eq;

    fn quiz_form(page: &mut MemoryPage) -> (ElementId, ElementId, ElementId, ElementId) {
        let form = page.append("form", &[]);
        let title = page.append_to(form, "input", &[("required", "")]).unwrap();
        let remarks = page.append_to(form, "textarea", &[]).unwrap();
        let chapter = page.append_to(form, "select", &[("required", "")]).unwrap();
        page.append_to(chapter, "option", &[("value", "4")]).unwrap();
        (form, title, remarks, chapter)
    }

    #[test]
    fn complete_form_is_valid_and_clears_old_marks() {
        let mut page = MemoryPage::new();
        let (form, title, remarks, _) = quiz_form(&mut page);
        page.set_value(title, "Chapter 1 review").unwrap();
        page.add_class(remarks, "is-invalid").unwrap();

        let report = validate_form(&mut page, form, &Markup::default()).unwrap();

        assert!(report.valid);
        assert!(report.invalid_controls.is_empty());
        assert!(!page.has_class(remarks, "is-invalid"));
        assert!(page.alerts().is_empty());
    }

    #[test]
    fn whitespace_only_value_fails() {
        let mut page = MemoryPage::new();
        let (form, title, remarks, chapter) = quiz_form(&mut page);
        page.set_value(title, "   \t").unwrap();

        let report = validate_form(&mut page, form, &Markup::default()).unwrap();

        assert!(!report.valid);
        assert_eq!(report.invalid_controls, vec![title]);
        assert!(page.has_class(title, "is-invalid"));
        assert!(!page.has_class(remarks, "is-invalid"));
        assert!(!page.has_class(chapter, "is-invalid"));
        assert_eq!(
            page.alerts(),
            vec!["Please fill out all required fields.".to_string()]
        );
    }

    #[test]
    fn each_pass_starts_from_scratch() {
        let mut page = MemoryPage::new();
        let (form, title, _, _) = quiz_form(&mut page);
        let markup = Markup::default();

        assert!(!validate_form(&mut page, form, &markup).unwrap().valid);
        page.set_value(title, "filled").unwrap();
        assert!(validate_form(&mut page, form, &markup).unwrap().valid);
        assert!(!page.has_class(title, "is-invalid"));
    }

    #[test]
    fn guard_cancels_invalid_submit() {
        let mut page = MemoryPage::new();
        let (form, _, _, _) = quiz_form(&mut page);
        let guard = FormGuard::new(form, Markup::default());
        let mut event = Event::new(EventKind::Submit, form);

        guard.handle(&mut page, &mut event).unwrap();
        assert!(event.default_prevented());
        assert_eq!(page.alerts().len(), 1);
    }
}
