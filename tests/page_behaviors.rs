use pretty_assertions::assert_eq;

use quizmaster_page::{
    attach,
    dom::{memory::PageEffect, Document, ElementId},
    state::{TickOutcome, TimerStatus},
    Markup, MemoryPage,
};

struct QuizPage {
    page: MemoryPage,
    form: ElementId,
    name: ElementId,
    answer: ElementId,
    notes: ElementId,
}

fn quiz_page() -> QuizPage {
    let mut page = MemoryPage::new();
    let form = page.append("form", &[("id", "quiz"), ("action", "/quiz/7")]);
    let name = page
        .append_to(form, "input", &[("name", "name"), ("required", "")])
        .unwrap();
    let answer = page
        .append_to(form, "select", &[("name", "question_1"), ("required", "")])
        .unwrap();
    page.append_to(answer, "option", &[("value", "")]).unwrap();
    page.append_to(answer, "option", &[("value", "2")]).unwrap();
    let notes = page.append_to(form, "textarea", &[("name", "notes")]).unwrap();
    page.append_to(form, "button", &[("type", "submit")]).unwrap();
    QuizPage {
        page,
        form,
        name,
        answer,
        notes,
    }
}

#[test]
fn complete_form_submits_without_marks() {
    let QuizPage {
        mut page,
        form,
        name,
        answer,
        notes,
    } = quiz_page();
    attach(&mut page, &Markup::default()).unwrap();
    page.set_value(name, "Ada").unwrap();
    page.set_value(answer, "2").unwrap();

    let outcome = page.request_submit(form).unwrap();

    assert!(!outcome.default_prevented);
    assert_eq!(page.submitted_forms(), vec![(form, false)]);
    for control in [name, answer, notes] {
        assert!(!page.has_class(control, "is-invalid"));
    }
    assert!(page.alerts().is_empty());
}

#[test]
fn one_empty_field_blocks_submission_and_marks_only_it() {
    let QuizPage {
        mut page,
        form,
        name,
        answer,
        notes,
    } = quiz_page();
    attach(&mut page, &Markup::default()).unwrap();
    page.set_value(name, "   ").unwrap();
    page.set_value(answer, "2").unwrap();

    let outcome = page.request_submit(form).unwrap();

    assert!(outcome.default_prevented);
    assert!(page.submitted_forms().is_empty());
    assert!(page.has_class(name, "is-invalid"));
    assert!(!page.has_class(answer, "is-invalid"));
    assert!(!page.has_class(notes, "is-invalid"));
    assert_eq!(page.alerts().len(), 1);
}

#[test]
fn submit_button_click_goes_through_the_guard() {
    let QuizPage { mut page, form, .. } = quiz_page();
    attach(&mut page, &Markup::default()).unwrap();
    let button = page.query_within(form, &quizmaster_page::dom::Selector::tag("button"))[0];

    page.click(button).unwrap();

    assert!(page.submitted_forms().is_empty());
    assert_eq!(
        page.alerts(),
        vec!["Please fill out all required fields.".to_string()]
    );
}

#[test]
fn timer_expiry_bypasses_the_form_guard() {
    let QuizPage {
        mut page, form, name, ..
    } = quiz_page();
    let display = page.append("span", &[("id", "quiz-timer"), ("data-duration", "00:03")]);
    let mut session = attach(&mut page, &Markup::default())
        .unwrap()
        .timer
        .unwrap();
    session.start();

    let mut shown = Vec::new();
    loop {
        match session.tick(&mut page).unwrap() {
            TickOutcome::Displayed(text) => shown.push(text),
            TickOutcome::Expired { submitted } => {
                assert!(submitted);
                break;
            }
            TickOutcome::Inactive => panic!("session stopped early"),
        }
    }

    assert_eq!(shown, vec!["00:03", "00:02", "00:01", "00:00"]);
    assert_eq!(page.text_content(display), "00:00");
    assert_eq!(session.status(), TimerStatus::Expired);
    assert_eq!(
        page.alerts(),
        vec!["Time is up! Your quiz will be submitted automatically.".to_string()]
    );
    assert_eq!(page.submitted_forms(), vec![(form, true)]);
    assert!(!page.has_class(name, "is-invalid"));
}

#[test]
fn toggle_clicks_alternate_block_and_none() {
    let mut page = MemoryPage::new();
    let question = page.append("div", &[("class", "question")]);
    let button = page
        .append_to(question, "button", &[("class", "btn toggle-options"), ("type", "button")])
        .unwrap();
    let panel = page
        .append_to(question, "div", &[("style", "display: none")])
        .unwrap();
    attach(&mut page, &Markup::default()).unwrap();

    page.click(button).unwrap();
    assert_eq!(page.inline_display(panel).as_deref(), Some("block"));
    page.click(button).unwrap();
    assert_eq!(page.inline_display(panel).as_deref(), Some("none"));
}

#[test]
fn unset_panel_is_hidden_until_first_click() {
    let mut page = MemoryPage::new();
    let button = page.append("button", &[("class", "toggle-options"), ("type", "button")]);
    let panel = page.append("div", &[]);

    let attachment = attach(&mut page, &Markup::default()).unwrap();
    assert_eq!(attachment.toggles, vec![(button, panel)]);
    assert_eq!(page.inline_display(panel).as_deref(), Some("none"));

    page.click(button).unwrap();
    assert_eq!(page.inline_display(panel).as_deref(), Some("block"));
}

#[test]
fn declined_delete_fires_nothing() {
    let mut page = MemoryPage::new();
    let link = page.append(
        "a",
        &[("class", "btn delete-btn"), ("href", "/admin/delete_quiz/3")],
    );
    attach(&mut page, &Markup::default()).unwrap();
    page.enqueue_confirm_response(false);

    let outcome = page.click(link).unwrap();

    assert!(outcome.default_prevented);
    assert!(page.navigations().is_empty());
    assert!(page.submitted_forms().is_empty());
    assert!(page.effects().contains(&PageEffect::Confirm {
        message: "Are you sure you want to delete this item?".to_string(),
        accepted: false,
    }));
}

#[test]
fn accepted_delete_fires_exactly_once() {
    let mut page = MemoryPage::new();
    let form = page.append("form", &[("action", "/admin/delete_chapter/2")]);
    let button = page
        .append_to(form, "button", &[("class", "delete-btn"), ("type", "submit")])
        .unwrap();
    attach(&mut page, &Markup::default()).unwrap();
    page.enqueue_confirm_response(true);

    page.click(button).unwrap();

    assert_eq!(page.submitted_forms(), vec![(form, false)]);
    assert!(page.alerts().is_empty());
}

#[test]
fn accepted_delete_link_navigates_exactly_once() {
    let mut page = MemoryPage::new();
    let link = page.append(
        "a",
        &[("class", "btn delete-btn"), ("href", "/admin/delete_quiz/3")],
    );
    attach(&mut page, &Markup::default()).unwrap();
    page.enqueue_confirm_response(true);

    let outcome = page.click(link).unwrap();

    assert!(!outcome.default_prevented);
    assert_eq!(page.navigations(), vec!["/admin/delete_quiz/3".to_string()]);
    assert!(page.submitted_forms().is_empty());
}

#[test]
fn custom_markup_hooks_are_honored() {
    let markup = Markup::from_json(
        r#"{"delete_class": "danger", "delete_confirmation": "Remove this user?"}"#,
    )
    .unwrap();
    let mut page = MemoryPage::new();
    let link = page.append("a", &[("class", "danger"), ("href", "/admin/users/delete/9")]);
    attach(&mut page, &markup).unwrap();
    page.enqueue_confirm_response(false);

    page.click(link).unwrap();

    assert_eq!(
        page.effects(),
        &[PageEffect::Confirm {
            message: "Remove this user?".to_string(),
            accepted: false,
        }]
    );
}
