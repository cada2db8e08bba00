// File: src/view.rs
// Purpose: Maud views for the registration page, its form and htmx fragments

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::form::{Field, FOODS, LANGUAGES};
use crate::state::FormState;

pub const FIELD_ROUTE: &str = "/field";
pub const SUBMIT_ROUTE: &str = "/submit";
pub const UNMOUNT_ROUTE: &str = "/unmount";

/// Form parameter carrying the mounted form's id
pub const FORM_ID_PARAM: &str = "_form";

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@1.9.12";

const STYLE: &str = r#"
.success { color: #1b7f3b; }
.error { color: #b3261e; }
.validation { color: #b3261e; font-size: 0.9em; }
.inputGroup { margin-bottom: 1em; }
"#;

/// Id of the element holding a field's error text
pub fn error_slot_id(field: Field) -> String {
    format!("{}-error", field.name())
}

/// Full page for a freshly mounted form
pub fn page(form_id: &str, state: &FormState) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Create an Account" }
                script src=(HTMX_SRC) {}
                style { (PreEscaped(STYLE)) }
            }
            body {
                div {
                    h2 { "Create an Account" }
                    (form(form_id, state))
                }
                script {
                    (PreEscaped(format!(
                        "window.addEventListener('pagehide', () => navigator.sendBeacon('{}', new URLSearchParams({{ {}: '{}' }})));",
                        UNMOUNT_ROUTE, FORM_ID_PARAM, form_id
                    )))
                }
            }
        }
    }
}

/// The form element, swapped whole after a submission
///
/// Every request from inside the form carries `form_id`, so each mounted page
/// only ever touches its own state.
pub fn form(form_id: &str, state: &FormState) -> Markup {
    let values = state.values();
    let status = state.status();

    html! {
        form #registration hx-post=(SUBMIT_ROUTE) hx-target="this" hx-swap="outerHTML"
            hx-disabled-elt="#submit" {
            input type="hidden" name=(FORM_ID_PARAM) value=(form_id);
            @if let Some(message) = status.success_message() {
                h4.success { (message) }
            }
            @if let Some(message) = status.failure_message() {
                h4.error { (message) }
            }

            div.inputGroup {
                label for="username" { "Username:" }
                input #username name=(Field::Username.name()) type="text"
                    placeholder="Type Username" value=(values.username)
                    hx-post=(FIELD_ROUTE) hx-trigger="input changed delay:200ms"
                    hx-target=(target(Field::Username)) hx-swap="outerHTML";
                (field_error(Field::Username, &state.errors().username))
            }

            div.inputGroup {
                fieldset {
                    legend { "Favorite Language:" }
                    @for choice in LANGUAGES {
                        label {
                            input type="radio" name=(Field::FavLanguage.name()) value=(choice.value)
                                checked[values.fav_language == choice.value]
                                hx-post=(FIELD_ROUTE) hx-trigger="change"
                                hx-target=(target(Field::FavLanguage)) hx-swap="outerHTML";
                            (choice.label)
                        }
                    }
                }
                (field_error(Field::FavLanguage, &state.errors().fav_language))
            }

            div.inputGroup {
                label for="favFood" { "Favorite Food:" }
                select #favFood name=(Field::FavFood.name())
                    hx-post=(FIELD_ROUTE) hx-trigger="change"
                    hx-target=(target(Field::FavFood)) hx-swap="outerHTML" {
                    option value="" selected[values.fav_food.is_empty()] { "-- Select Favorite Food --" }
                    @for choice in FOODS {
                        option value=(choice.value) selected[values.fav_food == choice.value] { (choice.label) }
                    }
                }
                (field_error(Field::FavFood, &state.errors().fav_food))
            }

            div.inputGroup {
                label {
                    input #agreement type="checkbox" name=(Field::Agreement.name())
                        checked[values.agreement]
                        hx-post=(FIELD_ROUTE) hx-trigger="change"
                        hx-target=(target(Field::Agreement)) hx-swap="outerHTML";
                    "Agree to our terms"
                }
                (field_error(Field::Agreement, &state.errors().agreement))
            }

            div {
                (submit_button(state.submit_enabled(), false))
            }
        }
    }
}

/// Error slot for one field; hidden while the message is empty
pub fn field_error(field: Field, message: &str) -> Markup {
    html! {
        div.validation id=(error_slot_id(field)) hidden[message.is_empty()] { (message) }
    }
}

/// The submit control; `oob` marks it for an htmx out-of-band swap
pub fn submit_button(enabled: bool, oob: bool) -> Markup {
    html! {
        input #submit type="submit" disabled[!enabled] hx-swap-oob=[oob.then_some("true")];
    }
}

/// Response to a field change: the field's error slot plus the submit control
pub fn field_update(state: &FormState, field: Field) -> Markup {
    html! {
        (field_error(field, state.errors().get(field)))
        (submit_button(state.submit_enabled(), true))
    }
}

/// Shown when a request arrives for a form that is no longer mounted
pub fn expired() -> Markup {
    html! {
        h4.error { "This form has expired. Reload the page to start again." }
    }
}

fn target(field: Field) -> String {
    format!("#{}", error_slot_id(field))
}
