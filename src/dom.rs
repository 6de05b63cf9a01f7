use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, Node,
};

use crate::api::{CheckResponse, Submission};
use crate::config::{MarkupMode, WidgetConfig};
use crate::error::WidgetError;

pub const BUTTON_PREFIX: &str = "check_";
pub const FEEDBACK_CLASS: &str = "problem-widget-feedback";

// -- Element id scheme --

pub fn button_id(id: &str) -> String {
    format!("{}{}", BUTTON_PREFIX, id)
}

pub fn container_id(id: &str) -> String {
    format!("main_{}", id)
}

pub fn input_prefix(id: &str) -> String {
    format!("input_{}_", id)
}

pub fn status_id(field: &str) -> String {
    format!("status_{}", field)
}

pub fn feedback_id(id: &str) -> String {
    format!("feedback_{}", id)
}

/// Widget id of a `check_{id}` element, if the element id has that shape.
pub fn widget_id_from_button(element_id: &str) -> Option<&str> {
    element_id
        .strip_prefix(BUTTON_PREFIX)
        .filter(|rest| !rest.is_empty())
}

/// `[id="value"]`, safe for ids containing quotes or backslashes.
pub fn id_equals(value: &str) -> String {
    attr_selector("=", value)
}

/// `[id^="prefix"]`
pub fn id_starts_with(prefix: &str) -> String {
    attr_selector("^=", prefix)
}

fn attr_selector(op: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("[id{}\"{}\"]", op, escaped)
}

// -- DOM access --

pub fn document() -> Result<Document, WidgetError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| WidgetError::Dom("no document available".to_string()))
}

pub fn element_by_id(element_id: &str) -> Option<Element> {
    document().ok()?.get_element_by_id(element_id)
}

fn query_all(selector: &str) -> Result<Vec<Element>, WidgetError> {
    let list = document()?
        .query_selector_all(selector)
        .map_err(WidgetError::dom)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

/// Whether an element with this tag and `type` can be a Check/Reset button.
/// `tag` is compared case-insensitively; `input_type` only matters for `<input>`.
pub fn is_toggle_control(tag: &str, input_type: &str) -> bool {
    if tag.eq_ignore_ascii_case("button") {
        return true;
    }
    tag.eq_ignore_ascii_case("input")
        && (input_type.eq_ignore_ascii_case("button") || input_type.eq_ignore_ascii_case("submit"))
}

/// A `check_{id}` element is a widget button only when it is a button
/// control and the page also has the widget's container or inputs.
pub fn is_widget_button(button: &Element, id: &str) -> bool {
    let input_type = button
        .dyn_ref::<HtmlInputElement>()
        .map(|input| input.type_())
        .unwrap_or_default();
    if !is_toggle_control(&button.tag_name(), &input_type) {
        return false;
    }
    element_by_id(&container_id(id)).is_some()
        || document()
            .ok()
            .and_then(|d| d.query_selector(&id_starts_with(&input_prefix(id))).ok().flatten())
            .is_some()
}

/// Ids of every widget on the page, in document order.
pub fn discover_widget_ids() -> Result<Vec<String>, WidgetError> {
    Ok(query_all(&id_starts_with(BUTTON_PREFIX))?
        .iter()
        .filter_map(|el| {
            let id = widget_id_from_button(&el.id())?.to_string();
            if is_widget_button(el, &id) {
                Some(id)
            } else {
                debug!("#{} is not a widget button, skipped", el.id());
                None
            }
        })
        .collect())
}

fn field_value(el: &Element) -> String {
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        return input.value();
    }
    if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
        return select.value();
    }
    if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
        return area.value();
    }
    el.get_attribute("value").unwrap_or_default()
}

/// Current value of every `input_{id}_*` element, keyed by element id.
pub fn collect_submission(id: &str) -> Result<Submission, WidgetError> {
    let mut submission = Submission::default();
    for el in query_all(&id_starts_with(&input_prefix(id)))? {
        submission.insert(el.id(), field_value(&el));
    }
    Ok(submission)
}

pub fn read_label(button: &Element) -> String {
    if let Some(input) = button.dyn_ref::<HtmlInputElement>() {
        return input.value();
    }
    // A <button> shows its text; its value attribute is form data
    let text = button
        .text_content()
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if !text.is_empty() || button.dyn_ref::<HtmlButtonElement>().is_some() {
        return text;
    }
    button
        .get_attribute("value")
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

pub fn render_button(button: &Element, label: &str, disabled: bool) {
    match button.dyn_ref::<HtmlInputElement>() {
        Some(input) => {
            if let Err(e) = button.set_attribute("value", label) {
                warn!("#{}: value not set: {:?}", button.id(), e);
            }
            input.set_value(label);
        }
        None => button.set_text_content(Some(label)),
    }
    let toggled = if disabled {
        button.set_attribute("disabled", "")
    } else {
        button.remove_attribute("disabled")
    };
    if let Err(e) = toggled {
        warn!("#{}: disabled flag not updated: {:?}", button.id(), e);
    }
}

/// Replace the class of `element_id`. Returns false when it is not in the page.
pub fn set_class(element_id: &str, class: &str) -> bool {
    match element_by_id(element_id) {
        Some(el) => {
            el.set_class_name(class);
            true
        }
        None => false,
    }
}

/// Apply the status icon of every graded field. Returns how many were found.
pub fn mark_statuses(response: &CheckResponse, config: &WidgetConfig) -> usize {
    response
        .marks(config)
        .filter(|(field, class)| {
            let found = set_class(&status_id(field), class);
            if !found {
                warn!("#{} not found", status_id(field));
            }
            found
        })
        .count()
}

pub fn replace_content(element_id: &str, markup: &str, mode: MarkupMode) -> bool {
    let Some(el) = element_by_id(element_id) else {
        return false;
    };
    match mode {
        MarkupMode::Trusted => el.set_inner_html(markup),
        MarkupMode::Escaped => el.set_text_content(Some(markup)),
    }
    true
}

/// Insert the element the feedback view mounts into: right before the
/// container, or right after the button when the page has no container.
pub fn insert_feedback_anchor(id: &str) -> Result<HtmlElement, WidgetError> {
    let document = document()?;
    let anchor = document.create_element("span").map_err(WidgetError::dom)?;
    anchor.set_id(&feedback_id(id));
    anchor.set_class_name(FEEDBACK_CLASS);

    let (parent, before): (Option<Node>, Option<Node>) =
        match document.get_element_by_id(&container_id(id)) {
            Some(container) => (container.parent_node(), Some(container.into())),
            None => {
                warn!("#{} not found, feedback goes after the button", container_id(id));
                let button = document
                    .get_element_by_id(&button_id(id))
                    .ok_or_else(|| WidgetError::MissingElement(button_id(id)))?;
                (button.parent_node(), button.next_sibling())
            }
        };
    let parent = parent.ok_or_else(|| WidgetError::Dom(format!("widget {} is detached", id)))?;
    parent
        .insert_before(&anchor, before.as_ref())
        .map_err(WidgetError::dom)?;

    anchor
        .dyn_into::<HtmlElement>()
        .map_err(|_| WidgetError::Dom("feedback anchor is not an HTML element".to_string()))
}
