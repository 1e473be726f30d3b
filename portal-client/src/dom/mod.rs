//! Browser implementations of the controller ports, plus the startup wiring that attaches the
//! portal to a server rendered page.

mod app;
mod forms;
mod runtime;
mod views;

pub use app::App;

use common::error::{RpError, RpResult};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement, Window};

use crate::{bindings::ElementLookup, config::ClientConfig};

/// Id of the optional JSON element carrying runtime configuration
const CONFIG_ELEMENT_ID: &str = "portal-config";

/// Bootstrap class hiding an element
const HIDDEN_CLASS: &str = "d-none";

/// Show or hide `element` through the Bootstrap hidden class
fn set_hidden(element: &Element, hidden: bool) {
    let class_list = element.class_list();
    let result = if hidden {
        class_list.add_1(HIDDEN_CLASS)
    } else {
        class_list.remove_1(HIDDEN_CLASS)
    };
    if let Err(error) = result {
        log::warn!("Could not toggle `{HIDDEN_CLASS}` on #{}. {error:?}", element.id());
    }
}

fn js_error(error: JsValue) -> RpError {
    RpError::Generic(format!("{error:?}"))
}

fn window() -> RpResult<Window> {
    web_sys::window().ok_or_else(|| RpError::Generic("No window available".to_owned()))
}

fn document() -> RpResult<Document> {
    window()?
        .document()
        .ok_or_else(|| RpError::Generic("No document available".to_owned()))
}

/// Value of an input, select or textarea. Other elements have no value.
fn element_value(element: &Element) -> Option<String> {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        return Some(select.value());
    }
    element
        .dyn_ref::<HtmlTextAreaElement>()
        .map(HtmlTextAreaElement::value)
}

/// Value of the form control with `id`, empty when the page has no such control
fn value_of(document: &Document, id: &str) -> String {
    document
        .get_element_by_id(id)
        .and_then(|element| element_value(&element))
        .unwrap_or_default()
}

/// Value of the control matched by `selector` within `scope`
fn value_in(scope: &Element, selector: &str) -> String {
    scope
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|element| element_value(&element))
        .unwrap_or_default()
}

/// [ElementLookup] over the current document
pub struct DocumentLookup {
    document: Document,
}

impl DocumentLookup {
    pub fn new() -> RpResult<Self> {
        Ok(Self {
            document: document()?,
        })
    }
}

impl ElementLookup for DocumentLookup {
    fn tag_of(&self, element_id: &str) -> Option<String> {
        self.document
            .get_element_by_id(element_id)
            .map(|element| element.tag_name().to_ascii_lowercase())
    }
}

/// Default configuration, overridden by the page's embedded configuration document if present
pub fn load_config() -> ClientConfig {
    let embedded = document()
        .ok()
        .and_then(|document| document.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|element| element.text_content());
    let Some(json) = embedded else {
        return ClientConfig::default();
    };
    match ClientConfig::from_json(&json) {
        Ok(config) => config,
        Err(error) => {
            log::warn!("Ignoring invalid embedded configuration. {error}");
            ClientConfig::default()
        }
    }
}

/// True if the system colour scheme preference is dark
pub fn prefers_dark() -> bool {
    window()
        .ok()
        .and_then(|window| window.match_media("(prefers-color-scheme: dark)").ok())
        .flatten()
        .map_or(false, |query| query.matches())
}
