#![warn(clippy::cloned_instead_of_copied)]
#![warn(clippy::empty_structs_with_brackets)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::inefficient_to_string)]
#![warn(clippy::manual_let_else)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::panic)]
#![warn(clippy::print_stdout)]
#![warn(clippy::str_to_string)]
#![warn(clippy::uninlined_format_args)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::use_self)]
#![warn(clippy::wildcard_imports)]

//! Browser client of the recruitment portal. Pages are rendered by the edge service; this crate
//! attaches to them, handling the session, form submissions, alerts and service health.

pub mod api;
pub mod bindings;
pub mod config;
pub mod controller;
pub mod form;
pub mod health;
pub mod notify;
pub mod session;
pub mod storage;
pub mod theme;

#[cfg(target_arch = "wasm32")]
mod dom;

#[cfg(target_arch = "wasm32")]
thread_local! {
    static APP: std::cell::RefCell<Option<dom::App>> = std::cell::RefCell::new(None);
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    use wasm_bindgen::{closure::Closure, JsCast};

    console_error_panic_hook::set_once();
    let config = dom::load_config();
    if let Err(error) = console_log::init_with_level(config.log_level()) {
        web_sys::console::error_1(&format!("Could not initialise logging. {error}").into());
    }

    match dom::App::mount(config) {
        Ok(app) => APP.with(|slot| *slot.borrow_mut() = Some(app)),
        Err(error) => {
            log::error!("Could not attach portal to page. {error}");
            return;
        }
    }

    let Some(window) = web_sys::window() else {
        return;
    };
    let on_page_hide = Closure::once_into_js(|| {
        if let Some(app) = APP.with(|slot| slot.borrow_mut().take()) {
            app.unmount();
        }
    });
    let attached =
        window.add_event_listener_with_callback("pagehide", on_page_hide.unchecked_ref());
    if attached.is_err() {
        log::warn!("Could not register page teardown");
    }
}
