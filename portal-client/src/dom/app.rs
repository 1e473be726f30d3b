use std::rc::Rc;

use common::error::RpResult;
use wasm_bindgen::{closure::Closure, JsCast};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, EventTarget};

use super::{
    document,
    forms::{read_credentials, read_job_apply, read_profile, read_registration, ButtonControl},
    js_error,
    runtime::{LocationNavigator, TimeoutScheduler, TimeoutTicker},
    views::{DomAlertView, DomListingView, DomNavView, DomStatusView, DomThemeTarget},
    DocumentLookup,
};
use crate::{
    api::FetchTransport,
    bindings::{Action, Binding, BindingTable, EventKind},
    config::ClientConfig,
    controller::{PortalController, Ports},
    form::{NoControl, SubmitControl},
    storage::{KeyValueStore, LocalStore, MemoryStore},
};

/// Event listener removed from its target when dropped
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach<F>(target: &EventTarget, event: &'static str, handler: F) -> RpResult<Self>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(js_error)?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let removed = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
        if removed.is_err() {
            log::warn!("Could not remove `{}` listener", self.event);
        }
    }
}

/// The portal attached to the current page. Dropping it detaches every listener and stops the
/// health poller.
pub struct App {
    controller: Rc<PortalController>,
    listeners: Vec<Listener>,
}

/// `localStorage` when usable, otherwise storage lasting only for this page
fn browser_storage() -> Rc<dyn KeyValueStore> {
    if let Some(store) = LocalStore::available() {
        const PROBE_KEY: &str = "__portal_probe__";
        if store.set(PROBE_KEY, "1").and_then(|()| store.remove(PROBE_KEY)).is_ok() {
            return Rc::new(store);
        }
    }
    log::warn!("Local storage unavailable, the session will not persist across pages");
    Rc::new(MemoryStore::new())
}

impl App {
    /// Build the controller, validate the binding table against the page and attach every
    /// present binding
    /// # Errors
    /// This function will return an error if the document is unavailable, the binding table
    /// does not match the page or a listener cannot be attached
    pub fn mount(config: ClientConfig) -> RpResult<Self> {
        let document = document()?;
        let bindings = BindingTable::portal().resolve(&DocumentLookup::new()?)?;

        let ports = Ports {
            storage: browser_storage(),
            transport: Rc::new(FetchTransport),
            alerts: Rc::new(DomAlertView::new(document.clone())),
            scheduler: Rc::new(TimeoutScheduler),
            navigator: Rc::new(LocationNavigator),
            nav: Rc::new(DomNavView::new(document.clone())),
            listings: Rc::new(DomListingView::new(document.clone())),
            theme: Rc::new(DomThemeTarget::new(document.clone())),
            status: Rc::new(DomStatusView::new(document.clone())),
            ticker: Rc::new(TimeoutTicker),
        };
        let controller = Rc::new(PortalController::new(config, ports));
        controller.init_theme(super::prefers_dark());

        let mut listeners = Vec::new();
        for binding in bindings {
            let Some(element) = document.get_element_by_id(binding.element_id) else {
                continue;
            };
            match binding.event.dom_event() {
                Some(event) => {
                    let controller = controller.clone();
                    let document = document.clone();
                    let target: &EventTarget = element.as_ref();
                    listeners.push(Listener::attach(target, event, move |event| {
                        on_event(&controller, &document, binding, &event);
                    })?);
                }
                None => run_ready(&controller, binding),
            }
        }
        log::info!("Attached {} page listeners", listeners.len());

        let verifier = controller.clone();
        spawn_local(async move {
            verifier.verify_session().await;
        });
        Ok(Self {
            controller,
            listeners,
        })
    }

    /// Detach listeners and stop background work
    pub fn unmount(self) {
        self.controller.teardown();
        drop(self.listeners);
        log::info!("Portal detached from page");
    }
}

/// Element the event listener is attached to
fn current_element(event: &Event) -> Option<Element> {
    event
        .current_target()
        .and_then(|target| target.dyn_into::<Element>().ok())
}

fn submit_control(document: &Document, form: &Element, action: Action) -> Box<dyn SubmitControl> {
    match ButtonControl::for_form(document, form, action) {
        Some(control) => Box::new(control),
        None => Box::new(NoControl),
    }
}

/// Run the action of a `Ready` binding
fn run_ready(controller: &Rc<PortalController>, binding: Binding) {
    let controller = controller.clone();
    match binding.action {
        Action::PollHealth => spawn_local(controller.start_health_polling()),
        Action::LoadJobs => spawn_local(async move { controller.load_jobs().await }),
        Action::LoadCompetences => {
            spawn_local(async move { controller.load_competences().await });
        }
        Action::LoadApplications => {
            spawn_local(async move { controller.load_applications().await });
        }
        other => log::warn!("{other:?} cannot run on page load"),
    }
}

/// Run the action of an event binding
fn on_event(
    controller: &Rc<PortalController>,
    document: &Document,
    binding: Binding,
    event: &Event,
) {
    if binding.event == EventKind::Submit || binding.event == EventKind::Click {
        event.prevent_default();
    }
    let controller = controller.clone();
    let element = current_element(event);
    match binding.action {
        Action::Login => {
            let credentials = read_credentials(document);
            let control = form_control(document, element.as_ref(), binding.action);
            spawn_local(async move {
                controller.login(credentials, control.as_ref()).await;
            });
        }
        Action::Register => {
            let form = read_registration(document);
            let control = form_control(document, element.as_ref(), binding.action);
            spawn_local(async move {
                controller.register(form, control.as_ref()).await;
            });
        }
        Action::ApplyToJob => {
            let Some(element) = element else { return };
            let form = read_job_apply(&element);
            let control = submit_control(document, &element, binding.action);
            spawn_local(async move {
                controller.apply_to_job(form, control.as_ref()).await;
            });
        }
        Action::SubmitProfile => {
            let Some(element) = element else { return };
            let form = read_profile(&element);
            let control = submit_control(document, &element, binding.action);
            spawn_local(async move {
                controller.submit_profile(form, control.as_ref()).await;
            });
        }
        Action::CheckUsername => {
            let username = element
                .as_ref()
                .and_then(super::element_value)
                .unwrap_or_default();
            spawn_local(async move {
                controller.check_username(&username).await;
            });
        }
        Action::Logout => controller.logout(),
        Action::ToggleTheme => {
            controller.toggle_theme();
        }
        other => log::warn!("{other:?} is not an event action"),
    }
}

fn form_control(
    document: &Document,
    form: Option<&Element>,
    action: Action,
) -> Box<dyn SubmitControl> {
    match form {
        Some(form) => submit_control(document, form, action),
        None => Box::new(NoControl),
    }
}
