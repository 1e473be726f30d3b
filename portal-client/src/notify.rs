//! Inline alerts. Each container shows at most one alert; a new alert replaces the previous one
//! and success or info alerts dismiss themselves after a delay.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::{Rc, Weak},
    time::Duration,
};

/// Container used when a page does not name its own
pub const DEFAULT_CONTAINER: &str = "messageContainer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Danger,
}

impl Severity {
    /// Bootstrap contextual class suffix
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }

    /// Warnings and errors stay until the user dismisses them
    pub const fn auto_dismiss(self) -> bool {
        matches!(self, Self::Success | Self::Info)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
}

/// Renders alerts into the page
pub trait AlertView {
    /// Show the `alert` in the `container`, creating the container if it is absent and replacing
    /// whatever it displayed before. `dismiss` must be called when the user closes the alert.
    fn show(&self, container: &str, alert: &Alert, dismiss: Box<dyn Fn()>);
    /// Remove the alert with `alert_id` from the `container`, if still displayed
    fn remove(&self, container: &str, alert_id: u64);
}

/// Runs deferred work on the event loop
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

/// Shared state of a [Notifier], referenced weakly by pending timers
struct NotifierState {
    view: Rc<dyn AlertView>,
    scheduler: Rc<dyn Scheduler>,
    dismiss_after: Duration,
    next_id: Cell<u64>,
    /// Id of the alert currently displayed per container
    active: RefCell<HashMap<String, u64>>,
}

impl NotifierState {
    /// Remove the alert `id` from `container` unless it was already replaced
    fn dismiss(&self, container: &str, id: u64) {
        let mut active = self.active.borrow_mut();
        if active.get(container) != Some(&id) {
            log::debug!("Alert {id} in `{container}` already replaced");
            return;
        }
        active.remove(container);
        drop(active);
        self.view.remove(container, id);
    }
}

#[derive(Clone)]
pub struct Notifier {
    state: Rc<NotifierState>,
}

impl Notifier {
    pub fn new(
        view: Rc<dyn AlertView>,
        scheduler: Rc<dyn Scheduler>,
        dismiss_after: Duration,
    ) -> Self {
        Self {
            state: Rc::new(NotifierState {
                view,
                scheduler,
                dismiss_after,
                next_id: Cell::new(1),
                active: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Show `message` in the default container. Returns the id of the new alert.
    pub fn notify(&self, message: &str, severity: Severity) -> u64 {
        self.notify_in(DEFAULT_CONTAINER, message, severity)
    }

    /// Show `message` in `container`, replacing the alert it currently shows
    pub fn notify_in(&self, container: &str, message: &str, severity: Severity) -> u64 {
        let id = self.state.next_id.get();
        self.state.next_id.set(id + 1);
        let alert = Alert {
            id,
            message: message.to_owned(),
            severity,
        };
        self.state
            .active
            .borrow_mut()
            .insert(container.to_owned(), id);

        let weak = Rc::downgrade(&self.state);
        let owned_container = container.to_owned();
        self.state.view.show(
            container,
            &alert,
            Box::new(move || dismiss_weak(&weak, &owned_container, id)),
        );

        if severity.auto_dismiss() {
            let weak = Rc::downgrade(&self.state);
            let owned_container = container.to_owned();
            self.state.scheduler.schedule(
                self.state.dismiss_after,
                Box::new(move || dismiss_weak(&weak, &owned_container, id)),
            );
        }
        id
    }

    /// Remove the alert `id` from `container`. Does nothing if another alert replaced it.
    pub fn dismiss(&self, container: &str, id: u64) {
        self.state.dismiss(container, id);
    }

    /// Id of the alert currently shown in `container`
    pub fn active(&self, container: &str) -> Option<u64> {
        self.state.active.borrow().get(container).copied()
    }
}

fn dismiss_weak(state: &Weak<NotifierState>, container: &str, id: u64) {
    if let Some(state) = state.upgrade() {
        state.dismiss(container, id);
    }
}
