use std::time::Duration;

use async_trait::async_trait;
use gloo_timers::{callback::Timeout, future::TimeoutFuture};

use crate::{controller::Navigator, health::Ticker, notify::Scheduler};

/// Milliseconds of `duration` as accepted by the browser timers
fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

/// [Scheduler] over `setTimeout`
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        Timeout::new(millis(delay), task).forget();
    }
}

/// [Ticker] sleeping on a browser timeout
pub struct TimeoutTicker;

#[async_trait(?Send)]
impl Ticker for TimeoutTicker {
    async fn sleep(&self, period: Duration) {
        TimeoutFuture::new(millis(period)).await;
    }
}

/// [Navigator] assigning the window location
pub struct LocationNavigator;

impl Navigator for LocationNavigator {
    fn navigate(&self, path: &str) {
        let result = super::window().and_then(|window| {
            window
                .location()
                .set_href(path)
                .map_err(super::js_error)
        });
        if let Err(error) = result {
            log::error!("Could not navigate to {path}. {error}");
        }
    }
}
