//! Periodic health checks of the backend services. The poll loop runs as a single abortable task
//! whose [PollHandle] stops it when stopped explicitly or dropped.

use std::{rc::Rc, time::Duration};

use async_trait::async_trait;
use common::api::StatusBody;
use futures::future::{join_all, AbortHandle, Abortable};
use recruit_portal_common::{ServiceEndpoint, ServiceStatus};

use crate::api::{HttpRequest, Transport};

/// Renders the status badge of every service
pub trait StatusView {
    fn render(&self, statuses: &[ServiceStatus]);
}

/// Waits between poll cycles
#[async_trait(?Send)]
pub trait Ticker {
    async fn sleep(&self, period: Duration);
}

/// Check a single `service`. Any failure to obtain a 2xx response is unhealthy, as is a 2xx whose
/// body declares the service unhealthy.
pub async fn probe(transport: &dyn Transport, service: &ServiceEndpoint) -> ServiceStatus {
    let healthy = match transport.send(HttpRequest::get(service.url.clone())).await {
        Ok(response) if response.is_success() => {
            !StatusBody::parse(&response.body).is_unhealthy()
        }
        Ok(response) => {
            log::warn!("{} answered with status {}", service.name, response.status);
            false
        }
        Err(error) => {
            log::warn!("{} could not be reached. {error}", service.name);
            false
        }
    };
    ServiceStatus::of(service, healthy)
}

pub struct HealthPoller {
    transport: Rc<dyn Transport>,
    services: Vec<ServiceEndpoint>,
    view: Rc<dyn StatusView>,
    ticker: Rc<dyn Ticker>,
    interval: Duration,
}

impl HealthPoller {
    pub fn new(
        transport: Rc<dyn Transport>,
        services: Vec<ServiceEndpoint>,
        view: Rc<dyn StatusView>,
        ticker: Rc<dyn Ticker>,
        interval: Duration,
    ) -> Self {
        Self {
            transport,
            services,
            view,
            ticker,
            interval,
        }
    }

    /// Check every service concurrently and render the results
    pub async fn poll_once(&self) -> Vec<ServiceStatus> {
        let transport = self.transport.as_ref();
        let statuses = join_all(
            self.services
                .iter()
                .map(|service| probe(transport, service)),
        )
        .await;
        let unhealthy = statuses.iter().filter(|status| !status.healthy).count();
        log::debug!(
            "Health poll finished, {unhealthy} of {} services unhealthy",
            statuses.len()
        );
        self.view.render(&statuses);
        statuses
    }

    /// Build the poll loop: one cycle immediately, then one cycle per interval after the previous
    /// results were rendered. The returned future must be spawned by the caller and completes
    /// once the [PollHandle] is stopped or dropped.
    pub fn start(self) -> (impl std::future::Future<Output = ()>, PollHandle) {
        let (handle, registration) = AbortHandle::new_pair();
        let poll_loop = Abortable::new(
            async move {
                loop {
                    self.poll_once().await;
                    self.ticker.sleep(self.interval).await;
                }
            },
            registration,
        );
        let task = async move {
            if poll_loop.await.is_err() {
                log::info!("Health polling stopped");
            }
        };
        (task, PollHandle { handle })
    }
}

/// Ownership of a running poll loop. Dropping the handle stops the loop.
pub struct PollHandle {
    handle: AbortHandle,
}

impl PollHandle {
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, rc::Rc, time::Duration};

    use async_trait::async_trait;
    use common::error::{RpError, RpResult};
    use futures::FutureExt;
    use recruit_portal_common::{ServiceEndpoint, ServiceStatus};
    use rstest::rstest;

    use super::{probe, HealthPoller, StatusView, Ticker};
    use crate::api::{HttpRequest, HttpResponse, Transport};

    /// Transport answering by url
    struct FixedTransport;

    #[async_trait(?Send)]
    impl Transport for FixedTransport {
        async fn send(&self, request: HttpRequest) -> RpResult<HttpResponse> {
            match request.url.as_str() {
                "/health" => Ok(HttpResponse::new(200, r#"{"status": "healthy"}"#)),
                "/auth/health" => Ok(HttpResponse::new(503, "")),
                "/registration/health" => Ok(HttpResponse::new(
                    200,
                    r#"{"status": "unhealthy", "error": "Database check failed"}"#,
                )),
                _ => Err(RpError::Network("connection refused".to_owned())),
            }
        }
    }

    #[derive(Default)]
    struct RecordingStatusView {
        renders: RefCell<Vec<Vec<ServiceStatus>>>,
    }

    impl StatusView for RecordingStatusView {
        fn render(&self, statuses: &[ServiceStatus]) {
            self.renders.borrow_mut().push(statuses.to_vec());
        }
    }

    /// Ticker that completes a fixed number of sleeps and then never wakes up
    struct LimitedTicker {
        remaining: RefCell<usize>,
        periods: RefCell<Vec<Duration>>,
    }

    #[async_trait(?Send)]
    impl Ticker for LimitedTicker {
        async fn sleep(&self, period: Duration) {
            self.periods.borrow_mut().push(period);
            let exhausted = {
                let mut remaining = self.remaining.borrow_mut();
                let exhausted = *remaining == 0;
                *remaining = remaining.saturating_sub(1);
                exhausted
            };
            if exhausted {
                futures::future::pending::<()>().await;
            }
        }
    }

    fn services() -> Vec<ServiceEndpoint> {
        vec![
            ServiceEndpoint::new("Edge Service", "/health"),
            ServiceEndpoint::new("Auth Service", "/auth/health"),
            ServiceEndpoint::new("Registration Service", "/registration/health"),
            ServiceEndpoint::new("Job Application Service", "/jobapplications/health"),
        ]
    }

    fn poller(sleeps: usize) -> (HealthPoller, Rc<RecordingStatusView>, Rc<LimitedTicker>) {
        let view = Rc::new(RecordingStatusView::default());
        let ticker = Rc::new(LimitedTicker {
            remaining: RefCell::new(sleeps),
            periods: RefCell::default(),
        });
        let poller = HealthPoller::new(
            Rc::new(FixedTransport),
            services(),
            view.clone(),
            ticker.clone(),
            Duration::from_secs(30),
        );
        (poller, view, ticker)
    }

    #[rstest]
    #[case::healthy("/health", true)]
    #[case::error_status("/auth/health", false)]
    #[case::declared_unhealthy("/registration/health", false)]
    #[case::network_error("/jobapplications/health", false)]
    #[tokio::test]
    async fn probe_should_classify(#[case] url: &str, #[case] healthy: bool) {
        let status = probe(&FixedTransport, &ServiceEndpoint::new("Service", url)).await;
        assert_eq!(status.healthy, healthy);
    }

    #[tokio::test]
    async fn poll_once_should_render_every_service() {
        let (poller, view, _) = poller(0);
        let statuses = poller.poll_once().await;
        assert_eq!(statuses.len(), 4);
        assert_eq!(view.renders.borrow().len(), 1);
        assert_eq!(
            statuses
                .iter()
                .map(|status| status.healthy)
                .collect::<Vec<_>>(),
            vec![true, false, false, false]
        );
    }

    #[test]
    fn loop_should_poll_after_every_interval() {
        let (poller, view, ticker) = poller(2);
        let (task, _handle) = poller.start();
        assert!(task.now_or_never().is_none());
        assert_eq!(view.renders.borrow().len(), 3);
        assert_eq!(*ticker.periods.borrow(), vec![Duration::from_secs(30); 3]);
    }

    #[rstest]
    #[case::stopped(true)]
    #[case::dropped(false)]
    fn stopped_loop_should_not_poll(#[case] explicit: bool) {
        let (poller, view, _) = poller(5);
        let (task, handle) = poller.start();
        if explicit {
            handle.stop();
        } else {
            drop(handle);
        }
        assert!(task.now_or_never().is_some());
        assert!(view.renders.borrow().is_empty());
    }
}
