//! Behavioural tests for [`RouteFetcher`].
//!
//! Steps are synchronous; each scenario owns a multi-threaded runtime that
//! drives the fetcher's tasks.

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use ecotour_core::test_support::StubRoutingService;
use ecotour_core::{
    Coordinate, OutputTarget, RouteFetcher, RoutingError, SurfaceEvent, SurfaceReceiver,
    TaskHandle, lat_lon, surface_channel,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::{Builder, Runtime};

/// Everything a scenario touches.
struct Rig {
    runtime: Runtime,
    service: Option<Arc<StubRoutingService>>,
    events: Vec<SurfaceEvent>,
    handles: Vec<TaskHandle>,
}

impl Rig {
    fn service(&self) -> Arc<StubRoutingService> {
        Arc::clone(self.service.as_ref().expect("routing service must be configured"))
    }

    fn fetch(&mut self, routes: &[Vec<Coordinate>]) {
        let (tx, mut rx) = surface_channel();
        let routing: Arc<StubRoutingService> = self.service();
        let fetcher = RouteFetcher::new(routing, tx, self.runtime.handle().clone());
        for waypoints in routes {
            let handle = fetcher.start(OutputTarget::Tour, waypoints.clone(), true);
            self.handles.push(handle);
        }
        for handle in &self.handles {
            self.runtime.block_on(handle.wait());
        }
        self.events = drain(&mut rx);
    }

    fn delivered(&self) -> Vec<&SurfaceEvent> {
        self.events
            .iter()
            .filter(|event| matches!(event, SurfaceEvent::RouteDelivered { .. }))
            .collect()
    }

    fn unavailable(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, SurfaceEvent::RouteUnavailable { .. }))
            .count()
    }
}

#[fixture]
fn rig() -> RefCell<Rig> {
    let runtime = Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build Tokio runtime");
    RefCell::new(Rig {
        runtime,
        service: None,
        events: Vec::new(),
        handles: Vec::new(),
    })
}

fn drain(rx: &mut SurfaceReceiver) -> Vec<SurfaceEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn waypoints(count: usize) -> Vec<Coordinate> {
    [
        lat_lon(49.2665, -123.2500),
        lat_lon(49.2621, -123.2531),
        lat_lon(49.2505, -123.2390),
        lat_lon(49.2609, -123.2490),
    ]
    .into_iter()
    .take(count)
    .collect()
}

// --- Given steps ---

#[given("a routing service that answers every pair")]
fn answering_service(#[from(rig)] rig: &RefCell<Rig>) {
    rig.borrow_mut().service = Some(Arc::new(StubRoutingService::new()));
}

#[given("a routing service that fails every pair")]
fn failing_service(#[from(rig)] rig: &RefCell<Rig>) {
    rig.borrow_mut().service = Some(Arc::new(
        StubRoutingService::new().failing_by_default(RoutingError::Timeout {
            url: "http://router.example/route/v1/foot".to_owned(),
            timeout_secs: 30,
        }),
    ));
}

#[given("a slow routing service")]
fn slow_service(#[from(rig)] rig: &RefCell<Rig>) {
    rig.borrow_mut().service = Some(Arc::new(
        StubRoutingService::new().with_latency(Duration::from_millis(100)),
    ));
}

// --- When steps ---

#[when("a route through {count} waypoints is fetched")]
fn fetch_route(count: usize, #[from(rig)] rig: &RefCell<Rig>) {
    rig.borrow_mut().fetch(&[waypoints(count)]);
}

#[when("a route is fetched and immediately replaced")]
fn fetch_and_replace(#[from(rig)] rig: &RefCell<Rig>) {
    rig.borrow_mut().fetch(&[waypoints(4), waypoints(2)]);
}

// --- Then steps ---

#[then("one path of {points} points is delivered")]
fn one_path(points: usize, #[from(rig)] rig: &RefCell<Rig>) {
    let borrowed = rig.borrow();
    let delivered = borrowed.delivered();
    assert_eq!(delivered.len(), 1, "expected one delivery, got {delivered:?}");
    assert!(
        matches!(delivered.first(), Some(SurfaceEvent::RouteDelivered { path, .. }) if path.len() == points),
        "unexpected delivery {delivered:?}"
    );
}

#[then("no path is delivered")]
fn no_path(#[from(rig)] rig: &RefCell<Rig>) {
    assert!(rig.borrow().delivered().is_empty());
}

#[then("one route unavailable notice is shown")]
fn one_notice(#[from(rig)] rig: &RefCell<Rig>) {
    assert_eq!(rig.borrow().unavailable(), 1);
}

#[then("no route unavailable notice is shown")]
fn no_notice(#[from(rig)] rig: &RefCell<Rig>) {
    assert_eq!(rig.borrow().unavailable(), 0);
}

#[then("the routing service was called {calls} times")]
fn service_calls(calls: usize, #[from(rig)] rig: &RefCell<Rig>) {
    assert_eq!(rig.borrow().service().calls(), calls);
}

#[then("only the replacement is delivered")]
fn only_replacement(#[from(rig)] rig: &RefCell<Rig>) {
    let borrowed = rig.borrow();
    let replacement = borrowed.handles.last().expect("two tasks started").id();
    let delivered = borrowed.delivered();
    assert_eq!(delivered.len(), 1, "expected one delivery, got {delivered:?}");
    assert!(matches!(
        delivered.first(),
        Some(SurfaceEvent::RouteDelivered { task, .. }) if *task == replacement
    ));
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/route_fetcher.feature", name = $title)]
        fn $fn_name(rig: RefCell<Rig>) {
            let _ = rig;
        }
    };
}

register_scenario!(tour_route_delivered, "a tour route is delivered once");
register_scenario!(total_failure_notice, "total failure shows a single notice");
register_scenario!(single_waypoint, "a single waypoint needs no routing");
register_scenario!(superseded_task_silent, "a superseded task stays silent");
