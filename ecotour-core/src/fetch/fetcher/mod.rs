//! Route tasks, their handles and the fetcher that owns them.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{Coordinate, RouteCache, RoutingService, route_pair};

use super::{OutputTarget, SurfaceEvent, SurfaceSender, TaskId, TaskState};

#[derive(Debug)]
struct ActiveTask {
    id: TaskId,
    token: CancellationToken,
}

#[derive(Debug, Default)]
struct Registry {
    last_id: u64,
    active: HashMap<OutputTarget, ActiveTask>,
}

impl Registry {
    fn allocate(&mut self) -> TaskId {
        self.last_id += 1;
        TaskId::new(self.last_id)
    }

    fn release(&mut self, target: OutputTarget, id: TaskId) {
        if self.active.get(&target).is_some_and(|task| task.id == id) {
            self.active.remove(&target);
        }
    }
}

/// State shared by the fetcher, its handles and its running tasks.
///
/// Every surface post and every cancellation happens with `registry` held,
/// so a task cannot deliver once it has been cancelled or superseded.
#[derive(Debug)]
struct Shared {
    registry: Mutex<Registry>,
    surface: SurfaceSender,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn post(&self, event: SurfaceEvent) {
        if self.surface.send(event).is_err() {
            debug!("surface queue closed; dropping route event");
        }
    }
}

/// Starts and cancels background route tasks.
///
/// At most one task is active per [`OutputTarget`]. Results reach the
/// surface strictly in start order, and only from the most recent task for
/// each target.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use ecotour_core::test_support::StubRoutingService;
/// use ecotour_core::{OutputTarget, RouteFetcher, RouteSurface, TaskState, lat_lon, surface_channel};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let (surface_tx, mut surface_rx) = surface_channel();
/// let fetcher = RouteFetcher::new(
///     Arc::new(StubRoutingService::new()),
///     surface_tx,
///     tokio::runtime::Handle::current(),
/// );
///
/// let handle = fetcher.start(
///     OutputTarget::Tour,
///     vec![lat_lon(0.0, 0.0), lat_lon(0.0, 1.0)],
///     true,
/// );
/// assert_eq!(handle.wait().await, TaskState::Completed);
///
/// let mut surface = RouteSurface::new();
/// surface.drain(&mut surface_rx);
/// assert_eq!(surface.path(OutputTarget::Tour).map(<[_]>::len), Some(2));
/// # });
/// ```
pub struct RouteFetcher {
    service: Arc<dyn RoutingService>,
    cache: Arc<RouteCache>,
    runtime: Handle,
    shared: Arc<Shared>,
}

impl fmt::Debug for RouteFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteFetcher")
            .field("service", &"<dyn RoutingService>")
            .field("cache", &self.cache)
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}

impl RouteFetcher {
    /// Fetch through `service`, posting to `surface`, spawning on `runtime`.
    ///
    /// The fetcher starts with a private cache; share one across fetchers
    /// with [`with_cache`](Self::with_cache).
    #[must_use]
    pub fn new(service: Arc<dyn RoutingService>, surface: SurfaceSender, runtime: Handle) -> Self {
        Self {
            service,
            cache: Arc::new(RouteCache::new()),
            runtime,
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry::default()),
                surface,
            }),
        }
    }

    /// Use `cache` for segment lookups.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<RouteCache>) -> Self {
        self.cache = cache;
        self
    }

    /// The segment cache in use.
    #[must_use]
    pub const fn cache(&self) -> &Arc<RouteCache> {
        &self.cache
    }

    /// Route through `waypoints` in order and draw the result on `target`.
    ///
    /// Any task still running for `target` is cancelled first and the surface
    /// is told to clear the target. Fewer than two waypoints deliver an empty
    /// path immediately without calling the routing service.
    pub fn start(
        &self,
        target: OutputTarget,
        waypoints: Vec<Coordinate>,
        use_cache: bool,
    ) -> TaskHandle {
        let mut registry = self.shared.lock();
        let id = registry.allocate();
        let superseded = registry.active.remove(&target).map(|previous| {
            previous.token.cancel();
            debug!("route task {} for {target} superseded by {id}", previous.id);
            previous.id
        });
        self.shared
            .post(SurfaceEvent::Cleared { target, superseded });

        let token = CancellationToken::new();
        if waypoints.len() < 2 {
            self.shared.post(SurfaceEvent::RouteDelivered {
                target,
                task: id,
                path: Vec::new(),
            });
            drop(registry);
            let (_, state) = watch::channel(TaskState::Completed);
            return TaskHandle {
                id,
                target,
                token,
                state,
                shared: Arc::clone(&self.shared),
            };
        }

        registry.active.insert(
            target,
            ActiveTask {
                id,
                token: token.clone(),
            },
        );
        drop(registry);

        let (state_tx, state) = watch::channel(TaskState::Created);
        let task = RouteTask {
            id,
            target,
            waypoints,
            use_cache,
            token: token.clone(),
            state: state_tx,
            service: Arc::clone(&self.service),
            cache: Arc::clone(&self.cache),
            shared: Arc::clone(&self.shared),
        };
        debug!("route task {id} for {target} created");
        self.runtime.spawn(task.run());

        TaskHandle {
            id,
            target,
            token,
            state,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Cancel the task behind `handle`.
    pub fn cancel(&self, handle: &TaskHandle) {
        handle.cancel();
    }

    /// Cancel whatever task is active for `target`.
    ///
    /// Returns the cancelled task, if one was active.
    pub fn cancel_target(&self, target: OutputTarget) -> Option<TaskId> {
        let mut registry = self.shared.lock();
        registry.active.remove(&target).map(|task| {
            task.token.cancel();
            debug!("route task {} for {target} cancelled", task.id);
            task.id
        })
    }

    /// Cancel whatever task is active for `target` and tell the surface to
    /// discard its path.
    pub fn clear(&self, target: OutputTarget) {
        let mut registry = self.shared.lock();
        let superseded = registry.active.remove(&target).map(|task| {
            task.token.cancel();
            task.id
        });
        self.shared
            .post(SurfaceEvent::Cleared { target, superseded });
    }

    /// Cancel every active task.
    pub fn cancel_all(&self) {
        let mut registry = self.shared.lock();
        for (target, task) in registry.active.drain() {
            task.token.cancel();
            debug!("route task {} for {target} cancelled", task.id);
        }
    }

    /// Task currently active for `target`.
    #[must_use]
    pub fn active_task(&self, target: OutputTarget) -> Option<TaskId> {
        self.shared.lock().active.get(&target).map(|task| task.id)
    }
}

/// Observer and cancel switch for one route task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    target: OutputTarget,
    token: CancellationToken,
    state: watch::Receiver<TaskState>,
    shared: Arc<Shared>,
}

impl TaskHandle {
    /// Identifier of the task.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Target the task draws on.
    #[must_use]
    pub const fn target(&self) -> OutputTarget {
        self.target
    }

    /// Request cancellation.
    ///
    /// Idempotent and non-blocking: the task may still be waiting on the
    /// routing service when this returns, but it will not post to the
    /// surface afterwards. A task that already delivered is unaffected.
    pub fn cancel(&self) {
        let mut registry = self.shared.lock();
        self.token.cancel();
        registry.release(self.target, self.id);
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> TaskState {
        *self.state.borrow()
    }

    /// Wait for the task to stop and return its final state.
    ///
    /// If the runtime drops the task before it finishes, the last observed
    /// state is returned.
    pub async fn wait(&self) -> TaskState {
        let mut state = self.state.clone();
        if let Ok(terminal) = state.wait_for(|current| current.is_terminal()).await {
            return *terminal;
        }
        *state.borrow()
    }
}

enum Walk {
    Cancelled,
    Finished {
        path: Vec<Coordinate>,
        resolved: usize,
    },
}

struct RouteTask {
    id: TaskId,
    target: OutputTarget,
    waypoints: Vec<Coordinate>,
    use_cache: bool,
    token: CancellationToken,
    state: watch::Sender<TaskState>,
    service: Arc<dyn RoutingService>,
    cache: Arc<RouteCache>,
    shared: Arc<Shared>,
}

impl RouteTask {
    async fn run(self) {
        self.state.send_replace(TaskState::Running);
        debug!(
            "route task {} for {} running over {} waypoints",
            self.id,
            self.target,
            self.waypoints.len()
        );
        let walk = self.walk().await;
        self.finish(walk);
    }

    /// Resolve each consecutive pair, joining results into one path.
    ///
    /// Contiguous resolved pairs share their common endpoint once. Failed
    /// pairs are skipped.
    async fn walk(&self) -> Walk {
        let mut path = Vec::new();
        let mut resolved = 0_usize;
        let mut joined_at = None;

        for (index, pair) in self.waypoints.windows(2).enumerate() {
            let &[from, to] = pair else { continue };
            if self.token.is_cancelled() {
                return Walk::Cancelled;
            }
            let result = tokio::select! {
                biased;
                () = self.token.cancelled() => return Walk::Cancelled,
                result = route_pair(
                    self.service.as_ref(),
                    &self.cache,
                    from,
                    to,
                    self.use_cache,
                ) => result,
            };
            match result {
                Ok(route) => {
                    if joined_at != Some(index) {
                        path.push(from);
                    }
                    path.extend(route.waypoints);
                    path.push(to);
                    joined_at = Some(index + 1);
                    resolved += 1;
                }
                Err(err) => warn!(
                    "route task {} for {} skipped pair {index}: {err}",
                    self.id, self.target
                ),
            }
        }
        Walk::Finished { path, resolved }
    }

    fn finish(self, walk: Walk) {
        let mut registry = self.shared.lock();
        let finished = match walk {
            Walk::Finished { path, resolved } if !self.token.is_cancelled() => {
                Some((path, resolved))
            }
            _ => None,
        };
        let Some((path, resolved)) = finished else {
            self.state.send_replace(TaskState::Cancelled);
            debug!("route task {} for {} stopped after cancellation", self.id, self.target);
            return;
        };

        registry.release(self.target, self.id);
        if resolved == 0 {
            self.shared.post(SurfaceEvent::RouteUnavailable {
                target: self.target,
                task: self.id,
            });
            self.state.send_replace(TaskState::Failed);
            warn!("route task {} for {}: no pair resolved", self.id, self.target);
        } else {
            debug!(
                "route task {} for {} delivered {} points from {resolved} pairs",
                self.id,
                self.target,
                path.len()
            );
            self.shared.post(SurfaceEvent::RouteDelivered {
                target: self.target,
                task: self.id,
                path,
            });
            self.state.send_replace(TaskState::Completed);
        }
    }
}
