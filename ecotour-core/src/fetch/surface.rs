//! The single serialized queue between route tasks and the display.

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::Coordinate;

use super::{OutputTarget, TaskId};

/// Notice shown when every pair of a route failed.
pub const ROUTE_UNAVAILABLE_MESSAGE: &str = "Route service not available";

/// A message posted to the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// A new task took over `target`; its drawn path must be discarded.
    Cleared {
        /// Target being restarted.
        target: OutputTarget,
        /// The still-running task that was cancelled, if any.
        superseded: Option<TaskId>,
    },
    /// A finished task's full path.
    RouteDelivered {
        /// Target the path belongs to.
        target: OutputTarget,
        /// Task that produced it.
        task: TaskId,
        /// Ordered coordinates including the resolved endpoints.
        path: Vec<Coordinate>,
    },
    /// No pair of the task resolved.
    RouteUnavailable {
        /// Target the task was drawing.
        target: OutputTarget,
        /// Task that failed.
        task: TaskId,
    },
}

/// Producer half of the surface queue.
pub type SurfaceSender = mpsc::UnboundedSender<SurfaceEvent>;

/// Consumer half of the surface queue, owned by the display context.
pub type SurfaceReceiver = mpsc::UnboundedReceiver<SurfaceEvent>;

/// Create the surface queue.
#[must_use]
pub fn surface_channel() -> (SurfaceSender, SurfaceReceiver) {
    mpsc::unbounded_channel()
}

/// Display state rebuilt from surface events.
///
/// Only the context that owns the receiver mutates it, so it needs no
/// locking.
///
/// # Examples
/// ```
/// use ecotour_core::{OutputTarget, RouteSurface, SurfaceEvent, lat_lon};
///
/// let mut surface = RouteSurface::new();
/// surface.apply(SurfaceEvent::Cleared {
///     target: OutputTarget::Tour,
///     superseded: None,
/// });
/// assert_eq!(surface.path(OutputTarget::Tour), Some(&[][..]));
/// ```
#[derive(Debug, Default, Clone)]
pub struct RouteSurface {
    paths: HashMap<OutputTarget, Vec<Coordinate>>,
    deliveries: HashMap<OutputTarget, TaskId>,
    notifications: Vec<String>,
}

impl RouteSurface {
    /// An empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event.
    pub fn apply(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Cleared { target, .. } => {
                self.paths.insert(target, Vec::new());
                self.deliveries.remove(&target);
            }
            SurfaceEvent::RouteDelivered { target, task, path } => {
                self.paths.insert(target, path);
                self.deliveries.insert(target, task);
            }
            SurfaceEvent::RouteUnavailable { .. } => {
                self.notifications.push(ROUTE_UNAVAILABLE_MESSAGE.to_owned());
            }
        }
    }

    /// Apply every event already queued on `events` without waiting.
    ///
    /// Returns the number of events applied.
    pub fn drain(&mut self, events: &mut SurfaceReceiver) -> usize {
        let mut applied = 0;
        while let Ok(event) = events.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Path currently drawn for `target`, if it was ever touched.
    #[must_use]
    pub fn path(&self, target: OutputTarget) -> Option<&[Coordinate]> {
        self.paths.get(&target).map(Vec::as_slice)
    }

    /// Task whose path is drawn for `target`.
    #[must_use]
    pub fn delivered_by(&self, target: OutputTarget) -> Option<TaskId> {
        self.deliveries.get(&target).copied()
    }

    /// Notices shown so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }
}
