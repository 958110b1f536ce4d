//! Background route retrieval.
//!
//! A [`RouteFetcher`] runs one tokio task per output target. Starting a new
//! task for a target cancels the previous one first, and every result is
//! posted as a [`SurfaceEvent`] onto a single queue drained by the display
//! context. Cancellation is silent: a cancelled task never posts.

mod fetcher;
mod surface;

use std::fmt;

pub use fetcher::{RouteFetcher, TaskHandle};
pub use surface::{
    ROUTE_UNAVAILABLE_MESSAGE, RouteSurface, SurfaceEvent, SurfaceReceiver, SurfaceSender,
    surface_channel,
};

/// Logical display surface a route task populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputTarget {
    /// The closed loop through the selected sites.
    Tour,
    /// The leg from the visitor's position to the nearest selected site.
    RouteToTour,
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tour => "tour",
            Self::RouteToTour => "route-to-tour",
        })
    }
}

/// Identifier of one route task, unique per fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a route task.
///
/// `Created → Running → Completed | Cancelled | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Registered but not yet polled.
    Created,
    /// Walking waypoint pairs.
    Running,
    /// A path was delivered.
    Completed,
    /// Stopped before delivering.
    Cancelled,
    /// No pair resolved; the surface was told the route is unavailable.
    Failed,
}

impl TaskState {
    /// Whether the task has stopped.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}
