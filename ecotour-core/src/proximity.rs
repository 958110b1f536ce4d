//! Nearest-site search on a local planar approximation.
//!
//! The surface of the earth is treated as a plane scaled by the cosine of a
//! reference latitude. That latitude is taken from the first candidate and
//! held for the whole search, so every comparison within one search uses the
//! same scale. The bias grows with the latitude span of the candidates; at
//! city scale it is far below the spacing between sites.

use std::f64::consts::PI;

use thiserror::Error;

use crate::{Coordinate, PointOfInterest};

/// Errors returned by [`find_closest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProximityError {
    /// The candidate sequence was empty.
    #[error("at least one candidate point of interest is required")]
    NoCandidates,
}

/// Ordering key for the planar distance between `a` and `b`.
///
/// Returns `(Δlat)² + (cos(reference_latitude)·Δlon)²`. The value grows with
/// distance but is not itself a distance; use it for comparisons only.
///
/// # Examples
/// ```
/// use ecotour_core::{distance_score, lat_lon};
///
/// let near = distance_score(0.0, lat_lon(0.0, 0.0), lat_lon(0.0, 0.1));
/// let far = distance_score(0.0, lat_lon(0.0, 0.0), lat_lon(0.0, 0.2));
/// assert!(near < far);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "planar distance approximation requires float maths"
)]
pub fn distance_score(reference_latitude: f64, a: Coordinate, b: Coordinate) -> f64 {
    let longitude_scale = (PI * reference_latitude / 180.0).cos();
    let latitude_delta = a.y - b.y;
    let longitude_delta = a.x - b.x;
    latitude_delta.powi(2) + (longitude_scale * longitude_delta).powi(2)
}

/// Return the candidate nearest to `reference`.
///
/// Candidates with equal scores resolve to the first one encountered.
///
/// # Errors
///
/// Returns [`ProximityError::NoCandidates`] when `candidates` is empty.
///
/// # Examples
/// ```
/// use ecotour_core::{PointOfInterest, find_closest, lat_lon};
///
/// let pois = vec![
///     PointOfInterest::new("a", "A", lat_lon(0.0, 0.0)),
///     PointOfInterest::new("b", "B", lat_lon(0.0, 1.0)),
/// ];
/// let closest = find_closest(lat_lon(0.0, 0.9), &pois)?;
/// assert_eq!(closest.id.as_str(), "b");
/// # Ok::<(), ecotour_core::ProximityError>(())
/// ```
pub fn find_closest<'a, I>(
    reference: Coordinate,
    candidates: I,
) -> Result<&'a PointOfInterest, ProximityError>
where
    I: IntoIterator<Item = &'a PointOfInterest>,
{
    let mut iter = candidates.into_iter();
    let first = iter.next().ok_or(ProximityError::NoCandidates)?;
    let reference_latitude = first.latitude();

    let mut closest = first;
    let mut best = distance_score(reference_latitude, reference, first.location);
    for candidate in iter {
        let score = distance_score(reference_latitude, reference, candidate.location);
        if score < best {
            best = score;
            closest = candidate;
        }
    }
    Ok(closest)
}
