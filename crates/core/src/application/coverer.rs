// Region Coverer
// Approximates a boundary polygon as a bounded set of hierarchical
// spherical cells. The covering includes every cell intersecting the
// polygon, so the cover is a superset of the region; when the budget
// would be exceeded the coverer steps to a coarser resolution rather
// than failing, trading precision for cell count.

use std::collections::HashSet;

use geo_types::{Coord, LineString, Polygon};
use h3o::geom::{ContainmentMode, PolyfillConfig, ToCells};
use h3o::{CellIndex, Resolution};
use tracing::{debug, warn};

use crate::domain::{pair_coordinates, CellCover, Coordinate, DomainError};
use crate::error::Result;

/// Covering budgets
///
/// `max_level` bounds cell granularity (0 = coarsest, 15 = finest);
/// `max_cells` bounds cover size, trading approximation quality against
/// query fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverConfig {
    pub max_level: u8,
    pub max_cells: usize,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            max_level: 15,
            max_cells: 100,
        }
    }
}

/// Produces cell covers from flat boundary coordinate sequences
#[derive(Debug, Clone, Copy)]
pub struct RegionCoverer {
    config: CoverConfig,
}

impl RegionCoverer {
    pub fn new(config: CoverConfig) -> Result<Self> {
        if config.max_level > 15 {
            return Err(DomainError::InvalidLevel(config.max_level).into());
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> CoverConfig {
        self.config
    }

    /// Build a cell cover from a flat ordered lat/lng sequence
    ///
    /// Pairs the coordinates positionally, closes them into a single ring
    /// polygon (no hole support), and covers it at the finest resolution
    /// `<= max_level` whose covering fits `max_cells`. The budget check is
    /// exact: a resolution is only skipped when its real covering exceeds
    /// `max_cells`, never on an estimate alone. If even resolution 0
    /// exceeds the budget the resolution-0 cover is returned as-is: an
    /// over-inclusive approximation is preferred over a failure, and
    /// dropping cells would break the superset guarantee.
    ///
    /// # Errors
    /// - `DomainError::OddCoordinateCount` / `TooFewPoints` /
    ///   `InvalidCoordinate` on malformed input
    /// - `DomainError::InvalidGeometry` if the ring cannot be indexed
    pub fn cover(&self, flat: &[f64]) -> Result<CellCover> {
        let points = pair_coordinates(flat)?;
        let geometry = h3o::geom::Polygon::from_degrees(ring_polygon(&points))
            .map_err(|e| DomainError::InvalidGeometry(e.to_string()))?;
        let max_cells = self.config.max_cells.max(1);

        let mut resolution = resolution_of(self.config.max_level)?;
        loop {
            if let Some(cells) = cells_within_budget(&geometry, resolution, max_cells) {
                debug!(
                    resolution = u8::from(resolution),
                    cells = cells.len(),
                    max_cells,
                    "Region cover computed"
                );
                return Ok(CellCover::new(cells));
            }
            match resolution.pred() {
                Some(coarser) => {
                    debug!(
                        resolution = u8::from(resolution),
                        max_cells,
                        "Cover over budget, coarsening"
                    );
                    resolution = coarser;
                }
                None => {
                    // Cannot coarsen past resolution 0; an over-sized cover
                    // beats dropping cells and breaking the superset
                    // guarantee.
                    let cells: Vec<CellIndex> =
                        geometry.to_cells(polyfill_config(resolution)).collect();
                    warn!(
                        cells = cells.len(),
                        max_cells,
                        "Cover exceeds budget at coarsest resolution"
                    );
                    return Ok(CellCover::new(cells));
                }
            }
        }
    }
}

/// Materialize the covering at `resolution` if it fits the budget
///
/// The `max_cells_count` upper bound short-circuits resolutions that
/// provably fit; otherwise distinct cells are counted from the lazy
/// covering iterator (which can repeat cells), bailing out as soon as the
/// budget is exceeded.
fn cells_within_budget(
    geometry: &h3o::geom::Polygon,
    resolution: Resolution,
    max_cells: usize,
) -> Option<Vec<CellIndex>> {
    if geometry.max_cells_count(polyfill_config(resolution)) <= max_cells {
        return Some(geometry.to_cells(polyfill_config(resolution)).collect());
    }

    let mut seen = HashSet::with_capacity(max_cells + 1);
    let mut cells = Vec::with_capacity(max_cells);
    for cell in geometry.to_cells(polyfill_config(resolution)) {
        if seen.insert(cell) {
            if seen.len() > max_cells {
                return None;
            }
            cells.push(cell);
        }
    }
    Some(cells)
}

fn polyfill_config(resolution: Resolution) -> PolyfillConfig {
    PolyfillConfig::new(resolution).containment_mode(ContainmentMode::Covers)
}

/// Close the ordered points into a single-ring polygon
///
/// geo-types closes open rings itself; coordinates map as x = lng, y = lat.
fn ring_polygon(points: &[Coordinate]) -> Polygon<f64> {
    let ring: Vec<Coord<f64>> = points
        .iter()
        .map(|p| Coord { x: p.lng, y: p.lat })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

fn resolution_of(level: u8) -> Result<Resolution> {
    Resolution::try_from(level).map_err(|_| DomainError::InvalidLevel(level).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 degree box over Oresund, from the original service's example region
    const BOX: [f64; 8] = [55.0, 12.0, 55.0, 13.0, 56.0, 13.0, 56.0, 12.0];

    #[test]
    fn cover_respects_cell_budget() {
        let coverer = RegionCoverer::new(CoverConfig {
            max_level: 15,
            max_cells: 100,
        })
        .unwrap();
        let cover = coverer.cover(&BOX).unwrap();
        assert!(!cover.is_empty());
        assert!(cover.len() <= 100);
    }

    #[test]
    fn cover_contains_every_input_point() {
        let coverer = RegionCoverer::new(CoverConfig::default()).unwrap();
        let cover = coverer.cover(&BOX).unwrap();
        for pair in BOX.chunks_exact(2) {
            assert!(
                cover.contains(pair[0], pair[1]),
                "point ({}, {}) not covered",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn raising_max_level_never_coarsens_the_cover() {
        let coarse = RegionCoverer::new(CoverConfig {
            max_level: 2,
            max_cells: 100,
        })
        .unwrap()
        .cover(&BOX)
        .unwrap();
        let fine = RegionCoverer::new(CoverConfig {
            max_level: 5,
            max_cells: 100,
        })
        .unwrap()
        .cover(&BOX)
        .unwrap();

        let max_res = |cover: &CellCover| {
            cover
                .iter()
                .map(|c| u8::from(c.resolution()))
                .max()
                .unwrap()
        };
        assert!(max_res(&fine) >= max_res(&coarse));
    }

    #[test]
    fn tiny_budget_still_produces_a_superset() {
        let coverer = RegionCoverer::new(CoverConfig {
            max_level: 6,
            max_cells: 2,
        })
        .unwrap();
        let cover = coverer.cover(&BOX).unwrap();
        assert!(!cover.is_empty());
        for pair in BOX.chunks_exact(2) {
            assert!(cover.contains(pair[0], pair[1]));
        }
    }

    #[test]
    fn budget_check_counts_real_cells_not_estimates() {
        // Learn the true covering size at a fixed resolution, then make
        // that exact count the budget: the coverer must keep the same
        // resolution instead of coarsening on an over-estimate
        let full = RegionCoverer::new(CoverConfig {
            max_level: 5,
            max_cells: 10_000,
        })
        .unwrap()
        .cover(&BOX)
        .unwrap();
        assert!(!full.is_empty());

        let tight = RegionCoverer::new(CoverConfig {
            max_level: 5,
            max_cells: full.len(),
        })
        .unwrap()
        .cover(&BOX)
        .unwrap();
        assert_eq!(tight, full);
    }

    #[test]
    fn degenerate_polygon_is_rejected() {
        let coverer = RegionCoverer::new(CoverConfig::default()).unwrap();
        let err = coverer.cover(&[55.0, 12.0, 55.0, 13.0]).unwrap_err();
        assert!(err.to_string().contains("Too few boundary points"));
    }

    #[test]
    fn level_above_finest_is_rejected() {
        let err = RegionCoverer::new(CoverConfig {
            max_level: 16,
            max_cells: 100,
        })
        .unwrap_err();
        assert!(err.to_string().contains("Invalid cell level"));
    }
}
