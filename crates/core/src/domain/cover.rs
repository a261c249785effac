// Cell Cover Domain Model
// A bounded set of hierarchical spherical cells whose union contains a
// region polygon. Cells are H3 indexes; each carries a resolution
// (0 = coarsest, 15 = finest) and a bounding rectangle derived from its
// boundary vertices.

use h3o::CellIndex;
use serde::{Deserialize, Serialize};

/// Lat/lng axis-aligned bounding rectangle of a cell
///
/// Corners follow the (lo, hi) convention of the count-query predicate:
/// `lat_lo <= lat_hi` and `lng_lo <= lng_hi`. Cells straddling the
/// antimeridian are not special-cased; regions there inherit the
/// upstream index's behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_lo: f64,
    pub lng_lo: f64,
    pub lat_hi: f64,
    pub lng_hi: f64,
}

impl BoundingBox {
    /// Compute the bounding rectangle of a cell from its boundary vertices
    pub fn of_cell(cell: CellIndex) -> Self {
        let mut bbox = Self {
            lat_lo: f64::MAX,
            lng_lo: f64::MAX,
            lat_hi: f64::MIN,
            lng_hi: f64::MIN,
        };
        for vertex in cell.boundary().iter() {
            bbox.lat_lo = bbox.lat_lo.min(vertex.lat());
            bbox.lng_lo = bbox.lng_lo.min(vertex.lng());
            bbox.lat_hi = bbox.lat_hi.max(vertex.lat());
            bbox.lng_hi = bbox.lng_hi.max(vertex.lng());
        }
        bbox
    }

    /// Whether a point lies inside the rectangle (inclusive)
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.lat_lo && lat <= self.lat_hi && lng >= self.lng_lo && lng <= self.lng_hi
    }
}

/// An ordered set of cells approximating a region
///
/// Produced by the region coverer under `max_level` / `max_cells` budgets.
/// The union of the cells' bounding rectangles is a superset of the
/// region's area; the cover may extend past the polygon boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellCover {
    cells: Vec<CellIndex>,
}

impl CellCover {
    /// Build a cover from cells, de-duplicated and in canonical order
    pub fn new(mut cells: Vec<CellIndex>) -> Self {
        cells.sort_unstable();
        cells.dedup();
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[CellIndex] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.cells.iter().copied()
    }

    /// Bounding rectangles of all cells, in cover order
    pub fn bounding_boxes(&self) -> impl Iterator<Item = BoundingBox> + '_ {
        self.cells.iter().map(|c| BoundingBox::of_cell(*c))
    }

    /// Whether any cell's bounding rectangle contains the point
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        self.bounding_boxes().any(|b| b.contains(lat, lng))
    }
}

impl<'a> IntoIterator for &'a CellCover {
    type Item = CellIndex;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, CellIndex>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter().copied()
    }
}
