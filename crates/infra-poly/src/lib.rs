// Poly Boundary Source - BoundarySource adapter over .poly files
// Geofabrik-style polygon filter files carry one "lng lat" pair per line
// in scientific notation, wrapped in section headers and END markers.
// Extraction is regex-driven: every decimal float in the file, in order.

use std::path::PathBuf;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use satcover_core::port::{BoundaryError, BoundarySource};

/// Decimal floats with optional sign and exponent
/// Example: longitude "8.552884E+00", latitude "5.491803E+01".
/// Section ids (bare integers) carry no decimal point and never match.
const FLOAT_EXPONENT_PATTERN: &str = r"[-+]?[0-9]*\.[0-9]+([eE][-+]?[0-9]+)?";

/// Extract a flat (lat, lng) sequence from .poly text
///
/// .poly files store longitude before latitude; pairs are swapped here so
/// the output satisfies the boundary port's (lat, lng) ordering.
///
/// # Errors
/// - `BoundaryError::Parse` on an odd number of floats or an unparsable
///   match
pub fn parse_poly_text(text: &str) -> Result<Vec<f64>, BoundaryError> {
    // The pattern is a constant; compilation cannot fail at runtime
    let regex = Regex::new(FLOAT_EXPONENT_PATTERN)
        .map_err(|e| BoundaryError::Parse(e.to_string()))?;

    let mut raw = Vec::new();
    for m in regex.find_iter(text) {
        let value: f64 = m
            .as_str()
            .parse()
            .map_err(|e| BoundaryError::Parse(format!("bad float {:?}: {}", m.as_str(), e)))?;
        raw.push(value);
    }

    if raw.len() % 2 != 0 {
        return Err(BoundaryError::Parse(format!(
            "odd float count {} in polygon text",
            raw.len()
        )));
    }

    let mut coords = Vec::with_capacity(raw.len());
    for pair in raw.chunks_exact(2) {
        coords.push(pair[1]); // lat
        coords.push(pair[0]); // lng
    }
    Ok(coords)
}

/// Boundary source reading `<dir>/<region>.poly`
pub struct PolyDirSource {
    dir: PathBuf,
}

impl PolyDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl BoundarySource for PolyDirSource {
    async fn boundary(&self, region: &str) -> Result<Vec<f64>, BoundaryError> {
        if region.is_empty() || region.contains('/') || region.contains('\\') || region.contains("..") {
            return Err(BoundaryError::RegionNotFound(region.to_string()));
        }

        let path = self.dir.join(format!("{region}.poly"));
        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BoundaryError::RegionNotFound(region.to_string())
            } else {
                BoundaryError::Fetch(format!("{}: {}", path.display(), e))
            }
        })?;

        let coords = parse_poly_text(&text)?;
        debug!(region, points = coords.len() / 2, "Boundary parsed");
        Ok(coords)
    }
}
