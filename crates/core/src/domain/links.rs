// Links Domain Model
// Image links fetched from the granule index / object store.

use std::collections::HashSet;

/// Links to satellite images (full object URLs, `bucket/object`)
pub type Links = Vec<String>;

/// Remove duplicated links while preserving first-seen order
///
/// Cells in a cover can overlap granule bounding boxes, so the same
/// granule may be listed under more than one cell. Deduplication is an
/// optional post-aggregation step; the default aggregation keeps
/// duplicates and callers treat counts as upper bounds.
pub fn dedup_links(links: &[String]) -> Links {
    let mut seen = HashSet::with_capacity(links.len());
    links
        .iter()
        .filter(|l| seen.insert(l.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_preserves_first_seen_order() {
        let links = vec![
            "b/a.jp2".to_string(),
            "b/b.jp2".to_string(),
            "b/a.jp2".to_string(),
            "b/c.jp2".to_string(),
            "b/b.jp2".to_string(),
        ];
        assert_eq!(dedup_links(&links), vec!["b/a.jp2", "b/b.jp2", "b/c.jp2"]);
    }

    #[test]
    fn dedup_of_unique_input_is_identity() {
        let links = vec!["x/1".to_string(), "x/2".to_string()];
        assert_eq!(dedup_links(&links), links);
    }
}
