use super::MatchableFeature;
use crate::model::spatial::{cell_cover, get_features_with_cells};
use std::collections::HashMap;

/// A read-only collection of matchable features with its derived spatial
/// indices. Features are stored in load order and addressed by index; the
/// cell index maps geohash cells at the construction resolution to the
/// features touching them.
#[derive(Debug, Clone)]
pub struct MatchableSet {
    pub features: Vec<MatchableFeature>,
    pub by_id: HashMap<String, usize>,
    pub by_cell: HashMap<String, Vec<usize>>,
    pub cells_by_id: HashMap<String, Vec<String>>,
    pub resolution: usize,
}

impl MatchableSet {
    /// builds the indices for a feature collection at the given geohash
    /// resolution. a feature whose id was already seen is dropped with a
    /// warning so that `by_id` stays a bijection onto the stored features.
    pub fn new(features: Vec<MatchableFeature>, resolution: usize) -> Self {
        let mut kept: Vec<MatchableFeature> = Vec::with_capacity(features.len());
        let mut by_id: HashMap<String, usize> = HashMap::with_capacity(features.len());
        let mut by_cell: HashMap<String, Vec<usize>> = HashMap::new();
        let mut cells_by_id: HashMap<String, Vec<String>> = HashMap::new();

        for feature in features {
            if by_id.contains_key(&feature.id) {
                log::warn!("duplicate feature id {}, keeping the first", feature.id);
                continue;
            }
            let index = kept.len();
            let cells = cell_cover(&feature.geometry, resolution);
            for cell in &cells {
                by_cell.entry(cell.clone()).or_default().push(index);
            }
            by_id.insert(feature.id.clone(), index);
            cells_by_id.insert(feature.id.clone(), cells);
            kept.push(feature);
        }

        Self {
            features: kept,
            by_id,
            by_cell,
            cells_by_id,
            resolution,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MatchableFeature> {
        self.by_id.get(id).map(|&index| &self.features[index])
    }

    /// the cells touched by the identified feature, if known.
    pub fn cells_of(&self, id: &str) -> Option<&[String]> {
        self.cells_by_id.get(id).map(|cells| cells.as_slice())
    }

    /// features of this set touching any of the given cells, deduplicated,
    /// in first-seen order.
    pub fn features_with_cells(&self, cells: &[String]) -> Vec<&MatchableFeature> {
        get_features_with_cells(&self.by_cell, cells)
            .into_iter()
            .map(|index| &self.features[index])
            .collect()
    }
}
