use crate::model::feature::MatchableFeature;
use geo::Point;
use std::collections::HashMap;

/// The position of one of a feature's connectors on its geometry.
#[derive(Debug, Clone)]
pub struct ConnectorPosition {
    pub connector_id: String,
    pub point: Point<f64>,
    pub arc_position_meters: f64,
}

/// One adjacency: leaving a feature through a connector into a neighbor.
#[derive(Debug, Clone, Copy)]
pub struct NeighborEdge {
    /// connector index on the source feature
    pub connector: usize,
    /// candidate index of the neighboring feature
    pub neighbor: usize,
    /// index of the shared connector on the neighboring feature
    pub neighbor_connector: usize,
}

/// Shared-junction adjacency over a trace's candidate features, derived
/// from connector ids. Undirected by construction and rebuilt per trace
/// because the candidate set is trace-specific. Features are addressed by
/// their index in the candidate slice.
#[derive(Debug, Clone)]
pub struct RoadGraph {
    pub connector_to_features: HashMap<String, Vec<usize>>,
    connector_positions: Vec<Vec<Option<ConnectorPosition>>>,
    edges: Vec<Vec<NeighborEdge>>,
}

impl RoadGraph {
    pub fn new(candidates: &[&MatchableFeature]) -> Self {
        let mut connector_to_features: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, feature) in candidates.iter().enumerate() {
            for connector_id in &feature.connector_ids {
                connector_to_features
                    .entry(connector_id.clone())
                    .or_default()
                    .push(index);
            }
        }

        let connector_positions: Vec<Vec<Option<ConnectorPosition>>> = candidates
            .iter()
            .map(|feature| {
                feature
                    .connector_ids
                    .iter()
                    .enumerate()
                    .map(|(ci, connector_id)| {
                        feature.connector_position(ci).map(|(point, arc)| {
                            ConnectorPosition {
                                connector_id: connector_id.clone(),
                                point,
                                arc_position_meters: arc,
                            }
                        })
                    })
                    .collect()
            })
            .collect();

        let mut edges: Vec<Vec<NeighborEdge>> = vec![Vec::new(); candidates.len()];
        for (u, feature) in candidates.iter().enumerate() {
            for (ci, connector_id) in feature.connector_ids.iter().enumerate() {
                if connector_positions[u][ci].is_none() {
                    continue;
                }
                let Some(members) = connector_to_features.get(connector_id) else {
                    continue;
                };
                for &g in members {
                    if g == u {
                        continue;
                    }
                    let Some(gi) = candidates[g]
                        .connector_ids
                        .iter()
                        .position(|c| c == connector_id)
                    else {
                        continue;
                    };
                    if connector_positions[g][gi].is_none() {
                        continue;
                    }
                    edges[u].push(NeighborEdge {
                        connector: ci,
                        neighbor: g,
                        neighbor_connector: gi,
                    });
                }
            }
        }

        Self {
            connector_to_features,
            connector_positions,
            edges,
        }
    }

    pub fn neighbors(&self, feature: usize) -> &[NeighborEdge] {
        &self.edges[feature]
    }

    pub fn connector_position(&self, feature: usize, connector: usize) -> Option<&ConnectorPosition> {
        self.connector_positions
            .get(feature)?
            .get(connector)?
            .as_ref()
    }

    /// the features connected to `feature` through any shared connector,
    /// deduplicated, in edge order.
    pub fn connected_features(&self, feature: usize) -> Vec<usize> {
        let mut result = Vec::new();
        for edge in &self.edges[feature] {
            if !result.contains(&edge.neighbor) {
                result.push(edge.neighbor);
            }
        }
        result
    }
}
