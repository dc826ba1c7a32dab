use super::{Route, RouteStep};
use crate::model::feature::MatchableFeature;
use crate::model::road_graph::RoadGraph;
use geo::Point;
use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Dijkstra over candidate features from a position on `from` to a
/// position on `to`. Features are graph nodes; traversing a feature costs
/// the arc distance along its geometry from the position it was entered at
/// to the connector it is left through, and entering `to` additionally
/// costs the arc distance from the shared connector to `to_point`.
///
/// Features named in `excluded_feature_ids` may not be used as
/// intermediate hops; the endpoints are exempt. When two paths tie on
/// distance the one discovered first is retained.
///
/// Returns None when either endpoint is unknown, has empty geometry, or no
/// path exists. Never errors.
pub fn shortest_route(
    candidates: &[&MatchableFeature],
    graph: &RoadGraph,
    from: usize,
    to: usize,
    from_point: &Point<f64>,
    to_point: &Point<f64>,
    excluded_feature_ids: &[String],
) -> Option<Route> {
    if from >= candidates.len() || to >= candidates.len() {
        return None;
    }

    if from == to {
        let distance = candidates[from].geometry.distance_along(from_point, to_point);
        return Some(Route {
            steps: vec![RouteStep {
                candidate: from,
                via_point: None,
            }],
            distance,
        });
    }

    let from_arc = candidates[from].geometry.nearest(from_point)?.arc_position_meters;
    let to_arc = candidates[to].geometry.nearest(to_point)?.arc_position_meters;

    let is_excluded =
        |index: usize| excluded_feature_ids.iter().any(|id| *id == candidates[index].id);

    let mut dist: HashMap<usize, f64> = HashMap::new();
    let mut entry_arc: HashMap<usize, f64> = HashMap::new();
    let mut prev: HashMap<usize, (usize, Point<f64>)> = HashMap::new();
    let mut frontier: PriorityQueue<usize, Reverse<OrderedFloat<f64>>> = PriorityQueue::new();

    dist.insert(from, 0.0);
    entry_arc.insert(from, from_arc);
    frontier.push(from, Reverse(OrderedFloat(0.0)));

    while let Some((u, Reverse(OrderedFloat(d)))) = frontier.pop() {
        if u == to {
            return Some(backtrack(from, to, d, &prev));
        }
        let u_entry = *entry_arc.get(&u)?;
        for edge in graph.neighbors(u) {
            let g = edge.neighbor;
            if g != to && is_excluded(g) {
                continue;
            }
            let Some(exit) = graph.connector_position(u, edge.connector) else {
                continue;
            };
            let Some(gate) = graph.connector_position(g, edge.neighbor_connector) else {
                continue;
            };
            let mut weight = (exit.arc_position_meters - u_entry).abs();
            if g == to {
                weight += (to_arc - gate.arc_position_meters).abs();
            }
            let tentative = d + weight;
            let current = dist.get(&g).copied().unwrap_or(f64::INFINITY);
            if tentative < current {
                dist.insert(g, tentative);
                entry_arc.insert(g, gate.arc_position_meters);
                prev.insert(g, (u, gate.point));
                frontier.push_increase(g, Reverse(OrderedFloat(tentative)));
            }
        }
    }

    None
}

fn backtrack(from: usize, to: usize, distance: f64, prev: &HashMap<usize, (usize, Point<f64>)>) -> Route {
    let mut steps: Vec<RouteStep> = Vec::new();
    let mut current = to;
    while current != from {
        match prev.get(&current) {
            Some(&(parent, via)) => {
                steps.push(RouteStep {
                    candidate: current,
                    via_point: Some(via),
                });
                current = parent;
            }
            None => break,
        }
    }
    steps.push(RouteStep {
        candidate: from,
        via_point: None,
    });
    steps.reverse();
    Route { steps, distance }
}
