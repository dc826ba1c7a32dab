use geo::Point;

/// One hop of a route: the feature traversed and the connector position
/// crossed to enter it. The first step starts inside its feature, so it
/// has no via point.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStep {
    /// candidate index of the traversed feature
    pub candidate: usize,
    pub via_point: Option<Point<f64>>,
}

/// An ordered list of steps through the road graph and the total distance
/// traveled along feature geometries, in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub steps: Vec<RouteStep>,
    pub distance: f64,
}

impl Route {
    pub fn is_reachable(&self) -> bool {
        self.distance.is_finite()
    }
}
