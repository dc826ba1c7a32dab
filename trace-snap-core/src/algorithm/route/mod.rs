mod route;
mod shortest_route;

pub use route::{Route, RouteStep};
pub use shortest_route::shortest_route;
