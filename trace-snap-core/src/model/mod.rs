pub mod feature;
pub mod road_graph;
pub mod spatial;
