mod cell_cover;

pub use cell_cover::{cell_cover, cell_edge_meters, get_features_with_cells};
