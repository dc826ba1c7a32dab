pub mod geojson_loader;

pub use geojson_loader::load_matchable_set;
