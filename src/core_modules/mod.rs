pub mod centroid_estimator;
pub mod edge_detector;
pub mod geometry;
pub mod grid_sampler;
pub mod hold_timer;
pub mod hover_tracker;
pub mod navigation;
pub mod palette;
pub mod site_partition;
pub mod utils;
