// Domain layer - Time arithmetic, boundary rules and engine request construction

pub mod errors;
pub mod filter_graph;
pub mod model;
pub mod request;
pub mod rules;
