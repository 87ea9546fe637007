pub mod stats;
pub mod tenant;
