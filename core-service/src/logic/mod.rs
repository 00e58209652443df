pub mod analysis;
pub mod certificate;
pub mod config;
pub mod features;
pub mod model;
pub mod schema;
