pub mod aggregate;
pub mod dedupe;
pub mod error;
pub mod features;
pub mod matchup;
pub mod model;
pub mod odds;
pub mod predict;
pub mod store;
pub mod value;
