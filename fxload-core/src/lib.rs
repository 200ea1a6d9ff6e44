mod config;
mod constants;
mod percentile;
mod sla;
mod stats;
mod template;

pub use config::*;
pub use constants::*;
pub use percentile::*;
pub use sla::*;
pub use stats::*;
pub use template::*;
