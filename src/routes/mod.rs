pub mod cpu_load;
pub mod health_checks;
pub mod metrics;

pub use cpu_load::*;
pub use health_checks::*;
pub use metrics::*;
