pub mod metrics;
pub mod aggregate;
pub mod query;
pub mod response;

pub use metrics::*;
pub use aggregate::*;
pub use query::*;
pub use response::*;
