//! Utility modules: filesystem predicates, logging setup, traversal

pub mod fs;
pub mod logging;
pub mod visit;

// Re-export commonly used items
pub use fs::{is_executable, is_readable, is_writable};
#[cfg(feature = "json-logging")]
pub use logging::init_json_logging;
pub use logging::{init_logging, init_module_logging};
pub use visit::{visit, visit_filtered};
