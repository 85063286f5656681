pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{format_outcome, print_banner, resolve_output_dir};
