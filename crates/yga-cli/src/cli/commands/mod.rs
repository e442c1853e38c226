//! CLI command handlers, one per file.

mod download;
mod fetch;
mod resources;

pub use download::run_download;
pub use fetch::run_fetch;
pub use resources::run_resources;
