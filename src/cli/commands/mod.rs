//! CLI command implementations

pub mod batch;
pub mod cache;
pub mod config;
pub mod lookup;
pub mod offline;
pub mod structures;

pub use batch::execute as batch;
pub use cache::execute as cache;
pub use config::execute as config;
pub use lookup::execute as lookup;
pub use offline::execute as offline;
pub use structures::execute as structures;
