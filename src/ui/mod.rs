//! UI module for consistent CLI output
//!
//! Uses `cliclack` for interactive prompts and spinners and `indicatif` for
//! batch progress, with automatic fallback to plain output in
//! CI/non-interactive environments.
//!
//! # Example
//!
//! ```rust,ignore
//! use chemcache::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Looking up aspirin...");
//! // ... do work ...
//! spinner.stop("Found CID 2244");
//!
//! if ui::confirm(&ctx, "Clear cached lookups?", false).await? {
//!     ui::step_ok(&ctx, "Cache cleared");
//! }
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, remark, section, step_error_detail, step_info, step_ok,
    step_ok_detail, step_warn, step_warn_hint,
};
pub use progress::{BatchProgressBar, TaskSpinner};
pub use prompts::confirm;
pub use theme::{init_theme, ChemTheme};
