//! Status lines for command output
//!
//! Fancy output goes through `cliclack::log`. Plain output prints one tagged
//! line per step so CI logs and the integration tests can match on it.

use super::context::UiContext;
use console::style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Ok,
    Warn,
    Fail,
    Info,
}

impl Level {
    fn tag(self) -> String {
        match self {
            Self::Ok => style("[OK]").green().to_string(),
            Self::Warn => style("[WARN]").yellow().to_string(),
            Self::Fail => style("[FAIL]").red().to_string(),
            Self::Info => style("[INFO]").cyan().to_string(),
        }
    }
}

fn plain_line(level: Level, message: &str) -> String {
    format!("  {} {}", level.tag(), message)
}

fn step(ctx: &UiContext, level: Level, message: &str) {
    if !ctx.use_fancy_output() {
        println!("{}", plain_line(level, message));
        return;
    }
    let shown = match level {
        Level::Ok => cliclack::log::success(message),
        Level::Warn => cliclack::log::warning(message),
        Level::Fail => cliclack::log::error(message),
        Level::Info => cliclack::log::info(message),
    };
    shown.ok();
}

/// Command banner
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).green().bold()).ok();
    } else {
        println!("{}\n", style(title).green().bold());
    }
}

/// Heading above a record or a batch summary
pub fn section(ctx: &UiContext, title: &str) {
    println!();
    if ctx.use_fancy_output() {
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    step(ctx, Level::Ok, message);
}

/// Success with a dimmed detail such as a path or a count
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    step(ctx, Level::Ok, &format!("{} ({})", message, style(detail).dim()));
}

pub fn step_warn(ctx: &UiContext, message: &str) {
    step(ctx, Level::Warn, message);
}

pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    step(ctx, Level::Warn, &format!("{} - {}", message, style(hint).dim()));
}

pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    step(ctx, Level::Fail, &format!("{}: {}", message, style(detail).red()));
}

pub fn step_info(ctx: &UiContext, message: &str) {
    step(ctx, Level::Info, message);
}

/// Dimmed follow-up text, such as the valid keys after a rejected one
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::remark(message).ok();
    } else {
        println!("  {}", style(message).dim());
    }
}

/// Property line of a compound record or a cache location
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    let key = if ctx.use_fancy_output() {
        style(key).dim().to_string()
    } else {
        key.to_string()
    };
    println!("  {}: {}", key, value);
}

/// Setting line coloured by whether it is in its normal state
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    if ctx.use_fancy_output() {
        let value = if ok {
            style(value).green()
        } else {
            style(value).yellow()
        };
        println!("  {}: {}", style(key).dim(), value);
    } else {
        let level = if ok { Level::Ok } else { Level::Warn };
        println!("{}", plain_line(level, &format!("{}: {}", key, value)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_tagged_by_level() {
        console::set_colors_enabled(false);
        assert_eq!(plain_line(Level::Ok, "Cleared cached lookups"), "  [OK] Cleared cached lookups");
        assert_eq!(plain_line(Level::Warn, "Offline mode: on"), "  [WARN] Offline mode: on");
        assert_eq!(plain_line(Level::Fail, "Unknown key: x"), "  [FAIL] Unknown key: x");
        assert_eq!(plain_line(Level::Info, "No saved structures"), "  [INFO] No saved structures");
    }

    #[test]
    fn plain_output_does_not_panic() {
        let ctx = UiContext::non_interactive();
        intro(&ctx, "Cache");
        section(&ctx, "CID 2244");
        step_ok_detail(&ctx, "Pruned 0 expired entries", "compound-by-id");
        step_warn_hint(&ctx, "1 succeeded, 0 failed", "Batch cancelled");
        step_error_detail(&ctx, "Unknown config key", "cache.colour");
        remark(&ctx, "Valid keys: cache.ttl_days");
        key_value(&ctx, "MolecularFormula", "C9H8O4");
        key_value_status(&ctx, "Offline mode", "off", true);
    }
}
