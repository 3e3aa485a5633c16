//! Terminal output helpers

use std::time::Duration;

use console::{Emoji, style};

/// Magnifying glass - for lookups
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Gear - for conversions
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
/// Link - for hashing
pub static LINK: Emoji<'_, '_> = Emoji("🔗 ", "");
/// Document - for file output
pub static DOCUMENT: Emoji<'_, '_> = Emoji("📄 ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

/// Print a step indicator: `[1/3] 🔍 Message...`
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    eprintln!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print completion message: `✨ Done in 0.42s`
pub fn print_done(elapsed: Duration) {
    eprintln!("{SPARKLE}Done in {:.2}s", elapsed.as_secs_f64());
}

/// Print a `label: value` line with the label dimmed.
pub fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("{} {value}", style(format!("{label}:")).dim());
}
