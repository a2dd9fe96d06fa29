// Badge Presenter hookup
// Renders the archive size on the host badge after every archive mutation.

use crate::host::Context;
use crate::types::settings::SHOW_BADGE_COUNT;

/// Badge label for `saved_tabs`. Empty when counting is off or nothing is
/// archived, which hides the badge.
pub fn badge_text(saved_tabs: usize, show_count: bool) -> String {
    if !show_count || saved_tabs == 0 {
        return String::new();
    }
    saved_tabs.to_string()
}

/// Pushes the current count to the host badge.
pub fn update_closed_count(ctx: &mut Context, saved_tabs: usize) {
    let show_count = ctx.settings.get_bool(SHOW_BADGE_COUNT);
    let text = badge_text(saved_tabs, show_count);
    ctx.badge.set_badge_text(&text);
}
