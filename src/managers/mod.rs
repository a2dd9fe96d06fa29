// Tab Wrangler state managers
// Managers own mutable state: last-access times, the closed-tab archive, locked tabs.

pub mod activity_tracker;
pub mod closed_tabs;
pub mod lock_registry;
