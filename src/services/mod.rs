// Tab Wrangler services
// Services hold no archive state of their own: settings, whitelist, filters, badge, backup.

pub mod badge;
pub mod backup;
pub mod settings_engine;
pub mod tab_filter;
pub mod whitelist;
