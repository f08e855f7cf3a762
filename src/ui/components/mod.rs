mod usage_panel;

pub use usage_panel::UsagePanel;
