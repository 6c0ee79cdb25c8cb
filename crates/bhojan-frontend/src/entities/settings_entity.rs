use bhojan_bridge::config::Config;
use gpui::{AppContext, Entity};

use crate::routes;

/// Configuration as last reported by the backend.
#[derive(Debug, Clone, Default)]
pub struct SettingsEntity {
    pub config: Config,
}

impl SettingsEntity {
    pub fn update<C: AppContext>(entity: &Entity<Self>, config: Config, cx: &mut C) -> C::Result<()> {
        entity.update(cx, |this, cx| {
            this.config = config;
            cx.notify();
        })
    }

    /// Resolves an in-app path against the configured base URL.
    pub fn absolute_url(&self, target: &str) -> String {
        routes::absolute_url(&self.config.server.base_url, target)
    }
}
