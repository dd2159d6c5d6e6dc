//! Main-thread access to the loaded configuration.

use std::cell::RefCell;
use std::rc::Rc;

use slatebar_core::Config;

pub struct ConfigManager {
    config: RefCell<Rc<Config>>,
}

thread_local! {
    static CONFIG_MANAGER: Rc<ConfigManager> = Rc::new(ConfigManager {
        config: RefCell::new(Rc::new(Config::default())),
    });
}

impl ConfigManager {
    /// The shared instance. Main thread only.
    pub fn global() -> Rc<ConfigManager> {
        CONFIG_MANAGER.with(Rc::clone)
    }

    /// Replace the active configuration. Called once at startup, before
    /// any panel is built.
    pub fn install(&self, config: Config) {
        *self.config.borrow_mut() = Rc::new(config);
    }

    pub fn config(&self) -> Rc<Config> {
        self.config.borrow().clone()
    }

    pub fn panel_height(&self) -> i32 {
        self.config.borrow().panel.height as i32
    }

    /// Whether a panel should be created on the given connector.
    pub fn monitor_allowed(&self, connector: &str) -> bool {
        let config = self.config.borrow();
        config.panel.monitors.is_empty()
            || config.panel.monitors.iter().any(|m| m == connector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(config: Config) -> ConfigManager {
        ConfigManager {
            config: RefCell::new(Rc::new(config)),
        }
    }

    #[test]
    fn test_empty_allow_list_allows_everything() {
        let manager = manager_with(Config::default());
        assert!(manager.monitor_allowed("DP-1"));
        assert!(manager.monitor_allowed("eDP-1"));
    }

    #[test]
    fn test_allow_list_filters_connectors() {
        let mut config = Config::default();
        config.panel.monitors = vec!["DP-1".to_string()];
        let manager = manager_with(config);
        assert!(manager.monitor_allowed("DP-1"));
        assert!(!manager.monitor_allowed("HDMI-A-1"));
    }
}
