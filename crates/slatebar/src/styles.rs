//! CSS class names and the generated stylesheet.
//!
//! Class names live in constants so widget code and the stylesheet cannot
//! drift apart. The stylesheet is generated because it interpolates config
//! values (bar height).

/// Widget-identifying classes.
pub mod widget {
    pub const REGION: &str = "panel-region";
    pub const REGION_LEFT: &str = "panel-region--left";
    pub const REGION_CENTER: &str = "panel-region--center";
    pub const REGION_RIGHT: &str = "panel-region--right";
    pub const CLOCK: &str = "clock-button";
    pub const QUICK_SETTINGS: &str = "quick-settings-button";
    pub const ACTIVITIES: &str = "activities-button";
    pub const QS_ROW: &str = "quick-settings-row";
}

/// State classes.
pub mod state {
    pub const CLICKABLE: &str = "clickable";
}

/// Return the stylesheet with config values interpolated.
pub fn css(panel_height: u32) -> String {
    format!(
        r#"
/* Window must be transparent so the strip draws its own background */
window.panel-window {{
    background: transparent;
}}

panel-strip {{
    min-height: {panel_height}px;
    background: alpha(#16161e, 0.92);
    color: #c0caf5;
}}

panel-strip .panel-region {{
    background: transparent;
}}

panel-menu-button {{
    padding: 0;
}}

panel-menu-button > button {{
    background: transparent;
    border: none;
    box-shadow: none;
    padding: 0 10px;
    min-height: {panel_height}px;
    border-radius: 0;
    color: inherit;
}}

panel-menu-button > button:hover,
panel-menu-button > button:checked {{
    background: alpha(#c0caf5, 0.12);
}}

.quick-settings-row {{
    padding: 6px 10px;
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_interpolates_height() {
        let sheet = css(40);
        assert!(sheet.contains("min-height: 40px;"));
    }
}
