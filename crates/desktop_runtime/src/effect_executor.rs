//! Executor for trigger-table effects.

use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::{
    app::{tray_menu, Application},
    settings::keys,
    triggers::ShellEffect,
};

impl Application {
    /// Runs `effects` in order. Effects never dispatch directly; follow-up actions are queued.
    pub(crate) async fn run_effects(&mut self, effects: &[ShellEffect]) {
        for effect in effects {
            trace!(?effect, "running shell effect");
            match *effect {
                ShellEffect::UpdateMenuForRoute => {
                    let screen = self.state().route_kind().clone();
                    self.update_menu(&screen).await;
                }
                ShellEffect::RefreshMenu => self.refresh_menu().await,
                ShellEffect::SyncMenuStates => self.update_menu_item_states(),
                ShellEffect::PersistSetting(key) => self.persist_mirrored_setting(key).await,
                ShellEffect::ToggleDevTools => {
                    let visible = self.state().dev_tools_visible;
                    self.services.shell.set_dev_tools_visible(visible);
                }
                ShellEffect::ApplyLocale => {
                    self.services
                        .shell
                        .set_locale(self.settings.text(keys::LOCALE));
                }
                ShellEffect::UpdateTray => self.update_tray(),
                ShellEffect::UpdateEditorFont => {
                    let css = editor_font_css(self.settings.text(keys::EDITOR_FONT_FAMILY));
                    self.services.shell.inject_editor_css(&css);
                }
                ShellEffect::ApplyZoomFactor => {
                    let percent = self.settings.int(keys::WINDOW_CONTENT_ZOOM_FACTOR);
                    self.services.shell.set_zoom_factor(zoom_factor(percent));
                }
                ShellEffect::ThemeAutoDetect => self.apply_theme_auto_detect().await,
            }
        }
    }

    async fn persist_mirrored_setting(&mut self, key: &'static str) {
        let Some(value) = self.state().mirrored_setting(key) else {
            return;
        };
        if let Err(err) = self.queue_setting(key, value).await {
            warn!(key, error = %err, "failed to mirror ui state into settings");
        }
    }

    fn update_tray(&self) {
        let shell = Rc::clone(&self.services.shell);
        let wanted = self.settings.bool(keys::SHOW_TRAY_ICON);
        if shell.tray_shown() == wanted {
            return;
        }
        if wanted {
            shell.create_tray(tray_menu());
        } else {
            shell.destroy_tray();
        }
    }

    async fn apply_theme_auto_detect(&mut self) {
        if !self.settings.bool(keys::THEME_AUTO_DETECT) {
            return;
        }
        let preferred = if self.services.shell.should_use_dark_colors() {
            keys::PREFERRED_DARK_THEME
        } else {
            keys::PREFERRED_LIGHT_THEME
        };
        let Some(theme) = self.settings.get(preferred).cloned() else {
            return;
        };
        match self.queue_setting(keys::THEME, theme).await {
            Ok(true) => debug!(preferred, "theme switched to match the system"),
            Ok(false) => {}
            Err(err) => warn!(error = %err, "failed to apply preferred theme"),
        }
    }
}

/// CSS rule forcing the editor font. Each comma-separated family is quoted and monospace is
/// always the last fallback.
pub fn editor_font_css(font_family: &str) -> String {
    let mut families: Vec<String> = font_family
        .split(',')
        .map(str::trim)
        .filter(|family| !family.is_empty())
        .map(|family| format!("\"{}\"", family.trim_matches('"')))
        .collect();
    families.push("monospace".to_string());
    format!(
        ".CodeMirror * {{ font-family: {} !important; }}",
        families.join(", ")
    )
}

/// Zoom setting (percent) as a window zoom factor.
pub fn zoom_factor(percent: i64) -> f64 {
    percent as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn editor_font_css_quotes_each_family() {
        assert_eq!(
            editor_font_css("Fira Code, \"Menlo\""),
            ".CodeMirror * { font-family: \"Fira Code\", \"Menlo\", monospace !important; }"
        );
        assert_eq!(
            editor_font_css("  "),
            ".CodeMirror * { font-family: monospace !important; }"
        );
    }

    #[test]
    fn zoom_percent_to_factor() {
        assert_eq!(zoom_factor(100), 1.0);
        assert_eq!(zoom_factor(150), 1.5);
    }
}
