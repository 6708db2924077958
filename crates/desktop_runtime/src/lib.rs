pub mod app;
pub mod commands;
mod effect_executor;
pub mod error;
pub mod keymap;
pub mod menu;
pub mod model;
pub mod reducer;
pub mod settings;
pub mod store;
pub mod triggers;

pub use app::{tray_menu, Application};
pub use commands::{builtin_declarations, default_command_args, when_context, CommandRegistry};
pub use effect_executor::{editor_font_css, zoom_factor};
pub use error::{CollaboratorIoError, ShellError};
pub use keymap::{Keymap, KeymapError};
pub use menu::{build_menu, filter_menu, sync_menu_states, MenuBuildInput, MenuBuildState};
pub use model::*;
pub use reducer::{reduce_app, AppAction, ReducerError};
pub use settings::{Settings, SettingsError};
pub use store::{ReducerPipeline, Store};
pub use triggers::{effects_for, ShellEffect};
