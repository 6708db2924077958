//! Application menu synthesis: template assembly, screen/platform pruning, and state sync.

pub mod builder;
pub mod prune;
pub mod sync;

pub use builder::{build_menu, MenuBuildInput, MenuBuildState, ROOT_MENU_ID};
pub use prune::filter_menu;
pub use sync::{sync_menu_states, NOTES_SORT_REVERSE_ID};
