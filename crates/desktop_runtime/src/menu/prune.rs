//! Screen/platform filtering, empty-submenu pruning, and separator collapsing.

use notes_command_contract::{MenuNode, Platform, ScreenId};

/// Filters a menu level (recursively) for `screen` and `platform`.
///
/// Nodes whose filters reject the screen or platform are removed, as are hidden separators.
/// Hidden leaves stay in the tree so their accelerators keep working, but they never count as
/// content: a submenu without a visible non-separator child is dropped, and separators are
/// collapsed as if hidden nodes were absent (no leading, trailing, or doubled separators).
pub fn filter_menu(items: Vec<MenuNode>, screen: &ScreenId, platform: Platform) -> Vec<MenuNode> {
    let mut kept = Vec::with_capacity(items.len());
    for mut item in items {
        if !item.matches(screen, platform) {
            continue;
        }
        if item.is_separator() && !item.visible {
            continue;
        }
        if item.is_submenu() {
            item.children = filter_menu(std::mem::take(&mut item.children), screen, platform);
            if !has_visible_content(&item.children) {
                continue;
            }
        }
        kept.push(item);
    }
    collapse_separators(kept)
}

fn has_visible_content(items: &[MenuNode]) -> bool {
    items.iter().any(|item| item.visible && !item.is_separator())
}

fn collapse_separators(items: Vec<MenuNode>) -> Vec<MenuNode> {
    let mut out: Vec<MenuNode> = Vec::with_capacity(items.len());
    // Start as if a separator preceded the list so leading separators are dropped.
    let mut after_separator = true;
    for item in items {
        if item.is_separator() {
            if after_separator {
                continue;
            }
            after_separator = true;
        } else if item.visible {
            after_separator = false;
        }
        out.push(item);
    }
    while let Some(last_visible) = out.iter().rposition(|item| item.visible) {
        if !out[last_visible].is_separator() {
            break;
        }
        out.remove(last_visible);
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn labels(items: &[MenuNode]) -> Vec<String> {
        items
            .iter()
            .map(|item| {
                if item.is_separator() {
                    "-".to_string()
                } else {
                    item.label.clone()
                }
            })
            .collect()
    }

    fn main_screen() -> ScreenId {
        ScreenId::main()
    }

    #[test]
    fn separators_collapse_at_edges_and_in_runs() {
        let items = vec![
            MenuNode::separator(),
            MenuNode::leaf("A"),
            MenuNode::separator(),
            MenuNode::separator(),
            MenuNode::leaf("B"),
            MenuNode::separator(),
        ];
        assert_eq!(
            labels(&filter_menu(items, &main_screen(), Platform::Linux)),
            vec!["A", "-", "B"]
        );
    }

    #[test]
    fn filtered_nodes_do_not_leave_double_separators() {
        let items = vec![
            MenuNode::leaf("A"),
            MenuNode::separator(),
            MenuNode::leaf("Mac only").on_platforms([Platform::Darwin]),
            MenuNode::separator(),
            MenuNode::leaf("Main only").on_screens([ScreenId::MAIN]),
            MenuNode::separator().on_screens([ScreenId::MAIN]),
            MenuNode::leaf("B"),
        ];
        assert_eq!(
            labels(&filter_menu(
                items.clone(),
                &ScreenId::new(ScreenId::CONFIG),
                Platform::Linux
            )),
            vec!["A", "-", "B"]
        );
        assert_eq!(
            labels(&filter_menu(items, &main_screen(), Platform::Darwin)),
            vec!["A", "-", "Mac only", "-", "Main only", "-", "B"]
        );
    }

    #[test]
    fn hidden_leaves_stay_but_do_not_count_as_content() {
        let items = vec![
            MenuNode::submenu(
                "Only hidden",
                vec![MenuNode::leaf("Hidden").visible(false), MenuNode::separator()],
            ),
            MenuNode::leaf("A"),
            MenuNode::separator(),
            MenuNode::leaf("Zoom in alias").visible(false),
            MenuNode::separator(),
            MenuNode::leaf("B"),
            MenuNode::separator(),
            MenuNode::leaf("Trailing hidden").visible(false),
        ];
        let filtered = filter_menu(items, &main_screen(), Platform::Windows);
        assert_eq!(
            labels(&filtered),
            vec!["A", "-", "Zoom in alias", "B", "Trailing hidden"]
        );
    }

    #[test]
    fn submenus_emptied_by_filters_are_pruned() {
        let items = vec![
            MenuNode::submenu(
                "Sort",
                vec![
                    MenuNode::leaf("Title").on_screens([ScreenId::MAIN]),
                    MenuNode::separator(),
                    MenuNode::leaf("Reverse").on_screens([ScreenId::MAIN]),
                ],
            ),
            MenuNode::leaf("Keep"),
        ];
        let filtered = filter_menu(items, &ScreenId::new(ScreenId::CONFIG), Platform::Linux);
        assert_eq!(labels(&filtered), vec!["Keep"]);
    }
}
