//! # Command Menu
//!
//! The slash-command catalog and the resolver that decides, from a block's
//! content, whether the menu is closed, open with a filtered list, or should
//! apply a command straight away.

use crate::models::{BlockId, BlockType};

/// Which group a command is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSection {
    Basic,
    Media,
}

/// One entry of the command menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuCommand {
    /// Stable name, also the slash token for commands that have one.
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub block_type: BlockType,
    /// List level the command creates, for list commands.
    pub level: Option<u8>,
    pub section: MenuSection,
    /// Extra words the filter matches on.
    pub search_terms: &'static [&'static str],
}

impl MenuCommand {
    const fn new(
        name: &'static str,
        label: &'static str,
        description: &'static str,
        block_type: BlockType,
        search_terms: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            label,
            description,
            block_type,
            level: None,
            section: MenuSection::Basic,
            search_terms,
        }
    }

    const fn at_level(mut self, level: u8) -> Self {
        self.level = Some(level);
        self
    }

    const fn media(mut self) -> Self {
        self.section = MenuSection::Media;
        self
    }
}

/// Every command, in menu order: basic blocks first, then media.
pub const CATALOG: [MenuCommand; 11] = [
    MenuCommand::new("text", "Text", "Plain text paragraph", BlockType::Text, &["paragraph", "plain"]),
    MenuCommand::new(
        "code",
        "Code",
        "Code block with syntax highlighting",
        BlockType::Code,
        &["snippet", "pre", "program"],
    ),
    MenuCommand::new("heading", "Heading", "Large section heading", BlockType::Heading, &["title", "header", "h1"]),
    MenuCommand::new("bullet", "Bullet List", "Bulleted list item", BlockType::Bullet, &["unordered", "ul"])
        .at_level(0),
    MenuCommand::new("numbered", "Numbered List", "Numbered list item", BlockType::Numbered, &["ordered", "ol", "number"])
        .at_level(0),
    MenuCommand::new("todo", "To-do List", "Checkable todo item", BlockType::Todo, &["task", "checkbox", "check"])
        .at_level(0),
    MenuCommand::new(
        "sub-bullet",
        "Sub Bullet",
        "Nested bullet point (bullet level 1)",
        BlockType::Bullet,
        &["nested", "indent"],
    )
    .at_level(1),
    MenuCommand::new("quote", "Quote", "Quoted text block", BlockType::Quote, &["blockquote", "cite"]),
    MenuCommand::new(
        "divider",
        "Divider",
        "Horizontal divider line",
        BlockType::Divider,
        &["rule", "hr", "separator", "line"],
    ),
    MenuCommand::new(
        "image",
        "Image with Description",
        "Upload an image and add a description below it",
        BlockType::Image,
        &["picture", "photo", "img"],
    )
    .media(),
    MenuCommand::new(
        "youtube",
        "YouTube with Description",
        "Embed a YouTube video with description text",
        BlockType::Video,
        &["video", "embed"],
    )
    .media(),
];

/// Typed tokens that apply their command without opening the menu.
const EXACT_TOKENS: [&str; 9] = [
    "code", "heading", "bullet", "numbered", "todo", "quote", "divider", "image", "youtube",
];

pub fn command(name: &str) -> Option<&'static MenuCommand> {
    CATALOG.iter().find(|c| c.name == name)
}

/// What the menu should do for a block's current content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuResolution {
    Closed,
    /// The content is exactly a command token.
    Apply(&'static MenuCommand),
    /// Matching commands, best first. Empty means "no results".
    Open(Vec<&'static MenuCommand>),
}

/// Resolves block content into a menu state.
pub fn resolve(content: &str) -> MenuResolution {
    let Some(query) = content.strip_prefix('/') else {
        return MenuResolution::Closed;
    };
    if let Some(token) = EXACT_TOKENS.iter().find(|t| **t == query)
        && let Some(cmd) = command(token)
    {
        return MenuResolution::Apply(cmd);
    }
    MenuResolution::Open(filter(query))
}

/// Case-insensitive filter over name, label and search terms.
///
/// Matches rank as: exact name or label, then prefix, then substring, then
/// search-term matches. Ties keep catalog order. An empty query lists
/// everything.
pub fn filter(query: &str) -> Vec<&'static MenuCommand> {
    let query = query.to_lowercase();
    let mut ranked: Vec<(u8, usize, &'static MenuCommand)> = CATALOG
        .iter()
        .enumerate()
        .filter_map(|(i, cmd)| rank(cmd, &query).map(|r| (r, i, cmd)))
        .collect();
    ranked.sort_by_key(|(r, i, _)| (*r, *i));
    ranked.into_iter().map(|(_, _, cmd)| cmd).collect()
}

fn rank(cmd: &MenuCommand, query: &str) -> Option<u8> {
    let name = cmd.name.to_lowercase();
    let label = cmd.label.to_lowercase();
    let fields = [name.as_str(), label.as_str()];

    if fields.iter().any(|f| *f == query) {
        Some(0)
    } else if fields.iter().any(|f| f.starts_with(query)) {
        Some(1)
    } else if fields.iter().any(|f| f.contains(query)) {
        Some(2)
    } else if cmd.search_terms.iter().any(|t| t.contains(query)) {
        Some(3)
    } else {
        None
    }
}

/// Transient menu state of an editing session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open {
        /// Block the menu was opened from.
        anchor: BlockId,
        query: String,
        selected: usize,
        items: Vec<&'static MenuCommand>,
    },
}

impl MenuState {
    pub fn is_open(&self) -> bool {
        matches!(self, MenuState::Open { .. })
    }

    pub fn anchor(&self) -> Option<BlockId> {
        match self {
            MenuState::Open { anchor, .. } => Some(*anchor),
            MenuState::Closed => None,
        }
    }

    /// Opens or refreshes the menu for `anchor`. The selection resets when
    /// the query changes.
    pub fn refresh(&mut self, anchor: BlockId, query: &str, items: Vec<&'static MenuCommand>) {
        let selected = match self {
            MenuState::Open {
                anchor: a,
                query: q,
                selected,
                ..
            } if *a == anchor && q.as_str() == query => (*selected).min(items.len().saturating_sub(1)),
            _ => 0,
        };
        *self = MenuState::Open {
            anchor,
            query: query.to_string(),
            selected,
            items,
        };
    }

    pub fn close(&mut self) {
        *self = MenuState::Closed;
    }

    /// Moves the highlight down, wrapping to the top.
    pub fn select_next(&mut self) {
        if let MenuState::Open {
            selected, items, ..
        } = self
            && !items.is_empty()
        {
            *selected = (*selected + 1) % items.len();
        }
    }

    /// Moves the highlight up, wrapping to the bottom.
    pub fn select_previous(&mut self) {
        if let MenuState::Open {
            selected, items, ..
        } = self
            && !items.is_empty()
        {
            *selected = selected.checked_sub(1).unwrap_or(items.len() - 1);
        }
    }

    pub fn selected(&self) -> Option<&'static MenuCommand> {
        match self {
            MenuState::Open {
                selected, items, ..
            } => items.get(*selected).copied(),
            MenuState::Closed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn names(items: &[&MenuCommand]) -> Vec<&'static str> {
        items.iter().map(|c| c.name).collect()
    }

    #[rstest]
    #[case("/code", "code")]
    #[case("/divider", "divider")]
    #[case("/youtube", "youtube")]
    #[case("/image", "image")]
    fn test_exact_tokens_apply(#[case] content: &str, #[case] expected: &str) {
        assert_eq!(resolve(content), MenuResolution::Apply(command(expected).unwrap()));
    }

    #[rstest]
    #[case("")]
    #[case("plain text")]
    #[case(" /code")]
    fn test_closed_without_leading_slash(#[case] content: &str) {
        assert_eq!(resolve(content), MenuResolution::Closed);
    }

    #[test]
    fn test_text_token_opens_menu() {
        // `/text` is not an auto-apply token
        let MenuResolution::Open(items) = resolve("/text") else {
            panic!("expected an open menu");
        };
        assert_eq!(items[0].name, "text");
    }

    #[test]
    fn test_empty_query_lists_everything_in_order() {
        let MenuResolution::Open(items) = resolve("/") else {
            panic!("expected an open menu");
        };
        assert_eq!(names(&items), names(&CATALOG.iter().collect::<Vec<_>>()));
    }

    #[test]
    fn test_ranking() {
        // Given a query that is a prefix of one command and inside others
        let items = filter("Bu");

        // Then the prefix match comes first and substring matches follow
        assert_eq!(names(&items), vec!["bullet", "sub-bullet"]);
    }

    #[test]
    fn test_search_terms_rank_last() {
        let items = filter("li");
        // "line" only appears in the divider's search terms
        assert_eq!(names(&items), vec!["bullet", "numbered", "todo", "divider"]);
    }

    #[test]
    fn test_no_results() {
        assert_eq!(resolve("/zzz"), MenuResolution::Open(Vec::new()));
    }

    #[test]
    fn test_selection_wraps_and_resets() {
        let mut menu = MenuState::default();
        menu.refresh(BlockId(1), "", filter(""));

        menu.select_previous();
        assert_eq!(menu.selected().map(|c| c.name), Some("youtube"));
        menu.select_next();
        assert_eq!(menu.selected().map(|c| c.name), Some("text"));
        menu.select_next();

        // same query keeps the highlight
        menu.refresh(BlockId(1), "", filter(""));
        assert_eq!(menu.selected().map(|c| c.name), Some("code"));

        // a new query resets it
        menu.refresh(BlockId(1), "c", filter("c"));
        assert_eq!(menu.selected().map(|c| c.name), Some("code"));
        if let MenuState::Open { selected, .. } = &menu {
            assert_eq!(*selected, 0);
        }
    }
}
