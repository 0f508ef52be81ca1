//! Catalog of recognized block tags and their families.

use serde::{Deserialize, Serialize};

pub const HEADING_TAGS: [&str; 3] = ["h1", "h2", "h3"];

pub const BUTTON_TAGS: [&str; 3] = ["button", "button1", "button2"];

pub const TYPOGRAPHY_TAGS: [&str; 14] = [
    "b1b", "b1m", "b2b", "b2m", "b3b", "b3m", "b4b", "b4m", "b5b", "b5m", "c1b", "c1m", "c2b",
    "c2m",
];

/// Every recognized block tag, in catalog order.
pub const BLOCK_TAGS: [&str; 21] = [
    "h1", "h2", "h3", "div", "button", "button1", "button2", "b1b", "b1m", "b2b", "b2m", "b3b",
    "b3m", "b4b", "b4m", "b5b", "b5m", "c1b", "c1m", "c2b", "c2m",
];

/// Family of a recognized block tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading,
    Container,
    Button,
    Typography,
}

impl BlockKind {
    /// Classify a tag name; `None` for anything outside the catalog.
    #[must_use]
    pub fn of(tag_name: &str) -> Option<Self> {
        let name = tag_name.to_ascii_lowercase();
        if is_heading_tag(&name) {
            Some(Self::Heading)
        } else if is_div_tag(&name) {
            Some(Self::Container)
        } else if is_button_tag(&name) {
            Some(Self::Button)
        } else if is_typography_tag(&name) {
            Some(Self::Typography)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Container => "container",
            Self::Button => "button",
            Self::Typography => "typography",
        }
    }
}

fn in_family(family: &[&str], tag_name: &str) -> bool {
    family
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(tag_name))
}

#[must_use]
pub fn is_heading_tag(tag_name: &str) -> bool {
    in_family(&HEADING_TAGS, tag_name)
}

#[must_use]
pub fn is_button_tag(tag_name: &str) -> bool {
    in_family(&BUTTON_TAGS, tag_name)
}

#[must_use]
pub fn is_typography_tag(tag_name: &str) -> bool {
    in_family(&TYPOGRAPHY_TAGS, tag_name)
}

#[must_use]
pub fn is_div_tag(tag_name: &str) -> bool {
    tag_name.eq_ignore_ascii_case("div")
}

#[cfg(test)]
mod tests {
    use super::{BLOCK_TAGS, BlockKind, is_button_tag, is_div_tag, is_heading_tag, is_typography_tag};

    #[test]
    fn every_catalog_tag_has_exactly_one_family() {
        for tag in BLOCK_TAGS {
            let memberships = [
                is_heading_tag(tag),
                is_button_tag(tag),
                is_typography_tag(tag),
                is_div_tag(tag),
            ]
            .into_iter()
            .filter(|member| *member)
            .count();
            assert_eq!(memberships, 1, "{tag} should belong to one family");
            assert!(BlockKind::of(tag).is_some());
        }
    }

    #[test]
    fn classification_ignores_case() {
        assert_eq!(BlockKind::of("BUTTON1"), Some(BlockKind::Button));
        assert_eq!(BlockKind::of("H2"), Some(BlockKind::Heading));
        assert_eq!(BlockKind::of("Div"), Some(BlockKind::Container));
        assert_eq!(BlockKind::of("c2m"), Some(BlockKind::Typography));
    }

    #[test]
    fn unknown_tags_are_rejected() {
        for tag in ["span", "h4", "button3", "b6b", "a", ""] {
            assert_eq!(BlockKind::of(tag), None, "{tag}");
        }
    }
}
