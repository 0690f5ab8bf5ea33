use super::SectionId;
use crate::config::NavigationConfig;

/// A key press as seen by the document-level keydown handler
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyPress<'a> {
    pub key: &'a str,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    /// Focus is inside an input or textarea
    pub in_text_field: bool,
}

impl<'a> KeyPress<'a> {
    pub fn key(key: &'a str) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shortcut {
    CloseMenu,
    ShowSection(SectionId),
}

/// Maps digits to sections in configured order, plus Escape and Ctrl/Cmd+K
#[derive(Debug, Clone)]
pub struct ShortcutMap {
    sections: Vec<SectionId>,
    contact: SectionId,
}

impl ShortcutMap {
    pub fn new(sections: Vec<SectionId>, contact: SectionId) -> Self {
        Self { sections, contact }
    }

    pub fn resolve(&self, press: &KeyPress<'_>) -> Option<Shortcut> {
        if press.in_text_field {
            return None;
        }

        if press.key == "Escape" {
            return Some(Shortcut::CloseMenu);
        }

        if (press.ctrl || press.meta) && press.key.eq_ignore_ascii_case("k") {
            return Some(Shortcut::ShowSection(self.contact.clone()));
        }

        if press.ctrl || press.alt {
            return None;
        }

        let mut chars = press.key.chars();
        let digit = chars.next()?.to_digit(10)?;
        if chars.next().is_some() || digit == 0 {
            return None;
        }
        self.sections
            .get(digit as usize - 1)
            .cloned()
            .map(Shortcut::ShowSection)
    }
}

impl From<&NavigationConfig> for ShortcutMap {
    fn from(config: &NavigationConfig) -> Self {
        Self::new(
            config.sections.iter().map(SectionId::from).collect(),
            SectionId::from(config.contact_section.as_str()),
        )
    }
}
