//! Light and dark colour schemes. The chosen theme is persisted; without a stored choice the
//! system preference applies until the user toggles.

use std::{cell::Cell, rc::Rc};

use crate::storage::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Value of the `data-bs-theme` attribute and of the stored preference
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Element the theme is applied to, the document root in the browser
pub trait ThemeTarget {
    fn apply(&self, theme: Theme);
}

/// Dark mode toggle with the choice persisted across pages
pub struct ThemeSwitch {
    storage: Rc<dyn KeyValueStore>,
    key: String,
    target: Rc<dyn ThemeTarget>,
    applied: Cell<Option<Theme>>,
}

impl ThemeSwitch {
    pub fn new(storage: Rc<dyn KeyValueStore>, key: String, target: Rc<dyn ThemeTarget>) -> Self {
        Self {
            storage,
            key,
            target,
            applied: Cell::new(None),
        }
    }

    /// Apply the stored theme, or the system preference when no choice was stored yet
    pub fn init(&self, prefers_dark: bool) -> Theme {
        let theme = self.stored().unwrap_or(if prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        });
        self.target.apply(theme);
        self.applied.set(Some(theme));
        theme
    }

    /// Switch to the other theme and remember it
    pub fn toggle(&self) -> Theme {
        let theme = self.current().toggled();
        self.target.apply(theme);
        self.applied.set(Some(theme));
        if let Err(error) = self.storage.set(&self.key, theme.as_str()) {
            log::warn!("Could not persist theme. {error}");
        }
        theme
    }

    /// Theme currently applied, falling back to the stored one and then to light
    pub fn current(&self) -> Theme {
        self.applied
            .get()
            .or_else(|| self.stored())
            .unwrap_or(Theme::Light)
    }

    fn stored(&self) -> Option<Theme> {
        match self.storage.get(&self.key) {
            Ok(value) => value.as_deref().and_then(Theme::parse),
            Err(error) => {
                log::warn!("Could not read theme. {error}");
                None
            }
        }
    }
}
