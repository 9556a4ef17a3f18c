//! Light/dark background toggle.

use serde::{Deserialize, Serialize};

/// Looping, muted, autoplaying background video and the toggle icon shown over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backdrop {
    pub video_src: &'static str,
    pub style_class: &'static str,
    pub icon: &'static str,
    pub autoplay: bool,
    pub looped: bool,
    pub muted: bool,
}

const LIGHT: Backdrop = Backdrop {
    video_src: "/videos/clouds.mp4",
    style_class: "background-video",
    icon: "🌙",
    autoplay: true,
    looped: true,
    muted: true,
};

const DARK: Backdrop = Backdrop {
    video_src: "/videos/night-clouds.mp4",
    style_class: "background-video-dark",
    icon: "☀",
    autoplay: true,
    looped: true,
    muted: true,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Theme {
    dark: bool,
}

impl Theme {
    pub fn new(dark: bool) -> Self {
        Self { dark }
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    pub fn toggle(&mut self) {
        self.dark = !self.dark;
    }

    pub fn backdrop(&self) -> &'static Backdrop {
        if self.dark { &DARK } else { &LIGHT }
    }
}
