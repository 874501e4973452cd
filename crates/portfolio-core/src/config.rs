#![forbid(unsafe_code)]

//! Page configuration.
//!
//! Every selector, class name, delay and message the components use lives
//! here. [`PageConfig::default`] reproduces the stock page; a host may
//! override any subset by passing JSON to [`PageConfig::from_json`]. Durations
//! are written in milliseconds in JSON.

use core::fmt;
use core::str::FromStr;
use core::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Configuration error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    Json(String),
    /// A root margin string was not 1-4 pixel lengths.
    RootMargin(String),
    /// An observer threshold fell outside `[0, 1]`.
    Threshold(f64),
    /// The easter egg key sequence is empty.
    EmptyKeySequence,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "invalid config json: {msg}"),
            Self::RootMargin(raw) => write!(f, "invalid root margin: {raw:?}"),
            Self::Threshold(t) => write!(f, "observer threshold {t} outside [0, 1]"),
            Self::EmptyKeySequence => f.write_str("easter egg key sequence is empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Observer options
// ---------------------------------------------------------------------------

/// CSS margin shorthand applied to the observer root, in pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl RootMargin {
    /// Same inset on top and bottom, none on the sides.
    #[must_use]
    pub const fn vertical(top: i32, bottom: i32) -> Self {
        Self {
            top,
            right: 0,
            bottom,
            left: 0,
        }
    }
}

fn parse_px(raw: &str, token: &str) -> Result<i32, ConfigError> {
    let number = token.strip_suffix("px").unwrap_or(token);
    // A bare zero is the only unitless length CSS accepts.
    if number.len() == token.len() && number != "0" {
        return Err(ConfigError::RootMargin(raw.to_string()));
    }
    number
        .parse()
        .map_err(|_| ConfigError::RootMargin(raw.to_string()))
}

impl FromStr for RootMargin {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(|token| parse_px(s, token))
            .collect::<Result<Vec<_>, _>>()?;
        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            _ => return Err(ConfigError::RootMargin(s.to_string())),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

impl TryFrom<String> for RootMargin {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RootMargin> for String {
    fn from(value: RootMargin) -> Self {
        value.to_string()
    }
}

/// Options for one intersection observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverOptions {
    /// Fraction of the target that must be visible, `0.0..=1.0`.
    pub threshold: f64,
    pub root_margin: RootMargin,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: RootMargin::default(),
        }
    }
}

impl ObserverOptions {
    #[must_use]
    pub const fn new(threshold: f64, root_margin: RootMargin) -> Self {
        Self {
            threshold,
            root_margin,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if (0.0..=1.0).contains(&self.threshold) {
            Ok(())
        } else {
            Err(ConfigError::Threshold(self.threshold))
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

mod millis {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis().min(u128::from(u64::MAX)) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Selectors for the page anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub preloader: String,
    pub navbar: String,
    pub menu_toggle: String,
    pub nav_menu: String,
    pub nav_link: String,
    pub sections: String,
    pub in_page_anchor: String,
    pub contact_form: String,
    pub animate_on_scroll: String,
    pub lazy_image: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            preloader: "#preloader".into(),
            navbar: ".navbar".into(),
            menu_toggle: "#menuToggle".into(),
            nav_menu: "#navMenu".into(),
            nav_link: ".navbar__link".into(),
            sections: "section[id]".into(),
            in_page_anchor: "a[href^=\"#\"]".into(),
            contact_form: "#contactForm".into(),
            animate_on_scroll: ".project-card, .about__card, .evidence-card".into(),
            lazy_image: "img[data-src]".into(),
        }
    }
}

/// State class vocabulary shared with the stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    pub body_loading: String,
    pub preloader_hidden: String,
    pub link_active: String,
    pub menu_active: String,
    pub toggle_active: String,
    pub navbar_scrolled: String,
    pub image_loaded: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            body_loading: "loading".into(),
            preloader_hidden: "preloader--hidden".into(),
            link_active: "navbar__link--active".into(),
            menu_active: "navbar__menu--active".into(),
            toggle_active: "navbar__toggle--active".into(),
            navbar_scrolled: "navbar--scrolled".into(),
            image_loaded: "loaded".into(),
        }
    }
}

/// Delays and pixel thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    #[serde(with = "millis", rename = "preloader_grace_ms")]
    pub preloader_grace: Duration,
    #[serde(with = "millis", rename = "preloader_removal_ms")]
    pub preloader_removal: Duration,
    #[serde(with = "millis", rename = "reveal_stagger_ms")]
    pub reveal_stagger: Duration,
    #[serde(with = "millis", rename = "flourish_ms")]
    pub flourish: Duration,
    /// Scroll offset above which the navbar is styled as scrolled (exclusive).
    pub scrolled_threshold_px: f64,
    /// Fixed header height subtracted from smooth-scroll targets.
    pub header_offset_px: f64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            preloader_grace: Duration::from_millis(600),
            preloader_removal: Duration::from_millis(500),
            reveal_stagger: Duration::from_millis(100),
            flourish: Duration::from_millis(2000),
            scrolled_threshold_px: 100.0,
            header_offset_px: 80.0,
        }
    }
}

/// Observer options per component.
///
/// Deserializes as a patch: a field missing from JSON keeps that component's
/// own default, not the generic [`ObserverOptions::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ObserverConfigPatch")]
pub struct ObserverConfig {
    pub active_section: ObserverOptions,
    pub reveal: ObserverOptions,
    pub lazy_image: ObserverOptions,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            active_section: ObserverOptions::new(0.3, RootMargin::vertical(-100, -100)),
            reveal: ObserverOptions::new(0.1, RootMargin::vertical(0, -50)),
            lazy_image: ObserverOptions::default(),
        }
    }
}

/// Partial [`ObserverOptions`] as written in JSON.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(default)]
struct ObserverPatch {
    threshold: Option<f64>,
    root_margin: Option<RootMargin>,
}

impl ObserverPatch {
    fn apply(self, base: ObserverOptions) -> ObserverOptions {
        ObserverOptions {
            threshold: self.threshold.unwrap_or(base.threshold),
            root_margin: self.root_margin.unwrap_or(base.root_margin),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ObserverConfigPatch {
    active_section: ObserverPatch,
    reveal: ObserverPatch,
    lazy_image: ObserverPatch,
}

impl From<ObserverConfigPatch> for ObserverConfig {
    fn from(patch: ObserverConfigPatch) -> Self {
        let base = Self::default();
        Self {
            active_section: patch.active_section.apply(base.active_section),
            reveal: patch.reveal.apply(base.reveal),
            lazy_image: patch.lazy_image.apply(base.lazy_image),
        }
    }
}

/// Inline styles used by the reveal animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealStyle {
    pub hidden_opacity: String,
    pub hidden_transform: String,
    pub shown_opacity: String,
    pub shown_transform: String,
    pub transition: String,
}

impl Default for RevealStyle {
    fn default() -> Self {
        Self {
            hidden_opacity: "0".into(),
            hidden_transform: "translateY(30px)".into(),
            shown_opacity: "1".into(),
            shown_transform: "translateY(0)".into(),
            transition: "opacity 0.6s ease, transform 0.6s ease".into(),
        }
    }
}

/// Key sequence and flourish of the easter egg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EasterEggConfig {
    pub sequence: Vec<String>,
    /// Value written to `body.style.animation` while the flourish runs.
    pub animation: String,
}

impl Default for EasterEggConfig {
    fn default() -> Self {
        let sequence = [
            "ArrowUp",
            "ArrowUp",
            "ArrowDown",
            "ArrowDown",
            "ArrowLeft",
            "ArrowRight",
            "ArrowLeft",
            "ArrowRight",
            "b",
            "a",
        ];
        Self {
            sequence: sequence.iter().map(|s| (*s).to_string()).collect(),
            animation: "rainbow 2s infinite".into(),
        }
    }
}

/// A console banner line with its CSS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerLine {
    pub text: String,
    pub css: String,
}

impl BannerLine {
    fn new(text: &str, css: &str) -> Self {
        Self {
            text: text.into(),
            css: css.into(),
        }
    }
}

/// User and developer facing texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub contact_ack: String,
    pub easter_egg: String,
    pub banner: Vec<BannerLine>,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            contact_ack: "Thanks for your message! I'll get back to you soon. 📧\n\n\
                Note: this form is not connected yet. Hook it up to an email relay \
                such as Formspree or EmailJS to actually deliver messages."
                .into(),
            easter_egg: "🎉 You found the Easter Egg! 🎉\n\nThanks for exploring my portfolio 🚀"
                .into(),
            banner: vec![
                BannerLine::new(
                    "Hi there! 👋",
                    "font-size: 20px; font-weight: bold; color: #667eea;",
                ),
                BannerLine::new(
                    "Thanks for visiting my portfolio",
                    "font-size: 14px; color: #718096;",
                ),
                BannerLine::new(
                    "Found a bug or have a suggestion? Get in touch! 🚀",
                    "font-size: 12px; color: #764ba2;",
                ),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// PageConfig
// ---------------------------------------------------------------------------

/// Complete page configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub selectors: Selectors,
    pub classes: ClassNames,
    pub timings: Timings,
    pub observers: ObserverConfig,
    pub reveal: RevealStyle,
    pub easter_egg: EasterEggConfig,
    pub messages: Messages,
}

impl PageConfig {
    /// Parse JSON overrides on top of the defaults and validate the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Json(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.observers.active_section.validate()?;
        self.observers.reveal.validate()?;
        self.observers.lazy_image.validate()?;
        if self.easter_egg.sequence.is_empty() {
            return Err(ConfigError::EmptyKeySequence);
        }
        Ok(())
    }
}
