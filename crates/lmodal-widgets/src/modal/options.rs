#![forbid(unsafe_code)]

//! Overlay configuration.
//!
//! [`ModalOptions`] carries every recognized option with its default.
//! [`OptionsOverride`] mirrors it with every field optional and is layered on
//! top field by field; nested groups (keys, iframe, fetch, gesture) merge
//! field by field as well, while list-valued fields are replaced wholesale.
//!
//! Overrides come from code, from trigger attributes via the declared
//! `lm-*` schema ([`OptionsOverride::from_attributes`]), or, with the
//! `config-files` feature, from TOML/JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use lmodal_core::KeyCode;
use lmodal_runtime::{Duration, Handler};

use super::error::{AttributeError, ParseError};
#[cfg(feature = "config-files")]
use super::error::ConfigError;
use super::events::{ModalEvent, ModalEventKind};
use super::gesture::{GestureConfig, VelocityRule};

/// Colour scheme class applied to the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "config-files",
    derive(serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Theme {
    Dark,
    Light,
    #[default]
    Auto,
}

impl Theme {
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Dark => "lm-theme-dark",
            Self::Light => "lm-theme-light",
            Self::Auto => "lm-theme-auto",
        }
    }
}

impl FromStr for Theme {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            "auto" => Ok(Self::Auto),
            _ => Err(ParseError::new(s, "dark, light or auto")),
        }
    }
}

/// A width or height: whole pixels or any CSS length.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "config-files",
    derive(serde::Deserialize),
    serde(untagged)
)]
pub enum Dimension {
    Px(u32),
    Css(String),
}

impl Dimension {
    /// Value for an inline style.
    pub fn css_value(&self) -> String {
        match self {
            Self::Px(px) => format!("{px}px"),
            Self::Css(value) => value.clone(),
        }
    }
}

impl From<u32> for Dimension {
    fn from(px: u32) -> Self {
        Self::Px(px)
    }
}

impl From<&str> for Dimension {
    fn from(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| Self::Css(value.to_owned()))
    }
}

impl FromStr for Dimension {
    type Err = ParseError;

    /// `"640"` and `"640px"` are pixels; any other non-blank text is CSS.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::new(s, "a CSS length"));
        }
        let digits = trimmed.strip_suffix("px").unwrap_or(trimmed);
        match digits.parse::<u32>() {
            Ok(px) => Ok(Self::Px(px)),
            Err(_) => Ok(Self::Css(trimmed.to_owned())),
        }
    }
}

/// Credentials policy for fetched documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "config-files",
    derive(serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Credentials {
    Omit,
    #[default]
    SameOrigin,
    Include,
}

impl Credentials {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Omit => "omit",
            Self::SameOrigin => "same-origin",
            Self::Include => "include",
        }
    }
}

/// Attributes for embedded frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IframeOptions {
    pub scrolling: String,
    pub sandbox: String,
}

impl Default for IframeOptions {
    fn default() -> Self {
        Self {
            scrolling: "auto".to_owned(),
            sandbox: "allow-scripts allow-same-origin allow-presentation allow-popups".to_owned(),
        }
    }
}

/// Request settings for fetched documents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchOptions {
    pub credentials: Credentials,
    pub headers: Vec<(String, String)>,
}

/// Handlers registered on every instance created with these options.
///
/// They are attached before the instance's `Init` event fires.
#[derive(Clone, Default)]
pub struct Callbacks {
    entries: Vec<(ModalEventKind, Handler<ModalEvent>)>,
}

impl Callbacks {
    #[must_use]
    pub fn on(mut self, kind: ModalEventKind, handler: impl Fn(&ModalEvent) + 'static) -> Self {
        self.entries.push((kind, std::rc::Rc::new(handler)));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &(ModalEventKind, Handler<ModalEvent>)> {
        self.entries.iter()
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("len", &self.entries.len())
            .finish()
    }
}

/// Fully resolved options for one overlay.
#[derive(Debug, Clone)]
pub struct ModalOptions {
    pub theme: Theme,
    /// Extra class on the container for every item.
    pub main_class: Option<String>,
    pub close_button: bool,
    pub close_on_backdrop: bool,
    /// Gates `Escape` even when it is listed in `close_keys`.
    pub close_on_esc: bool,
    pub close_keys: Vec<KeyCode>,
    /// Close every live overlay before opening.
    pub close_existing: bool,
    pub open_speed: Duration,
    pub close_speed: Duration,
    pub drag_to_close: bool,
    /// Accept touch pointers for drag-to-close.
    pub touch: bool,
    /// Close keys and arrow navigation.
    pub keyboard: bool,
    pub trap_focus: bool,
    pub auto_focus: bool,
    pub auto_focus_delay: Duration,
    pub restore_focus: bool,
    pub hide_scrollbar: bool,
    /// Build the container as a `dialog` element.
    pub native_dialog: bool,
    pub compact: bool,
    pub autoplay: bool,
    pub idle_timeout: Option<Duration>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    /// Initial gallery index, clamped into range.
    pub start_index: usize,
    pub iframe: IframeOptions,
    pub fetch: FetchOptions,
    pub gesture: GestureConfig,
    pub callbacks: Callbacks,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            main_class: None,
            close_button: true,
            close_on_backdrop: true,
            close_on_esc: true,
            close_keys: vec![KeyCode::Escape],
            close_existing: false,
            open_speed: Duration::from_millis(366),
            close_speed: Duration::from_millis(366),
            drag_to_close: true,
            touch: true,
            keyboard: true,
            trap_focus: true,
            auto_focus: true,
            auto_focus_delay: Duration::from_millis(150),
            restore_focus: true,
            hide_scrollbar: true,
            native_dialog: true,
            compact: false,
            autoplay: true,
            idle_timeout: None,
            width: None,
            height: None,
            start_index: 0,
            iframe: IframeOptions::default(),
            fetch: FetchOptions::default(),
            gesture: GestureConfig::default(),
            callbacks: Callbacks::default(),
        }
    }
}

impl ModalOptions {
    /// Defaults overlaid with `over`.
    #[must_use]
    pub fn layered(mut self, over: &OptionsOverride) -> Self {
        self.apply(over);
        self
    }

    /// Overlay every field `over` sets.
    pub fn apply(&mut self, over: &OptionsOverride) {
        set(&mut self.theme, over.theme);
        if let Some(class) = &over.main_class {
            self.main_class = Some(class.clone());
        }
        set(&mut self.close_button, over.close_button);
        set(&mut self.close_on_backdrop, over.close_on_backdrop);
        set(&mut self.close_on_esc, over.close_on_esc);
        set(&mut self.close_existing, over.close_existing);
        set_ms(&mut self.open_speed, over.open_speed_ms);
        set_ms(&mut self.close_speed, over.close_speed_ms);
        set(&mut self.drag_to_close, over.drag_to_close);
        set(&mut self.touch, over.touch);
        set(&mut self.keyboard, over.keyboard);
        set(&mut self.trap_focus, over.trap_focus);
        set(&mut self.auto_focus, over.auto_focus);
        set_ms(&mut self.auto_focus_delay, over.auto_focus_delay_ms);
        set(&mut self.restore_focus, over.restore_focus);
        set(&mut self.hide_scrollbar, over.hide_scrollbar);
        set(&mut self.native_dialog, over.native_dialog);
        set(&mut self.compact, over.compact);
        set(&mut self.autoplay, over.autoplay);
        if let Some(ms) = over.idle_timeout_ms {
            self.idle_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(width) = &over.width {
            self.width = Some(width.clone());
        }
        if let Some(height) = &over.height {
            self.height = Some(height.clone());
        }
        set(&mut self.start_index, over.start_index);

        if let Some(keys) = &over.keys.close {
            self.close_keys = keys.clone();
        }

        if let Some(scrolling) = &over.iframe.scrolling {
            self.iframe.scrolling = scrolling.clone();
        }
        if let Some(sandbox) = &over.iframe.sandbox {
            self.iframe.sandbox = sandbox.clone();
        }

        set(&mut self.fetch.credentials, over.fetch.credentials);
        if let Some(headers) = &over.fetch.headers {
            self.fetch.headers = headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
        }

        let gesture = &over.gesture;
        set(&mut self.gesture.dead_zone, gesture.dead_zone);
        set(&mut self.gesture.progress_distance, gesture.progress_distance);
        set(&mut self.gesture.dismiss_distance, gesture.dismiss_distance);
        set_ms(&mut self.gesture.return_duration, gesture.return_ms);
        match gesture.velocity {
            Some(false) => self.gesture.velocity = None,
            Some(true) if self.gesture.velocity.is_none() => {
                self.gesture.velocity = Some(VelocityRule::default());
            }
            _ => {}
        }
        if let Some(rule) = self.gesture.velocity.as_mut() {
            set(&mut rule.min_velocity, gesture.min_velocity);
            set(&mut rule.min_distance, gesture.min_distance);
        }
    }

    #[must_use]
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn main_class(mut self, class: impl Into<String>) -> Self {
        self.main_class = Some(class.into());
        self
    }

    #[must_use]
    pub fn close_button(mut self, show: bool) -> Self {
        self.close_button = show;
        self
    }

    #[must_use]
    pub fn close_on_backdrop(mut self, close: bool) -> Self {
        self.close_on_backdrop = close;
        self
    }

    #[must_use]
    pub fn close_on_esc(mut self, close: bool) -> Self {
        self.close_on_esc = close;
        self
    }

    #[must_use]
    pub fn close_keys(mut self, keys: impl Into<Vec<KeyCode>>) -> Self {
        self.close_keys = keys.into();
        self
    }

    #[must_use]
    pub fn close_existing(mut self, close: bool) -> Self {
        self.close_existing = close;
        self
    }

    #[must_use]
    pub fn open_speed(mut self, speed: Duration) -> Self {
        self.open_speed = speed;
        self
    }

    #[must_use]
    pub fn close_speed(mut self, speed: Duration) -> Self {
        self.close_speed = speed;
        self
    }

    #[must_use]
    pub fn drag_to_close(mut self, enabled: bool) -> Self {
        self.drag_to_close = enabled;
        self
    }

    #[must_use]
    pub fn touch(mut self, enabled: bool) -> Self {
        self.touch = enabled;
        self
    }

    #[must_use]
    pub fn keyboard(mut self, enabled: bool) -> Self {
        self.keyboard = enabled;
        self
    }

    #[must_use]
    pub fn trap_focus(mut self, enabled: bool) -> Self {
        self.trap_focus = enabled;
        self
    }

    #[must_use]
    pub fn auto_focus(mut self, enabled: bool) -> Self {
        self.auto_focus = enabled;
        self
    }

    #[must_use]
    pub fn auto_focus_delay(mut self, delay: Duration) -> Self {
        self.auto_focus_delay = delay;
        self
    }

    #[must_use]
    pub fn restore_focus(mut self, enabled: bool) -> Self {
        self.restore_focus = enabled;
        self
    }

    #[must_use]
    pub fn hide_scrollbar(mut self, enabled: bool) -> Self {
        self.hide_scrollbar = enabled;
        self
    }

    #[must_use]
    pub fn native_dialog(mut self, enabled: bool) -> Self {
        self.native_dialog = enabled;
        self
    }

    #[must_use]
    pub fn compact(mut self, enabled: bool) -> Self {
        self.compact = enabled;
        self
    }

    #[must_use]
    pub fn autoplay(mut self, enabled: bool) -> Self {
        self.autoplay = enabled;
        self
    }

    #[must_use]
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    #[must_use]
    pub fn width(mut self, width: impl Into<Dimension>) -> Self {
        self.width = Some(width.into());
        self
    }

    #[must_use]
    pub fn height(mut self, height: impl Into<Dimension>) -> Self {
        self.height = Some(height.into());
        self
    }

    #[must_use]
    pub fn start_index(mut self, index: usize) -> Self {
        self.start_index = index;
        self
    }

    #[must_use]
    pub fn iframe(mut self, iframe: IframeOptions) -> Self {
        self.iframe = iframe;
        self
    }

    #[must_use]
    pub fn fetch(mut self, fetch: FetchOptions) -> Self {
        self.fetch = fetch;
        self
    }

    #[must_use]
    pub fn gesture(mut self, gesture: GestureConfig) -> Self {
        self.gesture = gesture;
        self
    }

    /// Register a handler attached to the instance before `Init`.
    #[must_use]
    pub fn on(mut self, kind: ModalEventKind, handler: impl Fn(&ModalEvent) + 'static) -> Self {
        self.callbacks = self.callbacks.on(kind, handler);
        self
    }
}

fn set<T: Copy>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn set_ms(slot: &mut Duration, value: Option<u64>) {
    if let Some(ms) = value {
        *slot = Duration::from_millis(ms);
    }
}

/// Partial override of the key bindings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "config-files",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct KeysOverride {
    #[cfg_attr(feature = "config-files", serde(deserialize_with = "serde_keys::deserialize"))]
    pub close: Option<Vec<KeyCode>>,
}

/// Partial override of [`IframeOptions`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "config-files",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct IframeOverride {
    pub scrolling: Option<String>,
    pub sandbox: Option<String>,
}

/// Partial override of [`FetchOptions`]. Headers replace the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "config-files",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct FetchOverride {
    pub credentials: Option<Credentials>,
    pub headers: Option<BTreeMap<String, String>>,
}

/// Partial override of [`GestureConfig`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "config-files",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields, rename_all = "kebab-case")
)]
pub struct GestureOverride {
    pub dead_zone: Option<f32>,
    pub progress_distance: Option<f32>,
    pub dismiss_distance: Option<f32>,
    /// Enable or disable the flick rule.
    pub velocity: Option<bool>,
    pub min_velocity: Option<f32>,
    pub min_distance: Option<f32>,
    pub return_ms: Option<u64>,
}

/// Every [`ModalOptions`] field, optional.
///
/// Durations are milliseconds. `idle_timeout_ms = 0` disables the idle
/// timer.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "config-files",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields, rename_all = "kebab-case")
)]
pub struct OptionsOverride {
    pub theme: Option<Theme>,
    pub main_class: Option<String>,
    pub close_button: Option<bool>,
    pub close_on_backdrop: Option<bool>,
    pub close_on_esc: Option<bool>,
    pub close_existing: Option<bool>,
    pub open_speed_ms: Option<u64>,
    pub close_speed_ms: Option<u64>,
    pub drag_to_close: Option<bool>,
    pub touch: Option<bool>,
    pub keyboard: Option<bool>,
    pub trap_focus: Option<bool>,
    pub auto_focus: Option<bool>,
    pub auto_focus_delay_ms: Option<u64>,
    pub restore_focus: Option<bool>,
    pub hide_scrollbar: Option<bool>,
    pub native_dialog: Option<bool>,
    pub compact: Option<bool>,
    pub autoplay: Option<bool>,
    pub idle_timeout_ms: Option<u64>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub start_index: Option<usize>,
    pub keys: KeysOverride,
    pub iframe: IframeOverride,
    pub fetch: FetchOverride,
    pub gesture: GestureOverride,
}

/// Option attributes recognized on trigger elements.
pub const ATTRIBUTE_KEYS: &[&str] = &[
    "lm-theme",
    "lm-close-button",
    "lm-close-on-backdrop",
    "lm-close-on-esc",
    "lm-close-existing",
    "lm-open-speed",
    "lm-close-speed",
    "lm-drag-to-close",
    "lm-touch",
    "lm-keyboard",
    "lm-auto-focus",
    "lm-restore-focus",
    "lm-hide-scrollbar",
    "lm-idle-timeout",
    "lm-width",
    "lm-height",
    "lm-start-index",
    "lm-main-class",
    "lm-compact",
    "lm-autoplay",
];

const ATTRIBUTE_PREFIX: &str = "lm-";

impl OptionsOverride {
    /// Decode option attributes.
    ///
    /// Attributes outside the `lm-` namespace are not options and are
    /// skipped. Inside it, every name must be in [`ATTRIBUTE_KEYS`] and
    /// every value must parse; the first violation is returned.
    pub fn from_attributes<'a, I>(attributes: I) -> Result<Self, AttributeError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut over = Self::default();
        for (key, value) in attributes {
            if key.starts_with(ATTRIBUTE_PREFIX) {
                over.set_attribute(key, value)?;
            }
        }
        Ok(over)
    }

    /// Like [`from_attributes`](Self::from_attributes), but unknown names
    /// and unparsable values are skipped and logged.
    pub fn from_attributes_lenient<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut over = Self::default();
        for (key, value) in attributes {
            if !key.starts_with(ATTRIBUTE_PREFIX) {
                continue;
            }
            if let Err(err) = over.set_attribute(key, value) {
                tracing::debug!(%err, "options.attribute_skipped");
            }
        }
        over
    }

    fn set_attribute(&mut self, key: &str, value: &str) -> Result<(), AttributeError> {
        let invalid = |expected: &'static str| AttributeError::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
            expected,
        };
        let flag = || parse_flag(value).ok_or_else(|| invalid("a boolean"));
        let millis = || {
            value
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid("milliseconds"))
        };
        match key {
            "lm-theme" => {
                self.theme = Some(value.parse::<Theme>().map_err(|e| invalid(e.expected()))?);
            }
            "lm-close-button" => self.close_button = Some(flag()?),
            "lm-close-on-backdrop" => self.close_on_backdrop = Some(flag()?),
            "lm-close-on-esc" => self.close_on_esc = Some(flag()?),
            "lm-close-existing" => self.close_existing = Some(flag()?),
            "lm-open-speed" => self.open_speed_ms = Some(millis()?),
            "lm-close-speed" => self.close_speed_ms = Some(millis()?),
            "lm-drag-to-close" => self.drag_to_close = Some(flag()?),
            "lm-touch" => self.touch = Some(flag()?),
            "lm-keyboard" => self.keyboard = Some(flag()?),
            "lm-auto-focus" => self.auto_focus = Some(flag()?),
            "lm-restore-focus" => self.restore_focus = Some(flag()?),
            "lm-hide-scrollbar" => self.hide_scrollbar = Some(flag()?),
            "lm-idle-timeout" => {
                let trimmed = value.trim();
                self.idle_timeout_ms = Some(if matches!(trimmed, "none" | "off" | "null") {
                    0
                } else {
                    millis()?
                });
            }
            "lm-width" => {
                self.width = Some(value.parse::<Dimension>().map_err(|e| invalid(e.expected()))?);
            }
            "lm-height" => {
                self.height = Some(value.parse::<Dimension>().map_err(|e| invalid(e.expected()))?);
            }
            "lm-start-index" => {
                self.start_index = Some(
                    value
                        .trim()
                        .parse()
                        .map_err(|_| invalid("a non-negative index"))?,
                );
            }
            "lm-main-class" => {
                let class = value.trim();
                if class.is_empty() {
                    return Err(invalid("a class name"));
                }
                self.main_class = Some(class.to_owned());
            }
            "lm-compact" => self.compact = Some(flag()?),
            "lm-autoplay" => self.autoplay = Some(flag()?),
            _ => return Err(AttributeError::UnknownKey(key.to_owned())),
        }
        Ok(())
    }

    #[cfg(feature = "config-files")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Toml(e.to_string()))
    }

    #[cfg(feature = "config-files")]
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(source).map_err(|e| ConfigError::Json(e.to_string()))
    }
}

/// HTML-style boolean: present-but-empty means `true`.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a key name (`"Escape"`, `"ArrowLeft"`, `"q"`, `"F5"`).
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }
    let lower = trimmed.to_ascii_lowercase();
    let code = match lower.as_str() {
        "escape" | "esc" => KeyCode::Escape,
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "left" | "arrowleft" => KeyCode::Left,
        "right" | "arrowright" => KeyCode::Right,
        "up" | "arrowup" => KeyCode::Up,
        "down" | "arrowdown" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "space" => KeyCode::Char(' '),
        other => {
            let n = other.strip_prefix('f')?.parse::<u8>().ok()?;
            if !(1..=24).contains(&n) {
                return None;
            }
            KeyCode::F(n)
        }
    };
    Some(code)
}

#[cfg(feature = "config-files")]
mod serde_keys {
    use lmodal_core::KeyCode;
    use serde::Deserialize;

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<KeyCode>>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let names = Vec::<String>::deserialize(deserializer)?;
        names
            .iter()
            .map(|name| {
                super::parse_key(name)
                    .ok_or_else(|| serde::de::Error::custom(format!("unknown key '{name}'")))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn defaults_match_documented_table() {
        let o = ModalOptions::default();
        assert_eq!(o.theme, Theme::Auto);
        assert!(o.close_button && o.close_on_backdrop && o.close_on_esc);
        assert_eq!(o.close_keys, vec![KeyCode::Escape]);
        assert!(!o.close_existing);
        assert_eq!(o.open_speed, Duration::from_millis(366));
        assert_eq!(o.close_speed, Duration::from_millis(366));
        assert!(o.drag_to_close && o.touch && o.keyboard);
        assert!(o.trap_focus && o.auto_focus && o.restore_focus);
        assert_eq!(o.auto_focus_delay, Duration::from_millis(150));
        assert!(o.hide_scrollbar && o.native_dialog && o.autoplay);
        assert!(!o.compact);
        assert_eq!(o.idle_timeout, None);
        assert_eq!(o.width, None);
        assert_eq!(o.start_index, 0);
        assert_eq!(o.iframe.scrolling, "auto");
        assert_eq!(o.fetch.credentials, Credentials::SameOrigin);
        assert_eq!(o.gesture.dismiss_distance, 100.0);
        assert!(o.gesture.velocity.is_none());
        assert!(o.callbacks.is_empty());
    }

    #[test]
    fn override_replaces_only_set_fields() {
        let over = OptionsOverride {
            close_on_esc: Some(false),
            close_speed_ms: Some(100),
            width: Some(Dimension::Px(640)),
            ..OptionsOverride::default()
        };
        let o = ModalOptions::default().layered(&over);
        assert!(!o.close_on_esc);
        assert_eq!(o.close_speed, Duration::from_millis(100));
        assert_eq!(o.open_speed, Duration::from_millis(366));
        assert_eq!(o.width, Some(Dimension::Px(640)));
        assert!(o.close_button);
    }

    #[test]
    fn nested_groups_merge_field_by_field() {
        let mut over = OptionsOverride::default();
        over.iframe.sandbox = Some("allow-scripts".into());
        over.gesture.dismiss_distance = Some(60.0);
        let o = ModalOptions::default().layered(&over);
        assert_eq!(o.iframe.sandbox, "allow-scripts");
        assert_eq!(o.iframe.scrolling, "auto");
        assert_eq!(o.gesture.dismiss_distance, 60.0);
        assert_eq!(o.gesture.dead_zone, 10.0);
    }

    #[test]
    fn lists_are_replaced_wholesale() {
        let mut over = OptionsOverride::default();
        over.keys.close = Some(vec![KeyCode::Char('q')]);
        let mut headers = BTreeMap::new();
        headers.insert("X-Requested-With".to_owned(), "lightmodal".to_owned());
        over.fetch.headers = Some(headers);
        let base = ModalOptions::default().close_keys(vec![KeyCode::Escape, KeyCode::Enter]);
        let o = base.layered(&over);
        assert_eq!(o.close_keys, vec![KeyCode::Char('q')]);
        assert_eq!(
            o.fetch.headers,
            vec![("X-Requested-With".to_owned(), "lightmodal".to_owned())]
        );
    }

    #[test]
    fn velocity_rule_toggles_and_tunes() {
        let mut over = OptionsOverride::default();
        over.gesture.velocity = Some(true);
        over.gesture.min_velocity = Some(0.5);
        let o = ModalOptions::default().layered(&over);
        let rule = o.gesture.velocity.expect("enabled");
        assert_eq!(rule.min_velocity, 0.5);
        assert_eq!(rule.min_distance, 20.0);

        let mut off = OptionsOverride::default();
        off.gesture.velocity = Some(false);
        assert!(o.layered(&off).gesture.velocity.is_none());
    }

    #[test]
    fn idle_timeout_zero_disables() {
        let base = ModalOptions::default().idle_timeout(Some(Duration::from_secs(3)));
        let over = OptionsOverride {
            idle_timeout_ms: Some(0),
            ..OptionsOverride::default()
        };
        assert_eq!(base.layered(&over).idle_timeout, None);
    }

    #[test]
    fn attributes_decode_with_typed_parsers() {
        let over = OptionsOverride::from_attributes([
            ("href", "#panel"),
            ("lm-theme", "Dark"),
            ("lm-close-on-backdrop", "false"),
            ("lm-compact", ""),
            ("lm-close-speed", "250"),
            ("lm-width", "80vw"),
            ("lm-height", "480px"),
            ("lm-idle-timeout", "none"),
            ("lm-start-index", "2"),
        ])
        .expect("valid");
        assert_eq!(over.theme, Some(Theme::Dark));
        assert_eq!(over.close_on_backdrop, Some(false));
        assert_eq!(over.compact, Some(true));
        assert_eq!(over.close_speed_ms, Some(250));
        assert_eq!(over.width, Some(Dimension::Css("80vw".into())));
        assert_eq!(over.height, Some(Dimension::Px(480)));
        assert_eq!(over.idle_timeout_ms, Some(0));
        assert_eq!(over.start_index, Some(2));
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let err = OptionsOverride::from_attributes([("lm-sparkles", "true")]).unwrap_err();
        assert_eq!(err, AttributeError::UnknownKey("lm-sparkles".into()));
    }

    #[test]
    fn invalid_value_is_rejected() {
        let err = OptionsOverride::from_attributes([("lm-open-speed", "fast")]).unwrap_err();
        assert!(matches!(
            err,
            AttributeError::InvalidValue { ref key, expected: "milliseconds", .. } if key == "lm-open-speed"
        ));
        assert!(OptionsOverride::from_attributes([("lm-touch", "maybe")]).is_err());
    }

    #[test]
    fn lenient_decoding_skips_bad_entries() {
        let over = OptionsOverride::from_attributes_lenient([
            ("lm-sparkles", "true"),
            ("lm-open-speed", "fast"),
            ("lm-keyboard", "no"),
        ]);
        assert_eq!(over.keyboard, Some(false));
        assert_eq!(over.open_speed_ms, None);
    }

    #[test]
    fn every_schema_key_is_accepted() {
        for key in ATTRIBUTE_KEYS {
            let value = match *key {
                "lm-theme" => "light",
                "lm-width" | "lm-height" => "100",
                "lm-main-class" => "gallery",
                k if k.ends_with("speed") || k.ends_with("timeout") || k.ends_with("index") => "5",
                _ => "true",
            };
            assert!(
                OptionsOverride::from_attributes([(*key, value)]).is_ok(),
                "{key} rejected"
            );
        }
    }

    #[test]
    fn dimension_parsing() {
        assert_eq!("640".parse::<Dimension>(), Ok(Dimension::Px(640)));
        assert_eq!(" 12px ".parse::<Dimension>(), Ok(Dimension::Px(12)));
        assert_eq!("50%".parse::<Dimension>(), Ok(Dimension::Css("50%".into())));
        assert_eq!(
            "  ".parse::<Dimension>().map_err(|e| e.expected()),
            Err("a CSS length")
        );
        assert_eq!(
            "dim".parse::<Theme>().map_err(|e| e.to_string()),
            Err("'dim': expected dark, light or auto".to_owned())
        );
        assert_eq!(Dimension::Px(10).css_value(), "10px");
        assert_eq!(Dimension::from("auto").css_value(), "auto");
    }

    #[test]
    fn key_names() {
        assert_eq!(parse_key("Escape"), Some(KeyCode::Escape));
        assert_eq!(parse_key("ArrowRight"), Some(KeyCode::Right));
        assert_eq!(parse_key("q"), Some(KeyCode::Char('q')));
        assert_eq!(parse_key("F5"), Some(KeyCode::F(5)));
        assert_eq!(parse_key("F99"), None);
        assert_eq!(parse_key("Hyper"), None);
    }

    #[test]
    fn callbacks_accumulate_in_order() {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let o = ModalOptions::default()
            .on(ModalEventKind::Open, move |_| h.set(h.get() + 1))
            .on(ModalEventKind::Close, |_| {});
        assert_eq!(o.callbacks.len(), 2);
        let (kind, handler) = o.callbacks.iter().next().expect("first");
        assert_eq!(*kind, ModalEventKind::Open);
        handler(&ModalEvent::Open);
        assert_eq!(hits.get(), 1);
        assert!(format!("{:?}", o.callbacks).contains("len: 2"));
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn toml_and_json_overrides() {
        let over = OptionsOverride::from_toml_str(
            r#"
            theme = "light"
            close-speed-ms = 200
            width = 720
            height = "60vh"

            [keys]
            close = ["Escape", "q"]

            [fetch]
            credentials = "include"

            [gesture]
            dismiss-distance = 80.0
            velocity = true
            "#,
        )
        .expect("toml");
        assert_eq!(over.theme, Some(Theme::Light));
        assert_eq!(over.close_speed_ms, Some(200));
        assert_eq!(over.width, Some(Dimension::Px(720)));
        assert_eq!(over.height, Some(Dimension::Css("60vh".into())));
        assert_eq!(over.keys.close, Some(vec![KeyCode::Escape, KeyCode::Char('q')]));
        assert_eq!(over.fetch.credentials, Some(Credentials::Include));
        assert_eq!(over.gesture.velocity, Some(true));

        let json = OptionsOverride::from_json_str(r#"{"close-on-esc": false, "start-index": 3}"#)
            .expect("json");
        assert_eq!(json.close_on_esc, Some(false));
        assert_eq!(json.start_index, Some(3));

        assert!(matches!(
            OptionsOverride::from_json_str(r#"{"bogus": 1}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            OptionsOverride::from_toml_str("[keys]\nclose = [\"Hyper\"]"),
            Err(ConfigError::Toml(_))
        ));
    }
}
