//! Native enumerations and property names of the indicator object.
//!
//! Discriminants match the native enumerations bit for bit; string forms
//! are the native nicks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;

/// What the indicator represents. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Category {
    ApplicationStatus = 0,
    Communications = 1,
    SystemServices = 2,
    Hardware = 3,
    Other = 4,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::ApplicationStatus,
        Category::Communications,
        Category::SystemServices,
        Category::Hardware,
        Category::Other,
    ];

    pub fn as_raw(self) -> u32 {
        self as u32
    }

    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_raw() == raw)
    }

    pub fn nick(self) -> &'static str {
        match self {
            Category::ApplicationStatus => "ApplicationStatus",
            Category::Communications => "Communications",
            Category::SystemServices => "SystemServices",
            Category::Hardware => "Hardware",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nick())
    }
}

impl FromStr for Category {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.nick() == s)
            .ok_or_else(|| IndicatorError::UnknownNick {
                kind: "category",
                nick: s.to_string(),
            })
    }
}

/// Current visual state of the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u32)]
pub enum Status {
    /// Not shown to the user.
    #[default]
    Passive = 0,
    /// Shown with the regular icon.
    Active = 1,
    /// Shown with the attention icon.
    #[serde(rename = "NeedsAttention", alias = "Attention")]
    Attention = 2,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Passive, Status::Active, Status::Attention];

    pub fn as_raw(self) -> u32 {
        self as u32
    }

    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_raw() == raw)
    }

    pub fn nick(self) -> &'static str {
        match self {
            Status::Passive => "Passive",
            Status::Active => "Active",
            Status::Attention => "NeedsAttention",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nick())
    }
}

impl FromStr for Status {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.nick() == s)
            .ok_or_else(|| IndicatorError::UnknownNick {
                kind: "status",
                nick: s.to_string(),
            })
    }
}

/// Direction of a scroll gesture over the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ScrollDirection {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl ScrollDirection {
    pub const ALL: [ScrollDirection; 4] = [
        ScrollDirection::Up,
        ScrollDirection::Down,
        ScrollDirection::Left,
        ScrollDirection::Right,
    ];

    pub fn as_raw(self) -> u32 {
        self as u32
    }

    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_raw() == raw)
    }
}

/// The two historical library flavors.
///
/// They differ in naming only; construction, properties and signal delivery
/// are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Flavor {
    #[default]
    AppIndicator,
    Ayatana,
}

impl Flavor {
    /// Native type name of the indicator object.
    pub fn type_name(self) -> &'static str {
        match self {
            Flavor::AppIndicator => "AppIndicator",
            Flavor::Ayatana => "AyatanaAppIndicator",
        }
    }

    /// Name under which the label change signal is emitted.
    pub fn label_signal_name(self) -> &'static str {
        match self {
            Flavor::AppIndicator => "new-label",
            Flavor::Ayatana => "x-ayatana-new-label",
        }
    }
}

/// Observable properties of the indicator, as reported by `notify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Id,
    Category,
    Status,
    IconName,
    AttentionIconName,
    IconThemePath,
    Label,
    LabelGuide,
    OrderingIndex,
    Title,
    Menu,
    SecondaryActivateTarget,
}

impl Property {
    pub const ALL: [Property; 12] = [
        Property::Id,
        Property::Category,
        Property::Status,
        Property::IconName,
        Property::AttentionIconName,
        Property::IconThemePath,
        Property::Label,
        Property::LabelGuide,
        Property::OrderingIndex,
        Property::Title,
        Property::Menu,
        Property::SecondaryActivateTarget,
    ];

    /// Looks up a property by its native name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Native property name.
    pub fn name(self) -> &'static str {
        match self {
            Property::Id => "id",
            Property::Category => "category",
            Property::Status => "status",
            Property::IconName => "icon-name",
            Property::AttentionIconName => "attention-icon-name",
            Property::IconThemePath => "icon-theme-path",
            Property::Label => "label",
            Property::LabelGuide => "label-guide",
            Property::OrderingIndex => "ordering-index",
            Property::Title => "title",
            Property::Menu => "menu",
            Property::SecondaryActivateTarget => "secondary-activate-target",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
