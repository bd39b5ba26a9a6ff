use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigError, Result};

/// Deepest level index a configuration entry may address.
pub const MAX_DEPTH: usize = 64;

/// Layout algorithm applied to one level's sibling groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutKind {
    SliceAndDice,
    Squarified,
    #[default]
    OrderedSquarified,
    Strip,
    PivotMiddle,
    PivotSize,
    PivotSplitSize,
    PivotSpace,
    Morton,
    Spatial,
    SpatialAv,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 11] = [
        LayoutKind::SliceAndDice,
        LayoutKind::Squarified,
        LayoutKind::OrderedSquarified,
        LayoutKind::Strip,
        LayoutKind::PivotMiddle,
        LayoutKind::PivotSize,
        LayoutKind::PivotSplitSize,
        LayoutKind::PivotSpace,
        LayoutKind::Morton,
        LayoutKind::Spatial,
        LayoutKind::SpatialAv,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayoutKind::SliceAndDice => "sliceAndDice",
            LayoutKind::Squarified => "squarified",
            LayoutKind::OrderedSquarified => "orderedSquarified",
            LayoutKind::Strip => "strip",
            LayoutKind::PivotMiddle => "pivotMiddle",
            LayoutKind::PivotSize => "pivotSize",
            LayoutKind::PivotSplitSize => "pivotSplitSize",
            LayoutKind::PivotSpace => "pivotSpace",
            LayoutKind::Morton => "morton",
            LayoutKind::Spatial => "spatial",
            LayoutKind::SpatialAv => "spatialAv",
        }
    }

    /// Layouts that place nodes by their geographic location.
    pub fn is_spatial(self) -> bool {
        matches!(
            self,
            LayoutKind::Spatial
                | LayoutKind::SpatialAv
                | LayoutKind::PivotSpace
                | LayoutKind::Morton
        )
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutKind {
    type Err = ConfigError;

    /// Case-insensitive; `-`, `_` and spaces are ignored.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        let kind = match key.as_str() {
            "sliceanddice" | "slice" => LayoutKind::SliceAndDice,
            "squarified" | "squarify" => LayoutKind::Squarified,
            "orderedsquarified" | "ordered" => LayoutKind::OrderedSquarified,
            "strip" => LayoutKind::Strip,
            "pivotmiddle" | "pivotbymiddle" => LayoutKind::PivotMiddle,
            "pivotsize" | "pivotbysize" => LayoutKind::PivotSize,
            "pivotsplitsize" | "pivotbysplitsize" => LayoutKind::PivotSplitSize,
            "pivotspace" | "pivotbyspace" => LayoutKind::PivotSpace,
            "morton" => LayoutKind::Morton,
            "spatial" => LayoutKind::Spatial,
            "spatialav" | "spatialaverage" => LayoutKind::SpatialAv,
            _ => return Err(ConfigError::UnknownLayout(s.to_string())),
        };
        Ok(kind)
    }
}

/// Direction constraint for a level's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    Horizontal,
    Vertical,
    #[default]
    Free,
}

impl Alignment {
    pub fn name(self) -> &'static str {
        match self {
            Alignment::Horizontal => "horizontal",
            Alignment::Vertical => "vertical",
            Alignment::Free => "free",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Alignment {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "h" => Ok(Alignment::Horizontal),
            "vertical" | "v" => Ok(Alignment::Vertical),
            "free" | "none" => Ok(Alignment::Free),
            _ => Err(ConfigError::UnknownAlignment(s.to_string())),
        }
    }
}

/// Parse a configured name, falling back to the default instead of rejecting
/// the whole configuration.
fn name_or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = ConfigError> + Default + fmt::Display,
{
    let name = String::deserialize(deserializer)?;
    Ok(name.parse().unwrap_or_else(|e| {
        let fallback = T::default();
        tracing::warn!("{}; using {}", e, fallback);
        fallback
    }))
}

impl<'de> Deserialize<'de> for LayoutKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        name_or_default(deserializer)
    }
}

impl<'de> Deserialize<'de> for Alignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        name_or_default(deserializer)
    }
}

/// Settings for one level of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub layout: LayoutKind,
    pub alignment: Alignment,
    /// Inset applied on every side of a branch before its children are laid out.
    /// The layout root is never inset, so the level 0 value has no effect.
    pub border: f64,
}

/// Configuration for treemap layout.
///
/// `levels[d]` governs how the children of depth-`d` nodes are arranged
/// (depth counted from the layout root). The last entry repeats for deeper
/// levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    /// Preferred width:height of each rectangle (1.0 = square-ish).
    pub aspect_ratio: f64,
    pub levels: Vec<LevelConfig>,
    /// Deepest level whose children are laid out.
    pub max_depth: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            aspect_ratio: 1.0,
            levels: vec![LevelConfig::default()],
            max_depth: MAX_DEPTH as u16,
        }
    }
}

impl LayoutConfig {
    /// Canvas of the given size with the default level settings.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Use `kind` for every level.
    pub fn with_layout(mut self, kind: LayoutKind) -> Self {
        for level in &mut self.levels {
            level.layout = kind;
        }
        self
    }

    /// Use `alignment` for every level.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        for level in &mut self.levels {
            level.alignment = alignment;
        }
        self
    }

    /// Use `border` for every level below the layout root. Negative values are
    /// clamped to zero.
    pub fn with_border(mut self, border: f64) -> Self {
        for level in &mut self.levels {
            level.border = if border.is_finite() { border.max(0.0) } else { 0.0 };
        }
        self
    }

    /// Invalid ratios store 1.0 and log a warning.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f64) -> Self {
        if let Err(e) = self.set_aspect_ratio(aspect_ratio) {
            tracing::warn!("{}; using 1.0", e);
        }
        self
    }

    /// Settings for `depth`; the last configured level repeats below.
    pub fn level(&self, depth: usize) -> LevelConfig {
        self.levels
            .get(depth)
            .or_else(|| self.levels.last())
            .copied()
            .unwrap_or_default()
    }

    fn slot_mut(&mut self, level: usize) -> std::result::Result<&mut LevelConfig, ConfigError> {
        if level > MAX_DEPTH {
            return Err(ConfigError::LevelOutOfRange {
                level,
                max: MAX_DEPTH,
            });
        }
        if self.levels.is_empty() {
            self.levels.push(LevelConfig::default());
        }
        while self.levels.len() <= level {
            let last = self.levels[self.levels.len() - 1];
            self.levels.push(last);
        }
        Ok(&mut self.levels[level])
    }

    pub fn set_layout_kind(&mut self, level: usize, kind: LayoutKind) -> Result<()> {
        self.slot_mut(level)?.layout = kind;
        Ok(())
    }

    /// Set a level's layout by name. An unknown name stores
    /// [`LayoutKind::OrderedSquarified`] and reports the error.
    pub fn set_layout(&mut self, level: usize, name: &str) -> Result<()> {
        let slot = self.slot_mut(level)?;
        match name.parse::<LayoutKind>() {
            Ok(kind) => {
                slot.layout = kind;
                Ok(())
            }
            Err(e) => {
                slot.layout = LayoutKind::default();
                tracing::warn!("{}; level {} falls back to {}", e, level, slot.layout);
                Err(e.into())
            }
        }
    }

    /// Set a level's alignment by name. An unknown name stores
    /// [`Alignment::Free`] and reports the error.
    pub fn set_alignment(&mut self, level: usize, name: &str) -> Result<()> {
        let slot = self.slot_mut(level)?;
        match name.parse::<Alignment>() {
            Ok(alignment) => {
                slot.alignment = alignment;
                Ok(())
            }
            Err(e) => {
                slot.alignment = Alignment::default();
                tracing::warn!("{}; level {} falls back to {}", e, level, slot.alignment);
                Err(e.into())
            }
        }
    }

    /// Set a level's border. Negative or non-finite borders store 0 and report the error.
    pub fn set_border(&mut self, level: usize, border: f64) -> Result<()> {
        let slot = self.slot_mut(level)?;
        if border.is_finite() && border >= 0.0 {
            slot.border = border;
            Ok(())
        } else {
            slot.border = 0.0;
            Err(ConfigError::InvalidBorder { level, border }.into())
        }
    }

    /// Set the canvas size. Invalid sizes leave the current canvas untouched.
    pub fn set_canvas(&mut self, width: f64, height: f64) -> Result<()> {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.width = width;
            self.height = height;
            Ok(())
        } else {
            Err(ConfigError::InvalidCanvas { width, height }.into())
        }
    }

    /// Set the target aspect ratio. Invalid ratios store 1.0 and report the error.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f64) -> Result<()> {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.aspect_ratio = aspect_ratio;
            Ok(())
        } else {
            self.aspect_ratio = 1.0;
            Err(ConfigError::InvalidAspectRatio(aspect_ratio).into())
        }
    }

    /// Check every value without changing anything.
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0)
        {
            return Err(ConfigError::InvalidCanvas {
                width: self.width,
                height: self.height,
            }
            .into());
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(ConfigError::InvalidAspectRatio(self.aspect_ratio).into());
        }
        if self.levels.len() > MAX_DEPTH + 1 {
            return Err(ConfigError::LevelOutOfRange {
                level: self.levels.len() - 1,
                max: MAX_DEPTH,
            }
            .into());
        }
        for (level, settings) in self.levels.iter().enumerate() {
            if !(settings.border.is_finite() && settings.border >= 0.0) {
                return Err(ConfigError::InvalidBorder {
                    level,
                    border: settings.border,
                }
                .into());
            }
        }
        Ok(())
    }
}
