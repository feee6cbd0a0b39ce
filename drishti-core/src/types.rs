use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Milliseconds on a monotonic clock
pub type Millis = u64;

/// Dimensions of a camera frame in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f32 {
        self.width as f32 * self.height as f32
    }

    pub fn diagonal(&self) -> f32 {
        (self.width as f32).hypot(self.height as f32)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned box in frame pixels, origin at the top-left corner.
///
/// Serialized as `[x, y, width, height]`, the layout detectors emit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Finite coordinates and non-negative extent
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }

    /// Weighted average of two boxes: `retain` of `self`, the rest of `next`.
    pub fn blend(&self, next: &BoundingBox, retain: f32) -> BoundingBox {
        let fresh = 1.0 - retain;
        BoundingBox {
            x: self.x * retain + next.x * fresh,
            y: self.y * retain + next.y * fresh,
            width: self.width * retain + next.width * fresh,
            height: self.height * retain + next.height * fresh,
        }
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}

/// One detector output for a single inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(alias = "class")]
    pub label: String,
    pub score: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, score: f32, bbox: BoundingBox) -> Self {
        Self {
            label: label.into(),
            score,
            bbox,
        }
    }
}

/// Danger tier derived from how much of the frame an object covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn distance(&self) -> Distance {
        match self {
            Urgency::Low => Distance::Far,
            Urgency::Medium => Distance::Near,
            Urgency::High => Distance::VeryClose,
        }
    }
}

/// Coarse distance estimate, one per urgency tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distance {
    Far,
    Near,
    VeryClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    Static,
    Lateral,
    Approaching,
}

/// One of five equal-width horizontal sectors of the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    FarLeft,
    Left,
    Center,
    Right,
    FarRight,
}

impl Zone {
    /// Sector for a horizontal position given as a fraction of frame width.
    /// Positions outside the frame clamp to the outer sectors.
    pub fn from_relative_x(relative_x: f32) -> Zone {
        if !relative_x.is_finite() {
            return Zone::Center;
        }
        let sector = (relative_x * 5.0).floor();
        if sector < 1.0 {
            Zone::FarLeft
        } else if sector < 2.0 {
            Zone::Left
        } else if sector < 3.0 {
            Zone::Center
        } else if sector < 4.0 {
            Zone::Right
        } else {
            Zone::FarRight
        }
    }
}

/// Avoidance direction recommended to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
}

/// Coarse surroundings inferred from the classes in view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    #[default]
    Scanning,
    Indoor,
    Outdoor,
}

impl fmt::Display for EnvironmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentMode::Scanning => write!(f, "scanning"),
            EnvironmentMode::Indoor => write!(f, "indoor"),
            EnvironmentMode::Outdoor => write!(f, "outdoor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Normal,
    High,
}

/// Narration language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ta")]
    Tamil,
}

impl Language {
    /// BCP-47 tag handed to narration engines
    pub fn tag(&self) -> &'static str {
        match self {
            Language::English => "en-IN",
            Language::Tamil => "ta-IN",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Tamil => "ta",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-in" | "en-us" | "english" => Ok(Language::English),
            "ta" | "ta-in" | "tamil" => Ok(Language::Tamil),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}
