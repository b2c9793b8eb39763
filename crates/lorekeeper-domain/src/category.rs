//! Category and importance enumerations for knowledge records

use std::fmt;

/// Classification of a knowledge record
///
/// Anything the pipeline cannot recognise becomes `Terminology`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// Organisational units (departments, teams, divisions)
    Department,

    /// Roles and job titles
    Position,

    /// Vocabulary and definitions
    #[default]
    Terminology,

    /// Step-by-step workflows
    Procedure,

    /// Rules, policies and regulations
    Regulation,
}

impl Category {
    /// All categories in declaration order
    pub const ALL: [Category; 5] = [
        Category::Department,
        Category::Position,
        Category::Terminology,
        Category::Procedure,
        Category::Regulation,
    ];

    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Department => "department",
            Category::Position => "position",
            Category::Terminology => "terminology",
            Category::Procedure => "procedure",
            Category::Regulation => "regulation",
        }
    }

    /// Parse a category from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "department" => Some(Category::Department),
            "position" => Some(Category::Position),
            "terminology" => Some(Category::Terminology),
            "procedure" => Some(Category::Procedure),
            "regulation" => Some(Category::Regulation),
            _ => None,
        }
    }

    /// Parse an optional label, falling back to `Terminology`
    pub fn from_label_or_default(label: Option<&str>) -> Self {
        label.and_then(Self::parse).unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid category: {}", s))
    }
}

/// How important a record is relative to its siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Importance {
    /// Core knowledge
    High,

    /// Ordinary knowledge
    #[default]
    Medium,

    /// Supplementary knowledge
    Low,
}

impl Importance {
    /// Get the importance name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::High => "high",
            Importance::Medium => "medium",
            Importance::Low => "low",
        }
    }

    /// Parse an importance from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Importance::High),
            "medium" => Some(Importance::Medium),
            "low" => Some(Importance::Low),
            _ => None,
        }
    }

    /// Parse an optional label, falling back to `Medium`
    pub fn from_label_or_default(label: Option<&str>) -> Self {
        label.and_then(Self::parse).unwrap_or_default()
    }

    /// Numeric rank used for ordering (higher sorts first)
    pub fn rank(&self) -> u8 {
        match self {
            Importance::High => 3,
            Importance::Medium => 2,
            Importance::Low => 1,
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Importance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid importance: {}", s))
    }
}
