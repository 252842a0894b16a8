use std::fmt;

// Pattern sets for view position matching
const CC_STRINGS: &[&str] = &["cc", "cranio-caudal", "craniocaudal", "caudal-cranial"];
const MLO_STRINGS: &[&str] = &[
    "mlo",
    "medio-lateral oblique",
    "medial-lateral oblique",
    "mediolateral oblique",
];

/// Mammographic view position
///
/// Only the two standard screening views are distinguished by triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "UPPERCASE"))]
pub enum ViewPosition {
    /// Cranio-caudal
    Cc,
    /// Medio-lateral oblique
    Mlo,
}

impl ViewPosition {
    /// Returns short string representation
    pub fn short_str(&self) -> &'static str {
        match self {
            ViewPosition::Cc => "CC",
            ViewPosition::Mlo => "MLO",
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            ViewPosition::Cc => "cc",
            ViewPosition::Mlo => "mlo",
        }
    }

    /// Parses a view position from a dataset or model label
    ///
    /// Accepts abbreviations and descriptive names, case-insensitive.
    /// Returns `None` for anything that is not CC or MLO.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let s_lower = s.trim().to_lowercase();
        if CC_STRINGS.contains(&s_lower.as_str()) {
            Some(ViewPosition::Cc)
        } else if MLO_STRINGS.contains(&s_lower.as_str()) {
            Some(ViewPosition::Mlo)
        } else {
            None
        }
    }
}

impl fmt::Display for ViewPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_str())
    }
}

/// Breast laterality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "UPPERCASE"))]
pub enum Laterality {
    Left,
    Right,
}

impl Laterality {
    /// Returns short string representation
    pub fn short_str(&self) -> &'static str {
        match self {
            Laterality::Left => "L",
            Laterality::Right => "R",
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            Laterality::Left => "left",
            Laterality::Right => "right",
        }
    }

    /// Parses laterality from "L"/"R" codes or full words
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "l" | "left" => Some(Laterality::Left),
            "r" | "right" => Some(Laterality::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Laterality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Tier that produced a classification
///
/// Variants are declared from most to least trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum Provenance {
    /// Curated reference dataset lookup
    Annotation,
    /// External trained view classifier
    TrainedModel,
    /// Rule-based image analysis
    Heuristic,
}

impl Provenance {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            Provenance::Annotation => "annotation",
            Provenance::TrainedModel => "trained-model",
            Provenance::Heuristic => "heuristic",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Category of a region of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum FindingCategory {
    Mass,
    Calcification,
    Asymmetry,
    ArchitecturalDistortion,
    Unknown,
}

impl FindingCategory {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            FindingCategory::Mass => "mass",
            FindingCategory::Calcification => "calcification",
            FindingCategory::Asymmetry => "asymmetry",
            FindingCategory::ArchitecturalDistortion => "architectural_distortion",
            FindingCategory::Unknown => "unknown",
        }
    }

    /// Capitalized label used in descriptions
    pub fn label(&self) -> &'static str {
        match self {
            FindingCategory::Mass => "Mass",
            FindingCategory::Calcification => "Calcification",
            FindingCategory::Asymmetry => "Asymmetry",
            FindingCategory::ArchitecturalDistortion => "Architectural distortion",
            FindingCategory::Unknown => "Region",
        }
    }

    /// Maps a reference dataset finding label onto a category
    ///
    /// Labels such as "Suspicious Calcification" or "Focal Asymmetry" fold
    /// into their base category. Unrecognised labels map to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        let s_lower = label.trim().to_lowercase();
        if s_lower == "mass" {
            FindingCategory::Mass
        } else if s_lower.contains("calcification") {
            FindingCategory::Calcification
        } else if s_lower.contains("asymmetry") {
            FindingCategory::Asymmetry
        } else if s_lower == "architectural distortion" {
            FindingCategory::ArchitecturalDistortion
        } else {
            FindingCategory::Unknown
        }
    }
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}
