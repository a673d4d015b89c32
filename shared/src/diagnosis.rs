//! Crop disease classification.
//!
//! The reference classifier routes on keywords found in the classification
//! key (usually the file name) and falls back to a random pick among the
//! known diseases. The random pick sits behind [`CategorySource`] so callers
//! can pin it.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::image_processing::{validate_capture, ImageValidationError};
use crate::model::CapturedImage;
use crate::MAX_IMAGE_BYTES;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiagnosisError {
    #[error("classification key is empty")]
    EmptyKey,

    #[error("invalid image: {0}")]
    InvalidImage(#[from] ImageValidationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiseaseCategory {
    Rust,
    Blight,
    Mildew,
    Unknown,
}

impl DiseaseCategory {
    /// Categories the random fallback chooses from. `Unknown` is never
    /// picked at random.
    pub const FALLBACK_CHOICES: [Self; 3] = [Self::Rust, Self::Blight, Self::Mildew];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Blight => "blight",
            Self::Mildew => "mildew",
            Self::Unknown => "unknown",
        }
    }

    /// Unrecognized ids map to `Unknown` rather than failing, so records
    /// written by other clients still render.
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "rust" => Self::Rust,
            "blight" => Self::Blight,
            "mildew" => Self::Mildew,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for DiseaseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Ordered keyword routes; the first matching row wins.
const KEYWORD_ROUTES: &[(&[&str], DiseaseCategory)] = &[
    (&["yellow", "rust"], DiseaseCategory::Rust),
    (&["brown", "blight"], DiseaseCategory::Blight),
    (&["white", "mildew"], DiseaseCategory::Mildew),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentKind {
    Organic,
    Chemical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treatment {
    pub name: String,
    pub how_to_use: String,
    pub safety_note: String,
}

/// A finished diagnosis. Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    disease: DiseaseCategory,
    confidence_percent: u8,
    organic_suggestion: Treatment,
    chemical_suggestion: Treatment,
    causes: Vec<String>,
}

impl Diagnosis {
    #[must_use]
    pub const fn disease(&self) -> DiseaseCategory {
        self.disease
    }

    #[must_use]
    pub const fn confidence_percent(&self) -> u8 {
        self.confidence_percent
    }

    #[must_use]
    pub const fn organic_suggestion(&self) -> &Treatment {
        &self.organic_suggestion
    }

    #[must_use]
    pub const fn chemical_suggestion(&self) -> &Treatment {
        &self.chemical_suggestion
    }

    #[must_use]
    pub const fn suggestion(&self, kind: TreatmentKind) -> &Treatment {
        match kind {
            TreatmentKind::Organic => &self.organic_suggestion,
            TreatmentKind::Chemical => &self.chemical_suggestion,
        }
    }

    #[must_use]
    pub fn causes(&self) -> &[String] {
        &self.causes
    }
}

struct TreatmentTemplate {
    name: &'static str,
    how_to_use: &'static str,
    safety_note: &'static str,
}

impl TreatmentTemplate {
    fn build(&self) -> Treatment {
        Treatment {
            name: self.name.to_string(),
            how_to_use: self.how_to_use.to_string(),
            safety_note: self.safety_note.to_string(),
        }
    }
}

struct DiagnosisTemplate {
    confidence_percent: u8,
    organic: TreatmentTemplate,
    chemical: TreatmentTemplate,
    causes: &'static [&'static str],
}

static RUST_TEMPLATE: DiagnosisTemplate = DiagnosisTemplate {
    confidence_percent: 85,
    organic: TreatmentTemplate {
        name: "Sulphur Dust",
        how_to_use: "Apply during early morning or evening. Dust leaves lightly.",
        safety_note: "Wear mask when applying. Safe for humans and pets.",
    },
    chemical: TreatmentTemplate {
        name: "Systemic Fungicide",
        how_to_use: "Mix 2ml per liter water. Spray every 10-14 days.",
        safety_note: "Wear protective gear. Keep away from children.",
    },
    causes: &["Humid weather", "Poor air circulation", "Overhead watering"],
};

static BLIGHT_TEMPLATE: DiagnosisTemplate = DiagnosisTemplate {
    confidence_percent: 78,
    organic: TreatmentTemplate {
        name: "Neem Oil Spray",
        how_to_use: "Mix 5ml neem oil per liter water. Spray in evening.",
        safety_note: "Natural and safe. Avoid during flowering.",
    },
    chemical: TreatmentTemplate {
        name: "Copper Fungicide",
        how_to_use: "Mix as per label instructions. Apply weekly.",
        safety_note: "Avoid inhalation. Wash hands after use.",
    },
    causes: &["Rainy season", "Poor soil drainage", "Nearby infected plants"],
};

static MILDEW_TEMPLATE: DiagnosisTemplate = DiagnosisTemplate {
    confidence_percent: 72,
    organic: TreatmentTemplate {
        name: "Baking Soda Spray",
        how_to_use: "1 tsp per liter water + few drops dish soap.",
        safety_note: "Completely safe. Test on small area first.",
    },
    chemical: TreatmentTemplate {
        name: "Potassium Bicarbonate",
        how_to_use: "Follow package directions. Apply in cool weather.",
        safety_note: "Less toxic than traditional fungicides.",
    },
    causes: &["High humidity", "Poor ventilation", "Overcrowded plants"],
};

static UNKNOWN_TEMPLATE: DiagnosisTemplate = DiagnosisTemplate {
    confidence_percent: 0,
    organic: TreatmentTemplate {
        name: "Remove Affected Leaves",
        how_to_use: "Prune visibly affected leaves and dispose of them away from the field.",
        safety_note: "Wash hands and tools after handling.",
    },
    chemical: TreatmentTemplate {
        name: "Consult Extension Officer",
        how_to_use: "Show a sample to your local agriculture officer before spraying.",
        safety_note: "Do not apply chemicals without a confirmed diagnosis.",
    },
    causes: &["Symptoms did not match a known disease"],
};

fn template(category: DiseaseCategory) -> &'static DiagnosisTemplate {
    match category {
        DiseaseCategory::Rust => &RUST_TEMPLATE,
        DiseaseCategory::Blight => &BLIGHT_TEMPLATE,
        DiseaseCategory::Mildew => &MILDEW_TEMPLATE,
        DiseaseCategory::Unknown => &UNKNOWN_TEMPLATE,
    }
}

/// Builds the full diagnosis for a category from the static table. Total
/// over every category.
#[must_use]
pub fn diagnosis_for(category: DiseaseCategory) -> Diagnosis {
    let t = template(category);
    Diagnosis {
        disease: category,
        confidence_percent: t.confidence_percent,
        organic_suggestion: t.organic.build(),
        chemical_suggestion: t.chemical.build(),
        causes: t.causes.iter().map(|c| (*c).to_string()).collect(),
    }
}

/// Keyword routing on a classification key. `None` means no keyword hit.
#[must_use]
pub fn category_for_key(key: &str) -> Option<DiseaseCategory> {
    let key = key.to_lowercase();
    KEYWORD_ROUTES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| key.contains(k)))
        .map(|(_, category)| *category)
}

/// Source of the fallback pick when no keyword matches.
pub trait CategorySource: Send {
    fn pick(&mut self, choices: &[DiseaseCategory]) -> DiseaseCategory;
}

/// Uniform random pick.
pub struct RandomCategory {
    rng: StdRng,
}

impl RandomCategory {
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl CategorySource for RandomCategory {
    fn pick(&mut self, choices: &[DiseaseCategory]) -> DiseaseCategory {
        choices
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(DiseaseCategory::Unknown)
    }
}

/// Always answers the same category.
#[derive(Debug, Clone, Copy)]
pub struct FixedCategory(pub DiseaseCategory);

impl CategorySource for FixedCategory {
    fn pick(&mut self, _choices: &[DiseaseCategory]) -> DiseaseCategory {
        self.0
    }
}

pub struct DiagnosisEngine {
    source: Box<dyn CategorySource>,
    max_image_bytes: usize,
}

impl DiagnosisEngine {
    #[must_use]
    pub fn new(source: Box<dyn CategorySource>, max_image_bytes: usize) -> Self {
        Self {
            source,
            max_image_bytes,
        }
    }

    #[must_use]
    pub fn with_source(source: impl CategorySource + 'static) -> Self {
        Self::new(Box::new(source), MAX_IMAGE_BYTES)
    }

    pub fn set_max_image_bytes(&mut self, max_image_bytes: usize) {
        self.max_image_bytes = max_image_bytes;
    }

    /// Classifies a captured image. The bytes are validated first; the
    /// classification itself only looks at the key derived from the image
    /// metadata.
    #[instrument(skip_all, fields(file_name = %image.file_name))]
    pub fn classify(&mut self, image: &CapturedImage) -> Result<Diagnosis, DiagnosisError> {
        validate_capture(&image.source_bytes, &image.mime_type, self.max_image_bytes)?;
        self.classify_key(&image.classification_key())
    }

    pub fn classify_key(&mut self, key: &str) -> Result<Diagnosis, DiagnosisError> {
        if key.trim().is_empty() {
            return Err(DiagnosisError::EmptyKey);
        }

        let category = match category_for_key(key) {
            Some(category) => {
                debug!(%category, "keyword match");
                category
            }
            None => {
                let category = self.source.pick(&DiseaseCategory::FALLBACK_CHOICES);
                debug!(%category, "no keyword match, using fallback pick");
                category
            }
        };

        Ok(diagnosis_for(category))
    }
}

impl Default for DiagnosisEngine {
    fn default() -> Self {
        Self::with_source(RandomCategory::from_entropy())
    }
}

impl std::fmt::Debug for DiagnosisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosisEngine")
            .field("max_image_bytes", &self.max_image_bytes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processing::fixtures::PNG_HEADER;
    use proptest::prelude::*;

    fn capture(file_name: &str, bytes: &[u8]) -> CapturedImage {
        CapturedImage {
            source_bytes: bytes.to_vec(),
            file_name: file_name.to_string(),
            mime_type: "image/png".to_string(),
            display_url: "blob:local/1".to_string(),
            captured_at_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn rust_keyword_routes_to_rust() {
        let mut engine = DiagnosisEngine::with_source(FixedCategory(DiseaseCategory::Mildew));
        let diagnosis = engine.classify_key("leaf_rust_sample.jpg").unwrap();
        assert_eq!(diagnosis.disease(), DiseaseCategory::Rust);
        assert_eq!(diagnosis.confidence_percent(), 85);
        assert_eq!(diagnosis.organic_suggestion().name, "Sulphur Dust");
    }

    #[test]
    fn synonyms_route_like_the_disease_name() {
        assert_eq!(category_for_key("YELLOW_spots.png"), Some(DiseaseCategory::Rust));
        assert_eq!(category_for_key("brown-leaf.jpg"), Some(DiseaseCategory::Blight));
        assert_eq!(category_for_key("white_powder.jpg"), Some(DiseaseCategory::Mildew));
        assert_eq!(category_for_key("photo123.jpg"), None);
    }

    #[test]
    fn earlier_route_wins() {
        assert_eq!(
            category_for_key("rust_and_blight.jpg"),
            Some(DiseaseCategory::Rust)
        );
    }

    #[test]
    fn unmatched_key_uses_pinned_fallback() {
        let mut engine = DiagnosisEngine::with_source(FixedCategory(DiseaseCategory::Blight));
        let diagnosis = engine.classify_key("photo123.jpg").unwrap();
        assert_eq!(diagnosis.disease(), DiseaseCategory::Blight);
        assert_eq!(diagnosis.confidence_percent(), 78);
        assert_eq!(diagnosis.chemical_suggestion().name, "Copper Fungicide");
    }

    #[test]
    fn seeded_random_is_reproducible_and_never_unknown() {
        let mut a = RandomCategory::seeded(7);
        let mut b = RandomCategory::seeded(7);
        for _ in 0..32 {
            let pick = a.pick(&DiseaseCategory::FALLBACK_CHOICES);
            assert_eq!(pick, b.pick(&DiseaseCategory::FALLBACK_CHOICES));
            assert_ne!(pick, DiseaseCategory::Unknown);
        }
    }

    #[test]
    fn random_pick_from_nothing_is_unknown() {
        assert_eq!(RandomCategory::seeded(1).pick(&[]), DiseaseCategory::Unknown);
    }

    #[test]
    fn unknown_template_is_fully_populated() {
        let diagnosis = diagnosis_for(DiseaseCategory::Unknown);
        assert_eq!(diagnosis.disease(), DiseaseCategory::Unknown);
        assert!(!diagnosis.organic_suggestion().name.is_empty());
        assert!(!diagnosis.chemical_suggestion().safety_note.is_empty());
        assert!(!diagnosis.causes().is_empty());
    }

    #[test]
    fn empty_key_fails() {
        let mut engine = DiagnosisEngine::with_source(FixedCategory(DiseaseCategory::Rust));
        assert_eq!(engine.classify_key(""), Err(DiagnosisError::EmptyKey));
        assert_eq!(engine.classify_key("   "), Err(DiagnosisError::EmptyKey));
    }

    #[test]
    fn classify_validates_bytes_first() {
        let mut engine = DiagnosisEngine::with_source(FixedCategory(DiseaseCategory::Rust));
        assert!(matches!(
            engine.classify(&capture("leaf_rust.png", &[])),
            Err(DiagnosisError::InvalidImage(ImageValidationError::EmptyInput))
        ));
        assert!(matches!(
            engine.classify(&capture("leaf_rust.png", b"garbage")),
            Err(DiagnosisError::InvalidImage(_))
        ));
        let ok = engine.classify(&capture("leaf_rust.png", &PNG_HEADER)).unwrap();
        assert_eq!(ok.disease(), DiseaseCategory::Rust);
    }

    #[test]
    fn from_id_falls_back_to_unknown() {
        assert_eq!(DiseaseCategory::from_id("Blight"), DiseaseCategory::Blight);
        assert_eq!(DiseaseCategory::from_id("leaf curl"), DiseaseCategory::Unknown);
        for category in DiseaseCategory::FALLBACK_CHOICES {
            assert_eq!(DiseaseCategory::from_id(category.id()), category);
        }
    }

    proptest! {
        #[test]
        fn classify_key_is_total(key in "[a-zA-Z0-9_.\\- ]{0,40}", seed in any::<u64>()) {
            let mut engine = DiagnosisEngine::with_source(RandomCategory::seeded(seed));
            match engine.classify_key(&key) {
                Ok(diagnosis) => {
                    prop_assert!(!key.trim().is_empty());
                    prop_assert!(diagnosis.confidence_percent() <= 100);
                    prop_assert!(!diagnosis.organic_suggestion().name.is_empty());
                    prop_assert!(!diagnosis.organic_suggestion().how_to_use.is_empty());
                    prop_assert!(!diagnosis.chemical_suggestion().name.is_empty());
                    prop_assert!(!diagnosis.chemical_suggestion().safety_note.is_empty());
                    prop_assert!(!diagnosis.causes().is_empty());
                }
                Err(e) => {
                    prop_assert!(key.trim().is_empty());
                    prop_assert_eq!(e, DiagnosisError::EmptyKey);
                }
            }
        }

        #[test]
        fn keyword_hits_are_deterministic(prefix in "[a-z0-9]{0,8}", seed in any::<u64>()) {
            let key = format!("{prefix}_mildew.jpg");
            let mut engine = DiagnosisEngine::with_source(RandomCategory::seeded(seed));
            let diagnosis = engine.classify_key(&key).unwrap();
            prop_assert_eq!(diagnosis, diagnosis_for(category_for_key(&key).unwrap()));
        }
    }
}
