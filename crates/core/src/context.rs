//! Clinical report contexts.
//!
//! The context selects the prompt template, the canonical field set and the placeholder
//! wording. It is parsed once at the request boundary; everything downstream takes the enum,
//! so an unrecognised context can never reach prompt composition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fields::Field;
use crate::{ReportError, ReportResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportContext {
    #[serde(alias = "urgencias")]
    UrgentCare,
    #[serde(alias = "planta")]
    WardAdmission,
    #[serde(alias = "evolutivo")]
    ProgressNote,
}

/// Text substituted for a segment the model did not produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholders {
    pub report: &'static str,
    pub recommendations: &'static str,
    pub keywords: &'static str,
}

/// Language of the placeholder wording, so a degraded response reads like the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaceholderLanguage {
    #[default]
    Spanish,
    English,
}

impl PlaceholderLanguage {
    /// Pick the wording for a configured report language such as `Spanish` or `English`.
    ///
    /// Anything that is not recognisably English gets the Spanish wording.
    pub fn for_report_language(language: &str) -> Self {
        let language = language.trim().to_ascii_lowercase();
        if language == "en" || language.starts_with("en-") || language.starts_with("english") {
            PlaceholderLanguage::English
        } else {
            PlaceholderLanguage::Spanish
        }
    }
}

impl ReportContext {
    pub const ALL: [ReportContext; 3] = [
        ReportContext::UrgentCare,
        ReportContext::WardAdmission,
        ReportContext::ProgressNote,
    ];

    /// Wire value of the context.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportContext::UrgentCare => "urgent-care",
            ReportContext::WardAdmission => "ward-admission",
            ReportContext::ProgressNote => "progress-note",
        }
    }

    /// Human-readable name used inside prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            ReportContext::UrgentCare => "emergency department visit",
            ReportContext::WardAdmission => "ward admission",
            ReportContext::ProgressNote => "ward progress note",
        }
    }

    /// Canonical fields of this context, in serialisation order.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            ReportContext::UrgentCare => &[
                Field::Name,
                Field::Age,
                Field::Sex,
                Field::Pregnancy,
                Field::DateTime,
                Field::ChiefComplaint,
                Field::PresentIllness,
                Field::Background,
                Field::Vitals,
                Field::PhysicalExam,
                Field::TestResults,
                Field::WorkingDiagnosis,
                Field::Plan,
            ],
            ReportContext::WardAdmission => &[
                Field::Name,
                Field::Age,
                Field::Sex,
                Field::DateTime,
                Field::ChiefComplaint,
                Field::PresentIllness,
                Field::Background,
                Field::UsualMedication,
                Field::Vitals,
                Field::PhysicalExam,
                Field::TestResults,
                Field::WorkingDiagnosis,
                Field::Plan,
            ],
            ReportContext::ProgressNote => &[Field::Status, Field::IntervalEvents, Field::Plan],
        }
    }

    /// Placeholders in the default report language.
    pub fn placeholders(&self) -> Placeholders {
        self.placeholders_in(PlaceholderLanguage::default())
    }

    pub fn placeholders_in(&self, language: PlaceholderLanguage) -> Placeholders {
        match (language, self) {
            (PlaceholderLanguage::Spanish, ReportContext::UrgentCare) => Placeholders {
                report: "No se pudo generar el informe de urgencias.",
                recommendations: "No se pudieron generar las recomendaciones al alta.",
                keywords: "No se pudieron generar las palabras clave.",
            },
            (PlaceholderLanguage::Spanish, ReportContext::WardAdmission) => Placeholders {
                report: "No se pudo generar el informe de ingreso.",
                recommendations: "No se pudo generar el plan de ingreso.",
                keywords: "No se pudieron generar las palabras clave.",
            },
            (PlaceholderLanguage::Spanish, ReportContext::ProgressNote) => Placeholders {
                report: "No se pudo generar el evolutivo.",
                recommendations: "No se pudo generar el plan.",
                keywords: "No se pudieron generar las palabras clave.",
            },
            (PlaceholderLanguage::English, ReportContext::UrgentCare) => Placeholders {
                report: "The emergency report could not be generated.",
                recommendations: "Discharge recommendations could not be generated.",
                keywords: "Keywords could not be generated.",
            },
            (PlaceholderLanguage::English, ReportContext::WardAdmission) => Placeholders {
                report: "The admission report could not be generated.",
                recommendations: "The admission plan could not be generated.",
                keywords: "Keywords could not be generated.",
            },
            (PlaceholderLanguage::English, ReportContext::ProgressNote) => Placeholders {
                report: "The progress note could not be generated.",
                recommendations: "The plan could not be generated.",
                keywords: "Keywords could not be generated.",
            },
        }
    }
}

impl fmt::Display for ReportContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportContext {
    type Err = ReportError;

    /// Parse a context value, accepting the legacy form values as aliases.
    ///
    /// Matching ignores case and treats `_` like `-`.
    fn from_str(s: &str) -> ReportResult<Self> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        match key.as_str() {
            "urgent-care" | "urgencias" => Ok(ReportContext::UrgentCare),
            "ward-admission" | "planta" => Ok(ReportContext::WardAdmission),
            "progress-note" | "evolutivo" => Ok(ReportContext::ProgressNote),
            _ => Err(ReportError::UnknownContext(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_canonical_and_legacy_values() {
        assert_eq!("urgent-care".parse::<ReportContext>().unwrap(), ReportContext::UrgentCare);
        assert_eq!("Ward_Admission".parse::<ReportContext>().unwrap(), ReportContext::WardAdmission);
        assert_eq!(" evolutivo ".parse::<ReportContext>().unwrap(), ReportContext::ProgressNote);
        assert_eq!("planta".parse::<ReportContext>().unwrap(), ReportContext::WardAdmission);
    }

    #[test]
    fn test_from_str_rejects_unknown_value() {
        let err = "unknown".parse::<ReportContext>().expect_err("should reject");
        assert!(matches!(err, ReportError::UnknownContext(v) if v == "unknown"));
        assert!("".parse::<ReportContext>().is_err());
    }

    #[test]
    fn test_as_str_round_trips_through_from_str() {
        for context in ReportContext::ALL {
            assert_eq!(context.as_str().parse::<ReportContext>().unwrap(), context);
        }
    }

    #[test]
    fn test_serde_uses_kebab_case_with_legacy_aliases() {
        let json = serde_json::to_string(&ReportContext::ProgressNote).unwrap();
        assert_eq!(json, "\"progress-note\"");
        let legacy: ReportContext = serde_json::from_str("\"urgencias\"").unwrap();
        assert_eq!(legacy, ReportContext::UrgentCare);
    }

    #[test]
    fn test_progress_note_has_no_demographics() {
        let fields = ReportContext::ProgressNote.fields();
        assert!(!fields.contains(&Field::Name));
        assert!(!fields.contains(&Field::Age));
        assert_eq!(fields, &[Field::Status, Field::IntervalEvents, Field::Plan]);
    }

    #[test]
    fn test_placeholders_are_non_empty_and_context_specific() {
        for context in ReportContext::ALL {
            for language in [PlaceholderLanguage::Spanish, PlaceholderLanguage::English] {
                let p = context.placeholders_in(language);
                assert!(!p.report.trim().is_empty());
                assert!(!p.recommendations.trim().is_empty());
                assert!(!p.keywords.trim().is_empty());
            }
        }
        assert_ne!(
            ReportContext::UrgentCare.placeholders().report,
            ReportContext::ProgressNote.placeholders().report
        );
    }

    #[test]
    fn test_default_placeholders_are_spanish() {
        let p = ReportContext::UrgentCare.placeholders();
        assert_eq!(p.report, "No se pudo generar el informe de urgencias.");
        assert_eq!(p, ReportContext::UrgentCare.placeholders_in(PlaceholderLanguage::Spanish));
    }

    #[test]
    fn test_placeholder_language_follows_report_language() {
        for (language, expected) in [
            ("Spanish", PlaceholderLanguage::Spanish),
            ("español", PlaceholderLanguage::Spanish),
            ("English", PlaceholderLanguage::English),
            (" english (UK) ", PlaceholderLanguage::English),
            ("en-GB", PlaceholderLanguage::English),
            ("Catalan", PlaceholderLanguage::Spanish),
        ] {
            assert_eq!(PlaceholderLanguage::for_report_language(language), expected, "{language}");
        }
        let english = ReportContext::ProgressNote.placeholders_in(PlaceholderLanguage::English);
        assert_eq!(english.report, "The progress note could not be generated.");
    }
}
