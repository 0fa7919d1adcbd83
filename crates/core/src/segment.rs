//! Splitting raw model output into report, recommendations and keywords.
//!
//! Models do not always honour the delimiter contract exactly. Separators are matched
//! case-insensitively, with spaces around the dashes, spaced dash runs (`- - -`), optional
//! trailing dashes, optional Markdown bold markers, English or Spanish wording, and as a bare
//! word alone on its own line (`\n` or `\r\n` terminated). Segmentation never fails: whatever
//! cannot be recovered becomes placeholder text.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::context::Placeholders;

static PRIMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)\**[ \t]*(?:(?:-{2,}|-(?:[ \t]-)+)|[–—]+)[ \t]*(?:separador|separator)\b[ \t]*(?:(?:-{2,}|-(?:[ \t]-)+)|[–—]+)?[ \t]*\**|^[ \t]*\**[ \t]*(?:separador|separator)[ \t]*\**:?[ \t\r]*$",
    )
    .expect("valid regex")
});

static SECONDARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)\**[ \t]*(?:(?:-{2,}|-(?:[ \t]-)+)|[–—]+)[ \t]*(?:key[ \t]*words|palabras[ \t]+clave)\b[ \t]*(?:(?:-{2,}|-(?:[ \t]-)+)|[–—]+)?[ \t]*\**|^[ \t]*\**[ \t]*(?:key[ \t]*words|palabras[ \t]+clave)[ \t]*\**:?[ \t\r]*$",
    )
    .expect("valid regex")
});

/// The three sections returned to the caller. None of them is ever empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResult {
    pub report: String,
    pub recommendations: String,
    pub keywords: String,
}

/// Split `raw` into its three sections.
///
/// `plan` is the request's plan field. It is used as the recommendations when the model
/// omitted the primary separator entirely. `placeholders` fill any section left empty.
pub fn segment(raw: &str, placeholders: Placeholders, plan: Option<&str>) -> ParsedResult {

    if raw.trim().is_empty() {
        return ParsedResult {
            report: placeholders.report.to_string(),
            recommendations: placeholders.recommendations.to_string(),
            keywords: placeholders.keywords.to_string(),
        };
    }

    let (report, recommendations, keywords) = match PRIMARY_RE.find(raw) {
        Some(primary) => split_on_primary(raw, primary.range()),
        None => {
            let recommendations = plan.map(str::trim).filter(|p| !p.is_empty()).unwrap_or("");
            (raw, recommendations, "")
        }
    };

    ParsedResult {
        report: clean(report).unwrap_or_else(|| placeholders.report.to_string()),
        recommendations: clean(recommendations)
            .unwrap_or_else(|| placeholders.recommendations.to_string()),
        keywords: clean(keywords).unwrap_or_else(|| placeholders.keywords.to_string()),
    }
}

/// Returns `(report, recommendations, keywords)` slices once the primary separator is known.
fn split_on_primary(raw: &str, primary: Range<usize>) -> (&str, &str, &str) {
    let before = &raw[..primary.start];
    let after = &raw[primary.end..];

    if let Some(secondary) = SECONDARY_RE.find(after) {
        return (before, &after[..secondary.start()], &after[secondary.end()..]);
    }

    // Keywords block emitted ahead of the recommendations.
    if let Some(secondary) = SECONDARY_RE.find(before) {
        return (
            &before[..secondary.start()],
            after,
            &before[secondary.end()..],
        );
    }

    (before, after, "")
}

/// Strip any leftover separator tokens and surrounding whitespace.
fn clean(segment: &str) -> Option<String> {
    let without_primary = PRIMARY_RE.replace_all(segment, "");
    let cleaned = SECONDARY_RE.replace_all(&without_primary, "");
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{PlaceholderLanguage, ReportContext};
    use proptest::prelude::*;

    fn parts(result: &ParsedResult) -> (&str, &str, &str) {
        (
            result.report.as_str(),
            result.recommendations.as_str(),
            result.keywords.as_str(),
        )
    }

    #[test]
    fn test_well_formed_output_splits_into_three() {
        let result = segment(
            "Patient stable.---SEPARADOR---Monitor vitals.---KEYWORDS---stable, monitoring",
            ReportContext::ProgressNote.placeholders(),
            None,
        );
        assert_eq!(
            parts(&result),
            ("Patient stable.", "Monitor vitals.", "stable, monitoring")
        );
    }

    #[test]
    fn test_separators_on_own_lines_are_trimmed() {
        let raw = "Report body.\n\n---SEPARADOR---\n\nRest at home.\n---KEYWORDS---\nchest pain, ECG\n";
        let result = segment(raw, ReportContext::UrgentCare.placeholders(), None);
        assert_eq!(
            parts(&result),
            ("Report body.", "Rest at home.", "chest pain, ECG")
        );
    }

    #[test]
    fn test_tolerates_case_spacing_and_markdown() {
        let raw = "Report.\n**--- separador ---**\nPlan.\n** --- Keywords --- **\nfever, cough";
        let result = segment(raw, ReportContext::WardAdmission.placeholders(), None);
        assert_eq!(parts(&result), ("Report.", "Plan.", "fever, cough"));

        let raw = "Report.\n---SEPARATOR---\nPlan.\n---PALABRAS CLAVE---\nfiebre, tos";
        let result = segment(raw, ReportContext::WardAdmission.placeholders(), None);
        assert_eq!(parts(&result), ("Report.", "Plan.", "fiebre, tos"));
    }

    #[test]
    fn test_bare_word_separator_on_its_own_line() {
        let raw = "Report.\nSEPARADOR\nPlan.\nKeywords:\nsyncope, fall";
        let result = segment(raw, ReportContext::UrgentCare.placeholders(), None);
        assert_eq!(parts(&result), ("Report.", "Plan.", "syncope, fall"));
    }

    #[test]
    fn test_word_inside_prose_is_not_a_separator() {
        let raw = "The separator wall was intact.\nNo keywords were needed.";
        let result = segment(raw, ReportContext::UrgentCare.placeholders(), None);
        assert_eq!(result.report, raw);
        assert_eq!(
            result.recommendations,
            ReportContext::UrgentCare.placeholders().recommendations
        );
    }

    #[test]
    fn test_missing_secondary_leaves_keywords_placeholder() {
        let result = segment(
            "Report.---SEPARADOR---Recommendations.",
            ReportContext::UrgentCare.placeholders(),
            Some("ignored plan"),
        );
        assert_eq!(result.report, "Report.");
        assert_eq!(result.recommendations, "Recommendations.");
        assert_eq!(result.keywords, ReportContext::UrgentCare.placeholders().keywords);
    }

    #[test]
    fn test_missing_primary_uses_plan_field() {
        let result = segment(
            "Whole free text report.",
            ReportContext::WardAdmission.placeholders(),
            Some("  Admit to cardiology.  "),
        );
        assert_eq!(result.report, "Whole free text report.");
        assert_eq!(result.recommendations, "Admit to cardiology.");
        assert_eq!(result.keywords, ReportContext::WardAdmission.placeholders().keywords);
    }

    #[test]
    fn test_missing_primary_without_plan_uses_placeholder() {
        let placeholders = ReportContext::ProgressNote.placeholders();
        for plan in [None, Some("   ")] {
            let result = segment("Only a report.", placeholders, plan);
            assert_eq!(result.report, "Only a report.");
            assert_eq!(result.recommendations, placeholders.recommendations);
            assert_eq!(result.keywords, placeholders.keywords);
        }
    }

    #[test]
    fn test_secondary_without_primary_keeps_whole_text_as_report() {
        let result = segment(
            "Report text.\n---KEYWORDS---\nalpha, beta",
            ReportContext::UrgentCare.placeholders(),
            None,
        );
        assert_eq!(result.report, "Report text.\n\nalpha, beta");
        assert_eq!(result.keywords, ReportContext::UrgentCare.placeholders().keywords);
    }

    #[test]
    fn test_reordered_separators() {
        let result = segment(
            "Report.\n---KEYWORDS---\nalpha, beta\n---SEPARADOR---\nFollow up in clinic.",
            ReportContext::UrgentCare.placeholders(),
            None,
        );
        assert_eq!(
            parts(&result),
            ("Report.", "Follow up in clinic.", "alpha, beta")
        );
    }

    #[test]
    fn test_stray_repeated_tokens_are_removed() {
        let raw = "Report.\n---SEPARADOR---\nPlan.\n---SEPARADOR---\n---KEYWORDS---\na, b\n---KEYWORDS---";
        let result = segment(raw, ReportContext::UrgentCare.placeholders(), None);
        assert_eq!(result.report, "Report.");
        assert_eq!(result.recommendations, "Plan.");
        assert_eq!(result.keywords, "a, b");
    }

    #[test]
    fn test_empty_segments_become_placeholders() {
        let placeholders = ReportContext::WardAdmission.placeholders();
        for raw in ["---SEPARADOR---   ---KEYWORDS---", "---SEPARADOR--- ---KEYWORDS---"] {
            let result = segment(raw, placeholders, None);
            assert_eq!(result.report, placeholders.report);
            assert_eq!(result.recommendations, placeholders.recommendations);
            assert_eq!(result.keywords, placeholders.keywords);
        }
    }

    #[test]
    fn test_empty_input_yields_placeholders_not_plan() {
        let placeholders = ReportContext::UrgentCare.placeholders();
        let result = segment("  \n ", ReportContext::UrgentCare.placeholders(), Some("a plan"));
        assert_eq!(result.report, placeholders.report);
        assert_eq!(result.recommendations, placeholders.recommendations);
        assert_eq!(result.keywords, placeholders.keywords);
    }

    #[test]
    fn test_parsed_result_serialises_with_wire_names() {
        let result = segment(
            "a---SEPARADOR---b---KEYWORDS---c",
            ReportContext::UrgentCare.placeholders(),
            None,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"report": "a", "recommendations": "b", "keywords": "c"})
        );
    }

    #[test]
    fn test_separator_variants_split_into_three() {
        let cases = [
            "Report. - - - SEPARADOR - - - Plan. - - - KEYWORDS - - - a, b",
            "Report.\r\nSEPARADOR\r\nPlan.\r\nKEYWORDS\r\na, b",
            "Report.\r\n---SEPARADOR---\r\nPlan.\r\n---KEYWORDS---\r\na, b\r\n",
            "Report.\n---SEPARADOR\nPlan.\n---KEYWORDS\na, b",
            "Report. -- separator -- Plan. --key words-- a, b",
            "Report.\n— SEPARADOR —\nPlan.\n— PALABRAS CLAVE —\na, b",
        ];
        for raw in cases {
            let result = segment(raw, ReportContext::UrgentCare.placeholders(), Some("plan field"));
            assert_eq!(parts(&result), ("Report.", "Plan.", "a, b"), "{raw:?}");
        }
    }

    #[test]
    fn test_dashed_word_prefix_is_not_a_separator() {
        let raw = "Report --separadores were checked.";
        let result = segment(raw, ReportContext::UrgentCare.placeholders(), None);
        assert_eq!(result.report, raw);
    }

    #[test]
    fn test_placeholders_follow_requested_language() {
        let english = ReportContext::UrgentCare.placeholders_in(PlaceholderLanguage::English);
        let result = segment("Report only.", english, None);
        assert_eq!(result.recommendations, english.recommendations);
        assert_eq!(result.keywords, "Keywords could not be generated.");
    }

    proptest! {
        #[test]
        fn test_segments_are_never_empty(
            raw in ".{0,200}",
            plan in proptest::option::of(".{0,40}"),
            idx in 0usize..3,
        ) {
            let context = ReportContext::ALL[idx];
            let result = segment(&raw, context.placeholders(), plan.as_deref());
            prop_assert!(!result.report.trim().is_empty());
            prop_assert!(!result.recommendations.trim().is_empty());
            prop_assert!(!result.keywords.trim().is_empty());
        }

        #[test]
        fn test_delimited_segments_round_trip(
            report in "Report[a-z ,.]{0,40}",
            recs in "Plan[a-z ,.]{0,40}",
            keywords in "[a-z]{1,6}(, [a-z]{1,6}){0,6}",
        ) {
            let raw = format!("{report}\n---SEPARADOR---\n{recs}\n---KEYWORDS---\n{keywords}");
            let result = segment(&raw, ReportContext::UrgentCare.placeholders(), None);
            prop_assert_eq!(result.report, report.trim());
            prop_assert_eq!(result.recommendations, recs.trim());
            prop_assert_eq!(result.keywords, keywords);
        }
    }
}
