//! Field normalisation.
//!
//! Intake forms name their inputs after the form section they live in (`urg-motivo`,
//! `evo-estado`, ...) and those names have drifted over time. This module maps whatever the
//! form sent onto a fixed set of canonical [`Field`]s:
//!
//! 1. keys are lower-cased, `_` and spaces become `-`;
//! 2. the context's form prefix is stripped;
//! 3. each canonical field takes the first non-blank value among its aliases, in order.
//!
//! Blank values are absent. Keys matching no alias are ignored. The alias and prefix tables
//! are configuration ([`FieldAliases`]); the built-in defaults can be overridden from YAML.

use std::collections::BTreeMap;
use std::path::Path;

use axiom_types::NonEmptyText;
use serde::{Deserialize, Serialize};

use crate::context::ReportContext;
use crate::{ReportError, ReportResult};

/// Canonical clinical intake fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Age,
    Sex,
    Pregnancy,
    DateTime,
    ChiefComplaint,
    PresentIllness,
    Background,
    UsualMedication,
    Vitals,
    PhysicalExam,
    TestResults,
    WorkingDiagnosis,
    Plan,
    Status,
    IntervalEvents,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::Name,
        Field::Age,
        Field::Sex,
        Field::Pregnancy,
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
        Field::Status,
        Field::IntervalEvents,
    ];

    /// Configuration key of the field (as used in alias override files).
    pub fn key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Age => "age",
            Field::Sex => "sex",
            Field::Pregnancy => "pregnancy",
            Field::DateTime => "date_time",
            Field::ChiefComplaint => "chief_complaint",
            Field::PresentIllness => "present_illness",
            Field::Background => "background",
            Field::UsualMedication => "usual_medication",
            Field::Vitals => "vitals",
            Field::PhysicalExam => "physical_exam",
            Field::TestResults => "test_results",
            Field::WorkingDiagnosis => "working_diagnosis",
            Field::Plan => "plan",
            Field::Status => "status",
            Field::IntervalEvents => "interval_events",
        }
    }

    /// Label used when the field is serialised into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Age => "Age",
            Field::Sex => "Sex",
            Field::Pregnancy => "Pregnancy",
            Field::DateTime => "Date and time",
            Field::ChiefComplaint => "Presenting complaint",
            Field::PresentIllness => "History of present illness",
            Field::Background => "Past medical history",
            Field::UsualMedication => "Usual medication",
            Field::Vitals => "Vital signs and triage",
            Field::PhysicalExam => "Physical examination",
            Field::TestResults => "Investigations",
            Field::WorkingDiagnosis => "Working diagnosis",
            Field::Plan => "Immediate plan",
            Field::Status => "Current status",
            Field::IntervalEvents => "Interval events",
        }
    }

    fn default_aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Name => &["name", "nombre"],
            Field::Age => &["age", "edad"],
            Field::Sex => &["sex", "sexo"],
            Field::Pregnancy => &["pregnancy", "embarazo"],
            Field::DateTime => &["date-time", "fecha-hora", "fecha"],
            Field::ChiefComplaint => &[
                "chief-complaint",
                "motivo",
                "motivo-consulta",
                "motivo-ingreso",
            ],
            Field::PresentIllness => &[
                "present-illness",
                "history",
                "historia",
                "enfermedad-actual",
            ],
            Field::Background => &["background", "antecedentes"],
            Field::UsualMedication => &[
                "usual-medication",
                "tratamiento-habitual",
                "medicacion",
            ],
            Field::Vitals => &["vitals", "triaje", "constantes"],
            Field::PhysicalExam => &["physical-exam", "exploracion", "exploracion-fisica"],
            Field::TestResults => &["test-results", "pruebas", "pruebas-complementarias"],
            Field::WorkingDiagnosis => &[
                "working-diagnosis",
                "sospecha",
                "juicio-clinico",
                "diagnostico",
            ],
            Field::Plan => &["plan", "plan-inmediato", "plan-terapeutico"],
            Field::Status => &["status", "estado", "estado-actual"],
            Field::IntervalEvents => &[
                "interval-events",
                "eventos",
                "eventos-relevantes",
                "incidencias",
            ],
        }
    }
}

fn default_prefixes(context: ReportContext) -> &'static [&'static str] {
    match context {
        ReportContext::UrgentCare => &["urg-", "urgencias-"],
        ReportContext::WardAdmission => &["pla-", "planta-"],
        ReportContext::ProgressNote => &["evo-", "evolutivo-"],
    }
}

/// Lower-case a source key and unify its separators.
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| match c {
            '_' | ' ' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Prefix and alias tables driving normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAliases {
    prefixes: BTreeMap<ReportContext, Vec<String>>,
    aliases: BTreeMap<Field, Vec<String>>,
}

/// On-disk shape of an alias override file. Every section is optional; entries present
/// replace the defaults for that context or field only.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AliasOverrides {
    #[serde(default)]
    prefixes: BTreeMap<ReportContext, Vec<String>>,
    #[serde(default)]
    aliases: BTreeMap<Field, Vec<String>>,
}

impl Default for FieldAliases {
    fn default() -> Self {
        let prefixes = ReportContext::ALL
            .iter()
            .map(|c| (*c, to_owned_list(default_prefixes(*c))))
            .collect();
        let aliases = Field::ALL
            .iter()
            .map(|f| (*f, to_owned_list(f.default_aliases())))
            .collect();
        Self { prefixes, aliases }
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl FieldAliases {
    /// Parse a YAML override document and merge it over the defaults.
    ///
    /// ```yaml
    /// prefixes:
    ///   ward-admission: [pla-, ing-]
    /// aliases:
    ///   chief_complaint: [motivo, motivo-de-consulta]
    /// ```
    ///
    /// # Errors
    /// Returns an error if the document is not valid YAML for this shape, or if any alias list
    /// is empty or contains a blank entry.
    pub fn from_yaml_str(yaml: &str) -> ReportResult<Self> {
        let overrides: AliasOverrides =
            serde_yaml::from_str(yaml).map_err(ReportError::AliasFileParse)?;

        let mut table = Self::default();
        for (context, prefixes) in overrides.prefixes {
            let prefixes = prefixes
                .iter()
                .map(|p| normalize_key(p))
                .filter(|p| !p.is_empty())
                .collect();
            table.prefixes.insert(context, prefixes);
        }
        for (field, aliases) in overrides.aliases {
            let aliases: Vec<String> = aliases.iter().map(|a| normalize_key(a)).collect();
            if aliases.is_empty() || aliases.iter().any(|a| a.is_empty()) {
                return Err(ReportError::Configuration(format!(
                    "alias list for field '{}' must contain only non-empty names",
                    field.key()
                )));
            }
            table.aliases.insert(field, aliases);
        }
        Ok(table)
    }

    /// Read and parse an override file.
    pub fn from_yaml_file(path: &Path) -> ReportResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(ReportError::AliasFileRead)?;
        Self::from_yaml_str(&contents)
    }

    pub fn prefixes_for(&self, context: ReportContext) -> &[String] {
        self.prefixes.get(&context).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn aliases_for(&self, field: Field) -> &[String] {
        self.aliases.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Normalised, non-blank patient fields for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientFields(BTreeMap<Field, NonEmptyText>);

impl PatientFields {
    pub fn get(&self, field: Field) -> Option<&NonEmptyText> {
        self.0.get(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &NonEmptyText)> {
        self.0.iter().map(|(f, v)| (*f, v))
    }
}

impl FromIterator<(Field, NonEmptyText)> for PatientFields {
    fn from_iter<I: IntoIterator<Item = (Field, NonEmptyText)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Map raw form fields onto the canonical fields of `context`.
pub fn normalize_fields(
    context: ReportContext,
    raw: &BTreeMap<String, String>,
    table: &FieldAliases,
) -> PatientFields {
    let prefixes = table.prefixes_for(context);

    let mut by_key: BTreeMap<String, NonEmptyText> = BTreeMap::new();
    for (key, value) in raw {
        let Some(value) = NonEmptyText::present(value) else {
            continue;
        };
        let key = normalize_key(key);
        let key = prefixes
            .iter()
            .find_map(|p| key.strip_prefix(p.as_str()))
            .map(str::to_string)
            .unwrap_or(key);
        by_key.entry(key).or_insert(value);
    }

    context
        .fields()
        .iter()
        .filter_map(|field| {
            table
                .aliases_for(*field)
                .iter()
                .find_map(|alias| by_key.get(alias))
                .map(|value| (*field, render_value(*field, value)))
        })
        .collect()
}

fn render_value(field: Field, value: &NonEmptyText) -> NonEmptyText {
    match field {
        Field::DateTime => render_form_datetime(value.as_str())
            .and_then(NonEmptyText::present)
            .unwrap_or_else(|| value.clone()),
        _ => value.clone(),
    }
}

/// Render an HTML `datetime-local` value as `DD/MM/YYYY HH:MM`.
fn render_form_datetime(value: &str) -> Option<String> {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_key_unifies_case_and_separators() {
        assert_eq!(normalize_key(" URG_Fecha Hora "), "urg-fecha-hora");
    }

    #[test]
    fn test_normalize_strips_context_prefix() {
        let fields = normalize_fields(
            ReportContext::UrgentCare,
            &raw(&[("urg-motivo", "chest pain"), ("urg-edad", "67")]),
            &FieldAliases::default(),
        );
        assert_eq!(fields.get(Field::ChiefComplaint).unwrap().as_str(), "chest pain");
        assert_eq!(fields.get(Field::Age).unwrap().as_str(), "67");
    }

    #[test]
    fn test_normalize_ignores_other_context_prefix() {
        let fields = normalize_fields(
            ReportContext::ProgressNote,
            &raw(&[("urg-estado", "stable")]),
            &FieldAliases::default(),
        );
        assert!(fields.is_empty());
    }

    #[test]
    fn test_normalize_picks_first_non_empty_alias_in_priority_order() {
        let fields = normalize_fields(
            ReportContext::ProgressNote,
            &raw(&[
                ("evo-status", "   "),
                ("evo-estado", "afebrile, improving"),
                ("evo-estado-actual", "should lose"),
            ]),
            &FieldAliases::default(),
        );
        assert_eq!(fields.get(Field::Status).unwrap().as_str(), "afebrile, improving");
    }

    #[test]
    fn test_normalize_treats_blank_as_absent() {
        let fields = normalize_fields(
            ReportContext::WardAdmission,
            &raw(&[("pla-plan", " \n\t "), ("pla-antecedentes", "  HTN  ")]),
            &FieldAliases::default(),
        );
        assert!(!fields.contains(Field::Plan));
        assert_eq!(fields.get(Field::Background).unwrap().as_str(), "HTN");
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_normalize_only_keeps_fields_of_the_context() {
        let fields = normalize_fields(
            ReportContext::ProgressNote,
            &raw(&[("nombre", "Jane"), ("plan", "discharge tomorrow")]),
            &FieldAliases::default(),
        );
        assert!(!fields.contains(Field::Name));
        assert!(fields.contains(Field::Plan));
    }

    #[test]
    fn test_normalize_renders_form_datetime() {
        let fields = normalize_fields(
            ReportContext::UrgentCare,
            &raw(&[("urg-fecha-hora", "2024-03-05T09:07")]),
            &FieldAliases::default(),
        );
        assert_eq!(fields.get(Field::DateTime).unwrap().as_str(), "05/03/2024 09:07");
    }

    #[test]
    fn test_normalize_keeps_free_text_datetime() {
        let fields = normalize_fields(
            ReportContext::UrgentCare,
            &raw(&[("date_time", "this morning")]),
            &FieldAliases::default(),
        );
        assert_eq!(fields.get(Field::DateTime).unwrap().as_str(), "this morning");
    }

    #[test]
    fn test_yaml_overrides_replace_only_listed_entries() {
        let table = FieldAliases::from_yaml_str(
            "prefixes:\n  ward-admission: [ING_]\naliases:\n  chief_complaint: [Reason]\n",
        )
        .unwrap();

        assert_eq!(table.prefixes_for(ReportContext::WardAdmission), &["ing-".to_string()]);
        assert_eq!(table.aliases_for(Field::ChiefComplaint), &["reason".to_string()]);
        assert_eq!(
            table.aliases_for(Field::Plan),
            FieldAliases::default().aliases_for(Field::Plan)
        );

        let fields = normalize_fields(
            ReportContext::WardAdmission,
            &raw(&[("ing-reason", "dyspnoea"), ("ing-motivo", "ignored")]),
            &table,
        );
        assert_eq!(fields.get(Field::ChiefComplaint).unwrap().as_str(), "dyspnoea");
    }

    #[test]
    fn test_key_matches_serde_name() {
        for field in Field::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.key()));
        }
    }

    #[test]
    fn test_yaml_rejects_empty_alias_list() {
        let err = FieldAliases::from_yaml_str("aliases:\n  plan: []\n").expect_err("empty list");
        assert!(matches!(err, ReportError::Configuration(msg) if msg.contains("plan")));
    }

    #[test]
    fn test_yaml_rejects_unknown_field() {
        let err = FieldAliases::from_yaml_str("aliases:\n  shoe_size: [talla]\n")
            .expect_err("unknown field");
        assert!(matches!(err, ReportError::AliasFileParse(_)));
    }

    #[test]
    fn test_from_yaml_file_reads_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases.yaml");
        std::fs::write(&path, "aliases:\n  status: [situacion]\n").unwrap();

        let table = FieldAliases::from_yaml_file(&path).unwrap();
        assert_eq!(table.aliases_for(Field::Status), &["situacion".to_string()]);
    }

    #[test]
    fn test_from_yaml_file_missing_file() {
        let err = FieldAliases::from_yaml_file(Path::new("/nonexistent/aliases.yaml"))
            .expect_err("missing file");
        assert!(matches!(err, ReportError::AliasFileRead(_)));
    }
}
