//! Prompt composition.
//!
//! A prompt is built from four parts, always in this order:
//! - a role and task statement specific to the [`ReportContext`]
//! - the invariant rule blocks from [`rules`]
//! - the output language instruction
//! - the serialised patient data
//!
//! Only fields that are present are serialised. Absent fields leave no trace in the prompt,
//! so the model has nothing to echo back about them.

pub mod rules;

use std::fmt;

use crate::context::ReportContext;
use crate::fields::{Field, PatientFields};

/// A fully composed prompt, ready to send to a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptText(String);

impl PromptText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PromptText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PromptText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

type Serializer = fn(&PatientFields) -> String;

/// Static per-context template.
struct ContextTemplate {
    role: &'static str,
    task: &'static str,
    serialize: Serializer,
}

const URGENT_CARE: ContextTemplate = ContextTemplate {
    role: "You are an emergency physician writing the clinical report of an emergency \
department visit.",
    task: "Write the emergency report from the patient data below, followed by the discharge \
recommendations and the keywords.",
    serialize: serialize_labeled,
};

const WARD_ADMISSION: ContextTemplate = ContextTemplate {
    role: "You are a hospital ward physician writing the admission report of a patient \
admitted to the ward.",
    task: "Write the admission report from the patient data below, followed by the admission \
plan and the keywords.",
    serialize: serialize_labeled,
};

const PROGRESS_NOTE: ContextTemplate = ContextTemplate {
    role: "You are a hospital ward physician writing the daily progress note of an inpatient.",
    task: "Write a brief progress note from the clinical information below, followed by the \
plan and the keywords.",
    serialize: serialize_progress_prose,
};

fn template_for(context: ReportContext) -> &'static ContextTemplate {
    match context {
        ReportContext::UrgentCare => &URGENT_CARE,
        ReportContext::WardAdmission => &WARD_ADMISSION,
        ReportContext::ProgressNote => &PROGRESS_NOTE,
    }
}

const PROGRESS_SCOPE_NOTE: &str = "Only the details above were supplied; do not mention or \
speculate about any other aspect of the patient's course.";

/// Builds prompts for every report context.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    language: String,
}

impl PromptComposer {
    /// Create a composer that instructs the model to answer in `language`.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    /// Compose the prompt for `context` from normalised patient fields.
    ///
    /// Composition is total: every context has a template, and an empty field set still
    /// yields a well-formed prompt.
    pub fn compose(&self, context: ReportContext, fields: &PatientFields) -> PromptText {
        let template = template_for(context);

        let mut sections: Vec<String> = Vec::with_capacity(7);
        sections.push(template.role.to_string());
        sections.push(template.task.to_string());
        sections.extend(rules::RULE_BLOCKS.iter().map(|block| block.text.to_string()));
        sections.push(format!(
            "Write the entire response in {}.",
            self.language.trim()
        ));

        let data = (template.serialize)(fields);
        if !data.is_empty() {
            sections.push(data);
        }

        PromptText(sections.join("\n\n"))
    }
}

/// Labeled block used by the urgent care and ward admission templates.
fn serialize_labeled(fields: &PatientFields) -> String {
    if fields.is_empty() {
        return String::new();
    }

    let mut out = String::from("PATIENT DATA (use only these values):");
    for (field, value) in fields.iter() {
        out.push_str("\n- ");
        out.push_str(field.label());
        out.push_str(": ");
        out.push_str(value.as_str());
    }
    out
}

/// Prose paragraph used by the progress note template.
///
/// Demographics are never included, even if present in the field set.
fn serialize_progress_prose(fields: &PatientFields) -> String {
    const SENTENCES: [(Field, &str); 3] = [
        (Field::Status, "The patient's current status is:"),
        (Field::IntervalEvents, "Relevant events since the last note:"),
        (Field::Plan, "The plan for the day is:"),
    ];

    let mut sentences = Vec::new();
    let mut any_absent = false;
    for (field, lead) in SENTENCES {
        match fields.get(field) {
            Some(value) => sentences.push(format!("{lead} {}", close_sentence(value.as_str()))),
            None => any_absent = true,
        }
    }

    if sentences.is_empty() {
        return String::new();
    }

    let mut out = String::from("CLINICAL INFORMATION:\n");
    out.push_str(&sentences.join(" "));
    if any_absent {
        out.push(' ');
        out.push_str(PROGRESS_SCOPE_NOTE);
    }
    out
}

fn close_sentence(value: &str) -> String {
    let value = value.trim();
    if value.ends_with(['.', '!', '?']) {
        value.to_string()
    } else {
        format!("{value}.")
    }
}
