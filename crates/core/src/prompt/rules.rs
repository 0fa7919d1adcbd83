//! Invariant rule blocks.
//!
//! These are composed verbatim, in this order, into every prompt regardless of context.

/// A named, static prompt fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleBlock {
    pub name: &'static str,
    pub text: &'static str,
}

pub const NON_FABRICATION: RuleBlock = RuleBlock {
    name: "non-fabrication",
    text: "GOLDEN RULE (NEVER BREAK IT): Never invent, infer or embellish clinical data. \
Use only the information supplied below. When an item was not supplied, leave it out \
entirely and do not remark on its absence.",
};

pub const STYLE: RuleBlock = RuleBlock {
    name: "style",
    text: "STYLE RULES:\n\
1. Write in a professional, narrative clinical register. Be concise and direct.\n\
2. Standard clinical abbreviations are allowed (for example BP, HR, SpO2, ECG).\n\
3. Output plain text only: no Markdown, HTML, bold, italics, headings or bullet symbols.\n\
4. Stay strictly within the data provided. No greetings, introductions or closing remarks.",
};

pub const OUTPUT_FORMAT: RuleBlock = RuleBlock {
    name: "output-format",
    text: "OUTPUT FORMAT (MANDATORY): The response must contain exactly two separator lines, \
in this order, each on a line of its own:\n\
---SEPARADOR---\n\
---KEYWORDS---\n\
They divide the response into three blocks:\n\
BLOCK 1, before ---SEPARADOR---: the main report.\n\
BLOCK 2, between ---SEPARADOR--- and ---KEYWORDS---: recommendations and plan.\n\
BLOCK 3, after ---KEYWORDS---: a single line of 5 to 7 comma-separated keywords that \
summarise the case.\n\
Write nothing outside these three blocks.",
};

/// All rule blocks in composition order.
pub const RULE_BLOCKS: [RuleBlock; 3] = [NON_FABRICATION, STYLE, OUTPUT_FORMAT];
