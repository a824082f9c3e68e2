// Labels of the block format the oracle uses for selections.
pub const TITLE_LABEL: &str = "TITLE:";
pub const SOURCE_LABEL: &str = "SOURCE:";
pub const RELEVANCE_LABEL: &str = "RELEVANCE:";
pub const LINK_LABEL: &str = "LINK:";
pub const BLOCK_SEPARATOR: &str = "---";

pub const DONT_TELL_ME: &str = r#"
Important instructions for your responses:

1. Do not narrate or describe your actions.
2. Do not summarize or restate the instructions I've given you.
3. Do not preface your responses with phrases like "Here is my selection..." or "I will now..."
4. Do not acknowledge or confirm that you understand these instructions.
5. Avoid phrases like "As an AI language model..." or similar self-referential statements.
"#;
