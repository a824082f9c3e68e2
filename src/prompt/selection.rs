use super::common::{
    BLOCK_SEPARATOR, DONT_TELL_ME, LINK_LABEL, RELEVANCE_LABEL, SOURCE_LABEL, TITLE_LABEL,
};
use crate::article::Article;
use crate::persona::Persona;

/// Upper bound on candidates placed in one selection prompt.
pub const MAX_SELECTION_CANDIDATES: usize = 15;

/// Generate a prompt asking the oracle to pick the `count` most relevant
/// candidates and emit them in the labeled block format.
pub fn selection_prompt(candidates: &[Article], persona: &Persona, count: usize) -> String {
    let articles_text = candidates
        .iter()
        .take(MAX_SELECTION_CANDIDATES)
        .map(|a| {
            format!(
                "Title: {}\nSource: {}\nSummary: {}\nLink: {}",
                a.title, a.source, a.summary, a.link
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are an AI news curator. Filter these {total} real AI news articles
and select the TOP {count} most relevant for: {name}

Audience: {criterion}

Articles:
{articles}

For each selected article, output EXACTLY this format:

{title_label} [headline]
{source_label} [source name]
{relevance_label} [brief explanation of why this is relevant to {name}]
{link_label} [exact URL from the article]
{separator}

Select {count} articles that matter most to {name}. Be selective and relevant.
{dont_tell_me}"#,
        total = candidates.len().min(MAX_SELECTION_CANDIDATES),
        count = count,
        name = persona.name,
        criterion = persona.criterion(),
        articles = articles_text,
        title_label = TITLE_LABEL,
        source_label = SOURCE_LABEL,
        relevance_label = RELEVANCE_LABEL,
        link_label = LINK_LABEL,
        separator = BLOCK_SEPARATOR,
        dont_tell_me = DONT_TELL_ME,
    )
}
