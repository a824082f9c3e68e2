use crate::persona::Persona;

/// Generate a yes/no prompt asking whether one article matters to a persona
pub fn relevance_prompt(title: &str, summary: &str, persona: &Persona) -> String {
    format!(
        r#"Classify if this article is relevant to {name}.

Audience: {criterion}

Article Title: {title}
Article Summary: {summary}

Is this article relevant to {name}? Answer with ONLY "yes" or "no":"#,
        name = persona.name,
        criterion = persona.criterion(),
        title = title,
        summary = summary,
    )
}
