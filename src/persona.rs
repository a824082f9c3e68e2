use serde::Serialize;

/// A named audience profile used as the relevance criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Persona {
    pub name: String,
    pub description: String,
    pub keywords: Vec<String>,
}

impl Persona {
    pub fn new(name: &str, description: &str, keywords: &[&str]) -> Self {
        Persona {
            name: name.to_string(),
            description: description.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// The fixed set of personas curation can target.
    pub fn catalog() -> Vec<Persona> {
        vec![
            Persona::new(
                "Developers and Programmers",
                "For developers building AI applications",
                &["python", "api", "framework", "code", "algorithm", "tool", "library", "sdk"],
            ),
            Persona::new(
                "Investors and Venture Capitalists",
                "For investors tracking AI company news",
                &["startup", "funding", "investment", "market", "growth", "valuation", "series"],
            ),
            Persona::new(
                "Students and Researchers",
                "For academics and researchers",
                &["paper", "research", "study", "experiment", "model", "dataset", "breakthrough"],
            ),
            Persona::new(
                "Founders and Business Leaders",
                "For leaders deciding how AI changes their products and teams",
                &["strategy", "product", "launch", "enterprise", "pricing", "partnership", "regulation"],
            ),
            Persona::new(
                "Healthcare Professionals",
                "For clinicians and health researchers following medical AI",
                &["clinical", "diagnosis", "medical", "patient", "drug", "imaging", "fda"],
            ),
            Persona::new(
                "Designers and Creative Professionals",
                "For designers and artists working with generative tools",
                &["image", "design", "creative", "video", "art", "generative", "interface"],
            ),
            Persona::new(
                "Journalists and Media Professionals",
                "For reporters covering AI and its impact",
                &["policy", "misinformation", "copyright", "ethics", "announcement", "lawsuit"],
            ),
            Persona::new(
                "Marketing and Advertising Professionals",
                "For marketers applying AI to campaigns and content",
                &["marketing", "advertising", "content", "customer", "personalization", "brand"],
            ),
        ]
    }

    /// Case-insensitive lookup in `personas`.
    pub fn find<'a>(personas: &'a [Persona], name: &str) -> Option<&'a Persona> {
        let name = name.trim();
        personas
            .iter()
            .find(|persona| persona.name.eq_ignore_ascii_case(name))
    }

    /// The persona as a prompt criterion: name, description and keywords.
    pub fn criterion(&self) -> String {
        if self.keywords.is_empty() {
            format!("{} ({})", self.name, self.description)
        } else {
            format!(
                "{} ({}; interested in: {})",
                self.name,
                self.description,
                self.keywords.join(", ")
            )
        }
    }
}
