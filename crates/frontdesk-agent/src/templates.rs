//! Persona, prompt and greeting for a voice-agent session.

use chrono::NaiveDate;
use frontdesk_knowledge::KnowledgeBase;
use frontdesk_types::voice::voice_name_from_model;
use std::collections::BTreeMap;

pub const DEFAULT_INDUSTRY: &str = "indivillage";
pub const DEFAULT_COMPANY: &str = "IndiVillage Tech Solutions";

const PERSONALITY: &str = include_str!("../prompts/personality.txt");
const GUIDANCE: &str = include_str!("../prompts/guidance.txt");
const COMPANY: &str = include_str!("../prompts/company.txt");
const CUSTOMER_SERVICE: &str = include_str!("../prompts/customer_service.txt");

/// Industries a session can be started for, keyed by id.
pub fn available_industries() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([(DEFAULT_INDUSTRY, DEFAULT_COMPANY)])
}

/// Values substituted into the prompt text.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub company: String,
    /// Summary of the knowledge base, may be empty.
    pub documentation: String,
    pub today: NaiveDate,
}

impl PromptContext {
    pub fn new(company: impl Into<String>, titles: &[String]) -> Self {
        let documentation = if titles.is_empty() {
            String::new()
        } else {
            format!("Available documentation topics: {}", titles.join(", "))
        };
        Self {
            company: company.into(),
            documentation,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Lists the article titles in `kb`. A read failure still yields a usable
    /// prompt that mentions the knowledge base.
    pub fn from_knowledge_base(company: &str, kb: &KnowledgeBase) -> Self {
        match kb.read_all() {
            Ok(entries) => {
                let titles: Vec<String> = entries.into_iter().map(|entry| entry.title).collect();
                Self::new(company, &titles)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not list knowledge base for prompt");
                Self::without_listing(company)
            }
        }
    }

    /// Context for when the article titles cannot be listed.
    pub fn without_listing(company: &str) -> Self {
        let mut context = Self::new(company, &[]);
        context.documentation = format!("{} knowledge base available", company);
        context
    }

    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

/// Rendered persona for one session.
#[derive(Debug, Clone)]
pub struct AgentTemplates {
    pub industry: String,
    pub company: String,
    pub voice_model: String,
    pub voice_name: String,
    pub personality: String,
    pub prompt: String,
    pub greeting: String,
}

impl AgentTemplates {
    /// Builds the templates. Unknown industries fall back to the default
    /// one, and an empty `voice_name` is derived from `voice_model`.
    pub fn new(
        industry: &str,
        voice_model: &str,
        voice_name: &str,
        context: &PromptContext,
    ) -> Self {
        if industry != DEFAULT_INDUSTRY {
            tracing::debug!(industry, "unsupported industry, using default");
        }
        let voice_name = if voice_name.is_empty() {
            voice_name_from_model(voice_model)
        } else {
            voice_name.to_string()
        };
        let company = context.company.as_str();
        let current_date = context.today.format("%A, %B %d, %Y").to_string();

        let personality = PERSONALITY
            .trim_end()
            .replace("{voice_name}", &voice_name)
            .replace("{company}", company);
        let guidance = GUIDANCE.trim_end().replace("{company}", company);
        let company_prompt = COMPANY
            .trim_end()
            .replace("{company}", company)
            .replace("{documentation}", &context.documentation);
        let customer_service = CUSTOMER_SERVICE
            .trim_end()
            .replace("{current_date}", &current_date);

        let prompt = [
            personality.as_str(),
            guidance.as_str(),
            company_prompt.as_str(),
            customer_service.as_str(),
        ]
        .join("\n\n");

        Self {
            industry: DEFAULT_INDUSTRY.to_string(),
            company: company.to_string(),
            voice_model: voice_model.to_string(),
            greeting: format!(
                "Hey! I'm {} voice assistant, How may I assist you today?",
                company
            ),
            voice_name,
            personality,
            prompt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(titles: &[String]) -> PromptContext {
        PromptContext::new(DEFAULT_COMPANY, titles)
            .with_date(NaiveDate::from_ymd_opt(2030, 6, 5).unwrap())
    }

    #[test]
    fn unknown_industry_is_coerced() {
        let templates = AgentTemplates::new("retail", "aura-2-thalia-en", "", &context(&[]));
        assert_eq!(templates.industry, "indivillage");
        assert_eq!(templates.company, "IndiVillage Tech Solutions");
    }

    #[test]
    fn voice_name_derives_from_model_unless_given() {
        let derived = AgentTemplates::new("indivillage", "aura-2-thalia-en", "", &context(&[]));
        assert_eq!(derived.voice_name, "Thalia");
        assert!(derived.personality.starts_with("You are Thalia, "));

        let given = AgentTemplates::new("indivillage", "aura-2-thalia-en", "Maya", &context(&[]));
        assert_eq!(given.voice_name, "Maya");
    }

    #[test]
    fn prompt_sections_in_order() {
        let titles = vec!["Company Overview".to_string(), "Leadership Team".to_string()];
        let templates = AgentTemplates::new("indivillage", "aura-2-thalia-en", "", &context(&titles));
        let prompt = &templates.prompt;

        let personality = prompt.find("You are Thalia").unwrap();
        let guidance = prompt.find("CHOOSING FUNCTIONS").unwrap();
        let docs = prompt
            .find("Available documentation topics: Company Overview, Leadership Team")
            .unwrap();
        let date = prompt.find("Today is Wednesday, June 05, 2030.").unwrap();
        assert!(personality < guidance && guidance < docs && docs < date);
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn greeting_names_company() {
        let templates = AgentTemplates::new("indivillage", "aura-2-thalia-en", "", &context(&[]));
        assert_eq!(
            templates.greeting,
            "Hey! I'm IndiVillage Tech Solutions voice assistant, How may I assist you today?"
        );
    }

    #[test]
    fn empty_knowledge_base_leaves_documentation_blank() {
        let dir = tempfile::tempdir().unwrap();
        let kb = KnowledgeBase::open(dir.path()).unwrap();
        let context = PromptContext::from_knowledge_base(DEFAULT_COMPANY, &kb);
        assert!(context.documentation.is_empty());
    }

    #[test]
    fn unlisted_knowledge_base_is_still_mentioned() {
        let context = PromptContext::without_listing(DEFAULT_COMPANY);
        assert_eq!(
            context.documentation,
            "IndiVillage Tech Solutions knowledge base available"
        );
    }

    #[test]
    fn industries_map() {
        let industries = available_industries();
        assert_eq!(industries.len(), 1);
        assert_eq!(industries["indivillage"], "IndiVillage Tech Solutions");
    }
}
