//! Climate tutor: prompt construction, model call, and the always-answer policy.
//!
//! `try_chat` / `try_explain` surface backend failures as `ProviderError` so
//! they can be tested; `chat` / `explain` are the public boundary and turn any
//! failure into a canned answer.

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::errors::ProviderError;
use crate::models::{ChatReply, ChatTurn, Explanation};
use crate::services::catalog;
use crate::services::llm::{ChatMessage, CompletionRequest, LanguageModel};

const PERSONA: &str = "\
You are ClimateBuddy, a patient and encouraging tutor for climate science.

Your job:
- Explain climate concepts in plain, accurate language grounded in current science.
- Match the learner's age, knowledge level and preferred language.
- Prefer local examples and everyday analogies, using the learner's location when it is known.
- Split complex ideas into small steps.
- Stay hopeful but honest about the challenges.
- Close every answer with one practical action the learner can take.

Pitch it by audience:
- Children (under 12): short words, simple analogies, vivid pictures.
- Teenagers (13-18): more scientific detail, still approachable.
- Adults: full explanations with scientific context.";

/// Suggestions attached to the canned chat reply.
const FALLBACK_CHAT_TOPICS: [&str; 3] = ["Greenhouse Effect", "Carbon Footprint", "Climate vs Weather"];

/// Canned explanations keyed by lowercased topic.
const FALLBACK_EXPLANATIONS: [(&str, &str); 4] = [
    (
        "greenhouse effect",
        "The greenhouse effect works like a blanket around Earth. Certain gases in the \
         atmosphere trap some of the sun's heat, which keeps the planet warm enough for life.",
    ),
    (
        "carbon footprint",
        "Your carbon footprint is the total amount of greenhouse gases, mostly carbon dioxide, \
         produced by the things you do. Driving, heating your home and the food you buy all add to it.",
    ),
    (
        "renewable energy",
        "Renewable energy comes from sources nature keeps refilling, such as sunlight, wind and \
         flowing water. Fossil fuels took millions of years to form and run out once burned.",
    ),
    (
        "climate change",
        "Climate change means long-term shifts in global temperatures and weather patterns. \
         The climate varies naturally, but since the 1800s burning fossil fuels has been the main driver.",
    ),
];

/// Sampling and length settings for model calls.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub temperature: f32,
    pub chat_max_tokens: u32,
    pub explain_max_tokens: u32,
}

impl From<&LlmConfig> for ModelSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            chat_max_tokens: config.chat_max_tokens,
            explain_max_tokens: config.explain_max_tokens,
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            chat_max_tokens: 500,
            explain_max_tokens: 600,
        }
    }
}

pub struct TutorEngine {
    model: Option<Arc<dyn LanguageModel>>,
    settings: ModelSettings,
}

impl TutorEngine {
    /// `model` is `None` when no backend is configured; every call then falls back.
    pub fn new(model: Option<Arc<dyn LanguageModel>>, settings: ModelSettings) -> Self {
        if model.is_none() {
            tracing::warn!("No language model configured, tutor will serve canned answers");
        }
        Self { model, settings }
    }

    fn model(&self) -> Result<&dyn LanguageModel, ProviderError> {
        self.model
            .as_deref()
            .ok_or(ProviderError::NotConfigured("language model backend"))
    }

    pub async fn try_chat(&self, turn: &ChatTurn) -> Result<ChatReply, ProviderError> {
        let request = CompletionRequest {
            messages: vec![
                ChatMessage::system(build_system_prompt(turn)),
                ChatMessage::user(turn.user_message.clone()),
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.chat_max_tokens,
        };

        let reply = self.model()?.complete(&request).await?;
        Ok(ChatReply {
            reply,
            suggested_topics: catalog::suggest_topics(&turn.user_message),
        })
    }

    /// Answer a learner turn. Never fails.
    pub async fn chat(&self, turn: &ChatTurn) -> ChatReply {
        match self.try_chat(turn).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Tutor chat falling back to canned reply: {}", e);
                fallback_reply(&turn.user_message)
            }
        }
    }

    pub async fn try_explain(
        &self,
        topic: &str,
        age_group: &str,
        knowledge_level: &str,
    ) -> Result<Explanation, ProviderError> {
        let prompt = format!(
            "Explain '{}' in climate science. Age group: {}, Knowledge level: {}. \
             Make it engaging and include practical examples.",
            topic, age_group, knowledge_level
        );
        let request = CompletionRequest {
            messages: vec![ChatMessage::system(PERSONA), ChatMessage::user(prompt)],
            temperature: self.settings.temperature,
            max_tokens: self.settings.explain_max_tokens,
        };

        let explanation = self.model()?.complete(&request).await?;
        Ok(Explanation {
            topic: topic.to_string(),
            explanation,
            related_topics: catalog::related_topics(topic),
        })
    }

    /// Explain a topic. Never fails.
    pub async fn explain(&self, topic: &str, age_group: &str, knowledge_level: &str) -> Explanation {
        match self.try_explain(topic, age_group, knowledge_level).await {
            Ok(explanation) => explanation,
            Err(e) => {
                tracing::warn!("Tutor explain for '{}' falling back: {}", topic, e);
                Explanation {
                    topic: topic.to_string(),
                    explanation: fallback_explanation(topic),
                    related_topics: catalog::related_topics(topic),
                }
            }
        }
    }
}

/// Persona followed by the learner profile for this turn.
pub fn build_system_prompt(turn: &ChatTurn) -> String {
    let mut prompt = format!(
        "{}\n\nLearner profile:\n- Age group: {}\n- Knowledge level: {}\n- Language: {}\n- Subject focus: {}",
        PERSONA, turn.age_group, turn.knowledge_level, turn.language, turn.subject
    );
    if let Some(location) = turn.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        prompt.push_str(&format!("\n- Location: {}", location));
    }
    prompt.push_str(&format!(
        "\n\nAdapt your answer to this learner and keep it focused on {}.",
        turn.subject
    ));
    prompt
}

fn fallback_reply(user_message: &str) -> ChatReply {
    let reply = format!(
        "Hi, I'm ClimateBuddy, your climate science tutor.\n\n\
         You asked: \"{}\"\n\n\
         My AI service is having trouble right now, but here are a few ideas to get you started:\n\n\
         - Climate vs weather: weather is what happens outside today; climate is the long-term \
         pattern of weather in a place.\n\
         - Greenhouse effect: some gases in the atmosphere trap the sun's heat and keep Earth warm \
         enough for life.\n\
         - What you can do: learn about your carbon footprint. Small daily changes add up.\n\n\
         Please try again in a moment, or explore the dashboard for live climate data.",
        user_message.trim()
    );
    ChatReply {
        reply,
        suggested_topics: FALLBACK_CHAT_TOPICS.iter().map(|t| t.to_string()).collect(),
    }
}

fn fallback_explanation(topic: &str) -> String {
    let key = topic.trim().to_lowercase();
    FALLBACK_EXPLANATIONS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, text)| text.to_string())
        .unwrap_or_else(|| {
            format!(
                "{} is an important idea for understanding how our planet works. \
                 A detailed explanation isn't available right now, so try the interactive \
                 dashboard to explore live climate data and trends.",
                topic.trim()
            )
        })
}
