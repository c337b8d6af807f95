//! Static topic and subject reference data.
//!
//! Read-only for the life of the process; nothing here allocates until a
//! caller asks for owned output.

use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::AppError;

/// Topics offered in the topic browser.
pub const CLIMATE_TOPICS: [&str; 10] = [
    "Greenhouse Effect",
    "Carbon Footprint",
    "Renewable Energy",
    "Ocean Acidification",
    "Deforestation",
    "Climate Adaptation",
    "Weather vs Climate",
    "Biodiversity Loss",
    "Sustainable Living",
    "Climate Solutions",
];

/// Suggestions used when nothing more specific applies.
pub const DEFAULT_TOPICS: [&str; 3] = ["Greenhouse Effect", "Renewable Energy", "Sustainable Living"];

/// Maximum number of suggested follow-up topics per reply.
pub const MAX_SUGGESTIONS: usize = 3;

/// A subject area the tutor can focus on.
#[derive(Debug, Clone, Copy)]
pub struct Subject {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub topics: &'static [&'static str],
}

/// Owned, serializable view of a [`Subject`].
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubjectInfo {
    pub name: String,
    pub description: String,
    pub topics: Vec<String>,
}

impl From<&Subject> for SubjectInfo {
    fn from(s: &Subject) -> Self {
        Self {
            name: s.name.to_string(),
            description: s.description.to_string(),
            topics: s.topics.iter().map(|t| t.to_string()).collect(),
        }
    }
}

pub const SUBJECTS: [Subject; 5] = [
    Subject {
        id: "climate_science",
        name: "Climate Science",
        description: "Core climate science concepts and mechanisms",
        topics: &["Greenhouse Effect", "Global Warming", "Climate Models", "Atmospheric Science"],
    },
    Subject {
        id: "renewable_energy",
        name: "Renewable Energy",
        description: "Clean energy sources and technologies",
        topics: &["Solar Power", "Wind Energy", "Hydroelectric", "Geothermal Energy"],
    },
    Subject {
        id: "sustainability",
        name: "Sustainability",
        description: "Sustainable living and environmental practices",
        topics: &[
            "Carbon Footprint",
            "Sustainable Living",
            "Green Technology",
            "Environmental Conservation",
        ],
    },
    Subject {
        id: "climate_impacts",
        name: "Climate Impacts",
        description: "Effects of climate change on ecosystems and society",
        topics: &["Sea Level Rise", "Extreme Weather", "Biodiversity Loss", "Food Security"],
    },
    Subject {
        id: "climate_solutions",
        name: "Climate Solutions",
        description: "Actions and technologies to address climate change",
        topics: &["Carbon Capture", "Climate Adaptation", "Policy Solutions", "Individual Actions"],
    },
];

/// Keyword (matched against the lowercased message) → suggested topics.
const TOPIC_KEYWORDS: [(&str, &[&str]); 9] = [
    ("greenhouse", &["Carbon Footprint", "Renewable Energy"]),
    ("carbon", &["Greenhouse Effect", "Carbon Footprint"]),
    ("energy", &["Renewable Energy", "Sustainable Living"]),
    ("ocean", &["Ocean Acidification", "Biodiversity Loss"]),
    ("weather", &["Weather vs Climate", "Climate Adaptation"]),
    ("tree", &["Deforestation", "Biodiversity Loss"]),
    ("sustainable", &["Sustainable Living", "Climate Solutions"]),
    ("biodiversity", &["Biodiversity Loss", "Deforestation"]),
    ("adaptation", &["Climate Adaptation", "Climate Solutions"]),
];

/// Topic (lowercased) → related topics.
const TOPIC_GRAPH: [(&str, &[&str]); 10] = [
    ("greenhouse effect", &["Carbon Footprint", "Climate Solutions"]),
    ("carbon footprint", &["Greenhouse Effect", "Sustainable Living"]),
    ("renewable energy", &["Climate Solutions", "Sustainable Living"]),
    ("ocean acidification", &["Biodiversity Loss", "Climate Adaptation"]),
    ("deforestation", &["Biodiversity Loss", "Carbon Footprint"]),
    ("climate adaptation", &["Climate Solutions", "Weather vs Climate"]),
    ("weather vs climate", &["Climate Adaptation", "Greenhouse Effect"]),
    ("biodiversity loss", &["Deforestation", "Ocean Acidification"]),
    ("sustainable living", &["Carbon Footprint", "Renewable Energy"]),
    ("climate solutions", &["Renewable Energy", "Sustainable Living"]),
];

pub fn list_topics() -> &'static [&'static str] {
    &CLIMATE_TOPICS
}

pub fn list_subjects() -> &'static [Subject] {
    &SUBJECTS
}

pub fn topics_for_subject(id: &str) -> Result<&'static Subject, AppError> {
    SUBJECTS
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Subject '{}' not found", id)))
}

fn to_owned_topics(topics: &[&str]) -> Vec<String> {
    topics.iter().map(|t| t.to_string()).collect()
}

/// Follow-up topics for a learner message.
///
/// Every keyword contained in the lowercased message contributes its topics;
/// the union is deduplicated (first occurrence wins) and cut to three. With no
/// keyword match the default set is returned.
pub fn suggest_topics(message: &str) -> Vec<String> {
    let message = message.to_lowercase();
    let mut suggestions: Vec<&str> = Vec::new();

    for (keyword, topics) in TOPIC_KEYWORDS {
        if message.contains(keyword) {
            for &topic in topics {
                if !suggestions.contains(&topic) {
                    suggestions.push(topic);
                }
            }
        }
    }

    if suggestions.is_empty() {
        return to_owned_topics(&DEFAULT_TOPICS);
    }
    suggestions.truncate(MAX_SUGGESTIONS);
    to_owned_topics(&suggestions)
}

/// Related topics for `topic` (case-insensitive), or the default set.
pub fn related_topics(topic: &str) -> Vec<String> {
    let key = topic.trim().to_lowercase();
    TOPIC_GRAPH
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, related)| to_owned_topics(related))
        .unwrap_or_else(|| to_owned_topics(&DEFAULT_TOPICS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_topics() {
        assert_eq!(list_topics().len(), 10);
        assert!(list_topics().contains(&"Weather vs Climate"));
    }

    #[test]
    fn test_topics_for_subject_found() {
        let subject = topics_for_subject("renewable_energy").unwrap();
        assert_eq!(subject.name, "Renewable Energy");
        assert_eq!(subject.topics.len(), 4);
    }

    #[test]
    fn test_topics_for_subject_not_found() {
        let err = topics_for_subject("nonexistent").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_subject_ids_unique() {
        let mut ids: Vec<&str> = list_subjects().iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), SUBJECTS.len());
    }

    #[test]
    fn test_suggest_topics_keyword_match() {
        let topics = suggest_topics("What about the greenhouse effect and carbon footprint?");
        let allowed = [
            "Carbon Footprint",
            "Renewable Energy",
            "Greenhouse Effect",
            "Sustainable Living",
        ];
        assert!(!topics.is_empty());
        assert!(topics.len() <= 3);
        assert!(topics.iter().all(|t| allowed.contains(&t.as_str())));
    }

    #[test]
    fn test_suggest_topics_no_match_returns_default() {
        assert_eq!(
            suggest_topics("hello"),
            vec!["Greenhouse Effect", "Renewable Energy", "Sustainable Living"]
        );
    }

    #[test]
    fn test_suggest_topics_case_insensitive() {
        assert_eq!(
            suggest_topics("Why are OCEANS warming?"),
            vec!["Ocean Acidification", "Biodiversity Loss"]
        );
    }

    #[test]
    fn test_suggest_topics_bounded_and_unique() {
        let messages = [
            "",
            "greenhouse carbon energy ocean weather tree sustainable biodiversity adaptation",
            "trees and biodiversity",
            "sustainable energy adaptation",
        ];
        for msg in messages {
            let topics = suggest_topics(msg);
            assert!(topics.len() <= MAX_SUGGESTIONS, "too many for {:?}", msg);
            let mut deduped = topics.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(deduped.len(), topics.len(), "duplicates for {:?}", msg);
        }
    }

    #[test]
    fn test_related_topics() {
        assert_eq!(
            related_topics("Deforestation"),
            vec!["Biodiversity Loss", "Carbon Footprint"]
        );
        assert_eq!(related_topics("quantum foam"), DEFAULT_TOPICS.to_vec());
    }
}
