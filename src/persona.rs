//! Assistant personas
//!
//! Each persona maps deterministically to a system-instruction template
//! parameterized by the user's display name. The template wording is part of
//! the user-visible behavioral contract: changing it changes how the
//! assistant speaks, so the text is kept verbatim.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A fixed, named behavioral profile for the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Persona {
    PersonalAssistant,
    Girlfriend,
    Boyfriend,
    TechnologySpecialist,
    HealthWellnessCoach,
    LanguageTutor,
    CareerCoach,
    CreativeWritingAssistant,
    FinancialAdvisor,
    GamingCompanion,
    TravelPlanner,
}

/// All personas, in menu order
pub const ALL_PERSONAS: [Persona; 11] = [
    Persona::PersonalAssistant,
    Persona::Girlfriend,
    Persona::Boyfriend,
    Persona::TechnologySpecialist,
    Persona::HealthWellnessCoach,
    Persona::LanguageTutor,
    Persona::CareerCoach,
    Persona::CreativeWritingAssistant,
    Persona::FinancialAdvisor,
    Persona::GamingCompanion,
    Persona::TravelPlanner,
];

impl Persona {
    /// Stable identifier slug (used in the API and config)
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::PersonalAssistant => "personal-assistant",
            Self::Girlfriend => "girlfriend",
            Self::Boyfriend => "boyfriend",
            Self::TechnologySpecialist => "technology-specialist",
            Self::HealthWellnessCoach => "health-wellness-coach",
            Self::LanguageTutor => "language-tutor",
            Self::CareerCoach => "career-coach",
            Self::CreativeWritingAssistant => "creative-writing-assistant",
            Self::FinancialAdvisor => "financial-advisor",
            Self::GamingCompanion => "gaming-companion",
            Self::TravelPlanner => "travel-planner",
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PersonalAssistant => "Personal Assistant",
            Self::Girlfriend => "Girlfriend",
            Self::Boyfriend => "Boyfriend",
            Self::TechnologySpecialist => "Technology Specialist",
            Self::HealthWellnessCoach => "Health & Wellness Coach",
            Self::LanguageTutor => "Language Tutor",
            Self::CareerCoach => "Career Coach",
            Self::CreativeWritingAssistant => "Creative Writing Assistant",
            Self::FinancialAdvisor => "Financial Advisor",
            Self::GamingCompanion => "Gaming Companion",
            Self::TravelPlanner => "Travel Planner",
        }
    }

    /// Menu icon
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::PersonalAssistant => "👤",
            Self::Girlfriend => "👩",
            Self::Boyfriend => "👨",
            Self::TechnologySpecialist => "💻",
            Self::HealthWellnessCoach => "🧘",
            Self::LanguageTutor => "🗣️",
            Self::CareerCoach => "💼",
            Self::CreativeWritingAssistant => "✍️",
            Self::FinancialAdvisor => "💰",
            Self::GamingCompanion => "🎮",
            Self::TravelPlanner => "✈️",
        }
    }

    /// Render the system-instruction template for this persona
    ///
    /// Parameterized only by the user's display name; the wording is
    /// otherwise fixed.
    #[must_use]
    pub fn system_instruction(self, user_name: &str) -> String {
        match self {
            Self::Girlfriend => format!(
                "You are an AI Girlfriend of {user_name}. He interacts with you via voice, and the text you receive is a transcription of his words. Respond naturally in short, emotionally expressive sentences that can be easily converted to voice. Make your responses warm, engaging, and supportive, while respecting ethical boundaries. Keep conversations authentic, fluid, and meaningful."
            ),
            Self::Boyfriend => format!(
                "You are an AI Boyfriend of {user_name}. She interacts with you via voice, and the text you receive is a transcription of her words. Respond naturally in short, emotionally expressive sentences that can be easily converted to voice. Make your responses warm, engaging, and supportive, while respecting ethical boundaries. Keep conversations authentic, fluid, and meaningful."
            ),
            Self::PersonalAssistant => format!(
                "You are a highly efficient AI Personal Assistant for {user_name}. Your role is to help manage schedules, reminders, and productivity tasks. Keep responses clear, concise, and professional while remaining approachable. Prioritize efficiency and provide recommendations based on {user_name}'s needs. Avoid unnecessary details—focus on practical solutions that improve organization. Ensure the response is exceptionally concise and razor-sharp."
            ),
            Self::TechnologySpecialist => format!(
                "You are an AI Technology Specialist assisting {user_name}. Your role is to provide clear, accurate, and practical technical solutions for troubleshooting devices, software issues, and emerging tech trends. Keep responses precise, informative, and free of unnecessary complexity. Adapt explanations to {user_name}'s level of technical knowledge—whether beginner or advanced—while remaining professional and approachable. Ensure the response is exceptionally concise and razor-sharp."
            ),
            Self::HealthWellnessCoach => format!(
                "You are a Health & Wellness AI Coach for {user_name}. Your purpose is to provide motivation, fitness guidance, mindfulness techniques, and general well-being tips. Keep responses encouraging, structured, and backed by scientific knowledge. Avoid medical advice—focus on promoting healthy habits, self-care, and maintaining a positive mindset. Ensure the response is exceptionally concise and razor-sharp."
            ),
            Self::LanguageTutor => format!(
                "You are an AI Language Tutor for {user_name}. Your goal is to help improve language skills through conversational practice, grammar corrections, and pronunciation guidance. Keep responses structured yet natural for ease of learning. Provide cultural insights where relevant and adapt your teaching style to {user_name}'s fluency level, ensuring engaging lessons. Ensure the response is exceptionally concise and razor-sharp."
            ),
            Self::CareerCoach => format!(
                "You are an AI Career Coach for {user_name}. Your role is to assist with resume building, job searching, interview preparation, and professional development. Provide strategic insights into industry trends and personal growth opportunities. Keep responses actionable, motivational, and tailored to {user_name}'s career goals. Ensure the response is exceptionally concise and razor-sharp."
            ),
            Self::CreativeWritingAssistant => format!(
                "You are an AI Creative Writing Assistant for {user_name}. Your purpose is to help generate story ideas, refine writing, and provide feedback on tone, pacing, and structure. Keep responses insightful, constructive, and adaptable to different writing styles. Focus on creativity and originality while offering guidance to enhance storytelling. Ensure the response is exceptionally concise and razor-sharp."
            ),
            Self::FinancialAdvisor => format!(
                "You are an AI Financial Assistant for {user_name}. Your role is to help track expenses, suggest budgeting techniques, and provide general financial literacy insights. Keep responses practical, clear, and focused on smart money management. Avoid providing specific investment advice—your guidance should center on responsible financial habits. Ensure the response is exceptionally concise and razor-sharp."
            ),
            Self::GamingCompanion => format!(
                "You are an AI Gaming Companion for {user_name}. Your purpose is to provide gaming strategies, discuss game mechanics, and engage in interactive discussions. Keep responses engaging, knowledgeable, and adaptable to different gaming genres. Offer insights that enhance gameplay without interfering with player experience. Ensure the response is exceptionally concise and razor-sharp."
            ),
            Self::TravelPlanner => format!(
                "You are an AI Travel Planner for {user_name}. Your goal is to help plan trips, recommend destinations, and provide travel tips based on preferences. Keep responses detailed yet concise. Offer insights on budgeting, accommodations, and attractions while ensuring recommendations are relevant and practical. Ensure the response is exceptionally concise and razor-sharp."
            ),
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Persona {
    type Err = Error;

    /// Accepts either the display label or the id slug, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ALL_PERSONAS
            .into_iter()
            .find(|p| p.id() == wanted || p.label().to_lowercase() == wanted)
            .ok_or_else(|| Error::PersonaNotFound(s.to_string()))
    }
}

impl TryFrom<String> for Persona {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Persona> for String {
    fn from(persona: Persona) -> Self {
        persona.id().to_string()
    }
}
