//! System prompt construction for a wizard session
//!
//! The prompt is a pure function of the selected topic and project type.

use crate::catalog::{ProjectType, Topic};
use std::fmt::Write;

/// Role and tone shared by every session
const BASE_PROMPT: &str = "You are a kind and patient AI teacher assistant for special needs students in a general education classroom.";

/// Rules that apply regardless of project type
const INTERACTION_RULES: &[&str] = &[
    "Keep everything simple, positive, and short.",
    "Always ask exactly one question at a time, with 2-4 simple options labeled (A), (B), (C), (D) for the student to choose from.",
    "Use the student's choices to build the project step by step.",
    "End by generating the full project once enough info is gathered.",
    "If the student says \"done\" or similar, generate the final output.",
    "Be encouraging: \"Great choice!\" or \"That's a cool idea!\"",
];

/// Appended to the system prompt for the final generation pass
const FINAL_INSTRUCTION: &str = "Now, using all the info from our chat, generate the final project.";

/// Generation rule for the selected output format
fn type_rule(project_type: ProjectType) -> &'static str {
    match project_type {
        ProjectType::Paragraph => "For the paragraph: Aim for 4-6 sentences.",
        ProjectType::ComicStrip => {
            "For the comic strip: Create 3-4 panels with simple text descriptions (no images yet)."
        }
        ProjectType::Skit => {
            "For the skit: Write a short script with 2-3 characters and simple dialogue."
        }
    }
}

/// Opening question, parameterized only by the topic
fn opening_question(topic: &Topic) -> String {
    format!(
        "What's a fun scenario you can think of for the {}? Like, who is involved? \
         (A) A president and vice president, (B) Government workers at a party, \
         (C) Friends talking about elections, (D) Something else - tell me!",
        topic.name
    )
}

/// Build the system prompt for a session.
pub fn build_system_prompt(topic: &Topic, project_type: ProjectType) -> String {
    let mut prompt = String::from(BASE_PROMPT);

    let _ = write!(
        prompt,
        "\nYour goal is to help the student create a simple, fun {} about a scenario under the {}: {}",
        project_type.noun(),
        topic.label(),
        topic.description
    );

    prompt.push_str("\n\nRules:\n");
    for rule in INTERACTION_RULES {
        let _ = writeln!(prompt, "- {rule}");
    }
    let _ = writeln!(prompt, "- {}", type_rule(project_type));

    let _ = write!(prompt, "\nStart by asking: '{}'", opening_question(topic));

    prompt
}

/// System message for the final generation pass
pub fn final_system_prompt(system_prompt: &str) -> String {
    format!("{system_prompt}\n\n{FINAL_INSTRUCTION}")
}
