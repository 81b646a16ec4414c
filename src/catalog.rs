//! Static catalog of topics and project types
//!
//! The catalog is fixed configuration. Adding a topic is a new row in
//! [`TOPICS`]; nothing else changes.

use serde::{Deserialize, Serialize};

/// One selectable act or amendment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub enacted: u16,
    pub description: String,
}

impl Topic {
    /// Label shown in selection lists, e.g. `Pendleton Act (1883)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.enacted)
    }
}

struct TopicRow {
    name: &'static str,
    enacted: u16,
    description: &'static str,
}

const TOPICS: &[TopicRow] = &[
    TopicRow {
        name: "22nd Amendment",
        enacted: 1951,
        description: "Limits presidents to two terms.",
    },
    TopicRow {
        name: "25th Amendment",
        enacted: 1967,
        description: "Handles what happens if the president can't do their job.",
    },
    TopicRow {
        name: "Pendleton Act",
        enacted: 1883,
        description: "Makes government jobs based on skills, not politics.",
    },
    TopicRow {
        name: "Hatch Act",
        enacted: 1939,
        description: "Stops government workers from doing politics on the job.",
    },
];

impl TopicRow {
    fn to_topic(&self) -> Topic {
        Topic {
            name: self.name.to_string(),
            enacted: self.enacted,
            description: self.description.to_string(),
        }
    }
}

/// All topics in catalog order
pub fn all_topics() -> Vec<Topic> {
    TOPICS.iter().map(TopicRow::to_topic).collect()
}

/// Find a topic by name or by label, ignoring case and surrounding whitespace
pub fn find_topic(query: &str) -> Option<Topic> {
    let query = query.trim();
    TOPICS
        .iter()
        .map(TopicRow::to_topic)
        .find(|t| t.name.eq_ignore_ascii_case(query) || t.label().eq_ignore_ascii_case(query))
}

/// Output format the student wants to create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Paragraph,
    ComicStrip,
    Skit,
}

impl ProjectType {
    pub const ALL: [ProjectType; 3] = [
        ProjectType::Paragraph,
        ProjectType::ComicStrip,
        ProjectType::Skit,
    ];

    /// Short noun used inside prompts and file names
    pub fn noun(self) -> &'static str {
        match self {
            ProjectType::Paragraph => "paragraph",
            ProjectType::ComicStrip => "comic strip",
            ProjectType::Skit => "skit",
        }
    }

    /// Label shown in selection lists
    pub fn label(self) -> &'static str {
        match self {
            ProjectType::Paragraph => "A paragraph describing a scenario",
            ProjectType::ComicStrip => "A comic strip of a scenario",
            ProjectType::Skit => "A skit showing a scenario",
        }
    }

    /// Stable identifier used on the wire
    pub fn id(self) -> &'static str {
        match self {
            ProjectType::Paragraph => "paragraph",
            ProjectType::ComicStrip => "comic_strip",
            ProjectType::Skit => "skit",
        }
    }

    /// Parse an identifier, noun or label
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|t| {
            t.id().eq_ignore_ascii_case(s)
                || t.noun().eq_ignore_ascii_case(s)
                || t.label().eq_ignore_ascii_case(s)
        })
    }
}

/// File name offered for the exported artifact.
///
/// Lowercased, spaces become `_`, anything else that is not alphanumeric is
/// dropped: `Pendleton Act` + comic strip -> `pendleton_act_comic_strip.txt`.
pub fn export_file_name(topic: &Topic, project_type: ProjectType) -> String {
    format!(
        "{}_{}.txt",
        slugify(&topic.name),
        slugify(project_type.noun())
    )
}

fn slugify(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' | '_' | '-' => Some('_'),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}
