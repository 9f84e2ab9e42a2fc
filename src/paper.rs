//! Paper records extracted from API notes.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::client::Note;
use crate::error::{Error, Result};

const PDF_URL: &str = "https://openreview.net/pdf";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub number: Option<u64>,
    pub note_id: String,
    pub title: String,
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub url: String,
}

impl Paper {
    /// Build from a submission note. The title is required; authors and
    /// abstract may be hidden on some notes and default to empty.
    pub fn from_note(note: &Note) -> Result<Self> {
        let title = note.text("title").ok_or_else(|| Error::MissingField {
            field: "title".into(),
            context: format!("note {}", note.id),
        })?;
        Ok(Self {
            number: note.number,
            note_id: note.id.clone(),
            title: title.to_string(),
            authors: note.strings("authors"),
            abstract_text: note.text("abstract").unwrap_or_default().to_string(),
            url: format!("{PDF_URL}?id={}", note.id),
        })
    }

    pub fn text(&self, field: TextField) -> Cow<'_, str> {
        match field {
            TextField::Title => Cow::Borrowed(&self.title),
            TextField::Abstract => Cow::Borrowed(&self.abstract_text),
            TextField::Both => Cow::Owned(format!("{} {}", self.title, self.abstract_text)),
        }
    }
}

pub fn extract_papers(notes: &[Note]) -> Result<Vec<Paper>> {
    notes.iter().map(Paper::from_note).collect()
}

/// Which part of a paper the keyword is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TextField {
    Title,
    Abstract,
    #[default]
    Both,
}
