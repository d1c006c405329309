use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type QuestionId = String;

/// Letters A..Z label the choices of a multiple choice question.
pub const MAX_CHOICES: usize = 26;

/// A single authored question. Immutable once the assignment is created;
/// the student's answer and the grader's feedback live on the assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice {
        choices: Vec<String>,
        correct_choice_index: usize,
    },
    ShortAnswer,
    Diagram,
    DocumentReference {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_page: Option<u32>,
    },
}

/// Field-less discriminant, used for metric labels and logging.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QuestionVariant {
    MultipleChoice,
    ShortAnswer,
    Diagram,
    DocumentReference,
}

impl QuestionVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionVariant::MultipleChoice => "multiple_choice",
            QuestionVariant::ShortAnswer => "short_answer",
            QuestionVariant::Diagram => "diagram",
            QuestionVariant::DocumentReference => "document_reference",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerShapeError {
    #[error("'{0}' is not a choice letter")]
    NotAChoiceLetter(String),
    #[error("choice {letter} is outside the {choices} available choices")]
    ChoiceOutOfRange { letter: char, choices: usize },
    #[error("artifact handle must not contain control characters")]
    MalformedArtifactHandle,
}

impl Question {
    pub fn new(id: impl Into<QuestionId>, prompt: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            kind,
        }
    }

    pub fn multiple_choice(
        id: impl Into<QuestionId>,
        prompt: impl Into<String>,
        choices: Vec<String>,
        correct_choice_index: usize,
    ) -> Self {
        Self::new(
            id,
            prompt,
            QuestionKind::MultipleChoice {
                choices,
                correct_choice_index,
            },
        )
    }

    pub fn short_answer(id: impl Into<QuestionId>, prompt: impl Into<String>) -> Self {
        Self::new(id, prompt, QuestionKind::ShortAnswer)
    }

    pub fn diagram(id: impl Into<QuestionId>, prompt: impl Into<String>) -> Self {
        Self::new(id, prompt, QuestionKind::Diagram)
    }

    pub fn document_reference(
        id: impl Into<QuestionId>,
        prompt: impl Into<String>,
        source_page: Option<u32>,
    ) -> Self {
        Self::new(id, prompt, QuestionKind::DocumentReference { source_page })
    }

    pub fn variant(&self) -> QuestionVariant {
        match self.kind {
            QuestionKind::MultipleChoice { .. } => QuestionVariant::MultipleChoice,
            QuestionKind::ShortAnswer => QuestionVariant::ShortAnswer,
            QuestionKind::Diagram => QuestionVariant::Diagram,
            QuestionKind::DocumentReference { .. } => QuestionVariant::DocumentReference,
        }
    }

    pub fn has_choices(&self) -> bool {
        matches!(self.kind, QuestionKind::MultipleChoice { .. })
    }

    pub fn requires_free_text(&self) -> bool {
        matches!(
            self.kind,
            QuestionKind::ShortAnswer | QuestionKind::DocumentReference { .. }
        )
    }

    pub fn requires_artifact_upload(&self) -> bool {
        matches!(self.kind, QuestionKind::Diagram)
    }

    pub fn references_source_document(&self) -> bool {
        matches!(self.kind, QuestionKind::DocumentReference { .. })
    }

    /// Checks `raw` against this variant's answer contract and returns the
    /// value to store. An empty result means "unanswered".
    ///
    /// Diagram handles are opaque: surrounding whitespace is trimmed and
    /// only control characters (newlines, tabs, NUL) are refused.
    pub fn normalize_answer(&self, raw: &str) -> Result<String, AnswerShapeError> {
        match &self.kind {
            QuestionKind::MultipleChoice { choices, .. } => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(String::new());
                }
                let index = letter_index(trimmed)
                    .ok_or_else(|| AnswerShapeError::NotAChoiceLetter(trimmed.to_string()))?;
                if index >= choices.len() {
                    return Err(AnswerShapeError::ChoiceOutOfRange {
                        letter: trimmed.to_ascii_uppercase().chars().next().unwrap_or('?'),
                        choices: choices.len(),
                    });
                }
                Ok(choice_letter(index).map(String::from).unwrap_or_default())
            }
            QuestionKind::ShortAnswer | QuestionKind::DocumentReference { .. } => {
                Ok(raw.to_string())
            }
            QuestionKind::Diagram => {
                let handle = raw.trim();
                if handle.chars().any(char::is_control) {
                    return Err(AnswerShapeError::MalformedArtifactHandle);
                }
                Ok(handle.to_string())
            }
        }
    }

    /// Choice index selected by `answer`, for multiple choice questions only.
    pub fn selected_choice(&self, answer: &str) -> Option<usize> {
        match &self.kind {
            QuestionKind::MultipleChoice { choices, .. } => {
                letter_index(answer.trim()).filter(|index| *index < choices.len())
            }
            QuestionKind::ShortAnswer
            | QuestionKind::Diagram
            | QuestionKind::DocumentReference { .. } => None,
        }
    }
}

/// `0 -> 'A'`, `1 -> 'B'`, ... up to `MAX_CHOICES`.
pub fn choice_letter(index: usize) -> Option<char> {
    if index < MAX_CHOICES {
        Some((b'A' + index as u8) as char)
    } else {
        None
    }
}

/// Inverse of [`choice_letter`]; case-insensitive, single letter only.
pub fn letter_index(value: &str) -> Option<usize> {
    let mut chars = value.chars();
    let letter = chars.next()?;
    if chars.next().is_some() || !letter.is_ascii_alphabetic() {
        return None;
    }
    Some((letter.to_ascii_uppercase() as u8 - b'A') as usize)
}
