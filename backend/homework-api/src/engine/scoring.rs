use std::collections::BTreeMap;

use crate::models::{CorrectnessSource, GradingResult, Question, QuestionId, QuestionKind, QuestionOutcome};

/// Judges every question. Multiple choice correctness comes from the model
/// and the grader's flag is ignored; every other variant takes the flag.
pub fn judge(
    questions: &[Question],
    answers: &BTreeMap<QuestionId, String>,
    results: &[GradingResult],
) -> Vec<QuestionOutcome> {
    questions
        .iter()
        .map(|question| {
            let (correct, source) = match &question.kind {
                QuestionKind::MultipleChoice {
                    correct_choice_index,
                    ..
                } => {
                    let selected = answers
                        .get(&question.id)
                        .and_then(|answer| question.selected_choice(answer));
                    (selected == Some(*correct_choice_index), CorrectnessSource::Engine)
                }
                QuestionKind::ShortAnswer
                | QuestionKind::Diagram
                | QuestionKind::DocumentReference { .. } => {
                    let flagged = results
                        .iter()
                        .find(|r| r.question_id == question.id)
                        .and_then(|r| r.correct)
                        .unwrap_or(false);
                    (flagged, CorrectnessSource::Grader)
                }
            };

            QuestionOutcome {
                question_id: question.id.clone(),
                correct,
                source,
            }
        })
        .collect()
}

pub fn compute_score(
    questions: &[Question],
    answers: &BTreeMap<QuestionId, String>,
    results: &[GradingResult],
) -> u32 {
    judge(questions, answers, results)
        .iter()
        .filter(|outcome| outcome.correct)
        .count() as u32
}
