use quiz_core::model::{OptionLabel, Question, QuestionId};
use quiz_core::{SubmissionState, SubmitConfirmation, SubmitTrigger, TimerSnapshot};
use services::{AttemptSession, Progress};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub label: OptionLabel,
    pub text: String,
    pub selected: bool,
}

impl OptionVm {
    #[must_use]
    pub fn class(&self) -> &'static str {
        if self.selected {
            "option option--selected"
        } else {
            "option"
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub id: QuestionId,
    pub position_label: String,
    pub prompt: String,
    pub options: Vec<OptionVm>,
    pub is_first: bool,
    pub is_last: bool,
}

impl QuestionVm {
    #[must_use]
    pub fn new(question: &Question, selected: Option<OptionLabel>, index: usize, total: usize) -> Self {
        let options = question
            .options()
            .iter()
            .map(|(label, text)| OptionVm {
                label,
                text: text.to_string(),
                selected: selected == Some(label),
            })
            .collect();
        Self {
            id: question.id(),
            position_label: format!("Question {} of {total}", index + 1),
            prompt: question.prompt().to_string(),
            options,
            is_first: index == 0,
            is_last: index + 1 >= total,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JumpVm {
    pub index: usize,
    pub label: String,
    pub answered: bool,
    pub current: bool,
}

impl JumpVm {
    #[must_use]
    pub fn class(&self) -> &'static str {
        match (self.current, self.answered) {
            (true, _) => "jump jump--current",
            (false, true) => "jump jump--answered",
            (false, false) => "jump",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressVm {
    pub answered_label: String,
    pub jumps: Vec<JumpVm>,
}

impl From<&Progress> for ProgressVm {
    fn from(progress: &Progress) -> Self {
        let jumps = (0..progress.total)
            .map(|index| JumpVm {
                index,
                label: (index + 1).to_string(),
                answered: !progress.unanswered_positions.contains(&index),
                current: index == progress.index,
            })
            .collect();
        Self {
            answered_label: format!("{} of {} answered", progress.answered, progress.total),
            jumps,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimerVm {
    pub label: String,
    pub low_time: bool,
}

impl TimerVm {
    /// The low-time modifier kicks in for the last two minutes.
    #[must_use]
    pub fn class(&self) -> &'static str {
        if self.low_time {
            "quiz-timer quiz-timer--low"
        } else {
            "quiz-timer"
        }
    }
}

impl From<TimerSnapshot> for TimerVm {
    fn from(snapshot: TimerSnapshot) -> Self {
        Self {
            label: snapshot.label(),
            low_time: snapshot.is_low_time(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitBannerVm {
    Submitting { forced: bool },
    Failed { message: String },
}

/// Status line under the question card while a submit is pending or failed.
#[must_use]
pub fn submit_banner(state: &SubmissionState) -> Option<SubmitBannerVm> {
    match state {
        SubmissionState::Submitting { trigger } => Some(SubmitBannerVm::Submitting {
            forced: *trigger == SubmitTrigger::Timer,
        }),
        SubmissionState::Failed { message } => Some(SubmitBannerVm::Failed {
            message: message.clone(),
        }),
        SubmissionState::Active | SubmissionState::Submitted => None,
    }
}

#[must_use]
pub fn confirmation_message(confirmation: SubmitConfirmation) -> String {
    let base = format!(
        "You answered {} of {} questions.",
        confirmation.answered, confirmation.total
    );
    match confirmation.unanswered() {
        0 => base,
        1 => format!("{base} 1 question is unanswered and will count as wrong."),
        n => format!("{base} {n} questions are unanswered and will count as wrong."),
    }
}

/// Everything the take-quiz page renders, read from the session in one go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TakeQuizVm {
    pub quiz_title: String,
    pub question: Option<QuestionVm>,
    pub progress: ProgressVm,
    pub timer: TimerVm,
    pub banner: Option<SubmitBannerVm>,
    pub can_answer: bool,
    pub guard_navigation: bool,
}

impl TakeQuizVm {
    #[must_use]
    pub fn from_session(session: &AttemptSession) -> Self {
        let progress = session.progress();
        let state = session.state();
        let question = session.current_question().map(|question| {
            let selected = session.answer(question.id());
            QuestionVm::new(&question, selected, progress.index, progress.total)
        });
        Self {
            quiz_title: session.attempt().quiz().title.clone(),
            question,
            progress: ProgressVm::from(&progress),
            timer: TimerVm::from(session.timer_snapshot()),
            banner: submit_banner(&state),
            can_answer: state == SubmissionState::Active,
            guard_navigation: session.should_guard_navigation(),
        }
    }
}
