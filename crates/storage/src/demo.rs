//! Sample catalog served by the in-memory backend in demo mode.

use quiz_core::model::{
    AnswerKey, OptionLabel, Question, QuestionError, QuestionId, QuestionOptions, QuizId,
    QuizSummary,
};

/// A quiz with its full, keyed question set.
#[derive(Debug, Clone)]
pub struct SeedQuiz {
    pub summary: QuizSummary,
    pub questions: Vec<Question>,
}

struct SeedQuestion {
    prompt: &'static str,
    options: [&'static str; 4],
    correct: OptionLabel,
    explanation: &'static str,
}

const RUST_BASICS: &[SeedQuestion] = &[
    SeedQuestion {
        prompt: "Which keyword declares a mutable binding?",
        options: ["let mut", "var", "mut let", "let!"],
        correct: OptionLabel::A,
        explanation: "Bindings are immutable unless declared with `let mut`.",
    },
    SeedQuestion {
        prompt: "What does the `?` operator do on an `Err` value?",
        options: [
            "Panics",
            "Returns the error early from the function",
            "Ignores it",
            "Converts it to `None`",
        ],
        correct: OptionLabel::B,
        explanation: "`?` converts the error with `From` and returns it early.",
    },
    SeedQuestion {
        prompt: "Which trait allows a value to be duplicated implicitly?",
        options: ["Clone", "Default", "Copy", "Send"],
        correct: OptionLabel::C,
        explanation: "`Copy` types are duplicated on assignment instead of moved.",
    },
    SeedQuestion {
        prompt: "Which smart pointer provides shared ownership across threads?",
        options: ["Rc", "Box", "Cell", "Arc"],
        correct: OptionLabel::D,
        explanation: "`Arc` uses atomic reference counting and is `Send + Sync`.",
    },
    SeedQuestion {
        prompt: "What is the type of a string literal?",
        options: ["String", "&'static str", "char", "&String"],
        correct: OptionLabel::B,
        explanation: "Literals are borrowed from the binary and live for `'static`.",
    },
];

const SQL_BASICS: &[SeedQuestion] = &[
    SeedQuestion {
        prompt: "Which clause filters rows after grouping?",
        options: ["WHERE", "HAVING", "ORDER BY", "LIMIT"],
        correct: OptionLabel::B,
        explanation: "`HAVING` applies to aggregated groups, `WHERE` to raw rows.",
    },
    SeedQuestion {
        prompt: "Which join keeps every row of the left table?",
        options: ["INNER JOIN", "CROSS JOIN", "LEFT JOIN", "SELF JOIN"],
        correct: OptionLabel::C,
        explanation: "Unmatched left rows appear with NULLs on the right side.",
    },
    SeedQuestion {
        prompt: "What does `COUNT(*)` count?",
        options: ["Rows", "Non-null values", "Distinct values", "Columns"],
        correct: OptionLabel::A,
        explanation: "`COUNT(*)` counts rows regardless of NULLs.",
    },
];

const NETWORKING: &[SeedQuestion] = &[
    SeedQuestion {
        prompt: "Which HTTP method is idempotent by definition?",
        options: ["POST", "PATCH", "CONNECT", "PUT"],
        correct: OptionLabel::D,
        explanation: "Repeating a PUT leaves the resource in the same state.",
    },
    SeedQuestion {
        prompt: "Which status code means the resource was not found?",
        options: ["401", "404", "409", "500"],
        correct: OptionLabel::B,
        explanation: "404 Not Found.",
    },
    SeedQuestion {
        prompt: "Which transport protocol does HTTP/3 run on?",
        options: ["TCP", "SCTP", "QUIC", "DCCP"],
        correct: OptionLabel::C,
        explanation: "HTTP/3 is carried over QUIC, which itself runs on UDP.",
    },
];

fn build(
    quiz_id: u64,
    first_question_id: u64,
    seeds: &[SeedQuestion],
) -> Result<Vec<Question>, QuestionError> {
    seeds
        .iter()
        .zip(first_question_id..)
        .map(|(seed, id)| {
            let [a, b, c, d] = seed.options;
            let question = Question::new(
                QuestionId::new(quiz_id * 100 + id),
                seed.prompt,
                QuestionOptions::new(a, b, c, d),
            )?;
            Ok(question.with_answer_key(AnswerKey {
                correct_option: seed.correct,
                explanation: Some(seed.explanation.to_string()),
            }))
        })
        .collect()
}

fn quiz(
    id: u64,
    title: &str,
    description: &str,
    duration_minutes: u32,
    pass_percentage: u8,
    seeds: &[SeedQuestion],
) -> Result<SeedQuiz, QuestionError> {
    let questions = build(id, 1, seeds)?;
    Ok(SeedQuiz {
        summary: QuizSummary {
            id: QuizId::new(id),
            title: title.to_string(),
            description: Some(description.to_string()),
            question_count: u32::try_from(questions.len()).unwrap_or(u32::MAX),
            duration_minutes,
            pass_percentage,
        },
        questions,
    })
}

/// The demo catalog.
///
/// # Errors
///
/// Returns `QuestionError` if a seed question is malformed.
pub fn catalog() -> Result<Vec<SeedQuiz>, QuestionError> {
    Ok(vec![
        quiz(
            1,
            "Rust basics",
            "Ownership, traits and error handling.",
            5,
            60,
            RUST_BASICS,
        )?,
        quiz(
            2,
            "SQL fundamentals",
            "Filtering, joining and aggregating.",
            3,
            50,
            SQL_BASICS,
        )?,
        quiz(
            3,
            "Networking",
            "HTTP semantics and transports.",
            2,
            70,
            NETWORKING,
        )?,
    ])
}
