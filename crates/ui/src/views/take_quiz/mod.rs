mod scripts;
mod view;

pub use view::TakeQuizView;

#[cfg(test)]
pub(crate) use view::{QuizIntent, QuizTestHandles};
