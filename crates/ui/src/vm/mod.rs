mod attempt_vm;
mod quiz_vm;
mod results_vm;
mod take_quiz_vm;
mod time_fmt;

pub use attempt_vm::{AttemptCardVm, DashboardVm, map_attempt_cards};
pub use quiz_vm::{QuizCardVm, map_quiz_cards};
pub use results_vm::{OptionResultVm, ResultRowVm, ResultsVm, map_results};
pub use take_quiz_vm::{
    JumpVm, OptionVm, ProgressVm, QuestionVm, SubmitBannerVm, TakeQuizVm, TimerVm,
    confirmation_message, submit_banner,
};
pub use time_fmt::{format_datetime, format_percentage};
