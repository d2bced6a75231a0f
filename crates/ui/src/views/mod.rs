mod catalog;
mod history;
mod home;
mod results;
mod state;
mod take_quiz;
mod toast;

pub use catalog::CatalogView;
pub use history::HistoryView;
pub use home::HomeView;
pub use results::ResultsView;
pub use state::{ViewError, ViewState, use_restart_on_invalidate, view_state_from_resource};
pub use take_quiz::TakeQuizView;
pub use toast::{ToastHost, Toaster, use_toaster_provider};

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;
