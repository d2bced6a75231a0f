use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::AppContext;
use crate::views::{CatalogView, HistoryView, HomeView, ResultsView, TakeQuizView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/quizzes", CatalogView)] Catalog {},
        #[route("/history", HistoryView)] History {},
    #[end_layout]
    #[route("/quizzes/:quiz_id/take", TakeQuizView)] TakeQuiz { quiz_id: u64 },
    #[layout(Layout)]
        #[route("/attempts/:attempt_id/results", ResultsView)] Results { attempt_id: u64 },
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    let ctx = use_context::<AppContext>();

    rsx! {
        nav { class: "sidebar",
            h1 { "Quiz" }
            if ctx.is_demo() {
                span { class: "sidebar-badge", "Demo data" }
            }
            ul {
                li { Link { to: Route::Home {}, "Dashboard" } }
                li { Link { to: Route::Catalog {}, "Quizzes" } }
                li { Link { to: Route::History {}, "My attempts" } }
            }
        }
    }
}
