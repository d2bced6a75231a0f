use std::sync::Arc;
use std::time::Duration;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::time::fixed_now;
use services::{
    AppServices, AttemptService, BackendMode, CatalogService, Clock, DashboardService,
    ManualScheduler, Scheduler,
};
use storage::{Backend, InMemoryApi, QuizApi};

use crate::context::{UiApp, build_app_context};
use crate::views::take_quiz::QuizTestHandles;
use crate::views::{
    CatalogView, HistoryView, HomeView, ResultsView, TakeQuizView, use_toaster_provider,
};

#[derive(Clone)]
struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn backend_mode(&self) -> BackendMode {
        self.services.mode()
    }

    fn attempts(&self) -> Arc<AttemptService> {
        self.services.attempts()
    }

    fn catalog(&self) -> Arc<CatalogService> {
        self.services.catalog()
    }

    fn dashboard(&self) -> Arc<DashboardService> {
        self.services.dashboard()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Catalog,
    History,
    TakeQuiz(u64),
    Results(u64),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    quiz_handles: Option<QuizTestHandles>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    use_toaster_provider();
    if let Some(handles) = props.quiz_handles.clone() {
        use_context_provider(|| handles);
    }
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Catalog => rsx! { CatalogView {} },
        ViewKind::History => rsx! { HistoryView {} },
        ViewKind::TakeQuiz(quiz_id) => rsx! { TakeQuizView { quiz_id } },
        ViewKind::Results(attempt_id) => rsx! { ResultsView { attempt_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub services: AppServices,
    pub scheduler: Arc<ManualScheduler>,
    pub quiz_handles: Option<QuizTestHandles>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild, then let pending resources settle.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..4 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Harness over the sample catalog served from memory.
pub fn setup_view_harness(view: ViewKind) -> (ViewHarness, InMemoryApi) {
    let api = InMemoryApi::with_demo_catalog();
    let harness = setup_view_harness_with_api(view, Arc::new(api.clone()));
    (harness, api)
}

pub fn setup_view_harness_with_api(view: ViewKind, api: Arc<dyn QuizApi>) -> ViewHarness {
    let scheduler = Arc::new(ManualScheduler::new());
    let services = AppServices::new(
        BackendMode::Demo,
        &Backend::new(api),
        Arc::clone(&scheduler) as Arc<dyn Scheduler>,
        Clock::manual(fixed_now()),
        Duration::from_secs(30),
    );
    let quiz_handles = match view {
        ViewKind::TakeQuiz(_) => Some(QuizTestHandles::default()),
        _ => None,
    };

    let app = Arc::new(TestApp {
        services: services.clone(),
    });
    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            quiz_handles: quiz_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        services,
        scheduler,
        quiz_handles,
    }
}
