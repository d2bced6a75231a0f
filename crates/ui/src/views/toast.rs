use std::time::Duration;

use dioxus::prelude::*;

const TOAST_TTL: Duration = Duration::from_secs(6);

/// App-wide notice that outlives the page that raised it.
#[derive(Clone, Copy, PartialEq)]
pub struct Toaster {
    message: Signal<Option<String>>,
}

impl Toaster {
    pub fn show(&self, message: impl Into<String>) {
        let mut current = self.message;
        let message = message.into();
        current.set(Some(message.clone()));
        // The raising page may unmount before the notice expires.
        let _ = spawn_forever(async move {
            tokio::time::sleep(TOAST_TTL).await;
            if current.peek().as_ref() == Some(&message) {
                current.set(None);
            }
        });
    }

    pub fn dismiss(&self) {
        let mut current = self.message;
        current.set(None);
    }

    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.message.read().clone()
    }
}

pub fn use_toaster_provider() -> Toaster {
    use_context_provider(|| Toaster {
        message: Signal::new(None),
    })
}

#[component]
pub fn ToastHost() -> Element {
    let toaster = use_context::<Toaster>();

    rsx! {
        if let Some(message) = toaster.message() {
            div { class: "toast", role: "status",
                span { "{message}" }
                button {
                    class: "toast__close",
                    r#type: "button",
                    onclick: move |_| toaster.dismiss(),
                    "Dismiss"
                }
            }
        }
    }
}
