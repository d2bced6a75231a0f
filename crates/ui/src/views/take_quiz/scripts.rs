/// Installs or removes the browser-level "leave page?" prompt.
///
/// The handler stays registered across pages but only fires while the quiz
/// root is mounted.
pub(super) fn navigation_guard_script(active: bool) -> String {
    format!(
        r#"(function() {{
                    const active = {active};
                    const existing = window.__quizLeaveGuard;
                    if (!active) {{
                        if (existing) {{
                            window.removeEventListener("beforeunload", existing);
                            window.__quizLeaveGuard = null;
                        }}
                        return;
                    }}
                    if (existing) {{
                        return;
                    }}
                    const guard = (event) => {{
                        if (!document.getElementById("quiz-root")) {{
                            return;
                        }}
                        event.preventDefault();
                        event.returnValue = "";
                        return "";
                    }};
                    window.__quizLeaveGuard = guard;
                    window.addEventListener("beforeunload", guard);
                }})();"#,
        active = active,
    )
}
