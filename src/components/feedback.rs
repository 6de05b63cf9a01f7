use leptos::prelude::*;

use crate::state::WidgetState;

/// Inline progress and error text shown next to a widget.
#[component]
pub fn WidgetFeedback(state: RwSignal<WidgetState>) -> impl IntoView {
    view! {
        {move || match state.get() {
            WidgetState::Pending(action) => view! {
                <span class="problem-widget-pending">{action.progress_text()}</span>
            }
            .into_any(),
            WidgetState::Failed { message, .. } => view! {
                <span class="problem-widget-error" role="alert">{message}</span>
            }
            .into_any(),
            WidgetState::AwaitingCheck | WidgetState::AwaitingReset => {
                view! { <span style="display:none"></span> }.into_any()
            }
        }}
    }
}
