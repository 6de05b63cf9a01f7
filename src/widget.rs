use std::sync::Arc;

use leptos::prelude::*;
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::api;
use crate::components::feedback::WidgetFeedback;
use crate::config::WidgetConfig;
use crate::dom;
use crate::error::WidgetError;
use crate::state::{Action, WidgetState};

/// One Check/Reset widget on the page.
#[derive(Clone)]
pub struct ProblemWidget {
    id: Arc<str>,
    config: Arc<WidgetConfig>,
    state: RwSignal<WidgetState>,
}

/// Attach a handler to the widget whose button is `check_{id}`.
///
/// Attaching is idempotent: a widget that already has its feedback anchor
/// in the page is left alone.
pub fn attach(id: &str, config: Arc<WidgetConfig>) -> Result<(), WidgetError> {
    let button = dom::element_by_id(&dom::button_id(id))
        .ok_or_else(|| WidgetError::MissingElement(dom::button_id(id)))?;
    if !dom::is_widget_button(&button, id) {
        return Err(WidgetError::NotAWidget(dom::button_id(id)));
    }
    if dom::element_by_id(&dom::feedback_id(id)).is_some() {
        debug!("Widget {} already attached", id);
        return Ok(());
    }

    let initial = WidgetState::from_label(&dom::read_label(&button), &config.check_label);
    let anchor = dom::insert_feedback_anchor(id)?;
    let id: Arc<str> = Arc::from(id);

    info!("Attaching widget {} ({:?})", id, initial);
    leptos::mount::mount_to(anchor, move || {
        let widget = ProblemWidget {
            id,
            config,
            state: RwSignal::new(initial),
        };
        widget.project_button();
        if let Err(e) = widget.listen() {
            error!("Widget {}: click handler not installed: {}", widget.id, e);
        }
        view! { <WidgetFeedback state=widget.state /> }
    })
    .forget();

    Ok(())
}

/// Attach every widget found on the page. Returns how many were attached.
pub fn attach_all(config: Arc<WidgetConfig>) -> usize {
    let ids = match dom::discover_widget_ids() {
        Ok(ids) => ids,
        Err(e) => {
            error!("Widget discovery failed: {}", e);
            return 0;
        }
    };

    ids.iter()
        .filter(|id| match attach(id, config.clone()) {
            Ok(()) => true,
            Err(e) => {
                warn!("Skipping widget {}: {}", id, e);
                false
            }
        })
        .count()
}

impl ProblemWidget {
    /// Keep the button label and disabled flag in sync with the state.
    /// The button is looked up on every run since a reset may replace it.
    fn project_button(&self) {
        let id = self.id.clone();
        let config = self.config.clone();
        let state = self.state;

        Effect::new(move |_| {
            let current = state.get();
            match dom::element_by_id(&dom::button_id(&id)) {
                Some(button) => {
                    dom::render_button(&button, current.label(&config), current.is_pending())
                }
                None => debug!("Widget {}: no button to render", id),
            }
        });
    }

    /// Clicks are caught at the document so a button re-rendered by a reset
    /// stays live.
    fn listen(&self) -> Result<(), WidgetError> {
        let widget = self.clone();
        let selector = dom::id_equals(&dom::button_id(&self.id));

        let closure = Closure::<dyn Fn(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
            let hit = ev
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                .and_then(|el| el.closest(&selector).ok().flatten())
                .is_some();
            if hit {
                ev.prevent_default();
                widget.on_click();
            }
        });

        dom::document()?
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            .map_err(WidgetError::dom)?;
        closure.forget();
        Ok(())
    }

    fn on_click(&self) {
        let Some(action) = self.state.get_untracked().next_action() else {
            debug!("Widget {}: request in flight, click ignored", self.id);
            return;
        };
        self.state.set(WidgetState::Pending(action));

        let widget = self.clone();
        spawn_local(async move {
            let outcome = match action {
                Action::Check => widget.check().await,
                Action::Reset => widget.reset().await,
            };
            let outcome = outcome.map_err(|e| {
                error!("Widget {}: {:?} failed: {}", widget.id, action, e);
                String::from(e)
            });
            widget.state.set(WidgetState::settled(action, outcome));
        });
    }

    async fn check(&self) -> Result<(), WidgetError> {
        let submission = dom::collect_submission(&self.id)?;
        let response = api::problem_check(&self.config, &self.id, &submission).await?;

        let marked = dom::mark_statuses(&response, &self.config);
        info!(
            "Widget {}: checked {} field(s), {} marked",
            self.id,
            submission.len(),
            marked
        );
        Ok(())
    }

    async fn reset(&self) -> Result<(), WidgetError> {
        let markup = api::problem_reset(&self.config, &self.id).await?;
        let container = dom::container_id(&self.id);
        if !dom::replace_content(&container, &markup, self.config.reset_markup) {
            warn!("Widget {}: #{} not found, reset markup dropped", self.id, container);
        }
        info!("Widget {}: reset", self.id);
        Ok(())
    }
}
