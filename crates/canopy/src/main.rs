use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use canopy_core::{AnalysisTransport, ClientConfig, Slot, Workflow};
use canopy_io::{BlobUrlPreviews, FetchTransport, PickedFile, ResultsPanel, SlotPicker};
use dioxus::prelude::*;

/// The workflow shared between event handlers and the in-flight request task.
///
/// Dropping the last reference drops the selection manager, which
/// revokes any outstanding preview URLs.
type SharedWorkflow = Rc<RefCell<Workflow<BlobUrlPreviews>>>;

fn main() {
    dioxus::launch(app);
}

/// Root application component.
///
/// Owns the workflow outside the signal system and re-renders through a
/// revision signal that the workflow's change listener bumps. Handlers
/// only borrow the workflow for the duration of a synchronous call, so
/// file selection stays possible while a request is in flight.
#[allow(clippy::too_many_lines)]
fn app() -> Element {
    // --- Application state ---
    let mut revision = use_signal(|| 0u64);
    let mut notices = use_signal(HashMap::<Slot, String>::new);

    let workflow: SharedWorkflow = use_hook(|| {
        let mut workflow = Workflow::new(BlobUrlPreviews::default());
        workflow.subscribe(move |change| {
            tracing::debug!(?change, "workflow changed");
            revision += 1;
        });
        Rc::new(RefCell::new(workflow))
    });

    let transport = use_hook(|| {
        let config = ClientConfig::with_endpoint_override(option_env!("CANOPY_ANALYZE_URL"));
        tracing::info!(endpoint = %config.endpoint, "analysis endpoint");
        Rc::new(FetchTransport::new(&config))
    });

    // --- File selection handler ---
    let on_pick = {
        let workflow = Rc::clone(&workflow);
        use_callback(move |picked: PickedFile| {
            let PickedFile {
                slot,
                name,
                declared_mime,
                bytes,
            } = picked;
            let outcome = workflow
                .borrow_mut()
                .select(slot, name, declared_mime, bytes);
            match outcome {
                Ok(()) => {
                    notices.write().remove(&slot);
                }
                Err(e) => {
                    notices.write().insert(slot, e.to_string());
                }
            }
        })
    };

    // --- Submit handler ---
    // Validation failures land in the workflow's Failed state; only a
    // successful begin spawns the request.
    let on_submit = {
        let workflow = Rc::clone(&workflow);
        let transport = Rc::clone(&transport);
        move |_| {
            let Ok(pending) = workflow.borrow_mut().begin_submit() else {
                return;
            };
            let workflow = Rc::clone(&workflow);
            let transport = Rc::clone(&transport);
            spawn(async move {
                let outcome = transport.send(pending.request()).await;
                workflow.borrow_mut().finish_submit(pending, outcome);
            });
        }
    };

    // --- Snapshot for rendering ---
    // Reading the revision subscribes this component to workflow changes.
    let _ = revision();
    let (previews, can_submit, loading, error, result) = {
        let wf = workflow.borrow();
        let previews: HashMap<Slot, String> = Slot::ALL
            .into_iter()
            .filter_map(|slot| {
                wf.selection(slot)
                    .map(|sel| (slot, sel.preview().as_str().to_owned()))
            })
            .collect();
        (
            previews,
            wf.can_submit(),
            wf.is_loading(),
            wf.state().error_message(),
            wf.state().result().cloned(),
        )
    };
    let notices = notices();

    // --- Layout ---
    rsx! {
        style { dangerous_inner_html: include_str!("../assets/main.css") }

        div { class: "container",
            main { class: "main",
                h1 { class: "title", "Forest Cover Analyzer" }
                p { class: "description",
                    "Upload 'Before' and 'After' satellite images to analyze changes."
                }

                div { class: "upload-section",
                    for slot in Slot::ALL {
                        SlotPicker {
                            key: "{slot}",
                            slot,
                            preview: previews.get(&slot).cloned(),
                            notice: notices.get(&slot).cloned(),
                            on_pick,
                        }
                    }
                }

                button {
                    class: "analyze-button",
                    r#type: "button",
                    disabled: !can_submit,
                    onclick: on_submit,
                    if loading { "Analyzing..." } else { "Analyze Forest Cover Change" }
                }

                // Only the latest error is shown.
                if let Some(ref err) = error {
                    p { class: "error-text", "{err}" }
                }

                if loading {
                    p { class: "loading", "Processing your images, please wait..." }
                }

                if let Some(result) = result {
                    ResultsPanel { result }
                }
            }
        }
    }
}
