//! Image picker for one slot, with drag-and-drop and a live preview.

use canopy_core::Slot;
use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;

/// MIME type implied by a filename's extension, used as a hint when the
/// file's content is not recognized.
fn declared_mime(name: &str) -> Option<&'static str> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") {
        Some("image/jpeg")
    } else if ext.eq_ignore_ascii_case("png") {
        Some("image/png")
    } else {
        None
    }
}

/// A file read from the picker, ready to hand to the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    /// Slot the file was picked for.
    pub slot: Slot,
    /// Filename as reported by the browser.
    pub name: String,
    /// MIME type implied by the filename's extension.
    pub declared_mime: Option<&'static str>,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// Props for the [`SlotPicker`] component.
#[derive(Props, Clone, PartialEq)]
pub struct SlotPickerProps {
    /// Which slot this picker fills.
    slot: Slot,
    /// Preview URL of the current selection, if any.
    preview: Option<String>,
    /// Why the last file offered to this slot was rejected, if it was.
    notice: Option<String>,
    /// Called with the file contents after the browser has read them.
    on_pick: EventHandler<PickedFile>,
}

/// A drop zone with a file picker and a preview of the current selection.
///
/// Accepts JPEG and PNG. A canceled picker delivers no file and leaves
/// the slot as it was.
#[component]
pub fn SlotPicker(props: SlotPickerProps) -> Element {
    let mut dragging = use_signal(|| false);
    let mut read_error = use_signal(|| Option::<String>::None);
    let slot = props.slot;

    // Read and forward the first file from a list.
    //
    // Shared by the file-picker and drag-and-drop paths.
    let process_files = move |files: Vec<FileData>| async move {
        let Some(file) = files.first() else {
            return;
        };
        let name = file.name();
        match file.read_bytes().await {
            Ok(bytes) => {
                read_error.set(None);
                props.on_pick.call(PickedFile {
                    slot,
                    declared_mime: declared_mime(&name),
                    name,
                    bytes: bytes.to_vec(),
                });
            }
            Err(e) => {
                read_error.set(Some(format!("Failed to read file: {e}")));
            }
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        process_files(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files()).await;
    };

    let zone_class = if dragging() {
        "drop-zone drop-zone-active"
    } else {
        "drop-zone"
    };
    let label = slot.label();

    rsx! {
        div { class: "slot",
            h3 { "{label} Image" }

            div {
                class: "{zone_class}",
                ondragover: move |evt| {
                    evt.prevent_default();
                    dragging.set(true);
                },
                ondragleave: move |_| {
                    dragging.set(false);
                },
                ondrop: handle_drop,

                label { class: "picker-button",
                    input {
                        r#type: "file",
                        accept: "image/jpeg, image/png",
                        class: "hidden",
                        onchange: handle_files,
                    }
                    "Choose File"
                }
                p { class: "hint", "or drop a JPEG or PNG here" }
            }

            if let Some(ref err) = props.notice {
                p { class: "error-text", "{err}" }
            }
            if let Some(ref err) = read_error() {
                p { class: "error-text", "{err}" }
            }

            if let Some(ref url) = props.preview {
                img {
                    src: "{url}",
                    alt: "{label} Preview",
                    class: "preview-image",
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_mime_from_extension() {
        assert_eq!(declared_mime("scene.JPG"), Some("image/jpeg"));
        assert_eq!(declared_mime("scene.jpeg"), Some("image/jpeg"));
        assert_eq!(declared_mime("a.b.png"), Some("image/png"));
        assert_eq!(declared_mime("scene.webp"), None);
        assert_eq!(declared_mime("no_extension"), None);
    }
}
