//! Selection manager: the two user-selected images and their previews.
//!
//! Each slot owns at most one [`ImageSelection`]. Preview handles are
//! allocated and released through a [`PreviewHandles`] implementation
//! (Blob URLs in the browser), and every code path that replaces or
//! discards a selection releases the handle it supersedes, including
//! dropping the manager itself.

use std::rc::Rc;

use crate::error::{PreviewError, SelectionError};
use crate::types::{ImageFile, ImageMediaType, Slot};

/// A transient, locally resolvable reference used to display a selected
/// file before it is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    /// Wrap a resolvable reference (e.g. a `blob:` URL).
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The reference as a string, suitable for an `<img src>`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Allocator for preview handles.
///
/// Every handle returned by [`create`](Self::create) is passed back to
/// [`release`](Self::release) exactly once by the [`SelectionManager`].
pub trait PreviewHandles {
    /// Allocate a handle that displays `file`.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError`] if the underlying resource cannot be created.
    fn create(&mut self, file: &ImageFile) -> Result<PreviewHandle, PreviewError>;

    /// Release a handle previously returned by [`create`](Self::create).
    fn release(&mut self, handle: &PreviewHandle);
}

/// A selected file together with its preview handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSelection {
    file: ImageFile,
    preview: PreviewHandle,
}

impl ImageSelection {
    /// The selected file.
    #[must_use]
    pub const fn file(&self) -> &ImageFile {
        &self.file
    }

    /// The preview handle for the selected file.
    #[must_use]
    pub const fn preview(&self) -> &PreviewHandle {
        &self.preview
    }
}

/// Tracks the before and after selections.
#[derive(Debug)]
pub struct SelectionManager<P: PreviewHandles> {
    before: Option<ImageSelection>,
    after: Option<ImageSelection>,
    previews: P,
}

impl<P: PreviewHandles> SelectionManager<P> {
    /// Create an empty manager using `previews` to allocate handles.
    #[must_use]
    pub const fn new(previews: P) -> Self {
        Self {
            before: None,
            after: None,
            previews,
        }
    }

    /// Select a file for `slot`.
    ///
    /// The file is classified by content (falling back to
    /// `declared_mime`). Unsupported or empty files are rejected, as is a
    /// file whose preview cannot be allocated; in every rejection case the
    /// slot keeps its previous selection. On success the prior preview
    /// handle for the slot is released.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Empty`], [`SelectionError::Unsupported`],
    /// or [`SelectionError::Preview`].
    pub fn select(
        &mut self,
        slot: Slot,
        name: impl Into<String>,
        declared_mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<&ImageSelection, SelectionError> {
        let name = name.into();
        if bytes.is_empty() {
            return Err(SelectionError::Empty { name });
        }
        let Some(media_type) = ImageMediaType::classify(&bytes, declared_mime) else {
            return Err(SelectionError::Unsupported { name });
        };

        let file = ImageFile::new(name, media_type, Rc::from(bytes));
        let preview = self.previews.create(&file)?;

        tracing::debug!(%slot, %media_type, bytes = file.len(), "image selected");

        let entry = match slot {
            Slot::Before => &mut self.before,
            Slot::After => &mut self.after,
        };
        if let Some(old) = entry.take() {
            self.previews.release(&old.preview);
        }
        Ok(entry.insert(ImageSelection { file, preview }))
    }

    /// Remove the selection for `slot`, releasing its preview handle.
    ///
    /// Returns `true` if the slot held a selection.
    pub fn clear(&mut self, slot: Slot) -> bool {
        match self.slot_mut(slot).take() {
            Some(old) => {
                self.previews.release(&old.preview);
                true
            }
            None => false,
        }
    }

    /// The current selection for `slot`, if any.
    #[must_use]
    pub const fn get(&self, slot: Slot) -> Option<&ImageSelection> {
        self.slot_ref(slot)
    }

    /// Slots that do not hold a file.
    #[must_use]
    pub fn missing(&self) -> Vec<Slot> {
        Slot::ALL
            .into_iter()
            .filter(|slot| self.get(*slot).is_none_or(|s| s.file.is_empty()))
            .collect()
    }

    /// Returns `true` if both slots hold a non-empty file.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// The preview allocator.
    #[must_use]
    pub const fn previews(&self) -> &P {
        &self.previews
    }

    const fn slot_ref(&self, slot: Slot) -> Option<&ImageSelection> {
        match slot {
            Slot::Before => self.before.as_ref(),
            Slot::After => self.after.as_ref(),
        }
    }

    const fn slot_mut(&mut self, slot: Slot) -> &mut Option<ImageSelection> {
        match slot {
            Slot::Before => &mut self.before,
            Slot::After => &mut self.after,
        }
    }
}

impl<P: PreviewHandles> Drop for SelectionManager<P> {
    fn drop(&mut self) {
        for slot in Slot::ALL {
            self.clear(slot);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeSet;

    use super::*;

    pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    /// Preview allocator that tracks which handles are alive.
    ///
    /// State is shared through an `Rc` so tests can inspect it after the
    /// manager has been dropped.
    #[derive(Debug, Clone, Default)]
    pub struct CountingPreviews {
        pub state: Rc<RefCell<PreviewLedger>>,
    }

    #[derive(Debug, Default)]
    pub struct PreviewLedger {
        pub next: u32,
        pub live: BTreeSet<String>,
        pub released: Vec<String>,
        pub fail_next: bool,
    }

    impl PreviewHandles for CountingPreviews {
        fn create(&mut self, _file: &ImageFile) -> Result<PreviewHandle, PreviewError> {
            let mut state = self.state.borrow_mut();
            if std::mem::take(&mut state.fail_next) {
                return Err(PreviewError("out of blob URLs".into()));
            }
            state.next += 1;
            let url = format!("blob:test/{}", state.next);
            state.live.insert(url.clone());
            Ok(PreviewHandle::new(url))
        }

        fn release(&mut self, handle: &PreviewHandle) {
            let mut state = self.state.borrow_mut();
            assert!(
                state.live.remove(handle.as_str()),
                "released a handle that was not live: {handle:?}"
            );
            state.released.push(handle.as_str().to_owned());
        }
    }

    fn manager() -> (SelectionManager<CountingPreviews>, Rc<RefCell<PreviewLedger>>) {
        let previews = CountingPreviews::default();
        let state = Rc::clone(&previews.state);
        (SelectionManager::new(previews), state)
    }

    #[test]
    fn select_stores_file_and_preview() {
        let (mut m, state) = manager();
        let sel = m.select(Slot::Before, "a.png", None, PNG.to_vec()).unwrap();
        assert_eq!(sel.file().name(), "a.png");
        assert_eq!(sel.file().media_type(), ImageMediaType::Png);
        assert_eq!(sel.preview().as_str(), "blob:test/1");
        assert_eq!(state.borrow().live.len(), 1);
        assert!(m.get(Slot::After).is_none());
    }

    #[test]
    fn replacing_a_selection_releases_the_old_preview() {
        let (mut m, state) = manager();
        m.select(Slot::After, "a.png", None, PNG.to_vec()).unwrap();
        m.select(Slot::After, "b.jpg", None, JPEG.to_vec()).unwrap();
        let state = state.borrow();
        assert_eq!(state.released, vec!["blob:test/1".to_owned()]);
        assert_eq!(state.live.len(), 1);
        assert!(state.live.contains("blob:test/2"));
    }

    #[test]
    fn unsupported_type_leaves_slot_unchanged() {
        let (mut m, state) = manager();
        m.select(Slot::Before, "a.png", None, PNG.to_vec()).unwrap();
        let err = m
            .select(Slot::Before, "b.gif", Some("image/gif"), b"GIF89a..".to_vec())
            .unwrap_err();
        assert!(matches!(err, SelectionError::Unsupported { ref name } if name == "b.gif"));
        assert_eq!(m.get(Slot::Before).unwrap().file().name(), "a.png");
        assert!(state.borrow().released.is_empty());
    }

    #[test]
    fn empty_file_is_rejected() {
        let (mut m, _state) = manager();
        let err = m
            .select(Slot::Before, "empty.png", Some("image/png"), Vec::new())
            .unwrap_err();
        assert!(matches!(err, SelectionError::Empty { .. }));
        assert!(m.get(Slot::Before).is_none());
    }

    #[test]
    fn preview_failure_leaves_slot_unchanged() {
        let (mut m, state) = manager();
        m.select(Slot::Before, "a.png", None, PNG.to_vec()).unwrap();
        state.borrow_mut().fail_next = true;
        let err = m.select(Slot::Before, "b.png", None, PNG.to_vec()).unwrap_err();
        assert!(matches!(err, SelectionError::Preview(_)));
        assert_eq!(m.get(Slot::Before).unwrap().file().name(), "a.png");
        assert_eq!(state.borrow().live.len(), 1);
    }

    #[test]
    fn clear_releases_preview() {
        let (mut m, state) = manager();
        m.select(Slot::Before, "a.png", None, PNG.to_vec()).unwrap();
        assert!(m.clear(Slot::Before));
        assert!(!m.clear(Slot::Before));
        assert!(state.borrow().live.is_empty());
    }

    #[test]
    fn completeness_tracks_both_slots() {
        let (mut m, _state) = manager();
        assert_eq!(m.missing(), vec![Slot::Before, Slot::After]);
        m.select(Slot::After, "a.jpg", None, JPEG.to_vec()).unwrap();
        assert_eq!(m.missing(), vec![Slot::Before]);
        assert!(!m.is_complete());
        m.select(Slot::Before, "b.png", None, PNG.to_vec()).unwrap();
        assert!(m.is_complete());
    }

    #[test]
    fn drop_releases_every_handle() {
        let (mut m, state) = manager();
        for _ in 0..5 {
            m.select(Slot::Before, "a.png", None, PNG.to_vec()).unwrap();
            m.select(Slot::After, "b.jpg", None, JPEG.to_vec()).unwrap();
        }
        assert_eq!(state.borrow().live.len(), 2);
        drop(m);
        let state = state.borrow();
        assert!(state.live.is_empty());
        assert_eq!(state.released.len(), 10);
    }
}
