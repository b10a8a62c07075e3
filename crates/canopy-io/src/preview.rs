//! Blob URL preview handles for selected images.

use canopy_core::{ImageFile, PreviewError, PreviewHandle, PreviewHandles};

use crate::blob;

/// Allocates `blob:` URLs for selection previews.
///
/// Counts outstanding URLs so leaks show up in debug logs.
#[derive(Debug, Default)]
pub struct BlobUrlPreviews {
    live: usize,
}

impl BlobUrlPreviews {
    /// Number of Blob URLs created and not yet revoked.
    #[must_use]
    pub const fn live(&self) -> usize {
        self.live
    }
}

impl PreviewHandles for BlobUrlPreviews {
    fn create(&mut self, file: &ImageFile) -> Result<PreviewHandle, PreviewError> {
        let url = blob::bytes_to_blob_url(file.bytes(), file.media_type().mime())
            .map_err(|e| PreviewError(e.to_string()))?;
        self.live += 1;
        tracing::debug!(live = self.live, "preview URL created");
        Ok(PreviewHandle::new(url))
    }

    fn release(&mut self, handle: &PreviewHandle) {
        blob::revoke_blob_url(handle.as_str());
        self.live = self.live.saturating_sub(1);
        tracing::debug!(live = self.live, "preview URL revoked");
    }
}
