//! Chunked media transfer capability traits.
//!
//! Uploads and downloads that are too large for the single-shot path go
//! through these handles, which own their own chunked or resumable transfer
//! cycle against the transport. A descriptor can hold at most one handle,
//! and an attached uploader makes the direct build path unreachable.

use std::fmt;
use std::io::Write;

use crate::content::Content;
use crate::error::Error;
use crate::headers::HeaderSet;
use crate::http::{HttpResponse, Method};

/// Capability trait for chunked or resumable uploads.
///
/// The engine configures the handle before the transfer: the initiation
/// method mirrors the descriptor's method, the metadata is the descriptor's
/// content when present, and the initiation headers are the descriptor's
/// headers at dispatch time. `upload` runs the whole transfer and returns
/// the final response.
pub trait MediaUploader: Send {
    fn set_initiation_method(&mut self, method: Method);
    fn set_metadata(&mut self, metadata: Content);
    fn set_initiation_headers(&mut self, headers: HeaderSet);
    fn upload(&mut self, url: &str) -> Result<HttpResponse, Error>;
}

/// Capability trait for chunked downloads (GET with range cycling).
pub trait MediaDownloader: Send {
    fn download(
        &mut self,
        url: &str,
        headers: &HeaderSet,
        sink: &mut dyn Write,
    ) -> Result<(), Error>;
}

/// Media transfer slot of a descriptor: absent, or exactly one of an
/// uploader or a downloader. The mutual exclusivity lives in the type.
#[derive(Default)]
pub enum MediaTransfer {
    #[default]
    None,
    Upload(Box<dyn MediaUploader>),
    Download(Box<dyn MediaDownloader>),
}

impl MediaTransfer {
    pub fn is_none(&self) -> bool {
        matches!(self, MediaTransfer::None)
    }

    pub fn is_upload(&self) -> bool {
        matches!(self, MediaTransfer::Upload(_))
    }

    pub fn is_download(&self) -> bool {
        matches!(self, MediaTransfer::Download(_))
    }
}

impl fmt::Debug for MediaTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaTransfer::None => f.write_str("MediaTransfer::None"),
            MediaTransfer::Upload(_) => f.write_str("MediaTransfer::Upload"),
            MediaTransfer::Download(_) => f.write_str("MediaTransfer::Download"),
        }
    }
}
