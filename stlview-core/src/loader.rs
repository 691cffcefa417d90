/// Model loading: byte fetch, request generations, parse and normalize.
///
/// A load is split at its only suspend point. [`LoadGeneration::issue`]
/// hands out a ticket, the host fetches bytes asynchronously, and the
/// synchronous continuation (`Viewer::finish_load`) drops any completion
/// whose ticket has been superseded, so the most recent request always wins.
use std::future::Future;

use crate::config::ViewerConfig;
use crate::error::{FetchError, LoadError};
use crate::geometry::NormalizedMesh;
use crate::stl;

/// Identifies one load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub url: String,
}

/// Monotonic request counter.
#[derive(Debug, Default)]
pub struct LoadGeneration {
    current: u64,
}

impl LoadGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket that supersedes every earlier one.
    pub fn issue(&mut self, url: &str) -> LoadTicket {
        self.current += 1;
        LoadTicket {
            generation: self.current,
            url: url.to_string(),
        }
    }

    /// Supersede all outstanding tickets without issuing a new one.
    pub fn invalidate(&mut self) {
        self.current += 1;
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.current
    }
}

/// Fetched bytes (or the fetch failure) paired with the ticket that asked for them.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadCompletion {
    pub ticket: LoadTicket,
    pub bytes: Result<Vec<u8>, FetchError>,
}

/// What the continuation did with a completion
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The mesh was attached, replacing any previous one.
    Applied { triangles: usize },
    /// A newer request (or an unmount) superseded this one; nothing changed.
    Superseded,
    /// The load failed; the scene is left empty and the error is recorded.
    Failed(LoadError),
}

/// Generic byte fetch.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>>;
}

/// Run `fetcher` for `ticket` and pair the result with it.
pub async fn fetch_completion<F: Fetch>(fetcher: &F, ticket: LoadTicket) -> LoadCompletion {
    let bytes = fetcher.fetch(&ticket.url).await;
    if let Err(e) = &bytes {
        log::warn!("fetch of {} failed: {e}", ticket.url);
    }
    LoadCompletion { ticket, bytes }
}

/// Parse STL bytes and normalize the result for display.
pub fn prepare_mesh(bytes: &[u8], config: &ViewerConfig) -> Result<NormalizedMesh, LoadError> {
    let geometry = stl::parse_stl_with_limit(bytes, config.text_size_limit)?;
    if geometry.triangle_count() == 0 {
        return Err(LoadError::Empty);
    }
    log::debug!(
        "parsed {} triangles from {} bytes",
        geometry.triangle_count(),
        bytes.len()
    );
    Ok(geometry.normalized(config.target_size))
}
