//! The image session: which image is being annotated, and how the next one
//! replaces it.
//!
//! Loads are tagged with a monotonically increasing generation. A load only
//! commits if its generation is still the latest when it finishes, so the
//! last *requested* image wins even when an older request resolves later.
//! Failed loads put the previous image back, but only if nothing newer has
//! started in the meantime.
//!
//! State lives behind a `parking_lot` mutex that is never held across an
//! `.await`; network and decode work run unlocked.

use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use mask_core::{ImageTransform, Size, Stroke};
use mask_render::compile_submission;
use parking_lot::Mutex;

use crate::backend::{SubmitBackend, SubmitPayload};
use crate::driver::{Driver, DriverRegistry, Locator};
use crate::error::{LoadError, SessionError};
use crate::loader::ImageLoader;

pub const DEFAULT_DECODE_TIMEOUT: Duration = Duration::from_secs(30);
/// Canvas assumed until the host reports its real size.
pub const DEFAULT_VIEWPORT: Size = Size::new(1280.0, 720.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Loading,
    Ready,
    Submitting,
}

/// The active driver and where it is positioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub driver: String,
    pub locator: Locator,
    /// `"id/page"` of the last item the driver returned.
    pub display: String,
}

/// A decoded image with its annotation.
#[derive(Debug, Clone)]
pub struct Entry {
    pub provider: String,
    pub id: String,
    pub page: String,
    pub image: Arc<DynamicImage>,
    pub size: Size,
    pub transform: ImageTransform,
    pub strokes: Vec<Stroke>,
    /// Load generation that produced this entry.
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The new image is current.
    Loaded { generation: u64 },
    /// A newer load started first; this result was discarded.
    Stale,
    /// The driver had nothing to return; the previous image is back.
    Exhausted,
}

struct State {
    phase: Phase,
    entry: Option<Entry>,
    /// Last ready entry, held while loads are in flight.
    parked: Option<Entry>,
    generation: u64,
    source: Source,
    viewport: Size,
    chrome_offset: f64,
}

impl State {
    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    fn restore_parked(&mut self) {
        self.entry = self.parked.take();
        self.phase = if self.entry.is_some() {
            Phase::Ready
        } else {
            Phase::Empty
        };
    }

    fn fit(&self, size: Size) -> ImageTransform {
        ImageTransform::fit(self.viewport, size, self.chrome_offset)
    }
}

struct Inner {
    state: Mutex<State>,
    registry: Arc<DriverRegistry>,
    loader: Arc<dyn ImageLoader>,
    backend: Arc<dyn SubmitBackend>,
    decode_timeout: Duration,
    source_lock: tokio::sync::Mutex<()>,
}

/// Shared handle to the session. Clones refer to the same session.
#[derive(Clone)]
pub struct ImageSession {
    inner: Arc<Inner>,
}

impl ImageSession {
    pub fn new(
        registry: Arc<DriverRegistry>,
        loader: Arc<dyn ImageLoader>,
        backend: Arc<dyn SubmitBackend>,
        source: Source,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    phase: Phase::Empty,
                    entry: None,
                    parked: None,
                    generation: 0,
                    source,
                    viewport: DEFAULT_VIEWPORT,
                    chrome_offset: 0.0,
                }),
                registry,
                loader,
                backend,
                decode_timeout: DEFAULT_DECODE_TIMEOUT,
                source_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Replace the decode timeout. Only affects a session not yet shared.
    pub fn with_decode_timeout(mut self, timeout: Duration) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.decode_timeout = timeout;
        } else {
            log::warn!("decode timeout ignored: session already shared");
        }
        self
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.inner.state.lock().phase
    }

    pub fn generation(&self) -> u64 {
        self.inner.state.lock().generation
    }

    pub fn source(&self) -> Source {
        self.inner.state.lock().source.clone()
    }

    pub fn registry(&self) -> &Arc<DriverRegistry> {
        &self.inner.registry
    }

    /// The active driver, if its key is registered.
    pub fn driver(&self) -> Option<Arc<dyn Driver>> {
        let key = self.inner.state.lock().source.driver.clone();
        self.inner.registry.get(&key)
    }

    /// `true` while a source change holds the source controls.
    pub fn is_source_locked(&self) -> bool {
        self.inner.source_lock.try_lock().is_err()
    }

    /// Run `f` on the ready entry. Must not block: the state lock is held.
    pub fn with_entry<R>(&self, f: impl FnOnce(&Entry) -> R) -> Option<R> {
        self.inner.state.lock().entry.as_ref().map(f)
    }

    pub fn with_entry_mut<R>(&self, f: impl FnOnce(&mut Entry) -> R) -> Option<R> {
        self.inner.state.lock().entry.as_mut().map(f)
    }

    /// Canvas size and chrome offset (device pixels) used to fit images.
    pub fn set_viewport(&self, viewport: Size, chrome_offset: f64) {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        state.viewport = viewport;
        state.chrome_offset = chrome_offset;
        for entry in state.entry.iter_mut().chain(state.parked.iter_mut()) {
            entry.transform = ImageTransform::fit(viewport, entry.size, chrome_offset);
        }
    }

    // ─── Transitions ─────────────────────────────────────────────────────

    /// Switch to the next image, from `locator` if given, else from the
    /// source's current locator.
    pub async fn next(&self, locator: Option<Locator>) -> Result<LoadOutcome, SessionError> {
        let (generation, driver_key, locator) = {
            let mut state = self.inner.state.lock();
            state.generation += 1;
            if let Some(entry) = state.entry.take() {
                state.parked = Some(entry);
            }
            state.phase = Phase::Loading;
            let locator = locator.unwrap_or_else(|| state.source.locator.clone());
            (state.generation, state.source.driver.clone(), locator)
        };
        log::debug!("load {generation}: {driver_key} {locator:?}");

        let Some(driver) = self.inner.registry.get(&driver_key) else {
            self.abandon(generation);
            return Err(SessionError::UnknownDriver(driver_key));
        };

        let item = match driver.next(&locator).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                log::info!("{driver_key} has nothing at {locator:?}");
                if !self.abandon(generation) {
                    return Ok(LoadOutcome::Stale);
                }
                // Start over from a fresh item rather than re-asking the same spot.
                self.inner.state.lock().source.locator = Locator::Fresh;
                return Ok(LoadOutcome::Exhausted);
            }
            Err(e) => {
                log::warn!("load {generation}: driver failed: {e}");
                return self.fail(generation, e.into());
            }
        };

        {
            let mut state = self.inner.state.lock();
            if state.is_current(generation) {
                state.source.locator = item.locator.clone();
                state.source.display = format!("{}/{}", item.id, item.page);
            }
        }

        let timeout = self.inner.decode_timeout;
        let image = match tokio::time::timeout(timeout, self.inner.loader.load(&item.url)).await {
            Ok(Ok(image)) => image,
            Ok(Err(e)) => {
                log::warn!("load {generation}: {e}");
                return self.fail(generation, e.into());
            }
            Err(_) => {
                log::warn!("load {generation}: decode of {} timed out", item.url);
                return self.fail(generation, LoadError::Timeout(timeout).into());
            }
        };

        let mut state = self.inner.state.lock();
        if !state.is_current(generation) {
            log::debug!(
                "load {generation} discarded: generation {} is newer",
                state.generation
            );
            return Ok(LoadOutcome::Stale);
        }
        let size = Size::new(f64::from(image.width()), f64::from(image.height()));
        let transform = state.fit(size);
        state.entry = Some(Entry {
            provider: driver_key,
            id: item.id,
            page: item.page,
            image: Arc::new(image),
            size,
            transform,
            strokes: Vec::new(),
            generation,
        });
        state.parked = None;
        state.phase = Phase::Ready;
        log::info!("load {generation}: ready {}", state.source.display);
        Ok(LoadOutcome::Loaded { generation })
    }

    /// Send the ready image and its mask to the backend, then advance.
    ///
    /// On failure the image and its strokes are put back.
    pub async fn submit(&self, author: &str) -> Result<LoadOutcome, SessionError> {
        let entry = {
            let mut state = self.inner.state.lock();
            if state.phase != Phase::Ready {
                return Err(SessionError::NotReady);
            }
            let Some(entry) = state.entry.take() else {
                return Err(SessionError::NotReady);
            };
            state.phase = Phase::Submitting;
            entry
        };
        log::debug!(
            "submitting {}/{}/{} with {} strokes",
            entry.provider,
            entry.id,
            entry.page,
            entry.strokes.len()
        );

        match self.send(&entry, author).await {
            Ok(()) => self.next(None).await,
            Err(e) => {
                log::warn!("submit failed, restoring {}/{}: {e}", entry.id, entry.page);
                self.restore_submitted(entry);
                Err(e)
            }
        }
    }

    /// Point the session at another driver and/or locator and load from it.
    ///
    /// Rejected with [`SessionError::SourceLocked`] while another change is
    /// still loading.
    pub async fn change_source(
        &self,
        driver: &str,
        locator: Locator,
    ) -> Result<LoadOutcome, SessionError> {
        let Ok(_guard) = self.inner.source_lock.try_lock() else {
            return Err(SessionError::SourceLocked);
        };
        if !self.inner.registry.contains(driver) {
            return Err(SessionError::UnknownDriver(driver.to_string()));
        }
        {
            let mut state = self.inner.state.lock();
            state.source.driver = driver.to_string();
            state.source.locator = locator;
        }
        log::info!("source changed to {driver}");
        self.next(None).await
    }

    // ─── Internals ───────────────────────────────────────────────────────

    async fn send(&self, entry: &Entry, author: &str) -> Result<(), SessionError> {
        let image = Arc::clone(&entry.image);
        let strokes = entry.strokes.clone();
        let images = tokio::task::spawn_blocking(move || compile_submission(&image, &strokes))
            .await
            .map_err(|e| SessionError::Task(e.to_string()))??;

        let payload = SubmitPayload {
            provider: entry.provider.clone(),
            id: entry.id.clone(),
            page: entry.page.clone(),
            image: images.image_base64(),
            mask: images.mask_base64(),
            author: author.to_string(),
        };
        self.inner.backend.submit(&payload).await?;
        Ok(())
    }

    /// Drop load `generation`; restores the parked entry if it is still
    /// current. Returns whether it was.
    fn abandon(&self, generation: u64) -> bool {
        let mut state = self.inner.state.lock();
        if !state.is_current(generation) {
            return false;
        }
        state.restore_parked();
        log::debug!("load {generation} abandoned, previous image restored");
        true
    }

    fn fail(&self, generation: u64, error: SessionError) -> Result<LoadOutcome, SessionError> {
        if self.abandon(generation) {
            Err(error)
        } else {
            Ok(LoadOutcome::Stale)
        }
    }

    fn restore_submitted(&self, mut entry: Entry) {
        let mut state = self.inner.state.lock();
        if state.phase == Phase::Submitting && state.is_current(entry.generation) {
            entry.transform = state.fit(entry.size);
            state.entry = Some(entry);
            state.phase = Phase::Ready;
        } else if state.parked.is_none() && state.entry.is_none() {
            // A load started meanwhile; keep the work for its failure path.
            state.parked = Some(entry);
        }
    }
}
