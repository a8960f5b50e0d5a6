//! `EditorSession`: the editor, the image session, and the preload worker
//! wired together behind one tick.

use std::ops::ControlFlow;
use std::sync::Arc;

use mask_core::{Settings, Size};
use mask_editor::{EditTarget, Editor, EditorAction, Frame, InputEvent};
use mask_render::{MaskSurface, render_overlay};
use tokio::sync::{mpsc, watch};

use crate::backend::{HttpBackend, SubmitBackend};
use crate::config::AppConfig;
use crate::driver::{DriverRegistry, Locator};
use crate::error::SessionError;
use crate::loader::{HttpImageLoader, ImageLoader};
use crate::preload::{PreloadWorker, TaskStatus};
use crate::schedule::{FrameSource, TickLoop};
use crate::session::{ImageSession, LoadOutcome, Source};

pub struct EditorSession {
    editor: Editor,
    session: ImageSession,
    settings: Arc<Settings>,
    preload: PreloadWorker,
    overlay: MaskSurface,
}

impl EditorSession {
    pub fn new(
        config: &AppConfig,
        registry: Arc<DriverRegistry>,
        loader: Arc<dyn ImageLoader>,
        backend: Arc<dyn SubmitBackend>,
    ) -> Result<Self, SessionError> {
        let driver = match &config.source.driver {
            Some(key) => key.clone(),
            None => registry
                .default_key()
                .ok_or_else(|| SessionError::UnknownDriver(String::new()))?
                .to_string(),
        };
        if !registry.contains(&driver) {
            return Err(SessionError::UnknownDriver(driver));
        }

        let source = Source {
            driver,
            locator: config.source.locator(),
            display: String::new(),
        };
        let session = ImageSession::new(registry, Arc::clone(&loader), backend, source)
            .with_decode_timeout(config.decode_timeout());

        Ok(Self {
            editor: Editor::new(config.keybinds.clone()),
            session,
            settings: Arc::new(config.settings.clone()),
            preload: PreloadWorker::new(loader),
            overlay: MaskSurface::new(1, 1),
        })
    }

    /// Build with the HTTP loader and backend from `config`.
    pub fn connect(config: &AppConfig, registry: Arc<DriverRegistry>) -> Result<Self, SessionError> {
        let loader = HttpImageLoader::new(config.base_url.as_deref())?;
        let backend = HttpBackend::new(config.submit_url.clone())?;
        Self::new(config, registry, Arc::new(loader), Arc::new(backend))
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn session(&self) -> &ImageSession {
        &self.session
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Swap in a new settings snapshot; the next tick reads it.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = Arc::new(settings);
    }

    pub fn preload_status(&self) -> watch::Receiver<TaskStatus> {
        self.preload.subscribe()
    }

    /// Begin preloading and load the first image.
    pub async fn start(&self) -> Result<LoadOutcome, SessionError> {
        self.restart_preload();
        self.session.next(None).await
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        self.editor.handle_event(event, &self.settings);
    }

    /// Run one editor tick of `dt` milliseconds. Skipped while the window
    /// is unfocused. Skip and submit requests are spawned onto the runtime.
    pub fn tick(&mut self, dt: f64) -> Vec<EditorAction> {
        if !self.editor.input.is_focused() {
            return Vec::new();
        }

        let settings = Arc::clone(&self.settings);
        let editor = &mut self.editor;
        let actions = self.session.with_entry_mut(|entry| {
            let target = EditTarget {
                generation: entry.generation,
                transform: entry.transform,
                strokes: &mut entry.strokes,
            };
            editor.tick(dt, &settings, Some(target))
        });
        let actions = match actions {
            Some(actions) => actions,
            None => self.editor.tick(dt, &settings, None),
        };

        for action in &actions {
            match action {
                EditorAction::SkipImage => {
                    let session = self.session.clone();
                    spawn("skip", async move { session.next(None).await.map(drop) });
                }
                EditorAction::SubmitImage => {
                    let session = self.session.clone();
                    let author = settings.username.clone();
                    spawn("submit", async move { session.submit(&author).await.map(drop) });
                }
                EditorAction::StrokesChanged => {}
            }
        }
        actions
    }

    pub fn frame(&self) -> Frame {
        let transform = self.session.with_entry(|entry| entry.transform);
        self.editor.frame(transform.as_ref(), &self.settings)
    }

    /// Redraw the overlay for the current image, in image pixels.
    /// `None` while no image is ready.
    pub fn overlay(&mut self) -> Option<&MaskSurface> {
        let opacity = self.editor.opacity();
        let preview = self.editor.preview();
        let overlay = &mut self.overlay;
        self.session.with_entry(|entry| {
            overlay.resize(entry.image.width(), entry.image.height());
            render_overlay(overlay, &entry.strokes, opacity, &preview);
        })?;
        Some(&self.overlay)
    }

    /// Canvas size in device pixels.
    pub fn set_viewport(&self, canvas: Size) {
        self.session
            .set_viewport(canvas, self.settings.chrome_offset());
    }

    /// Switch driver or locator, then restart preloading from the new driver.
    pub async fn change_source(
        &mut self,
        driver: &str,
        locator: Locator,
    ) -> Result<LoadOutcome, SessionError> {
        let outcome = self.session.change_source(driver, locator).await;
        if !matches!(outcome, Err(SessionError::SourceLocked)) {
            self.restart_preload();
        }
        outcome
    }

    /// Drive the editor until the frame source or the event channel closes.
    pub async fn run(
        &mut self,
        frames: FrameSource,
        mut events: mpsc::UnboundedReceiver<InputEvent>,
    ) {
        TickLoop::new(frames)
            .run(|dt| {
                loop {
                    match events.try_recv() {
                        Ok(event) => self.handle_event(&event),
                        Err(mpsc::error::TryRecvError::Empty) => break,
                        Err(mpsc::error::TryRecvError::Disconnected) => {
                            return ControlFlow::Break(());
                        }
                    }
                }
                self.tick(dt);
                ControlFlow::Continue(())
            })
            .await;
        self.preload.stop();
    }

    fn restart_preload(&self) {
        match self.session.driver() {
            Some(driver) => self.preload.start(driver, self.settings.preload),
            None => self.preload.stop(),
        }
    }
}

fn spawn<F>(what: &'static str, task: F)
where
    F: Future<Output = Result<(), SessionError>> + Send + 'static,
{
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        log::error!("{what} requested outside a tokio runtime");
        return;
    };
    runtime.spawn(async move {
        if let Err(e) = task.await {
            log::warn!("{what} failed: {e}");
        }
    });
}
