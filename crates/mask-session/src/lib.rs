//! Mask Draft session layer: image drivers, loading and submission, the
//! image session state machine, background preloading, and the tick loop
//! that drives the editor.

pub mod app;
pub mod backend;
pub mod config;
pub mod driver;
pub mod error;
pub mod loader;
pub mod preload;
pub mod schedule;
pub mod session;

pub use app::EditorSession;
pub use backend::{HttpBackend, SubmitBackend, SubmitPayload};
pub use config::{AppConfig, SourceConfig};
pub use driver::{Driver, DriverItem, DriverRegistry, DriverRegistryBuilder, Locator, PreloadItem};
pub use error::{BackendError, ConfigError, DriverError, LoadError, SessionError};
pub use loader::{HttpImageLoader, ImageLoader};
pub use preload::{PreloadWorker, TaskStatus};
pub use schedule::{FrameSource, TickLoop};
pub use session::{Entry, ImageSession, LoadOutcome, Phase, Source};
