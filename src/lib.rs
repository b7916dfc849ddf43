//! Subtitle synchronisation and scroll choreography for a video hero section.
//!
//! [`sync::SubtitleSync`] turns per-frame video time samples into changes of
//! the active bilingual subtitle, and [`transform::TransformResolver`] works
//! out where the scroll-pinned phone mockup ends up for a given viewport.
//! Both are pure with respect to their configuration; the drivers in
//! [`driver`] and the glue in [`stage`] call them once per frame or scroll
//! update.

pub mod config;
pub mod driver;
pub mod ease;
pub mod error;
pub mod lint;
pub mod parser;
pub mod processor;
pub mod serialiser;
pub mod srt;
pub mod stage;
pub mod subtitle;
pub mod sync;
pub mod timeline;
pub mod transform;
pub mod transition;

pub use config::StageConfig;
pub use error::{StageError, StageResult};
pub use subtitle::{resolve_active, SubtitleInterval, SubtitleTrack};
pub use sync::{SubtitleChange, SubtitleSync, TimeSource};
pub use transform::{TransformResolver, TransformResult, Viewport};
