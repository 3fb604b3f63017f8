pub mod dom;
pub mod engine;
pub mod event_loop;
pub mod highlight;
pub mod host;
pub mod scheduler;
pub mod sentence_detector;

// Re-export main types for convenient access
pub use sentence_detector::{BoundaryRules, SentenceBoundaryLocator, SentenceSpan};

// Page-side pipeline
pub use dom::{parse_html, to_html, Document, NodeId};
pub use engine::{HighlighterConfig, SentenceHighlighter};
pub use highlight::{Formatting, FormattingPatch, HighlightReport, LineLayout, Point, PointerEvent};

// Host collaborator and driver
pub use event_loop::{run, LoopStats};
pub use host::{HostClient, HostNotification, TabId, TabStateHost};
pub use scheduler::{PointerScheduler, SchedulerConfig};
