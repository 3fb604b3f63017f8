// WHY: the page-side pipeline from pointer to highlight marker
// eligibility -> caret -> container -> offsets -> locator -> renderer

pub mod caret;
pub mod container;
pub mod eligibility;
pub mod layout;
pub mod offsets;
pub mod renderer;
pub mod style;

pub use caret::{resolve_caret, Caret, CaretLookup, CaretSource, Point, PointerEvent};
pub use container::find_container;
pub use eligibility::{is_eligible, EligibilityReport};
pub use layout::LineLayout;
pub use offsets::{sub_ranges, text_runs, to_absolute_offset, to_sub_ranges, SubRange, TextRun};
pub use renderer::{apply_styles, highlight_sentence, remove_highlights, rehighlight, HighlightReport};
pub use style::{stylesheet, Formatting, FormattingPatch};

/// Class of the inline marker wrapping highlighted text
pub const HIGHLIGHT_CLASS: &str = "sentence-highlight";

/// Attribute set on the root of the extension's own floating UI
pub const FLOATING_UI_ATTR: &str = "data-sentence-follower-ui";

/// Attribute identifying the injected stylesheet
pub const STYLE_MARKER_ATTR: &str = "data-sentence-highlighter";

/// Attribute set on `<body>` once the highlighter is attached to a page
pub const INITIALIZED_ATTR: &str = "data-sentence-highlighter-initialized";
