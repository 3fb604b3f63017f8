// WHY: owned highlighter state, one instance per page
// Errors stop here: every failure is logged and degrades to "no highlight"

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::dom::Document;
use crate::highlight::{
    apply_styles, find_container, highlight_sentence, rehighlight, remove_highlights, resolve_caret,
    to_absolute_offset, CaretSource, EligibilityReport, Formatting, HighlightReport, PointerEvent,
    INITIALIZED_ATTR,
};
use crate::host::{HostClient, HostNotification};
use crate::scheduler::SchedulerConfig;
use crate::sentence_detector::{BoundaryRules, SentenceBoundaryLocator, DEFAULT_CACHE_CAPACITY};

/// Configuration for the page highlighter
#[derive(Debug, Clone)]
pub struct HighlighterConfig {
    pub rules: BoundaryRules,
    /// Sentence cache entries kept before a full clear
    pub cache_capacity: usize,
    pub scheduler: SchedulerConfig,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        Self {
            rules: BoundaryRules::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            scheduler: SchedulerConfig::default(),
        }
    }
}

pub struct SentenceHighlighter {
    locator: SentenceBoundaryLocator,
    scheduler: SchedulerConfig,
    enabled: bool,
    formatting: Formatting,
}

impl SentenceHighlighter {
    pub fn new(config: HighlighterConfig) -> Result<Self> {
        Ok(Self {
            locator: SentenceBoundaryLocator::with_cache_capacity(config.rules, config.cache_capacity)?,
            scheduler: config.scheduler,
            enabled: false,
            formatting: Formatting::default(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn formatting(&self) -> &Formatting {
        &self.formatting
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        self.scheduler
    }

    pub fn cache_len(&self) -> usize {
        self.locator.cache_len()
    }

    /// Drop memoized sentence spans
    pub fn reset(&mut self) {
        self.locator.clear_cache();
    }

    /// Load settings from the host and attach to the page.
    ///
    /// Returns false when the page was already initialized or has no body.
    pub async fn initialize(&mut self, doc: &mut Document, host: &HostClient) -> bool {
        info!(tab = host.tab().0, "Initializing sentence highlighter");
        self.formatting = match host.get_formatting().await {
            Ok(formatting) => formatting,
            Err(e) => {
                warn!(error = %e, "Error loading tab formatting, using defaults");
                Formatting::default()
            }
        };
        self.refresh_styles(doc);

        let Some(body) = doc.body() else {
            warn!("Page has no body to attach to");
            return false;
        };
        if doc.attr(body, INITIALIZED_ATTR).is_some() {
            debug!("Highlighter already initialized on this page");
            return false;
        }
        if let Err(e) = doc.set_attr(body, INITIALIZED_ATTR, "true") {
            warn!(error = %e, "Failed to mark page as initialized");
            return false;
        }

        match host.get_enabled().await {
            Ok(enabled) => self.enabled = enabled,
            Err(e) => error!(error = %e, "Error getting tab enabled state"),
        }
        info!(enabled = self.enabled, formatting = ?self.formatting, "Sentence highlighter initialized");
        true
    }

    /// Highlight the sentence under a debounced pointer move
    pub fn handle_pointer_move<C: CaretSource + ?Sized>(
        &mut self,
        doc: &mut Document,
        caret_source: &C,
        event: &PointerEvent,
    ) -> Option<HighlightReport> {
        if !self.enabled {
            return None;
        }

        let eligibility = EligibilityReport::inspect(doc, event.target);
        if !eligibility.is_eligible() {
            debug!(element = ?event.target, report = ?eligibility, "Element not eligible for highlighting");
            return None;
        }

        let caret = resolve_caret(caret_source, doc, event.point)?;
        if !doc.is_text(caret.node) {
            debug!(node = ?caret.node, "Caret is not inside text");
            return None;
        }
        let Some(container) = find_container(doc, caret.node) else {
            debug!(node = ?caret.node, "No container for text node");
            return None;
        };

        let offset = to_absolute_offset(doc, container, caret.node, caret.offset);
        Some(highlight_sentence(doc, &mut self.locator, container, offset))
    }

    /// Enable or disable locally; disabling clears the page
    pub fn set_enabled(&mut self, doc: &mut Document, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            let removed = remove_highlights(doc);
            debug!(removed, "Highlighting disabled");
        }
    }

    pub fn apply_notification(&mut self, doc: &mut Document, notification: &HostNotification) {
        match notification {
            HostNotification::UpdateTabEnabled { enabled } => {
                info!(enabled, "Tab enabled state updated");
                self.set_enabled(doc, *enabled);
            }
            HostNotification::UpdateTabFormatting { formatting } | HostNotification::ApplyFormatting { formatting } => {
                self.formatting.apply(formatting);
                info!(formatting = ?self.formatting, "Tab formatting updated");
                self.refresh_styles(doc);
                if self.enabled {
                    if let Some(report) = rehighlight(doc, &mut self.locator) {
                        debug!(wrapped = report.wrapped, "Reapplied highlight with new styles");
                    }
                }
            }
        }
    }

    /// Flip the tab's enabled state through the host.
    ///
    /// Local state changes only after the host confirms.
    pub async fn toggle(&mut self, doc: &mut Document, host: &HostClient) -> Result<bool> {
        let enabled = !self.enabled;
        if let Err(e) = host.set_enabled(enabled).await {
            error!(error = %e, "Failed to toggle highlighting");
            return Err(e);
        }
        self.set_enabled(doc, enabled);
        info!(enabled, "Sentence follower toggled");
        Ok(enabled)
    }

    fn refresh_styles(&self, doc: &mut Document) {
        if let Err(e) = apply_styles(doc, &self.formatting) {
            warn!(error = %e, "Failed to apply highlight styles");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::highlight::{FormattingPatch, LineLayout, Point, HIGHLIGHT_CLASS, STYLE_MARKER_ATTR};
    use crate::host::{Envelope, TabId, TabStateHost};
    use tokio::sync::mpsc;

    const PAGE: &str = "<p>First sentence here. Second one follows.</p>";

    fn engine() -> SentenceHighlighter {
        SentenceHighlighter::new(HighlighterConfig::default()).unwrap()
    }

    fn move_to(doc: &Document, x: f64, y: f64) -> PointerEvent {
        let point = Point::new(x, y);
        PointerEvent {
            point,
            target: LineLayout.element_from_point(doc, point).unwrap(),
        }
    }

    fn highlighted(doc: &Document) -> Vec<String> {
        doc.elements_with_class(HIGHLIGHT_CLASS)
            .into_iter()
            .map(|m| doc.text_content(m))
            .collect()
    }

    fn dead_client() -> HostClient {
        let (sender, receiver) = mpsc::channel::<Envelope>(1);
        drop(receiver);
        HostClient::new(TabId(99), sender)
    }

    fn style_text(doc: &Document) -> String {
        doc.descendants(doc.root())
            .into_iter()
            .find(|&n| doc.attr(n, STYLE_MARKER_ATTR).is_some())
            .map(|n| doc.text_content(n))
            .unwrap_or_default()
    }

    #[test]
    fn test_pointer_move_highlights_sentence() {
        let mut doc = parse_html(PAGE).unwrap();
        let mut engine = engine();
        engine.set_enabled(&mut doc, true);

        let ev = move_to(&doc, 30.0, 0.0);
        let report = engine
            .handle_pointer_move(&mut doc, &LineLayout, &ev)
            .unwrap();
        assert_eq!(report.wrapped, 1);
        assert_eq!(highlighted(&doc), vec!["Second one follows."]);
        assert_eq!(engine.cache_len(), 1);

        engine.reset();
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn test_disabled_engine_ignores_moves() {
        let mut doc = parse_html(PAGE).unwrap();
        let mut engine = engine();
        let ev = move_to(&doc, 3.0, 0.0);
        assert!(engine
            .handle_pointer_move(&mut doc, &LineLayout, &ev)
            .is_none());
        assert!(highlighted(&doc).is_empty());
    }

    #[test]
    fn test_ineligible_target_ignored() {
        let mut doc = parse_html("<h2>A heading here.</h2><p>Body text.</p>").unwrap();
        let mut engine = engine();
        engine.set_enabled(&mut doc, true);
        let ev = move_to(&doc, 2.0, 0.0);
        assert!(engine
            .handle_pointer_move(&mut doc, &LineLayout, &ev)
            .is_none());
        let ev = move_to(&doc, 2.0, 1.0);
        assert!(engine
            .handle_pointer_move(&mut doc, &LineLayout, &ev)
            .is_some());
    }

    #[test]
    fn test_disable_notification_clears_markers() {
        let mut doc = parse_html(PAGE).unwrap();
        let mut engine = engine();
        engine.set_enabled(&mut doc, true);
        let ev = move_to(&doc, 3.0, 0.0);
        engine.handle_pointer_move(&mut doc, &LineLayout, &ev);
        assert_eq!(highlighted(&doc), vec!["First sentence here."]);

        engine.apply_notification(&mut doc, &HostNotification::UpdateTabEnabled { enabled: false });
        assert!(!engine.is_enabled());
        assert!(highlighted(&doc).is_empty());
    }

    #[test]
    fn test_formatting_notification_restyles_and_keeps_highlight() {
        let mut doc = parse_html(PAGE).unwrap();
        let mut engine = engine();
        engine.set_enabled(&mut doc, true);
        let ev = move_to(&doc, 30.0, 0.0);
        engine.handle_pointer_move(&mut doc, &LineLayout, &ev);

        let patch = FormattingPatch {
            use_default_background: Some(true),
            ..FormattingPatch::default()
        };
        engine.apply_notification(&mut doc, &HostNotification::ApplyFormatting { formatting: patch });

        assert!(engine.formatting().use_default_background);
        assert!(style_text(&doc).contains("background-color: inherit"));
        assert_eq!(highlighted(&doc), vec!["Second one follows."]);
    }

    #[tokio::test]
    async fn test_initialize_loads_state_once() {
        let host = TabStateHost::spawn();
        let client = host.client(TabId(1));
        client.set_enabled(true).await.unwrap();

        let mut doc = parse_html(PAGE).unwrap();
        let mut engine = engine();
        assert!(engine.initialize(&mut doc, &client).await);
        assert!(engine.is_enabled());
        let body = doc.body().unwrap();
        assert_eq!(doc.attr(body, INITIALIZED_ATTR), Some("true"));
        assert!(style_text(&doc).contains("#ffff00"));

        assert!(!engine.initialize(&mut doc, &client).await);
        let styles = doc
            .descendants(doc.root())
            .into_iter()
            .filter(|&n| doc.attr(n, STYLE_MARKER_ATTR).is_some())
            .count();
        assert_eq!(styles, 1);
    }

    #[tokio::test]
    async fn test_initialize_falls_back_when_host_fails() {
        let mut doc = parse_html(PAGE).unwrap();
        let mut engine = engine();
        assert!(engine.initialize(&mut doc, &dead_client()).await);
        assert!(!engine.is_enabled());
        assert_eq!(engine.formatting(), &Formatting::default());
        assert!(style_text(&doc).contains("#ffff00"));
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let host = TabStateHost::spawn();
        let client = host.client(TabId(4));
        let mut doc = parse_html(PAGE).unwrap();
        let mut engine = engine();

        assert!(engine.toggle(&mut doc, &client).await.unwrap());
        assert!(client.get_enabled().await.unwrap());
        let ev = move_to(&doc, 3.0, 0.0);
        engine.handle_pointer_move(&mut doc, &LineLayout, &ev);
        assert_eq!(highlighted(&doc).len(), 1);

        assert!(!engine.toggle(&mut doc, &client).await.unwrap());
        assert!(highlighted(&doc).is_empty());
    }

    #[tokio::test]
    async fn test_failed_toggle_keeps_state() {
        let mut doc = parse_html(PAGE).unwrap();
        let mut engine = engine();
        assert!(engine.toggle(&mut doc, &dead_client()).await.is_err());
        assert!(!engine.is_enabled());
    }
}
