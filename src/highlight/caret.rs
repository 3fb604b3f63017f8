// WHY: screen point -> (text node, offset) through whatever caret primitives the platform offers
// Resolution never fails outward: any error degrades to "no caret"

use anyhow::Result;
use tracing::{debug, warn};

use crate::dom::{Document, NodeId};

/// Pointer position in client coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Mouse-move as delivered by the host page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub point: Point,
    /// Element under the pointer
    pub target: NodeId,
}

/// A collapsed caret: node plus char offset inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    pub node: NodeId,
    pub offset: usize,
}

/// Outcome of one caret-from-point primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretLookup {
    /// The platform lacks this primitive
    Unsupported,
    /// Supported, but nothing under the point
    Miss,
    Hit(Caret),
}

/// Platform caret lookup primitives.
///
/// Defaults describe a platform with no primitives and no selection.
pub trait CaretSource {
    fn caret_range_from_point(&self, _doc: &Document, _point: Point) -> Result<CaretLookup> {
        Ok(CaretLookup::Unsupported)
    }

    fn caret_position_from_point(&self, _doc: &Document, _point: Point) -> Result<CaretLookup> {
        Ok(CaretLookup::Unsupported)
    }

    /// Start of the current selection, if any
    fn selection_start(&self, _doc: &Document) -> Result<Option<Caret>> {
        Ok(None)
    }
}

/// Resolve the caret under `point`.
///
/// The range primitive is preferred, then the position primitive; only the
/// first supported one is consulted. A miss falls back to the selection start.
pub fn resolve_caret<C: CaretSource + ?Sized>(source: &C, doc: &Document, point: Point) -> Option<Caret> {
    match try_resolve(source, doc, point) {
        Ok(caret) => caret,
        Err(error) => {
            warn!(%error, x = point.x, y = point.y, "Caret position error");
            None
        }
    }
}

fn try_resolve<C: CaretSource + ?Sized>(source: &C, doc: &Document, point: Point) -> Result<Option<Caret>> {
    let lookup = match source.caret_range_from_point(doc, point)? {
        CaretLookup::Unsupported => source.caret_position_from_point(doc, point)?,
        supported => supported,
    };

    match lookup {
        CaretLookup::Hit(caret) => Ok(Some(caret)),
        CaretLookup::Miss | CaretLookup::Unsupported => {
            let selection = source.selection_start(doc)?;
            debug!(found = selection.is_some(), "Caret lookup fell back to selection");
            Ok(selection)
        }
    }
}
