//! Region selection state machine.
//!
//! `Idle → Dragging → {Committed | Cancelled}`. Terminal states ignore all
//! further input until [`SelectionTracker::reset`] starts a fresh session.

use shotcraft_model::event::{PointerKind, PointerSample};
use shotcraft_model::geometry::{Point, Rect};
use shotcraft_model::mapper;

/// Default minimum selection extent, in points.
pub const DEFAULT_MIN_SELECTION: f64 = 2.0;

/// Anchor and current pointer position of an in-progress drag, both in
/// window-space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub anchor: Point,
    pub current: Point,
}

impl Selection {
    pub fn at(anchor: Point) -> Self {
        Self {
            anchor,
            current: anchor,
        }
    }

    /// Normalized window-space rectangle spanned by the drag.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.anchor, self.current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState {
    Idle,
    Dragging(Selection),
    /// View-space rectangle, clamped to the view bounds.
    Committed(Rect),
    Cancelled,
}

impl SelectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SelectionState::Committed(_) | SelectionState::Cancelled)
    }
}

/// Notification emitted once per session when a terminal state is reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionOutcome {
    /// A usable view-space rectangle.
    Committed(Rect),
    /// The cancel key was pressed or input ended mid-drag.
    Cancelled,
    /// The drag ended below the minimum size.
    Degenerate,
}

/// Turns pointer samples into a committed selection or a cancellation.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    view_frame: Rect,
    window_flipped: bool,
    min_size: f64,
    state: SelectionState,
}

impl SelectionTracker {
    /// Tracker for a view occupying `view_frame` in window coordinates.
    pub fn new(view_frame: Rect, window_flipped: bool) -> Self {
        Self {
            view_frame,
            window_flipped,
            min_size: DEFAULT_MIN_SELECTION,
            state: SelectionState::Idle,
        }
    }

    pub fn with_min_size(mut self, min_size: f64) -> Self {
        self.min_size = min_size.max(0.0);
        self
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// View-space bounds every committed rectangle is clamped to.
    pub fn view_bounds(&self) -> Rect {
        Rect::from_size(self.view_frame.size())
    }

    /// Live view-space rectangle while dragging, for drawing the overlay.
    pub fn current_rect(&self) -> Option<Rect> {
        match self.state {
            SelectionState::Dragging(selection) => Some(self.clamped_view_rect(&selection)),
            SelectionState::Committed(rect) => Some(rect),
            _ => None,
        }
    }

    /// Feed one sample. Returns the outcome on the transition into a
    /// terminal state, `None` otherwise.
    pub fn handle(&mut self, sample: &PointerSample) -> Option<SelectionOutcome> {
        let point = sample.position();
        match (self.state, sample.kind) {
            (SelectionState::Idle, PointerKind::Down) => {
                self.state = SelectionState::Dragging(Selection::at(point));
                None
            }
            (SelectionState::Dragging(mut selection), PointerKind::Drag) => {
                selection.current = point;
                self.state = SelectionState::Dragging(selection);
                None
            }
            (SelectionState::Dragging(mut selection), PointerKind::Up) => {
                selection.current = point;
                let rect = self.clamped_view_rect(&selection);
                if rect.width < self.min_size || rect.height < self.min_size {
                    tracing::debug!(
                        width = rect.width,
                        height = rect.height,
                        "Selection below minimum size"
                    );
                    self.state = SelectionState::Cancelled;
                    Some(SelectionOutcome::Degenerate)
                } else {
                    tracing::debug!(
                        x = rect.x,
                        y = rect.y,
                        width = rect.width,
                        height = rect.height,
                        "Selection committed"
                    );
                    self.state = SelectionState::Committed(rect);
                    Some(SelectionOutcome::Committed(rect))
                }
            }
            (SelectionState::Dragging(_), PointerKind::Cancel) => self.cancel(),
            _ => None,
        }
    }

    /// Abandon an in-progress drag. No-op outside `Dragging`.
    pub fn cancel(&mut self) -> Option<SelectionOutcome> {
        if let SelectionState::Dragging(_) = self.state {
            self.state = SelectionState::Cancelled;
            Some(SelectionOutcome::Cancelled)
        } else {
            None
        }
    }

    /// Start a fresh session.
    pub fn reset(&mut self) {
        self.state = SelectionState::Idle;
    }

    fn clamped_view_rect(&self, selection: &Selection) -> Rect {
        mapper::rect_to_view_space(selection.rect(), self.view_frame, self.window_flipped)
            .intersection(&self.view_bounds())
    }
}
