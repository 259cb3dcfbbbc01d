//! Input plumbing: event types, click targets, and pixel ↔ cell conversion.

use ratzilla::ratatui::layout::Rect;

/// Input normalized from keyboard, mouse, and touch sources.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key press from keyboard.
    Key(char),
    /// A click/tap on a registered target, identified by a semantic action ID
    /// (see [`crate::actions`]).
    Click(u16),
}

/// A region on screen that can be tapped/clicked to trigger an action.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    /// Hit region in terminal cell coordinates.
    pub rect: Rect,
    pub action_id: u16,
}

/// Shared state between the render loop and the click handler.
///
/// The renderer clears and re-registers targets every frame, so the handler
/// always tests against what is currently on screen.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
    /// Where the cookie image should be overlaid, if anywhere.
    pub cookie_area: Option<Rect>,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
            cookie_area: None,
        }
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
        self.cookie_area = None;
    }

    /// Register a click target with a rectangular hit region and a semantic action ID.
    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Convenience: register a full-row click target at the given row within an area.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.targets.push(ClickTarget {
                rect: Rect::new(area.x, row, area.width, 1),
                action_id,
            });
        }
    }

    /// Hit-test a terminal cell. Later-registered targets win on overlap,
    /// matching the draw order.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            if col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height {
                Some(t.action_id)
            } else {
                None
            }
        })
    }
}

impl Default for ClickState {
    fn default() -> Self {
        Self::new()
    }
}

/// Phone-portrait widths get the compact cookie art.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 40
}

/// Convert a pixel Y coordinate to a terminal row index.
///
/// `click_y` is relative to the grid container's top edge.
/// `grid_height` is the total pixel height of the grid container.
///
/// Returns `None` if the click is outside the grid or inputs are invalid.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    if grid_height <= 0.0 || terminal_rows == 0 || click_y < 0.0 {
        return None;
    }

    let cell_height = grid_height / terminal_rows as f64;
    let row = (click_y / cell_height) as u16;

    if row >= terminal_rows {
        return None;
    }

    Some(row)
}

/// Convert a pixel X coordinate to a terminal column index.
pub fn pixel_x_to_col(click_x: f64, grid_width: f64, terminal_cols: u16) -> Option<u16> {
    if grid_width <= 0.0 || terminal_cols == 0 || click_x < 0.0 {
        return None;
    }
    let cell_width = grid_width / terminal_cols as f64;
    let col = (click_x / cell_width) as u16;
    if col >= terminal_cols { None } else { Some(col) }
}

/// Pixel box `(left, top, width, height)` of a cell rect, relative to the
/// grid container. Used to place DOM overlays over terminal cells.
pub fn cells_to_pixels(
    rect: Rect,
    grid_width: f64,
    grid_height: f64,
    terminal_cols: u16,
    terminal_rows: u16,
) -> Option<(f64, f64, f64, f64)> {
    if grid_width <= 0.0 || grid_height <= 0.0 || terminal_cols == 0 || terminal_rows == 0 {
        return None;
    }
    let cell_w = grid_width / terminal_cols as f64;
    let cell_h = grid_height / terminal_rows as f64;
    Some((
        rect.x as f64 * cell_w,
        rect.y as f64 * cell_h,
        rect.width as f64 * cell_w,
        rect.height as f64 * cell_h,
    ))
}
