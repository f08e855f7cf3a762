//! Fixed row geometry shared by the renderer and pointer hit-testing.
//!
//! ```text
//! ╭──────────────╮   row 0  border
//! │              │   row 1  padding
//! │ claude-usage │   row 2  title
//! │              │   row 3  blank
//! │ Session ███  │   row 4  first bar
//! │   resets in  │   row 5  reset line
//! │              │   row 6  separator
//! ```

use crate::usage::BarKind;

/// Lines above the first bar row
pub const HEADER_LINES: u16 = 4;
/// Lines per bar: bar, reset line, separator
pub const BAR_ROW_LINES: u16 = 3;
/// Lines of a bar row that belong to it for hover purposes
pub const BAR_CONTENT_LINES: u16 = 2;

pub const DEFAULT_BAR_WIDTH: u16 = 30;
const MIN_BAR_WIDTH: u16 = 20;
const MAX_BAR_WIDTH: u16 = 40;

/// Bar width for a terminal of the given width
pub fn bar_width_for(terminal_width: u16) -> u16 {
    terminal_width
        .saturating_sub(40)
        .clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH)
}

/// Which rendered bar, if any, covers terminal row `row`.
/// `present` is the list of rendered bars in order.
pub fn hit_test(row: u16, present: &[BarKind]) -> Option<BarKind> {
    let offset = row.checked_sub(HEADER_LINES)?;
    let index = (offset / BAR_ROW_LINES) as usize;
    if offset % BAR_ROW_LINES >= BAR_CONTENT_LINES {
        return None;
    }
    present.get(index).copied()
}
