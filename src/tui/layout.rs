//! Screen geometry, derived from the terminal size on every frame.

/// Lines above the list: title, rule, search, rule
const HEADER_LINES: u16 = 4;
/// Lines below the list: rule, status, rule, help
const FOOTER_LINES: u16 = 4;
/// Title and search, then status and help, when the rules are left out
const COMPACT_HEADER_LINES: u16 = 2;
const COMPACT_FOOTER_LINES: u16 = 2;
const MIN_LIST_HEIGHT: usize = 3;
const MIN_NAME_WIDTH: usize = 25;
const MAX_NAME_WIDTH: usize = 45;
/// Cells taken by pointer, marker, icon and separators
const GUTTER: usize = 14;
const MIN_PATH_WIDTH: usize = 15;
/// Below this many columns the help line is abbreviated
pub const WIDE_HELP_COLUMNS: u16 = 100;

/// Geometry of one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Terminal rows
    pub rows: u16,
    /// Terminal columns
    pub cols: u16,
    /// 1-based screen row of the first list line
    pub list_top: u16,
    /// Number of list rows
    pub list_height: usize,
    /// Terminal too short for the rule lines, which are left out
    pub compact: bool,
    /// Width of the name column
    pub name_width: usize,
    /// Width of the path column
    pub path_width: usize,
}

impl Layout {
    /// Computes the layout for a `rows` x `cols` terminal
    pub fn new(rows: u16, cols: u16) -> Self {
        let spare = usize::from(rows.saturating_sub(HEADER_LINES + FOOTER_LINES));
        let compact = spare < MIN_LIST_HEIGHT;
        let (header, list_height) = if compact {
            let spare = rows.saturating_sub(COMPACT_HEADER_LINES + COMPACT_FOOTER_LINES);
            (COMPACT_HEADER_LINES, usize::from(spare).max(1))
        } else {
            (HEADER_LINES, spare)
        };
        let name_width = (usize::from(cols) * 40 / 100).clamp(MIN_NAME_WIDTH, MAX_NAME_WIDTH);
        let path_width = usize::from(cols)
            .saturating_sub(name_width + GUTTER)
            .max(MIN_PATH_WIDTH);
        Self {
            rows,
            cols,
            list_top: header + 1,
            list_height,
            compact,
            name_width,
            path_width,
        }
    }

    /// Row of the viewport under the 1-based screen row `y`, if `y` is inside the list
    pub fn list_row(&self, y: u16) -> Option<usize> {
        let row = usize::from(y.checked_sub(self.list_top)?);
        (row < self.list_height).then_some(row)
    }

    /// Whether the help line has room for the full key legend
    pub fn wide(&self) -> bool {
        self.cols >= WIDE_HELP_COLUMNS
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(24, 80)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_terminal() {
        let layout = Layout::new(24, 80);
        assert_eq!(layout.list_top, 5);
        assert_eq!(layout.list_height, 16);
        assert_eq!(layout.name_width, 32);
        assert_eq!(layout.path_width, 34);
        assert!(!layout.wide());
    }

    #[test]
    fn test_clamps() {
        let tiny = Layout::new(5, 20);
        assert_eq!(tiny.list_height, 1);
        assert_eq!(tiny.name_width, 25);
        assert_eq!(tiny.path_width, 15);

        let huge = Layout::new(60, 300);
        assert_eq!(huge.list_height, 52);
        assert_eq!(huge.name_width, 45);
        assert_eq!(huge.path_width, 241);
        assert!(huge.wide());
    }

    #[test]
    fn test_short_terminals_drop_the_rules() {
        let normal = Layout::new(11, 80);
        assert!(!normal.compact);
        assert_eq!(normal.list_height, 3);

        for rows in 1..11u16 {
            let layout = Layout::new(rows, 80);
            assert!(layout.compact);
            assert_eq!(layout.list_top, 3);
            if rows >= 5 {
                assert_eq!(usize::from(layout.list_top) - 1 + layout.list_height + 2, usize::from(rows));
            }
        }
        let ten = Layout::new(10, 80);
        assert_eq!(ten.list_height, 6);
        assert_eq!(ten.list_row(3), Some(0));
        assert_eq!(ten.list_row(8), Some(5));
        assert_eq!(ten.list_row(9), None);
    }

    #[test]
    fn test_list_row() {
        let layout = Layout::new(11, 80);
        assert_eq!(layout.list_row(4), None);
        assert_eq!(layout.list_row(5), Some(0));
        assert_eq!(layout.list_row(7), Some(2));
        assert_eq!(layout.list_row(8), None);
        assert_eq!(layout.list_row(0), None);
    }
}
