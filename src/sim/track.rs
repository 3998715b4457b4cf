//! Paddle track geometry and static wall obstacles
//!
//! The glyph matrix is round, so the paddles ride a curved track hugging the
//! left edge. The bot uses the same track mirrored onto the right edge.

use serde::{Deserialize, Serialize};

use crate::consts::MATRIX_SIZE;

/// A single LED on the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The same point reflected onto the opposite edge
    pub const fn mirrored(self) -> Self {
        Self {
            x: MATRIX_SIZE - 1 - self.x,
            y: self.y,
        }
    }
}

/// Number of positions on the paddle track
pub const TRACK_LEN: usize = 27;

/// Left paddle track, bottom (index 0) to top (index 26); index 13 is the rest position
pub const PADDLE_TRACK: [GridPoint; TRACK_LEN] = [
    GridPoint::new(8, 23),
    GridPoint::new(7, 23),
    GridPoint::new(6, 22),
    GridPoint::new(5, 22),
    GridPoint::new(4, 21),
    GridPoint::new(3, 20),
    GridPoint::new(2, 19),
    GridPoint::new(2, 18),
    GridPoint::new(1, 17),
    GridPoint::new(1, 16),
    GridPoint::new(0, 15),
    GridPoint::new(0, 14),
    GridPoint::new(0, 13),
    GridPoint::new(0, 12),
    GridPoint::new(0, 11),
    GridPoint::new(0, 10),
    GridPoint::new(0, 9),
    GridPoint::new(1, 8),
    GridPoint::new(1, 7),
    GridPoint::new(2, 6),
    GridPoint::new(2, 5),
    GridPoint::new(3, 4),
    GridPoint::new(4, 3),
    GridPoint::new(5, 2),
    GridPoint::new(6, 2),
    GridPoint::new(7, 1),
    GridPoint::new(8, 1),
];

/// Look up a track position, clamping the index onto the track
#[inline]
pub fn track_at(index: i32) -> GridPoint {
    PADDLE_TRACK[index.clamp(0, TRACK_LEN as i32 - 1) as usize]
}

/// Indices of the 5-cell paddle window around `pointer` that lie on the track
pub fn paddle_window(pointer: usize) -> impl Iterator<Item = usize> {
    use crate::consts::PADDLE_HALF_LENGTH;
    let center = pointer as i32;
    (center - PADDLE_HALF_LENGTH..=center + PADDLE_HALF_LENGTH)
        .filter(|i| (0..TRACK_LEN as i32).contains(i))
        .map(|i| i as usize)
}

/// Columns spanned by the two wall segments
pub const WALL_COLUMNS: std::ops::RangeInclusive<i32> = 9..=15;
pub const TOP_WALL_ROW: i32 = 1;
pub const BOTTOM_WALL_ROW: i32 = 23;

/// Top and bottom wall segments, 7 cells each
pub const WALL_CELLS: [GridPoint; 14] = {
    let mut cells = [GridPoint::new(0, 0); 14];
    let mut i = 0;
    while i < 7 {
        cells[i] = GridPoint::new(9 + i as i32, TOP_WALL_ROW);
        cells[i + 7] = GridPoint::new(9 + i as i32, BOTTOM_WALL_ROW);
        i += 1;
    }
    cells
};

#[inline]
pub fn is_wall_cell(x: i32, y: i32) -> bool {
    (y == TOP_WALL_ROW || y == BOTTOM_WALL_ROW) && WALL_COLUMNS.contains(&x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_is_monotonic_in_rows() {
        for pair in PADDLE_TRACK.windows(2) {
            assert!(pair[1].y <= pair[0].y, "{:?} -> {:?}", pair[0], pair[1]);
        }
        assert_eq!(PADDLE_TRACK[0].y, 23);
        assert_eq!(PADDLE_TRACK[TRACK_LEN - 1].y, 1);
    }

    #[test]
    fn test_track_center_is_rest_position() {
        assert_eq!(track_at(13), GridPoint::new(0, 12));
        let on_grid = |v: i32| (0..MATRIX_SIZE).contains(&v);
        assert!(PADDLE_TRACK.iter().all(|p| on_grid(p.x) && on_grid(p.y)));
    }

    #[test]
    fn test_track_at_clamps() {
        assert_eq!(track_at(-5), PADDLE_TRACK[0]);
        assert_eq!(track_at(100), PADDLE_TRACK[TRACK_LEN - 1]);
    }

    #[test]
    fn test_mirror() {
        assert_eq!(GridPoint::new(0, 12).mirrored(), GridPoint::new(24, 12));
        assert_eq!(GridPoint::new(8, 23).mirrored(), GridPoint::new(16, 23));
    }

    #[test]
    fn test_paddle_window_clips_at_track_ends() {
        assert_eq!(paddle_window(13).collect::<Vec<_>>(), vec![11, 12, 13, 14, 15]);
        assert_eq!(paddle_window(0).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(paddle_window(26).collect::<Vec<_>>(), vec![24, 25, 26]);
    }

    #[test]
    fn test_wall_cells() {
        assert!(WALL_CELLS.iter().all(|c| is_wall_cell(c.x, c.y)));
        assert!(is_wall_cell(9, 1));
        assert!(is_wall_cell(15, 23));
        assert!(!is_wall_cell(8, 1));
        assert!(!is_wall_cell(12, 2));
    }
}
