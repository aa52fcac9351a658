//! Generic grid for spatial data

use serde::{Deserialize, Serialize};

use crate::core::types::GridPos;

/// Generic 2D grid over integer cell coordinates
///
/// Backs the occupant buckets, the flower buckets, the scent field and
/// the scouts' orientation maps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid<T: Clone + Default> {
    width: i32,
    height: i32,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self {
            width,
            height,
            data: vec![T::default(); (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    #[inline]
    fn index(&self, pos: GridPos) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    #[inline]
    pub fn get(&self, pos: GridPos) -> Option<&T> {
        if self.in_bounds(pos) {
            Some(&self.data[self.index(pos)])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut T> {
        if self.in_bounds(pos) {
            let idx = self.index(pos);
            Some(&mut self.data[idx])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, pos: GridPos, value: T) {
        if self.in_bounds(pos) {
            let idx = self.index(pos);
            self.data[idx] = value;
        }
    }

    /// Overwrite every cell with `value`
    pub fn fill(&mut self, value: T) {
        for cell in &mut self.data {
            *cell = value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_roundtrip() {
        let mut grid: Grid<u32> = Grid::new(4, 3);
        grid.set(GridPos::new(2, 1), 7);
        assert_eq!(grid.get(GridPos::new(2, 1)), Some(&7));
        assert_eq!(grid.get(GridPos::new(0, 0)), Some(&0));
    }

    #[test]
    fn test_out_of_bounds_is_none() {
        let grid: Grid<bool> = Grid::new(4, 3);
        assert_eq!(grid.get(GridPos::new(-1, 0)), None);
        assert_eq!(grid.get(GridPos::new(4, 0)), None);
        assert_eq!(grid.get(GridPos::new(0, 3)), None);
    }

    #[test]
    fn test_fill_resets_every_cell() {
        let mut grid: Grid<bool> = Grid::new(3, 3);
        grid.set(GridPos::new(1, 1), true);
        grid.set(GridPos::new(2, 0), true);
        grid.fill(false);
        for x in 0..3 {
            for y in 0..3 {
                assert_eq!(grid.get(GridPos::new(x, y)), Some(&false));
            }
        }
    }
}
