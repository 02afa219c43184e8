use std::ops::Deref;

/// Read-only, zero-copy view of a grid's cell buffer
///
/// Borrows the live buffer, so it reflects every mutation made before it was
/// taken and cannot outlive (or coexist with a mutation of) the owning grid.
/// Renderers should take a fresh view each frame.
#[derive(Debug, Clone, Copy)]
pub struct CellView<'a> {
    cells: &'a [u32],
    width: usize,
    height: usize,
}

impl<'a> CellView<'a> {
    pub(crate) fn new(cells: &'a [u32], width: usize, height: usize) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            cells,
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Heights in row-major order
    #[inline]
    pub fn as_slice(&self) -> &'a [u32] {
        self.cells
    }

    /// Base address of the buffer, for hosts that read memory directly
    #[inline]
    pub fn as_ptr(&self) -> *const u32 {
        self.cells.as_ptr()
    }

    /// Height at `(row, col)`, or `None` outside the grid
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        if row < self.height && col < self.width {
            Some(self.cells[row * self.width + col])
        } else {
            None
        }
    }

    /// One row of heights, or `None` if `row` is outside the grid
    pub fn row(&self, row: usize) -> Option<&'a [u32]> {
        if row < self.height {
            let start = row * self.width;
            Some(&self.cells[start..start + self.width])
        } else {
            None
        }
    }

    /// Iterate over rows from top to bottom
    pub fn rows(&self) -> std::slice::Chunks<'a, u32> {
        self.cells.chunks(self.width)
    }
}

impl Deref for CellView<'_> {
    type Target = [u32];

    fn deref(&self) -> &[u32] {
        self.cells
    }
}

#[cfg(test)]
mod tests {
    use crate::grid::Grid;

    #[test]
    fn test_view_is_zero_copy() {
        let grid = Grid::from_cells(3, 2, vec![0, 1, 2, 3, 4, 5]).unwrap();
        let view = grid.view();
        assert_eq!(view.as_ptr(), grid.cells().as_ptr());
        assert_eq!(view.len(), 6);
        assert_eq!(view.as_slice(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_view_accessors() {
        let grid = Grid::from_cells(3, 2, vec![0, 1, 2, 3, 4, 5]).unwrap();
        let view = grid.view();
        assert_eq!(view.get(1, 2), Some(5));
        assert_eq!(view.get(2, 0), None);
        assert_eq!(view.row(1), Some(&[3, 4, 5][..]));
        assert_eq!(view.row(2), None);
        assert_eq!(view.rows().count(), 2);
    }

    #[test]
    fn test_view_reflects_mutations() {
        let mut grid = Grid::new(2, 2).unwrap();
        let before = grid.view().as_ptr();
        grid.add_grains(1, 1, 9).unwrap();
        let view = grid.view();
        assert_eq!(view.get(1, 1), Some(9));
        // The buffer is never reallocated
        assert_eq!(view.as_ptr(), before);
    }
}
