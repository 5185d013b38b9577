use std::collections::VecDeque;

/// Front-biased stack of signed integers. Index 0 is the top of the stack, every other
/// element is addressable by its distance from the top.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TcStack {
    cells: VecDeque<i64>,
}

impl TcStack {
    pub fn new() -> TcStack {
        TcStack {
            cells: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Pushes `val` on top, shifting every other element one position down
    pub fn push_front(&mut self, val: i64) {
        self.cells.push_front(val);
    }

    /// Removes and returns the element at `index`, `None` if there is no such element
    pub fn pop_at(&mut self, index: usize) -> Option<i64> {
        self.cells.remove(index)
    }

    pub fn peek(&self, index: usize) -> Option<i64> {
        self.cells.get(index).copied()
    }

    /// Exchanges the elements at `a` and `b`. Leaves the stack untouched and returns `None` if
    /// either index is out of range.
    pub fn swap(&mut self, a: usize, b: usize) -> Option<()> {
        if a >= self.cells.len() || b >= self.cells.len() {
            return None;
        }
        self.cells.swap(a, b);

        Some(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &i64> {
        self.cells.iter()
    }

    pub fn to_vec(&self) -> Vec<i64> {
        self.cells.iter().copied().collect()
    }
}

impl From<Vec<i64>> for TcStack {
    fn from(cells: Vec<i64>) -> Self {
        TcStack {
            cells: cells.into(),
        }
    }
}
