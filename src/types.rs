//! Value types for shapes the standard library has no direct counterpart for.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

// ============================================================================
// NdArray - fixed-rank multi-dimensional array
// ============================================================================

/// Row-major array with `RANK` dimensions.
///
/// Once a dimension is zero every dimension after it is zero as well, so
/// `[2, 0, 5]` is stored as `[2, 0, 0]`. This is the shape the JSON form
/// reads back as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdArray<T, const RANK: usize> {
    dims: [usize; RANK],
    data: Vec<T>,
}

pub type Array2<T> = NdArray<T, 2>;
pub type Array3<T> = NdArray<T, 3>;
pub type Array4<T> = NdArray<T, 4>;

impl<T, const RANK: usize> NdArray<T, RANK> {
    /// Returns `None` if `data` does not hold exactly `dims` elements.
    pub fn new(mut dims: [usize; RANK], data: Vec<T>) -> Option<Self> {
        if let Some(zero) = dims.iter().position(|&d| d == 0) {
            dims[zero..].iter_mut().for_each(|d| *d = 0);
        }
        if data.len() != dims.iter().product::<usize>() {
            return None;
        }
        Some(Self { dims, data })
    }

    pub fn dims(&self) -> [usize; RANK] {
        self.dims
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn get(&self, index: [usize; RANK]) -> Option<&T> {
        let mut offset = 0;
        for (i, d) in index.iter().zip(self.dims.iter()) {
            if i >= d {
                return None;
            }
            offset = offset * d + i;
        }
        self.data.get(offset)
    }
}

impl<T> Array2<T> {
    /// Builds from equally long rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self> {
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return None;
        }
        let height = rows.len();
        Self::new([height, width], rows.into_iter().flatten().collect())
    }
}

// ============================================================================
// KeyValue
// ============================================================================

/// A two-slot pair encoded as `{"Key": .., "Value": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyValue<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> KeyValue<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

// ============================================================================
// Segment - shared view over a contiguous range
// ============================================================================

/// A range of a shared buffer.
#[derive(Clone)]
pub struct Segment<T> {
    buffer: Arc<[T]>,
    offset: usize,
    len: usize,
}

impl<T> Segment<T> {
    /// Returns `None` if `range` is out of bounds.
    pub fn new(buffer: Arc<[T]>, range: Range<usize>) -> Option<Self> {
        if range.start > range.end || range.end > buffer.len() {
            return None;
        }
        Some(Self {
            buffer,
            offset: range.start,
            len: range.end - range.start,
        })
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        let len = items.len();
        Self {
            buffer: Arc::from(items),
            offset: 0,
            len,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.buffer[self.offset..self.offset + self.len]
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for Segment<T> {
    fn default() -> Self {
        Self::from_vec(Vec::new())
    }
}

impl<T: PartialEq> PartialEq for Segment<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for Segment<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

// ============================================================================
// Stack - LIFO sequence
// ============================================================================

/// Last-in first-out sequence. Iterates bottom to top; encodes top first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for Stack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for Stack<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<'a, T> IntoIterator for &'a Stack<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nd_array_collapses_dimensions_after_zero() {
        let array = NdArray::<i32, 3>::new([2, 0, 5], Vec::new()).unwrap();
        assert_eq!(array.dims(), [2, 0, 0]);
    }

    #[test]
    fn nd_array_indexes_row_major() {
        let array = Array2::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(array.dims(), [2, 3]);
        assert_eq!(array.get([1, 0]), Some(&4));
        assert_eq!(array.get([0, 3]), None);
    }

    #[test]
    fn jagged_rows_are_rejected() {
        assert!(Array2::from_rows(vec![vec![1], vec![2, 3]]).is_none());
    }

    #[test]
    fn segment_compares_by_visible_elements() {
        let buffer: Arc<[u8]> = Arc::from(vec![9, 1, 2, 9]);
        let view = Segment::new(buffer, 1..3).unwrap();
        assert_eq!(view, Segment::from_vec(vec![1, 2]));
        assert_eq!(view.offset(), 1);
    }

    #[test]
    fn stack_pops_last_pushed() {
        let mut stack: Stack<i32> = [1, 2].into_iter().collect();
        stack.push(3);
        assert_eq!(stack.peek(), Some(&3));
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.len(), 2);
    }
}
