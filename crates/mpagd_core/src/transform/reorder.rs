use crate::error::{ProjectError, Result};
use crate::family::Family;

/// A permuted collection plus the index mapping that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reordered<T> {
    pub items: Vec<T>,
    /// `mapping[old] == new` for every original index.
    pub mapping: Vec<usize>,
}

impl<T> Reordered<T> {
    /// New index for `old`, or `None` when `old` was never a valid index.
    pub fn new_index(&self, old: usize) -> Option<usize> {
        self.mapping.get(old).copied()
    }

    /// Remap a byte reference. Values outside the collection are left alone.
    pub fn remap_byte(&self, old: u8) -> u8 {
        self.new_index(old as usize).map_or(old, |new| new as u8)
    }
}

/// Keep the first `offset` items, then place `offset + order[i]` in turn,
/// then every unnamed item in original order. All bounds and duplicate
/// checks run before any index arithmetic.
pub fn reorder<T: Clone>(
    family: Family,
    items: &[T],
    order: &[usize],
    offset: usize,
) -> Result<Reordered<T>> {
    let len = items.len();
    if offset > len {
        return Err(ProjectError::IndexOutOfRange {
            family,
            index: offset,
            len,
        });
    }
    let span = len - offset;
    if order.len() > span {
        return Err(ProjectError::OrderTooLong {
            family,
            order_len: order.len(),
            offset,
            len,
        });
    }

    let mut named = vec![false; span];
    for &entry in order {
        if entry >= span {
            return Err(ProjectError::IndexOutOfRange {
                family,
                index: entry,
                len: span,
            });
        }
        if named[entry] {
            return Err(ProjectError::DuplicateOrderEntry {
                family,
                index: entry,
            });
        }
        named[entry] = true;
    }

    let sequence = (0..offset)
        .chain(order.iter().map(|&entry| offset + entry))
        .chain((0..span).filter(|&i| !named[i]).map(|i| offset + i));

    let mut out = Vec::with_capacity(len);
    let mut mapping = vec![0usize; len];
    for (new, old) in sequence.enumerate() {
        mapping[old] = new;
        out.push(items[old].clone());
    }

    Ok(Reordered {
        items: out,
        mapping,
    })
}
