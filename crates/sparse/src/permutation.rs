/// Bijection between original and reordered indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation {
    forward: Vec<usize>,
    inverse: Vec<usize>,
}

impl Permutation {
    pub fn identity(n: usize) -> Self {
        Self {
            forward: (0..n).collect(),
            inverse: (0..n).collect(),
        }
    }

    /// `order[k]` is the original index placed at position `k`.
    pub fn from_order(order: Vec<usize>) -> Self {
        let mut forward = vec![usize::MAX; order.len()];
        for (new, &old) in order.iter().enumerate() {
            assert!(
                old < order.len() && forward[old] == usize::MAX,
                "order is not a permutation (index {})",
                old
            );
            forward[old] = new;
        }
        Self {
            forward,
            inverse: order,
        }
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    #[inline]
    pub fn new_index(&self, old: usize) -> usize {
        self.forward[old]
    }

    #[inline]
    pub fn old_index(&self, new: usize) -> usize {
        self.inverse[new]
    }
}
