//! Three-role temperature history.
//!
//! Every node keeps a `[Real; 3]` indexed by [`TimeSlot`]. The roles never
//! move through memory; history management is a copy from one role to another
//! across every node of a field.

use tp_core::numeric::Real;

/// Temporal role of a stored temperature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeSlot {
    /// Accepted at the end of the last sub-step; history term of the scheme.
    Previous,
    /// Last officially accepted state.
    Current,
    /// Scratch for the step in progress.
    Tentative,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Previous, TimeSlot::Current, TimeSlot::Tentative];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            TimeSlot::Previous => 0,
            TimeSlot::Current => 1,
            TimeSlot::Tentative => 2,
        }
    }
}

/// A flat field of nodes, each carrying one value per [`TimeSlot`].
#[derive(Clone, Debug, PartialEq)]
pub struct SlotField {
    nodes: Vec<[Real; 3]>,
}

impl SlotField {
    /// Field of `len` nodes with every slot set to `value`.
    pub fn filled(len: usize, value: Real) -> Self {
        Self {
            nodes: vec![[value; 3]; len],
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, node: usize, slot: TimeSlot) -> Real {
        self.nodes[node][slot.index()]
    }

    #[inline]
    pub fn set(&mut self, node: usize, slot: TimeSlot, value: Real) {
        self.nodes[node][slot.index()] = value;
    }

    /// Set one node in every slot.
    pub fn set_all_slots(&mut self, node: usize, value: Real) {
        self.nodes[node] = [value; 3];
    }

    /// Set every node in every slot.
    pub fn fill(&mut self, value: Real) {
        self.nodes.fill([value; 3]);
    }

    /// Copy `from` into `to` for every node.
    pub fn copy_slot(&mut self, from: TimeSlot, to: TimeSlot) {
        let (from, to) = (from.index(), to.index());
        for node in &mut self.nodes {
            node[to] = node[from];
        }
    }

    /// Iterate the values of one slot in node order.
    pub fn slot_values(&self, slot: TimeSlot) -> impl Iterator<Item = Real> + '_ {
        let idx = slot.index();
        self.nodes.iter().map(move |node| node[idx])
    }

    /// Collect one slot into a vector.
    pub fn snapshot(&self, slot: TimeSlot) -> Vec<Real> {
        self.slot_values(slot).collect()
    }

    /// True when two slots hold bit-identical values at every node.
    pub fn slots_identical(&self, a: TimeSlot, b: TimeSlot) -> bool {
        let (a, b) = (a.index(), b.index());
        self.nodes
            .iter()
            .all(|node| node[a].to_bits() == node[b].to_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_indices_are_distinct() {
        let idx: Vec<usize> = TimeSlot::ALL.iter().map(|s| s.index()).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }

    #[test]
    fn copy_slot_moves_one_role_only() {
        let mut field = SlotField::filled(4, 1.0);
        field.set(2, TimeSlot::Tentative, 7.5);
        field.copy_slot(TimeSlot::Tentative, TimeSlot::Current);
        assert_eq!(field.get(2, TimeSlot::Current), 7.5);
        assert_eq!(field.get(2, TimeSlot::Previous), 1.0);
        assert!(field.slots_identical(TimeSlot::Current, TimeSlot::Tentative));
        assert!(!field.slots_identical(TimeSlot::Previous, TimeSlot::Current));
    }

    #[test]
    fn fill_sets_every_slot() {
        let mut field = SlotField::filled(2, 3.0);
        field.set(1, TimeSlot::Previous, -1.0);
        field.fill(21.0);
        for slot in TimeSlot::ALL {
            assert!(field.slot_values(slot).all(|v| v == 21.0));
        }
    }
}
