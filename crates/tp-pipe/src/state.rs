//! Mutable thermal state owned by one pipe.

use crate::config::{GridLayout, PipeConfiguration};
use crate::ground::GroundBoundaryModel;
use crate::slots::{SlotField, TimeSlot};
use tp_core::numeric::Real;

/// Along-pipe fluid and wall temperatures [°C], entries `0..=N`.
///
/// Entry 0 is the inlet; entry `i` is the outlet end of section `i`.
#[derive(Clone, Debug, PartialEq)]
pub struct PipeProfile {
    pub fluid: SlotField,
    pub wall: SlotField,
}

impl PipeProfile {
    pub fn new(sections: usize, initial_c: Real) -> Self {
        Self {
            fluid: SlotField::filled(sections + 1, initial_c),
            wall: SlotField::filled(sections + 1, initial_c),
        }
    }

    pub fn sections(&self) -> usize {
        self.fluid.len() - 1
    }

    pub fn outlet(&self, slot: TimeSlot) -> Real {
        self.fluid.get(self.sections(), slot)
    }

    pub fn fill(&mut self, value: Real) {
        self.fluid.fill(value);
        self.wall.fill(value);
    }

    pub fn copy_slot(&mut self, from: TimeSlot, to: TimeSlot) {
        self.fluid.copy_slot(from, to);
        self.wall.copy_slot(from, to);
    }
}

/// Soil temperatures [°C] on a width × depth × length grid.
#[derive(Clone, Debug, PartialEq)]
pub struct SoilGrid {
    layout: GridLayout,
    field: SlotField,
}

impl SoilGrid {
    pub fn new(layout: GridLayout, initial_c: Real) -> Self {
        let field = SlotField::filled(layout.node_count(), initial_c);
        Self { layout, field }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn field(&self) -> &SlotField {
        &self.field
    }

    #[inline]
    pub fn get(&self, width: usize, depth: usize, length: usize, slot: TimeSlot) -> Real {
        self.field.get(self.layout.index(width, depth, length), slot)
    }

    #[inline]
    pub fn set(&mut self, width: usize, depth: usize, length: usize, slot: TimeSlot, value: Real) {
        let idx = self.layout.index(width, depth, length);
        self.field.set(idx, slot, value);
    }

    /// Set a node in all three slots.
    pub fn set_all_slots(&mut self, width: usize, depth: usize, length: usize, value: Real) {
        let idx = self.layout.index(width, depth, length);
        self.field.set_all_slots(idx, value);
    }

    pub fn copy_slot(&mut self, from: TimeSlot, to: TimeSlot) {
        self.field.copy_slot(from, to);
    }

    /// Every node, in every slot, to the undisturbed temperature at its depth.
    pub fn fill_undisturbed(&mut self, ground: &GroundBoundaryModel, day: Real) {
        for depth in 0..self.layout.depth_nodes {
            let t = ground.temperature(self.layout.row_depth(depth), day);
            for length in 0..self.layout.length_nodes {
                for width in 0..self.layout.width_nodes {
                    self.set_all_slots(width, depth, length, t);
                }
            }
        }
    }

    /// Refresh the deep row and the far-field column in every slot.
    pub fn refresh_boundaries(&mut self, ground: &GroundBoundaryModel, day: Real) {
        let deep = self.layout.depth_nodes - 1;
        let far = self.layout.width_nodes - 1;
        let deep_t = ground.temperature(self.layout.row_depth(deep), day);
        let column: Vec<Real> = (0..deep)
            .map(|d| ground.temperature(self.layout.row_depth(d), day))
            .collect();

        for length in 0..self.layout.length_nodes {
            for width in 0..self.layout.width_nodes {
                self.set_all_slots(width, deep, length, deep_t);
            }
            for (depth, t) in column.iter().enumerate() {
                self.set_all_slots(far, depth, length, *t);
            }
        }
    }

    /// True for the deep row and the far-field column.
    #[inline]
    pub fn is_boundary(&self, width: usize, depth: usize) -> bool {
        depth + 1 == self.layout.depth_nodes || width + 1 == self.layout.width_nodes
    }
}

/// Everything a pipe instance remembers between calls.
#[derive(Clone, Debug, PartialEq)]
pub struct ThermalState {
    pub pipe: PipeProfile,
    pub soil: Option<SoilGrid>,
}

impl ThermalState {
    pub fn new(config: &PipeConfiguration, initial_c: Real) -> Self {
        Self {
            pipe: PipeProfile::new(config.sections(), initial_c),
            soil: config
                .buried()
                .map(|b| SoilGrid::new(b.layout.clone(), initial_c)),
        }
    }

    /// Copy one role into another for every stored temperature.
    pub fn copy_slot(&mut self, from: TimeSlot, to: TimeSlot) {
        self.pipe.copy_slot(from, to);
        if let Some(soil) = self.soil.as_mut() {
            soil.copy_slot(from, to);
        }
    }

    /// True when two roles agree bit for bit everywhere.
    pub fn slots_identical(&self, a: TimeSlot, b: TimeSlot) -> bool {
        self.pipe.fluid.slots_identical(a, b)
            && self.pipe.wall.slots_identical(a, b)
            && self
                .soil
                .as_ref()
                .is_none_or(|soil| soil.field().slots_identical(a, b))
    }
}
