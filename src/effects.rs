//! Short-lived per-cell effects the renderer can flash: landings and clears.

use crate::board::ColorIndex;
use crate::hex::Axial;

pub const LANDING_DURATION: f64 = 0.18;
pub const CLEAR_DURATION: f64 = 0.22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Landing,
    Clear,
}

impl EffectKind {
    pub fn duration(self) -> f64 {
        match self {
            Self::Landing => LANDING_DURATION,
            Self::Clear => CLEAR_DURATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellEffect {
    pub cell: Axial,
    pub color: ColorIndex,
    pub kind: EffectKind,
    /// Seconds left.
    pub remaining: f64,
}

impl CellEffect {
    pub fn new(cell: Axial, color: ColorIndex, kind: EffectKind) -> Self {
        Self {
            cell,
            color,
            kind,
            remaining: kind.duration(),
        }
    }

    /// 1.0 when fresh, falling to 0.0 as it expires.
    pub fn strength(&self) -> f64 {
        (self.remaining / self.kind.duration()).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Effects {
    items: Vec<CellEffect>,
}

impl Effects {
    pub fn push(&mut self, cell: Axial, color: ColorIndex, kind: EffectKind) {
        self.items.push(CellEffect::new(cell, color, kind));
    }

    /// Age every effect by `dt` and drop the expired ones.
    pub fn tick(&mut self, dt: f64) {
        for e in &mut self.items {
            e.remaining -= dt;
        }
        self.items.retain(|e| e.remaining > 0.0);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[CellEffect] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
