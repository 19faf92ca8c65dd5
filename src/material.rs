// Material composition.
//
// Components carry either atom fractions (positive) or weight fractions
// (negative, following the usual data-deck convention). Normalization
// preserves the sign and scales the set to unit magnitude, so a material
// defined by weight keeps summing to -1 and one defined by atoms to +1.

use std::collections::HashMap;

use crate::reaction::AtomicReaction;

/// Scale fractions so their magnitudes sum to one, keeping signs.
///
/// Panics on an empty set, mixed signs, or a zero sum.
pub fn normalize_fractions(fractions: &mut [f64]) {
    assert!(!fractions.is_empty(), "material has no components");
    assert!(
        fractions.iter().all(|&f| f > 0.0) || fractions.iter().all(|&f| f < 0.0),
        "fractions must be all atom (positive) or all weight (negative)"
    );

    let magnitude: f64 = fractions.iter().map(|f| f.abs()).sum();
    for fraction in fractions.iter_mut() {
        *fraction /= magnitude;
    }
}

/// A collection of atoms with normalized fractions and their reaction
/// channels.
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    pub id: u32,
    // (atom id, normalized fraction)
    components: Vec<(u32, f64)>,
    reactions: HashMap<u32, Vec<AtomicReaction>>,
}

impl Material {
    pub fn new(name: impl Into<String>, id: u32, mut components: Vec<(u32, f64)>) -> Self {
        let mut fractions: Vec<f64> = components.iter().map(|&(_, f)| f).collect();
        normalize_fractions(&mut fractions);
        for (component, fraction) in components.iter_mut().zip(fractions) {
            component.1 = fraction;
        }

        Self {
            name: name.into(),
            id,
            components,
            reactions: HashMap::new(),
        }
    }

    pub fn components(&self) -> &[(u32, f64)] {
        &self.components
    }

    pub fn fraction(&self, atom_id: u32) -> Option<f64> {
        self.components
            .iter()
            .find(|&&(id, _)| id == atom_id)
            .map(|&(_, f)| f)
    }

    pub fn add_reactions(&mut self, atom_id: u32, reactions: Vec<AtomicReaction>) {
        debug_assert!(self.fraction(atom_id).is_some());
        self.reactions.insert(atom_id, reactions);
    }

    pub fn reactions(&self, atom_id: u32) -> &[AtomicReaction] {
        self.reactions.get(&atom_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fraction-weighted macroscopic-style total over all components'
    /// reaction channels at an energy.
    pub fn total_cross_section(&self, energy: f64) -> f64 {
        self.components
            .iter()
            .map(|&(atom_id, fraction)| {
                fraction.abs()
                    * self
                        .reactions(atom_id)
                        .iter()
                        .map(|r| r.cross_section(energy))
                        .sum::<f64>()
            })
            .sum()
    }
}
