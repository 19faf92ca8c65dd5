// Atomic reaction channels.
//
// A reaction pairs a cross section on a shared energy grid with the
// collision physics it triggers. The grid is held behind an `Arc` so every
// reaction of an atom can index the same allocation; a reaction that opens
// above the grid start stores only the tail of cross section values,
// offset by its threshold index.

use std::sync::Arc;

use crate::bank::ParticleBank;
use crate::bremsstrahlung::BremsstrahlungDistribution;
use crate::elastic::MomentPreservingElasticDistribution;
use crate::electroionization::ElectroionizationSubshellDistribution;
use crate::particle::{ParticleState, ParticleType};
use crate::physics::{sample_isotropic_direction, ELECTRON_REST_MASS_ENERGY};
use crate::relaxation::Subshell;
use crate::rng::RandomStream;

/// The collision physics behind a reaction channel.
#[derive(Clone, Debug)]
pub enum ReactionProcess {
    Bremsstrahlung(BremsstrahlungDistribution),
    ElectroionizationSubshell(ElectroionizationSubshellDistribution),
    MomentPreservingElastic(MomentPreservingElasticDistribution),
    /// Positron annihilation into two photons.
    Annihilation,
    /// Placeholder absorption channel carrying a cross section but no
    /// collision physics.
    VoidAbsorption,
}

#[derive(Clone, Debug)]
pub struct AtomicReaction {
    energy_grid: Arc<Vec<f64>>,
    /// Cross section values for grid points at and above the threshold
    /// index.
    cross_section: Vec<f64>,
    threshold_index: usize,
    process: ReactionProcess,
}

impl AtomicReaction {
    /// Panics if the grid is not strictly ascending or the cross section
    /// does not cover exactly the grid tail from the threshold index on.
    pub fn new(
        energy_grid: Arc<Vec<f64>>,
        cross_section: Vec<f64>,
        threshold_index: usize,
        process: ReactionProcess,
    ) -> Self {
        assert!(energy_grid.len() >= 2, "energy grid needs two points");
        assert!(
            energy_grid.windows(2).all(|w| w[0] < w[1]),
            "energy grid must be strictly ascending"
        );
        assert_eq!(
            threshold_index + cross_section.len(),
            energy_grid.len(),
            "cross section must cover the grid from the threshold on"
        );

        Self {
            energy_grid,
            cross_section,
            threshold_index,
            process,
        }
    }

    pub fn process(&self) -> &ReactionProcess {
        &self.process
    }

    pub fn threshold_energy(&self) -> f64 {
        self.energy_grid[self.threshold_index]
    }

    pub fn threshold_index(&self) -> usize {
        self.threshold_index
    }

    /// True if both reactions index the same energy grid allocation.
    pub fn shares_energy_grid(&self, other: &AtomicReaction) -> bool {
        Arc::ptr_eq(&self.energy_grid, &other.energy_grid)
    }

    /// Cross section at an arbitrary energy: zero below the threshold,
    /// linearly interpolated on the grid, clamped at the grid top.
    pub fn cross_section(&self, energy: f64) -> f64 {
        if energy < self.threshold_energy() {
            return 0.0;
        }
        let last = self.energy_grid.len() - 1;
        if energy >= self.energy_grid[last] {
            return self.cross_section[self.cross_section.len() - 1];
        }

        let mut low = self.threshold_index;
        let mut high = self.energy_grid.len();
        while high - low > 1 {
            let mid = (low + high) >> 1;
            if self.energy_grid[mid] <= energy {
                low = mid;
            } else {
                high = mid;
            }
        }

        let e0 = self.energy_grid[low];
        let e1 = self.energy_grid[low + 1];
        let xs0 = self.cross_section[low - self.threshold_index];
        let xs1 = self.cross_section[low + 1 - self.threshold_index];

        xs0 + (xs1 - xs0) * (energy - e0) / (e1 - e0)
    }

    /// Cross section at a full-grid index: zero below the threshold index.
    pub fn cross_section_at_index(&self, grid_index: usize) -> f64 {
        debug_assert!(grid_index < self.energy_grid.len());

        if grid_index < self.threshold_index {
            0.0
        } else {
            self.cross_section[grid_index - self.threshold_index]
        }
    }

    /// Cross section at an energy whose bracketing grid index the caller
    /// already found, skipping the binary search. Used when several
    /// reactions share one grid and the search was done once.
    pub fn cross_section_with_index(&self, energy: f64, grid_index: usize) -> f64 {
        debug_assert!(grid_index + 1 < self.energy_grid.len());
        debug_assert!(self.energy_grid[grid_index] <= energy);
        debug_assert!(energy <= self.energy_grid[grid_index + 1]);

        if grid_index < self.threshold_index {
            return 0.0;
        }

        let e0 = self.energy_grid[grid_index];
        let e1 = self.energy_grid[grid_index + 1];
        let xs0 = self.cross_section[grid_index - self.threshold_index];
        let xs1 = self.cross_section[grid_index + 1 - self.threshold_index];

        xs0 + (xs1 - xs0) * (energy - e0) / (e1 - e0)
    }

    /// Run the reaction's collision physics on the particle, reporting the
    /// ionized subshell if the channel involves one. Every channel except
    /// the void counts as a collision.
    pub fn react<S: RandomStream>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        stream: &mut S,
    ) -> Option<Subshell> {
        match &self.process {
            ReactionProcess::Bremsstrahlung(distribution) => {
                particle.increment_collision_number();
                distribution.scatter_electron(particle, bank, stream);
                None
            }
            ReactionProcess::ElectroionizationSubshell(distribution) => {
                particle.increment_collision_number();
                distribution.scatter_electron(particle, bank, stream);
                Some(distribution.subshell())
            }
            ReactionProcess::MomentPreservingElastic(distribution) => {
                particle.increment_collision_number();
                distribution.scatter_electron(particle, bank, stream);
                None
            }
            ReactionProcess::Annihilation => {
                particle.increment_collision_number();
                annihilate_positron(particle, bank, stream);
                None
            }
            ReactionProcess::VoidAbsorption => None,
        }
    }

    /// `react`, counting the sampling against a trial counter.
    pub fn react_and_count<S: RandomStream>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        stream: &mut S,
        trials: &mut u64,
    ) -> Option<Subshell> {
        *trials += 1;
        self.react(particle, bank, stream)
    }
}

/// Annihilate a positron at rest: two back-to-back photons at the electron
/// rest mass energy, emitted along a sampled isotropic axis. The positron
/// is terminated.
pub fn annihilate_positron<S: RandomStream>(
    positron: &mut ParticleState,
    bank: &mut ParticleBank,
    stream: &mut S,
) {
    debug_assert_eq!(positron.particle_type, ParticleType::Positron);

    let axis = sample_isotropic_direction(stream);

    let mut first =
        ParticleState::spawn_from(positron, ParticleType::Photon, ELECTRON_REST_MASS_ENERGY);
    first.direction = axis;
    bank.push(first);

    let mut second =
        ParticleState::spawn_from(positron, ParticleType::Photon, ELECTRON_REST_MASS_ENERGY);
    second.direction = [-axis[0], -axis[1], -axis[2]];
    bank.push(second);

    positron.set_energy(0.0);
    positron.set_as_gone();
}
