// Electroionization of a bound subshell.
//
// A collision frees a knock-on electron whose energy follows a tabulated
// bivariate spectrum; by convention the knock-on is the lower-energy
// outgoing electron, so it never carries more than half of the energy left
// after paying the subshell binding energy. Both outgoing directions follow
// from energy conservation through the same angle relation.

use crate::bank::ParticleBank;
use crate::distribution::TwoDDistribution;
use crate::interpolation::{InterpolationPolicy, LinLin};
use crate::particle::{ParticleState, ParticleType};
use crate::physics::{sample_azimuthal_angle, ELECTRON_REST_MASS_ENERGY};
use crate::relaxation::Subshell;
use crate::rng::RandomStream;

#[derive(Clone, Debug)]
pub struct ElectroionizationSubshellDistribution<
    ZY: InterpolationPolicy = LinLin,
    ZX: InterpolationPolicy = LinLin,
> {
    subshell: Subshell,
    binding_energy: f64,
    knock_on_distribution: TwoDDistribution<ZY, ZX>,
}

impl<ZY: InterpolationPolicy, ZX: InterpolationPolicy>
    ElectroionizationSubshellDistribution<ZY, ZX>
{
    pub fn new(
        subshell: Subshell,
        binding_energy: f64,
        knock_on_distribution: TwoDDistribution<ZY, ZX>,
    ) -> Self {
        assert!(binding_energy > 0.0, "binding energy must be positive");

        Self {
            subshell,
            binding_energy,
            knock_on_distribution,
        }
    }

    /// The ionized subshell.
    pub fn subshell(&self) -> Subshell {
        self.subshell
    }

    pub fn binding_energy(&self) -> f64 {
        self.binding_energy
    }

    pub fn min_incoming_energy(&self) -> f64 {
        self.knock_on_distribution.lower_bound_of_primary_indep_var()
    }

    pub fn max_incoming_energy(&self) -> f64 {
        self.knock_on_distribution.upper_bound_of_primary_indep_var()
    }

    /// Largest knock-on energy at the given incident energy: half of what
    /// remains after the binding energy is paid.
    pub fn max_knock_on_energy(&self, incoming_energy: f64) -> f64 {
        debug_assert!(incoming_energy > self.binding_energy);

        0.5 * (incoming_energy - self.binding_energy)
    }

    /// Raw tabulated spectrum value at (incident energy, knock-on energy).
    pub fn evaluate(&self, incoming_energy: f64, knock_on_energy: f64) -> f64 {
        self.knock_on_distribution.evaluate(incoming_energy, knock_on_energy)
    }

    /// Normalized knock-on energy pdf at the incident energy.
    pub fn evaluate_pdf(&self, incoming_energy: f64, knock_on_energy: f64) -> f64 {
        self.knock_on_distribution
            .evaluate_secondary_conditional_pdf(incoming_energy, knock_on_energy)
    }

    /// Knock-on energy cdf at the incident energy.
    pub fn evaluate_cdf(&self, incoming_energy: f64, knock_on_energy: f64) -> f64 {
        self.knock_on_distribution
            .evaluate_secondary_conditional_cdf(incoming_energy, knock_on_energy)
    }

    /// Sample the pair (primary outgoing energy, knock-on energy).
    pub fn sample<S: RandomStream>(&self, incoming_energy: f64, stream: &mut S) -> (f64, f64) {
        debug_assert!(incoming_energy > self.binding_energy);

        let knock_on_energy = self
            .knock_on_distribution
            .sample_secondary_conditional(incoming_energy, stream)
            .min(self.max_knock_on_energy(incoming_energy));

        let outgoing_energy = incoming_energy - self.binding_energy - knock_on_energy;

        (outgoing_energy.max(0.0), knock_on_energy)
    }

    pub fn sample_and_record_trials<S: RandomStream>(
        &self,
        incoming_energy: f64,
        stream: &mut S,
        trials: &mut u64,
    ) -> (f64, f64) {
        *trials += 1;
        self.sample(incoming_energy, stream)
    }

    /// Ionize: the knock-on electron is banked on its conservation angle,
    /// the primary is rotated onto its own and keeps the remaining energy,
    /// or terminates if nothing remains.
    pub fn scatter_electron<S: RandomStream>(
        &self,
        electron: &mut ParticleState,
        bank: &mut ParticleBank,
        stream: &mut S,
    ) {
        let incoming_energy = electron.energy;
        let (outgoing_energy, knock_on_energy) = self.sample(incoming_energy, stream);

        let knock_on_mu = outgoing_angle(incoming_energy, knock_on_energy);
        let mut knock_on =
            ParticleState::spawn_from(electron, ParticleType::Electron, knock_on_energy);
        knock_on.rotate_direction(knock_on_mu, sample_azimuthal_angle(stream));
        bank.push(knock_on);

        if outgoing_energy > 0.0 {
            let mu = outgoing_angle(incoming_energy, outgoing_energy);
            electron.set_energy(outgoing_energy);
            electron.rotate_direction(mu, sample_azimuthal_angle(stream));
        } else {
            electron.set_energy(0.0);
            electron.set_as_gone();
        }
    }
}

/// Polar cosine of an outgoing electron with the given energy share, from
/// conservation of energy and momentum.
pub fn outgoing_angle(incoming_energy: f64, outgoing_energy: f64) -> f64 {
    debug_assert!(outgoing_energy <= incoming_energy);

    if outgoing_energy <= 0.0 {
        return 0.0;
    }

    let energy_ratio = outgoing_energy / incoming_energy;
    let reduced_energy = incoming_energy / ELECTRON_REST_MASS_ENERGY;

    (energy_ratio * (reduced_energy + 2.0) / (energy_ratio * reduced_energy + 2.0)).sqrt()
}

/// Pick an interacting subshell from per-shell cross sections at the
/// collision energy.
pub fn sample_subshell_index<S: RandomStream>(cross_sections: &[f64], stream: &mut S) -> usize {
    debug_assert!(!cross_sections.is_empty());

    let total: f64 = cross_sections.iter().sum();
    debug_assert!(total > 0.0);

    let target = stream.sample() * total;
    let mut running = 0.0;
    for (index, &xs) in cross_sections.iter().enumerate() {
        running += xs;
        if target < running {
            return index;
        }
    }
    cross_sections.len() - 1
}
