// Bremsstrahlung photon emission.
//
// The photon energy comes from a tabulated bivariate spectrum sampled
// correlated between the bracketing incident energies. The emission angle
// comes from one of three models: the relativistic dipole closed form, a
// tabulated angular distribution bracketed by energy cutoffs with a dipole
// fallback, or the Koch-Motz 2BS rejection sampler.

use std::f64::consts::PI;

use crate::bank::ParticleBank;
use crate::distribution::TwoDDistribution;
use crate::interpolation::{InterpolationPolicy, LinLin};
use crate::particle::{ParticleState, ParticleType};
use crate::physics::{electron_speed_ratio, sample_azimuthal_angle, ELECTRON_REST_MASS_ENERGY};
use crate::rng::RandomStream;

/// How the photon emission angle is sampled.
#[derive(Clone, Debug)]
pub enum BremsstrahlungAngularModel {
    /// Relativistic dipole closed form.
    Dipole,
    /// Tabulated angular distribution, valid between the cutoff energies;
    /// dipole outside them.
    Tabular {
        distribution: TwoDDistribution<LinLin, LinLin>,
        lower_cutoff_energy: f64,
        upper_cutoff_energy: f64,
    },
    /// Koch-Motz 2BS rejection sampling for a given atomic number.
    TwoBS { atomic_number: f64 },
}

#[derive(Clone, Debug)]
pub struct BremsstrahlungDistribution<
    ZY: InterpolationPolicy = LinLin,
    ZX: InterpolationPolicy = LinLin,
> {
    energy_distribution: TwoDDistribution<ZY, ZX>,
    angular_model: BremsstrahlungAngularModel,
}

impl<ZY: InterpolationPolicy, ZX: InterpolationPolicy> BremsstrahlungDistribution<ZY, ZX> {
    pub fn new(
        energy_distribution: TwoDDistribution<ZY, ZX>,
        angular_model: BremsstrahlungAngularModel,
    ) -> Self {
        Self {
            energy_distribution,
            angular_model,
        }
    }

    pub fn min_incoming_energy(&self) -> f64 {
        self.energy_distribution.lower_bound_of_primary_indep_var()
    }

    pub fn max_incoming_energy(&self) -> f64 {
        self.energy_distribution.upper_bound_of_primary_indep_var()
    }

    /// Smallest photon energy emitted at the given incident energy.
    pub fn min_photon_energy(&self, incoming_energy: f64) -> f64 {
        self.energy_distribution
            .lower_bound_of_secondary_conditional(incoming_energy)
    }

    /// Largest photon energy emitted at the given incident energy. The
    /// photon cannot carry more than the electron brought in.
    pub fn max_photon_energy(&self, incoming_energy: f64) -> f64 {
        self.energy_distribution
            .upper_bound_of_secondary_conditional(incoming_energy)
            .min(incoming_energy)
    }

    /// Raw tabulated spectrum value at (incident energy, photon energy).
    pub fn evaluate(&self, incoming_energy: f64, photon_energy: f64) -> f64 {
        self.energy_distribution.evaluate(incoming_energy, photon_energy)
    }

    /// Normalized photon energy pdf at the incident energy.
    pub fn evaluate_pdf(&self, incoming_energy: f64, photon_energy: f64) -> f64 {
        self.energy_distribution
            .evaluate_secondary_conditional_pdf(incoming_energy, photon_energy)
    }

    /// Photon energy cdf at the incident energy.
    pub fn evaluate_cdf(&self, incoming_energy: f64, photon_energy: f64) -> f64 {
        self.energy_distribution
            .evaluate_secondary_conditional_cdf(incoming_energy, photon_energy)
    }

    /// Sample a photon energy and emission angle cosine.
    pub fn sample<S: RandomStream>(&self, incoming_energy: f64, stream: &mut S) -> (f64, f64) {
        debug_assert!(incoming_energy > 0.0);

        let photon_energy = self
            .energy_distribution
            .sample_secondary_conditional(incoming_energy, stream)
            .min(incoming_energy);

        let mu = match &self.angular_model {
            BremsstrahlungAngularModel::Dipole => {
                sample_dipole_angle(incoming_energy, stream)
            }
            BremsstrahlungAngularModel::Tabular {
                distribution,
                lower_cutoff_energy,
                upper_cutoff_energy,
            } => {
                // The cutoff band brackets the incident electron energy;
                // the angular table itself is indexed by the photon energy
                if incoming_energy >= *lower_cutoff_energy
                    && incoming_energy <= *upper_cutoff_energy
                {
                    distribution.sample_secondary_conditional(photon_energy, stream)
                } else {
                    log::trace!(
                        "incident energy {} outside tabulated angular range, using dipole",
                        incoming_energy
                    );
                    sample_dipole_angle(incoming_energy, stream)
                }
            }
            BremsstrahlungAngularModel::TwoBS { atomic_number } => {
                // A photon carrying the full incident energy leaves no
                // outgoing electron for the 2BS screening term
                if photon_energy < incoming_energy {
                    sample_twobs_angle(*atomic_number, incoming_energy, photon_energy, stream)
                } else {
                    sample_dipole_angle(incoming_energy, stream)
                }
            }
        };

        (photon_energy, mu)
    }

    /// `sample`, counting the call against a trial counter.
    pub fn sample_and_record_trials<S: RandomStream>(
        &self,
        incoming_energy: f64,
        stream: &mut S,
        trials: &mut u64,
    ) -> (f64, f64) {
        *trials += 1;
        self.sample(incoming_energy, stream)
    }

    /// Emit a photon: the photon is banked on the rotated direction, the
    /// electron keeps its direction and loses the photon's energy.
    pub fn scatter_electron<S: RandomStream>(
        &self,
        electron: &mut ParticleState,
        bank: &mut ParticleBank,
        stream: &mut S,
    ) {
        let (photon_energy, mu) = self.sample(electron.energy, stream);
        let azimuthal = sample_azimuthal_angle(stream);

        let mut photon = ParticleState::spawn_from(electron, ParticleType::Photon, photon_energy);
        photon.rotate_direction(mu, azimuthal);
        bank.push(photon);

        let remaining = electron.energy - photon_energy;
        if remaining > 0.0 {
            electron.set_energy(remaining);
        } else {
            electron.set_energy(0.0);
            electron.set_as_gone();
        }
    }
}

/// Dipole emission angle cosine for an electron with the given kinetic
/// energy (MeV).
pub fn sample_dipole_angle<S: RandomStream>(incoming_energy: f64, stream: &mut S) -> f64 {
    let beta = electron_speed_ratio(incoming_energy);

    let scaled = 2.0 * stream.sample();
    let parameter = -(1.0 + beta);

    (scaled + parameter) / (scaled * beta + parameter)
}

/// Koch-Motz 2BS emission angle cosine.
///
/// Candidate angles are drawn from the 1/(1+x)^2 density in the reduced
/// variable x = (E theta)^2 and kept by a rejection test against the 2BS
/// cross section. The loop runs until a candidate is accepted; it has no
/// iteration ceiling, so termination relies on the stream.
pub fn sample_twobs_angle<S: RandomStream>(
    atomic_number: f64,
    incoming_energy: f64,
    photon_energy: f64,
    stream: &mut S,
) -> f64 {
    debug_assert!(photon_energy < incoming_energy);

    // Energies in electron rest mass units
    let total_energy = incoming_energy / ELECTRON_REST_MASS_ENERGY;
    let outgoing_energy = (incoming_energy - photon_energy) / ELECTRON_REST_MASS_ENERGY;
    let reduced_photon_energy = photon_energy / ELECTRON_REST_MASS_ENERGY;
    let ratio = outgoing_energy / total_energy;

    let two_bs = |x: f64| -> f64 {
        let m_inverse = (reduced_photon_energy / (2.0 * total_energy * outgoing_energy)).powi(2)
            + (atomic_number.cbrt() / (111.0 * (1.0 + x))).powi(2);

        16.0 * x * ratio / (1.0 + x).powi(2) - (1.0 + ratio).powi(2)
            + ((1.0 + ratio * ratio) - 4.0 * x * ratio / (1.0 + x).powi(2)) * (-m_inverse.ln())
    };

    let x_max = (PI * total_energy).powi(2);
    // The rejection function is not monotonic; bound it by its value at the
    // ends and at x = 1
    let envelope = two_bs(0.0).max(two_bs(1.0)).max(two_bs(x_max));

    loop {
        let xi = stream.sample();
        let x = xi * x_max / (1.0 + x_max * (1.0 - xi));

        if stream.sample() * envelope <= two_bs(x) {
            return (x.sqrt() / total_energy).cos();
        }
    }
}
