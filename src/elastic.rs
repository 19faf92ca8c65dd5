// Moment-preserving elastic scattering.
//
// Forward-peaked elastic scattering below the cutoff cosine is condensed
// into a few discrete angles per incident energy, chosen to preserve the
// angular moments of the full distribution. A collision draws one discrete
// angle, correlating the bracketing energy grid points, and deflects the
// electron without energy loss.

use crate::bank::ParticleBank;
use crate::distribution::DiscreteDistribution;
use crate::particle::ParticleState;
use crate::physics::sample_azimuthal_angle;
use crate::rng::RandomStream;

#[derive(Clone, Debug)]
pub struct MomentPreservingElasticDistribution {
    cutoff_cosine: f64,
    energy_grid: Vec<f64>,
    // One discrete angle set per energy grid point
    discrete_angles: Vec<DiscreteDistribution>,
}

impl MomentPreservingElasticDistribution {
    /// Panics on an empty or unsorted energy grid or a row count mismatch.
    pub fn new(
        cutoff_cosine: f64,
        energy_grid: Vec<f64>,
        discrete_angles: Vec<DiscreteDistribution>,
    ) -> Self {
        assert!((-1.0..1.0).contains(&cutoff_cosine), "invalid cutoff cosine");
        assert!(!energy_grid.is_empty(), "empty energy grid");
        assert_eq!(
            energy_grid.len(),
            discrete_angles.len(),
            "one angle set per energy grid point"
        );
        assert!(
            energy_grid.windows(2).all(|w| w[0] < w[1]),
            "energy grid must be strictly ascending"
        );

        Self {
            cutoff_cosine,
            energy_grid,
            discrete_angles,
        }
    }

    pub fn cutoff_cosine(&self) -> f64 {
        self.cutoff_cosine
    }

    pub fn min_incoming_energy(&self) -> f64 {
        self.energy_grid[0]
    }

    pub fn max_incoming_energy(&self) -> f64 {
        self.energy_grid[self.energy_grid.len() - 1]
    }

    /// Sample a scattering cosine at the given incident energy. The
    /// bracketing grid points are sampled with the same random number and
    /// the two angles blended linearly in energy; the result always lies
    /// at or above the cutoff cosine.
    pub fn sample_with_random_number(&self, incoming_energy: f64, random_number: f64) -> f64 {
        let mu = if incoming_energy <= self.energy_grid[0] {
            self.discrete_angles[0].sample_with_random_number(random_number)
        } else if incoming_energy >= self.max_incoming_energy() {
            self.discrete_angles[self.discrete_angles.len() - 1]
                .sample_with_random_number(random_number)
        } else {
            let mut low = 0usize;
            let mut high = self.energy_grid.len();
            while high - low > 1 {
                let mid = (low + high) >> 1;
                if self.energy_grid[mid] <= incoming_energy {
                    low = mid;
                } else {
                    high = mid;
                }
            }

            let mu_0 = self.discrete_angles[low].sample_with_random_number(random_number);
            let mu_1 = self.discrete_angles[low + 1].sample_with_random_number(random_number);
            let fraction = (incoming_energy - self.energy_grid[low])
                / (self.energy_grid[low + 1] - self.energy_grid[low]);

            mu_0 + fraction * (mu_1 - mu_0)
        };

        debug_assert!(mu >= self.cutoff_cosine && mu <= 1.0);

        mu
    }

    pub fn sample<S: RandomStream>(&self, incoming_energy: f64, stream: &mut S) -> f64 {
        self.sample_with_random_number(incoming_energy, stream.sample())
    }

    /// Deflect the electron elastically; energy is unchanged and nothing is
    /// banked.
    pub fn scatter_electron<S: RandomStream>(
        &self,
        electron: &mut ParticleState,
        _bank: &mut ParticleBank,
        stream: &mut S,
    ) {
        let mu = self.sample(electron.energy, stream);
        let azimuthal = sample_azimuthal_angle(stream);
        electron.rotate_direction(mu, azimuthal);
    }
}
