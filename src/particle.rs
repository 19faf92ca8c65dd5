// Particle state carried through collision sampling.

use nalgebra::Vector3;

use crate::physics::rotate_direction_3d;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleType {
    Photon,
    Neutron,
    Electron,
    Positron,
    AdjointElectron,
}

/// A single transported particle.
///
/// Owned plain data; secondaries are new states pushed onto a bank rather
/// than children of the parent.
#[derive(Clone, Debug)]
pub struct ParticleState {
    pub particle_type: ParticleType,
    pub history_number: u64,
    /// 0 for source particles, parent's generation + 1 for secondaries.
    pub generation_number: u32,
    pub collision_number: u32,
    /// Kinetic energy in MeV.
    pub energy: f64,
    pub position: [f64; 3],
    /// Unit vector.
    pub direction: [f64; 3],
    pub weight: f64,
    gone: bool,
}

impl ParticleState {
    pub fn new(particle_type: ParticleType, history_number: u64) -> Self {
        Self {
            particle_type,
            history_number,
            generation_number: 0,
            collision_number: 0,
            energy: 0.0,
            position: [0.0; 3],
            direction: [0.0, 0.0, 1.0],
            weight: 1.0,
            gone: false,
        }
    }

    /// A secondary born at the parent's phase-space point: same history,
    /// position, direction and weight, next generation, zero collisions.
    pub fn spawn_from(parent: &ParticleState, particle_type: ParticleType, energy: f64) -> Self {
        debug_assert!(!parent.gone);

        Self {
            particle_type,
            history_number: parent.history_number,
            generation_number: parent.generation_number + 1,
            collision_number: 0,
            energy,
            position: parent.position,
            direction: parent.direction,
            weight: parent.weight,
            gone: false,
        }
    }

    /// Terminated particles take no further part in transport.
    pub fn is_gone(&self) -> bool {
        self.gone
    }

    pub fn set_as_gone(&mut self) {
        self.gone = true;
    }

    pub fn increment_collision_number(&mut self) {
        self.collision_number += 1;
    }

    pub fn set_energy(&mut self, energy: f64) {
        debug_assert!(energy >= 0.0);
        self.energy = energy;
    }

    /// Rotate the flight direction by polar cosine `mu` about the current
    /// direction with azimuthal angle `phi`.
    pub fn rotate_direction(&mut self, mu: f64, phi: f64) {
        debug_assert!((-1.0..=1.0).contains(&mu));

        let old = Vector3::new(self.direction[0], self.direction[1], self.direction[2]);
        let new = rotate_direction_3d(&old, mu, phi);
        self.direction = [new.x, new.y, new.z];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_particle_defaults() {
        let p = ParticleState::new(ParticleType::Electron, 7);
        assert_eq!(p.history_number, 7);
        assert_eq!(p.generation_number, 0);
        assert_eq!(p.collision_number, 0);
        assert_eq!(p.weight, 1.0);
        assert!(!p.is_gone());
    }

    #[test]
    fn test_spawn_inherits_phase_space() {
        let mut parent = ParticleState::new(ParticleType::Electron, 3);
        parent.position = [1.0, 2.0, 3.0];
        parent.direction = [1.0, 0.0, 0.0];
        parent.weight = 0.5;
        parent.generation_number = 2;
        parent.collision_number = 9;

        let child = ParticleState::spawn_from(&parent, ParticleType::Photon, 0.1);
        assert_eq!(child.particle_type, ParticleType::Photon);
        assert_eq!(child.history_number, 3);
        assert_eq!(child.generation_number, 3);
        assert_eq!(child.collision_number, 0);
        assert_eq!(child.position, parent.position);
        assert_eq!(child.direction, parent.direction);
        assert_eq!(child.weight, 0.5);
        assert_eq!(child.energy, 0.1);
    }

    #[test]
    fn test_rotate_direction_preserves_unit_norm() {
        let mut p = ParticleState::new(ParticleType::Photon, 0);
        p.rotate_direction(0.3, 2.0);
        let norm =
            (p.direction[0].powi(2) + p.direction[1].powi(2) + p.direction[2].powi(2)).sqrt();
        assert_relative_eq!(norm, 1.0, epsilon = 1e-12);
        // Cosine with the original z axis
        assert_relative_eq!(p.direction[2], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_gone_flag() {
        let mut p = ParticleState::new(ParticleType::Positron, 0);
        p.set_as_gone();
        assert!(p.is_gone());
    }
}
