//! Monte Carlo electron and photon collision sampling.
//!
//! Tabulated interpolation policies, secondary-particle distributions and
//! reaction channels for charged-particle transport: bremsstrahlung
//! emission, subshell electroionization, moment-preserving elastic
//! scattering, positron annihilation and atomic relaxation cascades.

pub mod bank;
pub mod bremsstrahlung;
pub mod distribution;
pub mod elastic;
pub mod electroionization;
pub mod grid;
pub mod interpolation;
pub mod material;
pub mod particle;
pub mod physics;
pub mod reaction;
pub mod relaxation;
pub mod rng;
pub mod tuple;

pub use bank::ParticleBank;
pub use bremsstrahlung::{BremsstrahlungAngularModel, BremsstrahlungDistribution};
pub use distribution::{
    DiscreteDistribution, TabularDistribution, TabulatedPdf, TwoDDistribution, TwoDTable,
};
pub use elastic::MomentPreservingElasticDistribution;
pub use electroionization::ElectroionizationSubshellDistribution;
pub use grid::TwoDGridPolicy;
pub use interpolation::InterpolationPolicy;
pub use material::Material;
pub use particle::{ParticleState, ParticleType};
pub use reaction::{annihilate_positron, AtomicReaction, ReactionProcess};
pub use relaxation::{
    AtomicRelaxationModel, AtomicRelaxationModelFactory, Subshell, SubshellRelaxationTable,
};
pub use rng::{FakeStream, RandomStream, TransportRng};
