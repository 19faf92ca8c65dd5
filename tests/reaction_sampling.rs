// Reaction channel integration checks: sampling through `AtomicReaction`
// into the particle bank.

use approx::assert_relative_eq;
use epmc::physics::ELECTRON_REST_MASS_ENERGY;
use epmc::{
    AtomicReaction, BremsstrahlungAngularModel, BremsstrahlungDistribution,
    DiscreteDistribution, ElectroionizationSubshellDistribution,
    MomentPreservingElasticDistribution, ParticleBank, ParticleState, ParticleType,
    ReactionProcess, Subshell, TabulatedPdf, TwoDDistribution, TwoDTable,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

fn energy_grid() -> Arc<Vec<f64>> {
    Arc::new(vec![1e-3, 1e-2, 1e-1, 1.0])
}

fn flat_spectrum(upper_0: f64, upper_1: f64) -> TwoDDistribution {
    TwoDDistribution::new(TwoDTable {
        primary: vec![1e-3, 1.0],
        rows: vec![
            TabulatedPdf {
                indep: vec![1e-6, upper_0],
                pdf: vec![1.0, 1.0],
            },
            TabulatedPdf {
                indep: vec![1e-6, upper_1],
                pdf: vec![1.0, 1.0],
            },
        ],
    })
}

fn bremsstrahlung_reaction(grid: Arc<Vec<f64>>) -> AtomicReaction {
    AtomicReaction::new(
        grid,
        vec![10.0, 8.0, 4.0, 1.0],
        0,
        ReactionProcess::Bremsstrahlung(BremsstrahlungDistribution::new(
            flat_spectrum(8e-4, 0.4),
            BremsstrahlungAngularModel::Dipole,
        )),
    )
}

#[test]
fn bremsstrahlung_reaction_banks_a_photon() {
    let reaction = bremsstrahlung_reaction(energy_grid());
    let mut electron = ParticleState::new(ParticleType::Electron, 5);
    electron.set_energy(0.5);
    let direction_before = electron.direction;
    let mut bank = ParticleBank::new();
    let mut rng = StdRng::seed_from_u64(77);

    reaction.react(&mut electron, &mut bank, &mut rng);

    assert_eq!(electron.collision_number, 1);
    assert_eq!(bank.len(), 1);
    let photon = bank.pop().unwrap();
    assert_eq!(photon.particle_type, ParticleType::Photon);
    assert_eq!(photon.history_number, 5);
    assert_eq!(photon.generation_number, 1);
    assert!(photon.energy > 0.0 && photon.energy < 0.5);
    assert_relative_eq!(photon.energy + electron.energy, 0.5, epsilon = 1e-12);
    // The radiating electron is not deflected
    assert_eq!(electron.direction, direction_before);
}

#[test]
fn electroionization_reaction_banks_a_knock_on() {
    let binding = 1e-3;
    let reaction = AtomicReaction::new(
        energy_grid(),
        vec![5.0, 4.0, 3.0, 2.0],
        0,
        ReactionProcess::ElectroionizationSubshell(ElectroionizationSubshellDistribution::new(
            Subshell::L1,
            binding,
            flat_spectrum(4e-4, 0.499),
        )),
    );
    let mut electron = ParticleState::new(ParticleType::Electron, 2);
    electron.set_energy(0.5);
    let mut bank = ParticleBank::new();
    let mut rng = StdRng::seed_from_u64(5);

    let shell = reaction.react(&mut electron, &mut bank, &mut rng);
    assert_eq!(shell, Some(Subshell::L1));

    assert_eq!(bank.len(), 1);
    let knock_on = bank.pop().unwrap();
    assert_eq!(knock_on.particle_type, ParticleType::Electron);
    assert_eq!(knock_on.generation_number, 1);
    assert!(knock_on.energy <= electron.energy);
    assert_relative_eq!(
        knock_on.energy + electron.energy + binding,
        0.5,
        epsilon = 1e-12
    );
    // The primary was deflected
    assert!(electron.direction[2] < 1.0);
}

#[test]
fn elastic_reaction_deflects_without_energy_loss() {
    let reaction = AtomicReaction::new(
        energy_grid(),
        vec![100.0, 80.0, 60.0, 40.0],
        0,
        ReactionProcess::MomentPreservingElastic(MomentPreservingElasticDistribution::new(
            0.9,
            vec![1e-3, 1.0],
            vec![
                DiscreteDistribution::new(vec![0.92, 0.98], vec![1.0, 1.0]),
                DiscreteDistribution::new(vec![0.94, 0.99], vec![1.0, 1.0]),
            ],
        )),
    );
    let mut electron = ParticleState::new(ParticleType::Electron, 0);
    electron.set_energy(0.25);
    let mut bank = ParticleBank::new();
    let mut rng = StdRng::seed_from_u64(123);

    reaction.react(&mut electron, &mut bank, &mut rng);

    assert_eq!(electron.energy, 0.25);
    assert!(bank.is_empty());
    assert!(electron.direction[2] >= 0.9);
}

#[test]
fn annihilation_reaction_emits_two_rest_mass_photons() {
    let reaction = AtomicReaction::new(
        energy_grid(),
        vec![1.0, 1.0, 1.0, 1.0],
        0,
        ReactionProcess::Annihilation,
    );
    let mut positron = ParticleState::new(ParticleType::Positron, 8);
    positron.set_energy(1e-5);
    let mut bank = ParticleBank::new();
    let mut rng = StdRng::seed_from_u64(31);

    reaction.react(&mut positron, &mut bank, &mut rng);

    assert!(positron.is_gone());
    assert_eq!(bank.len(), 2);
    let first = bank.pop().unwrap();
    let second = bank.pop().unwrap();
    assert_eq!(first.energy, ELECTRON_REST_MASS_ENERGY);
    assert_eq!(second.energy, ELECTRON_REST_MASS_ENERGY);
    let dot: f64 = first
        .direction
        .iter()
        .zip(second.direction.iter())
        .map(|(a, b)| a * b)
        .sum();
    assert_relative_eq!(dot, -1.0, epsilon = 1e-12);
}

#[test]
fn void_absorption_reaction_changes_nothing() {
    let reaction = AtomicReaction::new(
        energy_grid(),
        vec![1.0, 1.0, 1.0, 1.0],
        0,
        ReactionProcess::VoidAbsorption,
    );
    let mut electron = ParticleState::new(ParticleType::Electron, 0);
    electron.set_energy(0.5);
    let mut bank = ParticleBank::new();
    let mut rng = StdRng::seed_from_u64(1);

    reaction.react(&mut electron, &mut bank, &mut rng);

    assert_eq!(electron.energy, 0.5);
    assert_eq!(electron.collision_number, 0);
    assert!(bank.is_empty());
    assert!(!electron.is_gone());
}

#[test]
fn reactions_share_one_grid_allocation() {
    let grid = energy_grid();
    let brems = bremsstrahlung_reaction(grid.clone());
    let void = AtomicReaction::new(
        grid,
        vec![1.0, 1.0, 1.0, 1.0],
        0,
        ReactionProcess::VoidAbsorption,
    );
    assert!(brems.shares_energy_grid(&void));

    let separate = bremsstrahlung_reaction(energy_grid());
    assert!(!brems.shares_energy_grid(&separate));
}

#[test]
fn trials_count_across_reactions() {
    let reaction = bremsstrahlung_reaction(energy_grid());
    let mut bank = ParticleBank::new();
    let mut rng = StdRng::seed_from_u64(17);
    let mut trials = 0u64;

    for history in 0..25u64 {
        let mut electron = ParticleState::new(ParticleType::Electron, history);
        electron.set_energy(0.5);
        reaction.react_and_count(&mut electron, &mut bank, &mut rng, &mut trials);
    }

    assert_eq!(trials, 25);
    assert_eq!(bank.len(), 25);
}

#[test]
fn banked_secondaries_sort_by_history() {
    let reaction = bremsstrahlung_reaction(energy_grid());
    let mut bank = ParticleBank::new();
    let mut rng = StdRng::seed_from_u64(41);

    for history in [3u64, 1, 2, 0] {
        let mut electron = ParticleState::new(ParticleType::Electron, history);
        electron.set_energy(0.5);
        reaction.react(&mut electron, &mut bank, &mut rng);
    }

    bank.sort_by(|a, b| a.history_number.cmp(&b.history_number));
    let histories: Vec<u64> = std::iter::from_fn(|| bank.pop())
        .map(|p| p.history_number)
        .collect();
    assert_eq!(histories, vec![0, 1, 2, 3]);
}
