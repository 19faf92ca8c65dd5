// End-to-end relaxation cascade checks through the public API.

use approx::assert_relative_eq;
use epmc::relaxation::RelaxationTransition;
use epmc::{
    AtomicRelaxationModel, AtomicRelaxationModelFactory, FakeStream, ParticleBank, ParticleState,
    ParticleType, Subshell, SubshellRelaxationTable,
};
use std::sync::Arc;

fn silicon_like_tables() -> Vec<SubshellRelaxationTable> {
    vec![
        SubshellRelaxationTable {
            subshell: Subshell::K,
            transitions: vec![
                RelaxationTransition {
                    filling_shell: Subshell::L2,
                    ejected_shell: None,
                    emitted_energy: 1.0e-2,
                    cumulative_probability: 0.95,
                },
                RelaxationTransition {
                    filling_shell: Subshell::L1,
                    ejected_shell: Some(Subshell::L2),
                    emitted_energy: 5.71919999999999998e-2,
                    cumulative_probability: 1.0,
                },
            ],
        },
        SubshellRelaxationTable {
            subshell: Subshell::L1,
            transitions: vec![
                RelaxationTransition {
                    filling_shell: Subshell::M2,
                    ejected_shell: None,
                    emitted_energy: 1.584170000000e-2,
                    cumulative_probability: 0.6,
                },
                RelaxationTransition {
                    filling_shell: Subshell::M1,
                    ejected_shell: Some(Subshell::M2),
                    emitted_energy: 1.0e-3,
                    cumulative_probability: 1.0,
                },
            ],
        },
        SubshellRelaxationTable {
            subshell: Subshell::L2,
            transitions: vec![RelaxationTransition {
                filling_shell: Subshell::M3,
                ejected_shell: None,
                emitted_energy: 1.523590000000e-2,
                cumulative_probability: 1.0,
            }],
        },
    ]
}

#[test]
fn k_shell_vacancy_produces_auger_then_two_photons() {
    let model = AtomicRelaxationModel::detailed(silicon_like_tables());
    let mut parent = ParticleState::new(ParticleType::Photon, 11);
    parent.position = [0.1, 0.2, 0.3];
    parent.weight = 0.75;

    let mut bank = ParticleBank::new();
    let mut stream = FakeStream::new(vec![
        0.966, 0.5, 0.5, 0.09809, 0.5, 0.5, 0.40361, 0.5, 0.5,
    ]);

    model.relax_atom(Subshell::K, &parent, &mut bank, &mut stream);

    assert_eq!(bank.len(), 3);

    let auger = bank.pop().unwrap();
    assert_eq!(auger.particle_type, ParticleType::Electron);
    assert_eq!(auger.energy, 5.71919999999999998e-2);
    assert_eq!(auger.history_number, 11);
    assert_eq!(auger.generation_number, 1);
    assert_eq!(auger.position, parent.position);
    assert_eq!(auger.weight, 0.75);
    assert_relative_eq!(auger.direction[0], -1.0, epsilon = 1e-12);
    assert_relative_eq!(auger.direction[1], 0.0, epsilon = 1e-12);
    assert_relative_eq!(auger.direction[2], 0.0, epsilon = 1e-12);

    let l1_photon = bank.pop().unwrap();
    assert_eq!(l1_photon.particle_type, ParticleType::Photon);
    assert_eq!(l1_photon.energy, 1.584170000000e-2);

    let l2_photon = bank.pop().unwrap();
    assert_eq!(l2_photon.particle_type, ParticleType::Photon);
    assert_eq!(l2_photon.energy, 1.523590000000e-2);

    assert_eq!(stream.draws(), 9);
}

#[test]
fn void_model_abandons_vacancies() {
    let model = AtomicRelaxationModel::Void;
    let parent = ParticleState::new(ParticleType::Photon, 0);
    let mut bank = ParticleBank::new();
    let mut stream = FakeStream::new(vec![0.5]);

    model.relax_atom(Subshell::K, &parent, &mut bank, &mut stream);

    assert!(bank.is_empty());
    assert_eq!(stream.draws(), 0);
}

#[test]
fn factory_returns_shared_models_per_source() {
    let mut factory = AtomicRelaxationModelFactory::new();

    let first = factory.create_model(14, true, silicon_like_tables);
    let again = factory.create_model(14, true, silicon_like_tables);
    assert!(Arc::ptr_eq(&first, &again));

    let void = factory.create_model(14, false, silicon_like_tables);
    assert!(matches!(*void, AtomicRelaxationModel::Void));
    assert!(!Arc::ptr_eq(&first, &void));

    let void_again = factory.create_model(14, false, silicon_like_tables);
    assert!(Arc::ptr_eq(&void, &void_again));

    let lead = factory.create_model(82, true, silicon_like_tables);
    assert!(!Arc::ptr_eq(&first, &lead));
}
