// Atomic relaxation.
//
// An ionized subshell relaxes through tabulated transitions. A radiative
// transition emits a fluorescence photon and moves the vacancy to the
// filling shell; a non-radiative transition emits an Auger electron and
// leaves vacancies in both the filling and ejected shells. The cascade
// recurses depth-first until a vacancy lands in a shell with no transition
// table. Each emission is isotropic and costs exactly three stream draws:
// transition selection, polar cosine, azimuthal angle.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::bank::ParticleBank;
use crate::particle::{ParticleState, ParticleType};
use crate::physics::sample_isotropic_direction;
use crate::rng::RandomStream;

/// ENDF subshell designator (K = 1, L1 = 2, L2 = 3, L3 = 4, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subshell(pub u32);

impl Subshell {
    pub const K: Subshell = Subshell(1);
    pub const L1: Subshell = Subshell(2);
    pub const L2: Subshell = Subshell(3);
    pub const L3: Subshell = Subshell(4);
    pub const M1: Subshell = Subshell(5);
    pub const M2: Subshell = Subshell(6);
    pub const M3: Subshell = Subshell(7);
    pub const M4: Subshell = Subshell(8);
    pub const M5: Subshell = Subshell(9);

    pub fn label(&self) -> &'static str {
        static LABELS: Lazy<HashMap<u32, &'static str>> = Lazy::new(|| {
            HashMap::from([
                (1, "K"),
                (2, "L1"),
                (3, "L2"),
                (4, "L3"),
                (5, "M1"),
                (6, "M2"),
                (7, "M3"),
                (8, "M4"),
                (9, "M5"),
                (10, "N1"),
                (11, "N2"),
                (12, "N3"),
                (13, "N4"),
                (14, "N5"),
                (15, "N6"),
                (16, "N7"),
            ])
        });
        LABELS.get(&self.0).copied().unwrap_or("unknown")
    }
}

/// One way a vacancy can be filled.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelaxationTransition {
    /// Shell the filling electron drops from; it inherits the vacancy.
    pub filling_shell: Subshell,
    /// Shell the Auger electron is ejected from; `None` for a radiative
    /// (fluorescence) transition.
    pub ejected_shell: Option<Subshell>,
    /// Energy of the emitted photon or electron in MeV.
    pub emitted_energy: f64,
    /// Running selection probability; the last transition's value is 1.
    pub cumulative_probability: f64,
}

/// All transitions filling one subshell.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubshellRelaxationTable {
    pub subshell: Subshell,
    pub transitions: Vec<RelaxationTransition>,
}

impl SubshellRelaxationTable {
    /// Select a transition at a fixed random number.
    fn select(&self, random_number: f64) -> &RelaxationTransition {
        self.transitions
            .iter()
            .find(|t| random_number < t.cumulative_probability)
            .unwrap_or(&self.transitions[self.transitions.len() - 1])
    }
}

#[derive(Clone, Debug)]
pub enum AtomicRelaxationModel {
    /// No relaxation data: vacancies are abandoned and nothing is emitted.
    Void,
    Detailed {
        tables: HashMap<Subshell, SubshellRelaxationTable>,
    },
}

impl AtomicRelaxationModel {
    pub fn detailed(tables: Vec<SubshellRelaxationTable>) -> Self {
        Self::Detailed {
            tables: tables.into_iter().map(|t| (t.subshell, t)).collect(),
        }
    }

    /// Relax the atom left by `particle`, banking every emitted photon and
    /// electron at the particle's position.
    pub fn relax_atom<S: RandomStream>(
        &self,
        vacancy_shell: Subshell,
        particle: &ParticleState,
        bank: &mut ParticleBank,
        stream: &mut S,
    ) {
        let tables = match self {
            AtomicRelaxationModel::Void => return,
            AtomicRelaxationModel::Detailed { tables } => tables,
        };

        Self::relax_vacancy(tables, vacancy_shell, particle, bank, stream);
    }

    fn relax_vacancy<S: RandomStream>(
        tables: &HashMap<Subshell, SubshellRelaxationTable>,
        vacancy_shell: Subshell,
        particle: &ParticleState,
        bank: &mut ParticleBank,
        stream: &mut S,
    ) {
        let table = match tables.get(&vacancy_shell) {
            Some(table) if !table.transitions.is_empty() => table,
            _ => {
                log::trace!(
                    "no transition data for {} vacancy, cascade ends",
                    vacancy_shell.label()
                );
                return;
            }
        };

        let transition = table.select(stream.sample());

        let particle_type = if transition.ejected_shell.is_some() {
            ParticleType::Electron
        } else {
            ParticleType::Photon
        };
        let mut emitted =
            ParticleState::spawn_from(particle, particle_type, transition.emitted_energy);
        emitted.direction = sample_isotropic_direction(stream);
        bank.push(emitted);

        // The filling shell's vacancy relaxes first, then the ejected one
        Self::relax_vacancy(tables, transition.filling_shell, particle, bank, stream);
        if let Some(ejected) = transition.ejected_shell {
            Self::relax_vacancy(tables, ejected, particle, bank, stream);
        }
    }
}

/// Builds relaxation models, sharing one model per data source.
///
/// The cache key is the pair (data source id, detailed flag), so the void
/// and detailed models of the same source coexist and repeated requests
/// return the same allocation.
#[derive(Debug, Default)]
pub struct AtomicRelaxationModelFactory {
    cache: HashMap<(u32, bool), Arc<AtomicRelaxationModel>>,
}

impl AtomicRelaxationModelFactory {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Fetch or build the model for a data source. `tables` is only
    /// consulted on a cache miss with `detailed` set.
    pub fn create_model<F>(
        &mut self,
        source_id: u32,
        detailed: bool,
        tables: F,
    ) -> Arc<AtomicRelaxationModel>
    where
        F: FnOnce() -> Vec<SubshellRelaxationTable>,
    {
        self.cache
            .entry((source_id, detailed))
            .or_insert_with(|| {
                log::debug!(
                    "building {} relaxation model for source {}",
                    if detailed { "detailed" } else { "void" },
                    source_id
                );
                if detailed {
                    Arc::new(AtomicRelaxationModel::detailed(tables()))
                } else {
                    Arc::new(AtomicRelaxationModel::Void)
                }
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::FakeStream;
    use approx::assert_relative_eq;

    fn radiative(filling: Subshell, energy: f64, cumulative: f64) -> RelaxationTransition {
        RelaxationTransition {
            filling_shell: filling,
            ejected_shell: None,
            emitted_energy: energy,
            cumulative_probability: cumulative,
        }
    }

    fn tables() -> Vec<SubshellRelaxationTable> {
        vec![
            SubshellRelaxationTable {
                subshell: Subshell::K,
                transitions: vec![
                    radiative(Subshell::L2, 1.0e-2, 0.95),
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
                    radiative(Subshell::M2, 1.584170000000e-2, 0.6),
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
                transitions: vec![radiative(Subshell::M3, 1.523590000000e-2, 1.0)],
            },
        ]
    }

    #[test]
    fn test_subshell_labels() {
        assert_eq!(Subshell::K.label(), "K");
        assert_eq!(Subshell::L3.label(), "L3");
        assert_eq!(Subshell(99).label(), "unknown");
    }

    #[test]
    fn test_k_shell_cascade() {
        let model = AtomicRelaxationModel::detailed(tables());
        let parent = ParticleState::new(ParticleType::Photon, 0);
        let mut bank = ParticleBank::new();
        // Three draws per emission: selection, polar cosine, azimuthal
        let mut stream = FakeStream::new(vec![
            0.966, 0.5, 0.5, // K: Auger L1-L2
            0.09809, 0.5, 0.5, // L1: radiative
            0.40361, 0.5, 0.5, // L2: radiative
        ]);

        model.relax_atom(Subshell::K, &parent, &mut bank, &mut stream);

        assert_eq!(bank.len(), 3);
        let auger = bank.pop().unwrap();
        assert_eq!(auger.particle_type, ParticleType::Electron);
        assert_eq!(auger.energy, 5.71919999999999998e-2);
        assert_relative_eq!(auger.direction[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(auger.direction[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(auger.direction[2], 0.0, epsilon = 1e-12);

        let photon_1 = bank.pop().unwrap();
        assert_eq!(photon_1.particle_type, ParticleType::Photon);
        assert_eq!(photon_1.energy, 1.584170000000e-2);

        let photon_2 = bank.pop().unwrap();
        assert_eq!(photon_2.particle_type, ParticleType::Photon);
        assert_eq!(photon_2.energy, 1.523590000000e-2);

        assert_eq!(stream.draws(), 9);
    }

    #[test]
    fn test_cascade_stops_without_table() {
        let model = AtomicRelaxationModel::detailed(tables());
        let parent = ParticleState::new(ParticleType::Photon, 0);
        let mut bank = ParticleBank::new();
        // No table for M3
        let mut stream = FakeStream::new(vec![0.5]);

        model.relax_atom(Subshell::M3, &parent, &mut bank, &mut stream);
        assert!(bank.is_empty());
        assert_eq!(stream.draws(), 0);
    }

    #[test]
    fn test_void_model_emits_nothing() {
        let model = AtomicRelaxationModel::Void;
        let parent = ParticleState::new(ParticleType::Photon, 0);
        let mut bank = ParticleBank::new();
        let mut stream = FakeStream::new(vec![0.5]);

        model.relax_atom(Subshell::K, &parent, &mut bank, &mut stream);
        assert!(bank.is_empty());
        assert_eq!(stream.draws(), 0);
    }

    #[test]
    fn test_factory_shares_models() {
        let mut factory = AtomicRelaxationModelFactory::new();
        let a = factory.create_model(14, true, tables);
        let b = factory.create_model(14, true, tables);
        assert!(Arc::ptr_eq(&a, &b));

        let void = factory.create_model(14, false, tables);
        assert!(!Arc::ptr_eq(&a, &void));
        assert!(matches!(*void, AtomicRelaxationModel::Void));

        let other = factory.create_model(82, true, tables);
        assert!(!Arc::ptr_eq(&a, &other));
    }
}
