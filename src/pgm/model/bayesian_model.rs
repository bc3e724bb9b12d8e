use log::{info, trace};
use std::collections::BTreeSet;

use crate::pgm::common::config::EngineConfig;
use crate::pgm::common::errors::{BayesError, Result};

use super::cpd::TabularCpd;
use super::structure::NetworkStructure;
use super::variable::{VarId, Variable, VariableRegistry};

/// A network structure with one CPD per variable.
///
/// A model is assembled with `build` and becomes usable for inference only
/// after `validate` succeeds. There is no way to mutate it afterwards, so a
/// validated model can be shared read-only between threads.
#[derive(Clone, Debug)]
pub struct BayesianModel {
    structure: NetworkStructure,
    /// Indexed by `VarId`.
    cpds: Vec<Option<TabularCpd>>,
    validated: bool,
}

impl BayesianModel {
    /// Attaches CPDs to a structure. Only checks that can be decided per CPD
    /// happen here; coverage and parent sets are left to `validate`.
    pub fn build(structure: NetworkStructure, cpds: Vec<TabularCpd>) -> Result<Self> {
        let registry = structure.registry();
        let mut slots: Vec<Option<TabularCpd>> = vec![None; registry.len()];
        for cpd in cpds {
            let child = registry.id_of(cpd.child_variable().name())?;
            for parent in cpd.parent_variables() {
                registry.id_of(parent.name())?;
            }
            if slots[child.0].is_some() {
                return Err(BayesError::DuplicateCpd(cpd.child_variable().name().to_string()));
            }
            slots[child.0] = Some(cpd);
        }
        Ok(BayesianModel {
            structure,
            cpds: slots,
            validated: false,
        })
    }

    pub fn validate(self) -> Result<Self> {
        self.validate_with(&EngineConfig::default())
    }

    /// Checks acyclicity, CPD coverage, state labels, parent sets and
    /// normalization, in that order, walking variables in declaration order.
    pub fn validate_with(mut self, config: &EngineConfig) -> Result<Self> {
        trace!("BayesianModel::validate - Start");
        config.check()?;
        self.structure.topological_order()?;
        let registry = self.structure.registry();
        for (id, variable) in registry.iter() {
            let cpd = self.cpds[id.0]
                .as_ref()
                .ok_or_else(|| BayesError::MissingCpd(variable.name().to_string()))?;
            for scoped in cpd.as_factor().scope() {
                let registered = registry.get(scoped.name())?;
                if registered != scoped {
                    return Err(BayesError::StateMismatch {
                        variable: scoped.name().to_string(),
                        registry: registered.states().to_vec(),
                        cpd: scoped.states().to_vec(),
                    });
                }
            }
            let cpd_parents = cpd
                .parent_variables()
                .iter()
                .map(|p| registry.id_of(p.name()))
                .collect::<Result<BTreeSet<VarId>>>()?;
            let structural = self.structure.parent_ids(id);
            if &cpd_parents != structural {
                return Err(BayesError::ParentMismatch {
                    variable: variable.name().to_string(),
                    structure: structural
                        .iter()
                        .map(|p| registry.by_id(*p).name().to_string())
                        .collect(),
                    cpd: cpd
                        .parent_variables()
                        .iter()
                        .map(|p| p.name().to_string())
                        .collect(),
                });
            }
            cpd.check_normalized(config.normalization_tolerance)?;
        }
        info!(
            "BayesianModel::validate - {} variables, {} edges",
            registry.len(),
            self.structure.edge_count()
        );
        self.validated = true;
        Ok(self)
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub fn structure(&self) -> &NetworkStructure {
        &self.structure
    }

    pub fn registry(&self) -> &VariableRegistry {
        self.structure.registry()
    }

    pub fn id_of(&self, name: &str) -> Result<VarId> {
        self.registry().id_of(name)
    }

    pub fn variable(&self, name: &str) -> Result<&Variable> {
        self.registry().get(name)
    }

    /// Variables in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.registry().iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.registry().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry().is_empty()
    }

    pub fn cpd(&self, name: &str) -> Result<&TabularCpd> {
        let id = self.id_of(name)?;
        self.cpd_by_id(id)
            .ok_or_else(|| BayesError::MissingCpd(name.to_string()))
    }

    pub fn cpd_by_id(&self, id: VarId) -> Option<&TabularCpd> {
        self.cpds.get(id.0).and_then(|c| c.as_ref())
    }

    /// Attached CPDs in declaration order of their child.
    pub fn cpds(&self) -> impl Iterator<Item = &TabularCpd> {
        self.cpds.iter().flatten()
    }
}
