use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet};

use crate::pgm::common::config::EngineConfig;
use crate::pgm::common::errors::{BayesError, Result};
use crate::pgm::model::bayesian_model::BayesianModel;
use crate::pgm::model::factor::Factor;
use crate::pgm::model::variable::VarId;

use super::evidence::{Evidence, Query};
use super::ordering::{InteractionGraph, greedy_order, induced_width};

/// Exact inference by summing variables out of the product of CPDs.
///
/// The engine only borrows the model. Each call builds its own working set
/// of factors, so one model can answer queries from several threads at once.
pub struct VariableElimination<'a> {
    model: &'a BayesianModel,
    config: EngineConfig,
}

/// Targets and evidence resolved against the model, plus the reduced factors.
struct WorkingSet {
    targets: Vec<VarId>,
    factors: Vec<Factor>,
}

impl<'a> VariableElimination<'a> {
    pub fn new(model: &'a BayesianModel) -> Self {
        VariableElimination {
            model,
            config: EngineConfig::default(),
        }
    }

    /// Engine with custom tolerances and switches; rejects tolerances that
    /// are not finite and positive.
    pub fn with_config(model: &'a BayesianModel, config: EngineConfig) -> Result<Self> {
        config.check()?;
        Ok(VariableElimination { model, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Normalized joint distribution of `targets` given `evidence`, with the
    /// result's scope in the order the targets were given.
    pub fn query(&self, targets: &[&str], evidence: &Evidence) -> Result<Factor> {
        trace!("VariableElimination::query - Start: {:?} given {}", targets, evidence);
        let working = self.prepare(targets, evidence)?;
        let order = self.greedy(&working)?;
        let result = self.finish(working, &order, evidence)?;
        trace!("VariableElimination::query - End");
        Ok(result)
    }

    pub fn run_query(&self, query: &Query) -> Result<Factor> {
        self.query(&query.target_names(), &query.evidence)
    }

    /// Same as `query`, summing out variables in exactly the given order.
    ///
    /// `order` must list every variable that is neither a target nor observed,
    /// each once. Variables dropped by barren-node pruning are skipped.
    pub fn query_with_order(
        &self,
        targets: &[&str],
        evidence: &Evidence,
        order: &[&str],
    ) -> Result<Factor> {
        let working = self.prepare(targets, evidence)?;
        let order = self.explicit(&working, evidence, order)?;
        self.finish(working, &order, evidence)
    }

    /// One normalized marginal per target, in target order.
    pub fn query_marginals(&self, targets: &[&str], evidence: &Evidence) -> Result<Vec<Factor>> {
        let joint = self.query(targets, evidence)?;
        let names = joint.variable_names();
        let mut marginals = Vec::with_capacity(names.len());
        for keep in &names {
            let mut marginal = joint.clone();
            for other in names.iter().filter(|n| *n != keep) {
                marginal = marginal.marginalize(other)?;
            }
            marginals.push(marginal);
        }
        Ok(marginals)
    }

    /// Most probable joint assignment of `targets` given `evidence`.
    pub fn map_query(
        &self,
        targets: &[&str],
        evidence: &Evidence,
    ) -> Result<BTreeMap<String, String>> {
        let joint = self.query(targets, evidence)?;
        let (states, probability) = joint.argmax();
        debug!("VariableElimination::map_query - best assignment has p={}", probability);
        joint
            .scope()
            .iter()
            .zip(states)
            .map(|(variable, state)| {
                Ok((
                    variable.name().to_string(),
                    variable.state_label(state)?.to_string(),
                ))
            })
            .collect()
    }

    /// Unnormalized probability of the evidence under the model. Impossible
    /// evidence has probability zero rather than failing.
    pub fn probability_of_evidence(&self, evidence: &Evidence) -> Result<f64> {
        self.ensure_validated()?;
        let observed = evidence.resolve(self.model)?;
        let factors = match self.reduced_factors(&[], &observed) {
            Ok(factors) => factors,
            Err(BayesError::ZeroMassFactor(reason)) => {
                debug!("VariableElimination::probability_of_evidence - {}", reason);
                return Ok(0.0);
            }
            Err(e) => return Err(e),
        };
        let working = WorkingSet {
            targets: Vec::new(),
            factors,
        };
        let order = self.greedy(&working)?;
        let remaining = self.sum_out(working.factors, &order)?;
        Ok(Factor::product_of(remaining)?.sum())
    }

    /// The order `query` would sum variables out in, by name.
    pub fn elimination_order(&self, targets: &[&str], evidence: &Evidence) -> Result<Vec<String>> {
        let working = self.prepare(targets, evidence)?;
        let order = self.greedy(&working)?;
        Ok(order
            .into_iter()
            .map(|id| self.model.registry().by_id(id).name().to_string())
            .collect())
    }

    /// Induced width of the moral graph when eliminating every variable in `order`.
    pub fn induced_width(&self, order: &[&str]) -> Result<usize> {
        let ids = self.resolve_order(order)?;
        let everything: BTreeSet<VarId> = self.model.registry().iter().map(|(id, _)| id).collect();
        let listed: BTreeSet<VarId> = ids.iter().copied().collect();
        if listed != everything {
            return Err(BayesError::InvalidEliminationOrder(format!(
                "expected all {} variables, got {}",
                everything.len(),
                ids.len()
            )));
        }
        let mut graph = InteractionGraph::new();
        let structure = self.model.structure();
        for (id, variable) in self.model.registry().iter() {
            let mut scope = vec![(id, variable.cardinality())];
            for parent in structure.parent_ids(id) {
                scope.push((*parent, self.model.registry().by_id(*parent).cardinality()));
            }
            graph.add_scope(&scope);
        }
        Ok(induced_width(graph, &ids))
    }

    fn ensure_validated(&self) -> Result<()> {
        if self.model.is_validated() {
            Ok(())
        } else {
            Err(BayesError::ModelNotValidated)
        }
    }

    fn prepare(&self, targets: &[&str], evidence: &Evidence) -> Result<WorkingSet> {
        self.ensure_validated()?;
        if targets.is_empty() {
            return Err(BayesError::EmptyQuery);
        }
        let observed = evidence.resolve(self.model)?;
        let mut target_ids = Vec::with_capacity(targets.len());
        for name in targets {
            let id = self.model.id_of(name)?;
            if observed.contains_key(&id) {
                return Err(BayesError::EvidenceOverlapsTarget(name.to_string()));
            }
            if !target_ids.contains(&id) {
                target_ids.push(id);
            }
        }
        let factors = self.reduced_factors(&target_ids, &observed)?;
        Ok(WorkingSet {
            targets: target_ids,
            factors,
        })
    }

    /// CPDs of the relevant variables with every observed variable pinned.
    fn reduced_factors(
        &self,
        targets: &[VarId],
        observed: &BTreeMap<VarId, usize>,
    ) -> Result<Vec<Factor>> {
        let relevant: BTreeSet<VarId> = if self.config.prune_barren_nodes {
            let seeds = targets.iter().copied().chain(observed.keys().copied());
            self.model.structure().ancestral_set(seeds)
        } else {
            self.model.registry().iter().map(|(id, _)| id).collect()
        };
        debug!(
            "VariableElimination::reduced_factors - {} of {} CPDs relevant",
            relevant.len(),
            self.model.len()
        );
        let mut factors = Vec::with_capacity(relevant.len());
        for id in relevant {
            let cpd = self.model.cpd_by_id(id).ok_or_else(|| {
                BayesError::MissingCpd(self.model.registry().by_id(id).name().to_string())
            })?;
            let mut factor = cpd.as_factor().clone();
            let mut pinned = false;
            for variable in cpd.as_factor().scope() {
                let scoped = self.model.id_of(variable.name())?;
                if let Some(&state) = observed.get(&scoped) {
                    factor = factor.reduce(variable.name(), state)?;
                    pinned = true;
                }
            }
            if pinned && !(factor.sum() > self.config.zero_mass_epsilon) {
                return Err(BayesError::ZeroMassFactor(format!(
                    "evidence has no support in the CPD of '{}'",
                    cpd.child_variable().name()
                )));
            }
            factors.push(factor);
        }
        Ok(factors)
    }

    /// Variables to eliminate: everything left in a factor scope except the targets.
    fn candidates(&self, working: &WorkingSet) -> Result<(InteractionGraph, BTreeSet<VarId>)> {
        let mut graph = InteractionGraph::new();
        let mut candidates = BTreeSet::new();
        for factor in &working.factors {
            let mut scope = Vec::with_capacity(factor.scope().len());
            for variable in factor.scope() {
                let id = self.model.id_of(variable.name())?;
                scope.push((id, variable.cardinality()));
                if !working.targets.contains(&id) {
                    candidates.insert(id);
                }
            }
            graph.add_scope(&scope);
        }
        Ok((graph, candidates))
    }

    fn greedy(&self, working: &WorkingSet) -> Result<Vec<VarId>> {
        let (graph, candidates) = self.candidates(working)?;
        Ok(greedy_order(graph, &candidates, self.config.heuristic))
    }

    fn resolve_order(&self, order: &[&str]) -> Result<Vec<VarId>> {
        let mut ids = Vec::with_capacity(order.len());
        for name in order {
            let id = self.model.id_of(name)?;
            if ids.contains(&id) {
                return Err(BayesError::InvalidEliminationOrder(format!(
                    "'{}' is listed twice",
                    name
                )));
            }
            ids.push(id);
        }
        Ok(ids)
    }

    fn explicit(&self, working: &WorkingSet, evidence: &Evidence, order: &[&str]) -> Result<Vec<VarId>> {
        let ids = self.resolve_order(order)?;
        let registry = self.model.registry();
        for (id, variable) in registry.iter() {
            let hidden = !working.targets.contains(&id) && !evidence.contains(variable.name());
            if hidden != ids.contains(&id) {
                return Err(BayesError::InvalidEliminationOrder(format!(
                    "'{}' must {}be eliminated",
                    variable.name(),
                    if hidden { "" } else { "not " }
                )));
            }
        }
        let (_, candidates) = self.candidates(working)?;
        Ok(ids.into_iter().filter(|id| candidates.contains(id)).collect())
    }

    fn sum_out(&self, mut factors: Vec<Factor>, order: &[VarId]) -> Result<Vec<Factor>> {
        for id in order {
            let name = self.model.registry().by_id(*id).name();
            let (gathered, rest): (Vec<Factor>, Vec<Factor>) =
                factors.into_iter().partition(|f| f.contains(name));
            factors = rest;
            if gathered.is_empty() {
                continue;
            }
            debug!(
                "VariableElimination::sum_out - {} from {} factors",
                name,
                gathered.len()
            );
            let combined = Factor::product_of(gathered)?;
            factors.push(combined.marginalize(name)?);
        }
        Ok(factors)
    }

    fn finish(&self, working: WorkingSet, order: &[VarId], evidence: &Evidence) -> Result<Factor> {
        let names: Vec<&str> = working
            .targets
            .iter()
            .map(|id| self.model.registry().by_id(*id).name())
            .collect();
        let remaining = self.sum_out(working.factors, order)?;
        let joint = Factor::product_of(remaining)?.reorder(&names)?;
        joint
            .normalize_with(self.config.zero_mass_epsilon)
            .map_err(|_| {
                BayesError::ZeroMassFactor(format!(
                    "evidence {} is impossible under the model",
                    evidence
                ))
            })
    }
}

/// Runs a single query with the default configuration.
pub fn query(model: &BayesianModel, targets: &[&str], evidence: &Evidence) -> Result<Factor> {
    VariableElimination::new(model).query(targets, evidence)
}
