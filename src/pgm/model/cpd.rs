use log::trace;

use crate::pgm::common::config::DEFAULT_NORMALIZATION_TOLERANCE;
use crate::pgm::common::errors::{BayesError, Result};

use super::factor::Factor;
use super::variable::Variable;

/// P(child | parents) stored as a factor over `[child, parents...]`.
///
/// Tables are given the pgmpy way: one row per child state, one column per
/// parent assignment, with the first parent varying slowest across columns.
#[derive(Clone, Debug, PartialEq)]
pub struct TabularCpd {
    factor: Factor,
}

impl TabularCpd {
    pub fn new(child: &Variable, parents: &[&Variable], rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::with_tolerance(child, parents, rows, DEFAULT_NORMALIZATION_TOLERANCE)
    }

    pub fn with_tolerance(
        child: &Variable,
        parents: &[&Variable],
        rows: Vec<Vec<f64>>,
        tolerance: f64,
    ) -> Result<Self> {
        trace!(
            "TabularCpd::new - {} | {:?}",
            child.name(),
            parents.iter().map(|p| p.name()).collect::<Vec<_>>()
        );
        let columns: usize = parents.iter().map(|p| p.cardinality()).product();
        if rows.len() != child.cardinality() {
            return Err(BayesError::ShapeMismatch {
                context: format!("rows of the CPD for '{}'", child.name()),
                expected: child.cardinality(),
                actual: rows.len(),
            });
        }
        if let Some(row) = rows.iter().find(|row| row.len() != columns) {
            return Err(BayesError::ShapeMismatch {
                context: format!("columns of the CPD for '{}'", child.name()),
                expected: columns,
                actual: row.len(),
            });
        }
        let mut scope = Vec::with_capacity(parents.len() + 1);
        scope.push(child.clone());
        scope.extend(parents.iter().map(|p| (*p).clone()));
        let factor = Factor::new(scope, rows.into_iter().flatten().collect())?;
        let cpd = TabularCpd { factor };
        cpd.check_normalized(tolerance)?;
        Ok(cpd)
    }

    /// Marginal distribution of a parentless variable.
    pub fn prior(variable: &Variable, probabilities: &[f64]) -> Result<Self> {
        let rows = probabilities.iter().map(|p| vec![*p]).collect();
        Self::new(variable, &[], rows)
    }

    pub fn child_variable(&self) -> &Variable {
        &self.factor.scope()[0]
    }

    pub fn parent_variables(&self) -> &[Variable] {
        &self.factor.scope()[1..]
    }

    pub fn as_factor(&self) -> &Factor {
        &self.factor
    }

    pub fn into_factor(self) -> Factor {
        self.factor
    }

    /// P(child = `child_state` | parents = `parent_states`), parents in CPD order.
    pub fn probability(&self, child_state: &str, parent_states: &[&str]) -> Result<f64> {
        let parents = self.parent_variables();
        if parent_states.len() != parents.len() {
            return Err(BayesError::ShapeMismatch {
                context: format!("parent assignment of the CPD for '{}'", self.child_variable()),
                expected: parents.len(),
                actual: parent_states.len(),
            });
        }
        let mut states = vec![self.child_variable().state_index(child_state)?];
        for (parent, label) in parents.iter().zip(parent_states) {
            states.push(parent.state_index(label)?);
        }
        self.factor.value(&states)
    }

    /// Table in pgmpy layout: `rows[child_state][parent_column]`.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        let values = self.factor.values();
        let columns = values.len() / self.child_variable().cardinality();
        values.chunks(columns).map(|row| row.to_vec()).collect()
    }

    /// Sum over child states for each parent column.
    pub fn column_sums(&self) -> Vec<f64> {
        let rows = self.rows();
        let columns = rows.first().map(|r| r.len()).unwrap_or(0);
        (0..columns)
            .map(|column| rows.iter().map(|row| row[column]).sum())
            .collect()
    }

    pub fn check_normalized(&self, tolerance: f64) -> Result<()> {
        for (column, sum) in self.column_sums().into_iter().enumerate() {
            if !((sum - 1.0).abs() <= tolerance) {
                return Err(BayesError::UnnormalizedCpd {
                    variable: self.child_variable().name().to_string(),
                    assignment: self.describe_column(column),
                    sum,
                });
            }
        }
        Ok(())
    }

    /// Labels of the parent assignment behind a column index, e.g. `A=x, B=y`.
    fn describe_column(&self, mut column: usize) -> String {
        let parents = self.parent_variables();
        let mut labels = vec![""; parents.len()];
        for (slot, parent) in parents.iter().enumerate().rev() {
            let card = parent.cardinality();
            labels[slot] = parent.states()[column % card].as_str();
            column /= card;
        }
        parents
            .iter()
            .zip(labels)
            .map(|(p, label)| format!("{}={}", p.name(), label))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<TabularCpd> for Factor {
    fn from(cpd: TabularCpd) -> Factor {
        cpd.factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pgm::model::variable::VariableRegistry;

    #[test]
    fn columns_follow_first_parent_major_order() {
        let mut registry = VariableRegistry::new();
        let v = registry.define_binary("SystemVulnerability", "High", "Low").unwrap();
        let t = registry.define_binary("ExternalThreat", "Internal", "External").unwrap();
        let b = registry.define_binary("DataBreach", "Yes", "No").unwrap();
        let cpd = TabularCpd::new(
            &b,
            &[&v, &t],
            vec![vec![0.01, 0.1, 0.4, 0.9], vec![0.99, 0.9, 0.6, 0.1]],
        )
        .unwrap();
        assert_eq!(cpd.probability("Yes", &["Low", "Internal"]).unwrap(), 0.4);
        assert_eq!(cpd.probability("No", &["High", "External"]).unwrap(), 0.9);
        assert_eq!(cpd.parent_variables().len(), 2);
        for sum in cpd.column_sums() {
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn unnormalized_column_is_named() {
        let mut registry = VariableRegistry::new();
        let s = registry.define_binary("SecurityMeasures", "Strong", "Weak").unwrap();
        let v = registry.define_binary("SystemVulnerability", "High", "Low").unwrap();
        let err = TabularCpd::new(&v, &[&s], vec![vec![0.1, 0.9], vec![0.9, 0.2]]).unwrap_err();
        match err {
            BayesError::UnnormalizedCpd { variable, assignment, sum } => {
                assert_eq!(variable, "SystemVulnerability");
                assert_eq!(assignment, "SecurityMeasures=Weak");
                assert!((sum - 1.1).abs() < 1e-12);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn shape_is_checked_before_normalization() {
        let mut registry = VariableRegistry::new();
        let s = registry.define_binary("S", "a", "b").unwrap();
        let v = registry.define_binary("V", "x", "y").unwrap();
        let err = TabularCpd::new(&v, &[&s], vec![vec![0.5], vec![0.5]]).unwrap_err();
        assert!(matches!(err, BayesError::ShapeMismatch { expected: 2, actual: 1, .. }));
        let err = TabularCpd::prior(&v, &[0.5, 0.3, 0.2]).unwrap_err();
        assert!(matches!(err, BayesError::ShapeMismatch { expected: 2, actual: 3, .. }));
        assert!(TabularCpd::prior(&v, &[0.7, 0.3]).is_ok());
    }
}
