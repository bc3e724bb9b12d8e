use log::trace;
use ndarray::{ArrayD, ArrayViewD, Axis, Dimension, IxDyn};

use crate::pgm::common::config::DEFAULT_ZERO_MASS_EPSILON;
use crate::pgm::common::errors::{BayesError, Result};

use super::variable::Variable;

/// A non-negative table over the joint states of its scope.
///
/// Values are stored as an `ArrayD` with one axis per scope variable, in
/// scope order, so the flat row-major layout has the first variable as the
/// most significant digit. An empty scope is a scalar.
#[derive(Clone, Debug, PartialEq)]
pub struct Factor {
    scope: Vec<Variable>,
    values: ArrayD<f64>,
}

fn describe_scope(scope: &[Variable]) -> String {
    scope
        .iter()
        .map(|v| v.name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Factor {
    pub fn new(scope: Vec<Variable>, values: Vec<f64>) -> Result<Self> {
        for (i, variable) in scope.iter().enumerate() {
            if scope[..i].iter().any(|v| v.name() == variable.name()) {
                return Err(BayesError::DuplicateVariable(variable.name().to_string()));
            }
        }
        let shape: Vec<usize> = scope.iter().map(|v| v.cardinality()).collect();
        let expected: usize = shape.iter().product();
        if values.len() != expected {
            return Err(BayesError::ShapeMismatch {
                context: format!("factor over [{}]", describe_scope(&scope)),
                expected,
                actual: values.len(),
            });
        }
        // NaN fails the comparison as well
        if let Some((index, value)) = values.iter().enumerate().find(|(_, v)| !(**v >= 0.0)) {
            return Err(BayesError::NegativeValue {
                context: format!("factor over [{}]", describe_scope(&scope)),
                index,
                value: *value,
            });
        }
        let actual = values.len();
        let values = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|_| {
            BayesError::ShapeMismatch {
                context: format!("factor over [{}]", describe_scope(&scope)),
                expected,
                actual,
            }
        })?;
        Ok(Factor { scope, values })
    }

    /// A factor with an empty scope holding a single value.
    pub fn scalar(value: f64) -> Self {
        Factor {
            scope: Vec::new(),
            values: ArrayD::from_elem(IxDyn(&[]), value),
        }
    }

    /// Product of any number of factors; the empty product is the scalar 1.
    pub fn product_of<I>(factors: I) -> Result<Factor>
    where
        I: IntoIterator<Item = Factor>,
    {
        let mut iter = factors.into_iter();
        match iter.next() {
            Some(first) => iter.try_fold(first, |acc, f| acc.multiply(&f)),
            None => Ok(Factor::scalar(1.0)),
        }
    }

    pub fn scope(&self) -> &[Variable] {
        &self.scope
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.scope.iter().map(|v| v.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scope.iter().any(|v| v.name() == name)
    }

    pub fn is_scalar(&self) -> bool {
        self.scope.is_empty()
    }

    /// Number of entries in the table.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Entries in row-major scope order.
    pub fn values(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn sum(&self) -> f64 {
        self.values.sum()
    }

    fn axis_of(&self, name: &str) -> Result<usize> {
        self.scope
            .iter()
            .position(|v| v.name() == name)
            .ok_or_else(|| BayesError::VariableNotInScope {
                variable: name.to_string(),
                scope: describe_scope(&self.scope),
            })
    }

    /// View of the values laid out along `target`, with length-1 axes for
    /// target variables outside this factor's scope.
    fn aligned_view(&self, target: &[Variable]) -> ArrayViewD<'_, f64> {
        let mut placement: Vec<(usize, usize)> = self
            .scope
            .iter()
            .enumerate()
            .filter_map(|(axis, v)| {
                target
                    .iter()
                    .position(|t| t.name() == v.name())
                    .map(|position| (position, axis))
            })
            .collect();
        placement.sort_unstable();
        let permutation: Vec<usize> = placement.iter().map(|&(_, axis)| axis).collect();
        let mut view = self.values.view().permuted_axes(permutation);
        for (position, variable) in target.iter().enumerate() {
            if !self.contains(variable.name()) {
                view = view.insert_axis(Axis(position));
            }
        }
        view
    }

    /// Pointwise product over the union of both scopes.
    ///
    /// The result keeps this factor's variable order, followed by the
    /// variables only `other` mentions. A name shared by both scopes must
    /// carry the same states on each side.
    pub fn multiply(&self, other: &Factor) -> Result<Factor> {
        let mut scope = self.scope.clone();
        for variable in &other.scope {
            match self.scope.iter().find(|v| v.name() == variable.name()) {
                Some(mine) if mine != variable => {
                    return Err(BayesError::ConflictingVariable {
                        variable: variable.name().to_string(),
                        left: mine.states().to_vec(),
                        right: variable.states().to_vec(),
                    });
                }
                Some(_) => {}
                None => scope.push(variable.clone()),
            }
        }
        let lhs = self.aligned_view(&scope);
        let rhs = other.aligned_view(&scope);
        let values = &lhs * &rhs;
        trace!(
            "Factor::multiply - [{}] x [{}] -> [{}]",
            describe_scope(&self.scope),
            describe_scope(&other.scope),
            describe_scope(&scope)
        );
        Ok(Factor { scope, values })
    }

    /// Sums `name` out of the factor.
    pub fn marginalize(&self, name: &str) -> Result<Factor> {
        let axis = self.axis_of(name)?;
        let mut scope = self.scope.clone();
        scope.remove(axis);
        Ok(Factor {
            scope,
            values: self.values.sum_axis(Axis(axis)),
        })
    }

    /// Keeps only the slice where `name` is in state `state`, dropping that axis.
    pub fn reduce(&self, name: &str, state: usize) -> Result<Factor> {
        let axis = self.axis_of(name)?;
        let variable = &self.scope[axis];
        if state >= variable.cardinality() {
            return Err(BayesError::UnknownState {
                variable: name.to_string(),
                state: state.to_string(),
            });
        }
        let mut scope = self.scope.clone();
        scope.remove(axis);
        Ok(Factor {
            scope,
            values: self.values.index_axis(Axis(axis), state).to_owned(),
        })
    }

    pub fn normalize(&self) -> Result<Factor> {
        self.normalize_with(DEFAULT_ZERO_MASS_EPSILON)
    }

    pub fn normalize_with(&self, epsilon: f64) -> Result<Factor> {
        let total = self.sum();
        if !(total > epsilon) {
            return Err(BayesError::ZeroMassFactor(format!(
                "total mass {} over [{}]",
                total,
                describe_scope(&self.scope)
            )));
        }
        Ok(Factor {
            scope: self.scope.clone(),
            values: &self.values / total,
        })
    }

    /// Value at the given state indices, one per scope variable in scope order.
    pub fn value(&self, states: &[usize]) -> Result<f64> {
        if states.len() != self.scope.len() {
            return Err(BayesError::ShapeMismatch {
                context: format!("assignment for [{}]", describe_scope(&self.scope)),
                expected: self.scope.len(),
                actual: states.len(),
            });
        }
        for (variable, &state) in self.scope.iter().zip(states) {
            if state >= variable.cardinality() {
                return Err(BayesError::UnknownState {
                    variable: variable.name().to_string(),
                    state: state.to_string(),
                });
            }
        }
        Ok(self.values[IxDyn(states)])
    }

    /// Value at a labelled assignment. Every scope variable must appear exactly once;
    /// the order of the pairs does not matter.
    pub fn probability(&self, assignment: &[(&str, &str)]) -> Result<f64> {
        if assignment.len() != self.scope.len() {
            return Err(BayesError::ShapeMismatch {
                context: format!("assignment for [{}]", describe_scope(&self.scope)),
                expected: self.scope.len(),
                actual: assignment.len(),
            });
        }
        let mut states = vec![usize::MAX; self.scope.len()];
        for (name, label) in assignment {
            let axis = self.axis_of(name)?;
            states[axis] = self.scope[axis].state_index(label)?;
        }
        if let Some(axis) = states.iter().position(|s| *s == usize::MAX) {
            return Err(BayesError::UnknownState {
                variable: self.scope[axis].name().to_string(),
                state: "<missing>".to_string(),
            });
        }
        self.value(&states)
    }

    /// Every joint assignment as state labels in scope order, with its value.
    pub fn assignments(&self) -> impl Iterator<Item = (Vec<&str>, f64)> + '_ {
        self.values.indexed_iter().map(move |(index, value)| {
            let labels = self
                .scope
                .iter()
                .enumerate()
                .map(|(axis, v)| v.states()[index[axis]].as_str())
                .collect();
            (labels, *value)
        })
    }

    /// Largest entry and its state indices. Ties go to the first entry in row-major order.
    pub fn argmax(&self) -> (Vec<usize>, f64) {
        let mut best: Option<(Vec<usize>, f64)> = None;
        for (index, value) in self.values.indexed_iter() {
            let better = match &best {
                Some((_, current)) => *value > *current,
                None => true,
            };
            if better {
                best = Some((index.slice().to_vec(), *value));
            }
        }
        best.unwrap_or_else(|| (Vec::new(), 0.0))
    }

    /// Same factor with its axes permuted into `order`, which must name every
    /// scope variable exactly once.
    pub fn reorder(&self, order: &[&str]) -> Result<Factor> {
        if order.len() != self.scope.len() {
            return Err(BayesError::ShapeMismatch {
                context: format!("reordering of [{}]", describe_scope(&self.scope)),
                expected: self.scope.len(),
                actual: order.len(),
            });
        }
        let mut permutation = Vec::with_capacity(order.len());
        for name in order {
            let axis = self.axis_of(name)?;
            if permutation.contains(&axis) {
                return Err(BayesError::DuplicateVariable(name.to_string()));
            }
            permutation.push(axis);
        }
        let scope = permutation.iter().map(|&a| self.scope[a].clone()).collect();
        let values = self
            .values
            .view()
            .permuted_axes(permutation)
            .as_standard_layout()
            .into_owned();
        Ok(Factor { scope, values })
    }

    /// True when both factors cover the same variables and agree entrywise
    /// within `tolerance`, regardless of axis order.
    pub fn approx_eq(&self, other: &Factor, tolerance: f64) -> bool {
        if self.scope.len() != other.scope.len() {
            return false;
        }
        if self
            .scope
            .iter()
            .any(|v| other.scope.iter().all(|o| o != v))
        {
            return false;
        }
        let aligned = match other.reorder(&self.variable_names()) {
            Ok(aligned) => aligned,
            Err(_) => return false,
        };
        self.values
            .iter()
            .zip(aligned.values.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}
