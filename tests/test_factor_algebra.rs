#[cfg(test)]
mod test_factor_algebra {
    use bayesnet::pgm::common::errors::BayesError;
    use bayesnet::pgm::model::{Factor, Variable, VariableRegistry};

    fn variables() -> Vec<Variable> {
        let mut registry = VariableRegistry::new();
        vec![
            registry.define_binary("A", "a0", "a1").unwrap(),
            registry.define_variable("B", &["b0", "b1", "b2"]).unwrap(),
            registry.define_binary("C", "c0", "c1").unwrap(),
            registry.define_binary("D", "d0", "d1").unwrap(),
        ]
    }

    fn factor(scope: &[&Variable], seed: f64) -> Factor {
        let size: usize = scope.iter().map(|v| v.cardinality()).product();
        let values = (0..size).map(|i| 0.1 + ((i as f64 + seed) * 0.37) % 1.0).collect();
        Factor::new(scope.iter().map(|v| (*v).clone()).collect(), values).unwrap()
    }

    #[test]
    fn test_product_is_commutative_and_associative() {
        let v = variables();
        let ab = factor(&[&v[0], &v[1]], 1.0);
        let bc = factor(&[&v[1], &v[2]], 2.0);
        let cd = factor(&[&v[2], &v[3]], 3.0);

        let left = ab.multiply(&bc).unwrap().multiply(&cd).unwrap();
        let right = ab.multiply(&bc.multiply(&cd).unwrap()).unwrap();
        let shuffled = Factor::product_of(vec![cd.clone(), ab.clone(), bc.clone()]).unwrap();
        assert!(left.approx_eq(&right, 1e-12));
        assert!(left.approx_eq(&shuffled, 1e-12));
        assert_eq!(left.variable_names(), vec!["A", "B", "C", "D"]);
        assert_eq!(left.size(), 24);
    }

    #[test]
    fn test_marginalization_order_does_not_matter() {
        let v = variables();
        let joint = factor(&[&v[0], &v[1], &v[2]], 0.5);
        let first = joint.marginalize("A").unwrap().marginalize("C").unwrap();
        let second = joint.marginalize("C").unwrap().marginalize("A").unwrap();
        assert!(first.approx_eq(&second, 1e-12));
        assert_eq!(first.variable_names(), vec!["B"]);
        assert!((first.sum() - joint.sum()).abs() < 1e-12);
    }

    #[test]
    fn test_reduce_commutes_with_product() {
        let v = variables();
        let ab = factor(&[&v[0], &v[1]], 4.0);
        let bc = factor(&[&v[1], &v[2]], 5.0);
        let reduced_first = ab
            .reduce("B", 1)
            .unwrap()
            .multiply(&bc.reduce("B", 1).unwrap())
            .unwrap();
        let reduced_after = ab.multiply(&bc).unwrap().reduce("B", 1).unwrap();
        assert!(reduced_first.approx_eq(&reduced_after, 1e-12));
    }

    #[test]
    fn test_lookup_by_label() {
        let v = variables();
        let ab = Factor::new(vec![v[0].clone(), v[1].clone()], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(ab.probability(&[("B", "b2"), ("A", "a0")]).unwrap(), 3.0);
        assert!(matches!(
            ab.probability(&[("A", "a0")]).unwrap_err(),
            BayesError::ShapeMismatch { .. }
        ));
        assert!(matches!(
            ab.probability(&[("A", "a9"), ("B", "b0")]).unwrap_err(),
            BayesError::UnknownState { .. }
        ));
        assert!(matches!(
            ab.probability(&[("A", "a0"), ("C", "c0")]).unwrap_err(),
            BayesError::VariableNotInScope { .. }
        ));
        let labelled: Vec<(Vec<&str>, f64)> = ab.assignments().collect();
        assert_eq!(labelled.len(), 6);
        assert_eq!(labelled[4], (vec!["a1", "b1"], 5.0));
    }

    #[test]
    fn test_normalized_factor_sums_to_one() {
        let v = variables();
        let f = factor(&[&v[1], &v[3]], 7.0).normalize().unwrap();
        assert!((f.sum() - 1.0).abs() < 1e-12);
        assert!(f.values().iter().all(|p| *p >= 0.0));
    }
}
