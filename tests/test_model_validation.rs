#[cfg(test)]
mod test_model_validation {
    use bayesnet::pgm::common::config::EngineConfig;
    use bayesnet::pgm::common::errors::BayesError;
    use bayesnet::pgm::model::{BayesianModel, NetworkStructure, TabularCpd, Variable, VariableRegistry};

    struct Parts {
        registry: VariableRegistry,
        measures: Variable,
        vulnerability: Variable,
    }

    fn parts() -> Parts {
        let mut registry = VariableRegistry::new();
        let measures = registry.define_binary("SecurityMeasures", "Strong", "Weak").unwrap();
        let vulnerability = registry.define_binary("SystemVulnerability", "High", "Low").unwrap();
        Parts {
            registry,
            measures,
            vulnerability,
        }
    }

    fn vulnerability_cpd(parts: &Parts) -> TabularCpd {
        TabularCpd::new(
            &parts.vulnerability,
            &[&parts.measures],
            vec![vec![0.1, 0.9], vec![0.9, 0.1]],
        )
        .unwrap()
    }

    #[test]
    fn test_valid_model_passes() {
        let parts = parts();
        let cpds = vec![
            TabularCpd::prior(&parts.measures, &[0.7, 0.3]).unwrap(),
            vulnerability_cpd(&parts),
        ];
        let structure =
            NetworkStructure::from_edges(parts.registry, &[("SecurityMeasures", "SystemVulnerability")])
                .unwrap();
        let model = BayesianModel::build(structure, cpds).unwrap();
        assert!(!model.is_validated());
        let model = model.validate().unwrap();
        assert!(model.is_validated());
        assert_eq!(model.cpds().count(), 2);
        assert_eq!(
            model.cpd("SystemVulnerability").unwrap().parent_variables()[0].name(),
            "SecurityMeasures"
        );
    }

    #[test]
    fn test_missing_cpd_names_the_variable() {
        let parts = parts();
        let cpds = vec![vulnerability_cpd(&parts)];
        let structure =
            NetworkStructure::from_edges(parts.registry, &[("SecurityMeasures", "SystemVulnerability")])
                .unwrap();
        let err = BayesianModel::build(structure, cpds).unwrap().validate().unwrap_err();
        assert_eq!(err, BayesError::MissingCpd("SecurityMeasures".to_string()));
        assert!(err.to_string().contains("SecurityMeasures"));
    }

    #[test]
    fn test_duplicate_cpd_is_rejected() {
        let parts = parts();
        let cpds = vec![
            TabularCpd::prior(&parts.measures, &[0.7, 0.3]).unwrap(),
            TabularCpd::prior(&parts.measures, &[0.6, 0.4]).unwrap(),
        ];
        let structure = NetworkStructure::new(parts.registry);
        let err = BayesianModel::build(structure, cpds).unwrap_err();
        assert_eq!(err, BayesError::DuplicateCpd("SecurityMeasures".to_string()));
    }

    #[test]
    fn test_parent_mismatch() {
        let parts = parts();
        let cpds = vec![
            TabularCpd::prior(&parts.measures, &[0.7, 0.3]).unwrap(),
            vulnerability_cpd(&parts),
        ];
        // The CPD conditions on SecurityMeasures but the graph has no edge.
        let structure = NetworkStructure::new(parts.registry);
        let err = BayesianModel::build(structure, cpds).unwrap().validate().unwrap_err();
        assert_eq!(
            err,
            BayesError::ParentMismatch {
                variable: "SystemVulnerability".to_string(),
                structure: vec![],
                cpd: vec!["SecurityMeasures".to_string()],
            }
        );
    }

    #[test]
    fn test_state_mismatch() {
        let parts = parts();
        let mut other = VariableRegistry::new();
        let relabelled = other.define_binary("SecurityMeasures", "Weak", "Strong").unwrap();
        let cpds = vec![
            TabularCpd::prior(&relabelled, &[0.3, 0.7]).unwrap(),
            vulnerability_cpd(&parts),
        ];
        let structure =
            NetworkStructure::from_edges(parts.registry, &[("SecurityMeasures", "SystemVulnerability")])
                .unwrap();
        let err = BayesianModel::build(structure, cpds).unwrap().validate().unwrap_err();
        assert!(matches!(err, BayesError::StateMismatch { ref variable, .. } if variable == "SecurityMeasures"));
    }

    #[test]
    fn test_tolerance_is_configurable() {
        let parts = parts();
        let loose = TabularCpd::with_tolerance(&parts.measures, &[], vec![vec![0.7], vec![0.3001]], 1e-3)
            .unwrap();
        let structure = NetworkStructure::new(parts.registry);
        let model = BayesianModel::build(structure, vec![loose]).unwrap();

        let err = model.clone().validate().unwrap_err();
        assert!(matches!(err, BayesError::UnnormalizedCpd { ref variable, .. } if variable == "SecurityMeasures"));

        let config = EngineConfig::from_json_str(r#"{"normalization_tolerance": 0.001}"#).unwrap();
        let err = model.validate_with(&config).unwrap_err();
        // SystemVulnerability has no CPD at all
        assert_eq!(err, BayesError::MissingCpd("SystemVulnerability".to_string()));
    }

    #[test]
    fn test_cycles_are_rejected_without_mutation() {
        let mut registry = VariableRegistry::new();
        for name in ["A", "B", "C"] {
            registry.define_binary(name, "yes", "no").unwrap();
        }
        let mut structure = NetworkStructure::from_edges(registry, &[("A", "B"), ("B", "C")]).unwrap();
        let before = structure.edge_count();
        assert!(matches!(
            structure.add_edge("C", "A"),
            Err(BayesError::CycleDetected { .. })
        ));
        assert_eq!(structure.edge_count(), before);
        structure.add_edge("A", "B").unwrap();
        assert_eq!(structure.edge_count(), before);
        let order = structure.topological_order().unwrap();
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_variable_definitions_are_checked() {
        let mut registry = VariableRegistry::new();
        registry.define_binary("A", "yes", "no").unwrap();
        assert_eq!(
            registry.define_binary("A", "on", "off").unwrap_err(),
            BayesError::DuplicateVariable("A".to_string())
        );
        assert!(matches!(
            registry.define_variable("B", &["only"]).unwrap_err(),
            BayesError::InvalidCardinality { distinct: 1, .. }
        ));
        assert!(matches!(
            registry.define_variable("C", &["x", "y", "x"]).unwrap_err(),
            BayesError::DuplicateState { .. }
        ));
        assert_eq!(registry.len(), 1);
    }
}
