#[cfg(test)]
mod test_simulation {
    use std::cell::Cell;

    use approx::assert_relative_eq;
    use bioreactor::prelude::*;

    fn assert_series_eq(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert_relative_eq!(*a, *e, epsilon = 1e-6, max_relative = 1e-5);
        }
    }

    /// Runs the reference bioremediation scenario: 0 to 100 h at 1000 points.
    ///
    /// With the reference parameters the cyanide level rises while the
    /// biomass is still small and settles near 1.87 mg/L once the
    /// heterotrophs have grown, so the test checks boundedness and
    /// convergence rather than monotonicity.
    #[test]
    fn test_bioremediation_reference_scenario() {
        // ARRANGE
        let params = BioremediationParameters::default();
        let y0: Vec<f64> = BioremediationState::default().into();
        let setup = SimulationSetup::bioremediation();

        // ACT
        let trajectory: Trajectory = simulate(&params, &y0, &setup).unwrap();

        // ASSERT
        assert_eq!(trajectory.len(), 1000);
        assert_eq!(trajectory.time[0], 0.0);
        assert_eq!(trajectory.time[999], 100.0);
        assert!(trajectory.states.iter().all(|v| v.is_finite()));

        let cyanide = trajectory.component(0);
        assert!(cyanide.iter().all(|&c| (0.0..=params.c_in).contains(&c)));

        let peak = cyanide.iter().copied().fold(f64::MIN, f64::max);
        assert_relative_eq!(peak, 30.3, epsilon = 0.5);

        let last = trajectory.final_state().unwrap();
        assert_relative_eq!(last[0], 1.8705, epsilon = 1e-2);
        assert_relative_eq!(last[1], 1.2941, epsilon = 1e-2);
        assert_relative_eq!(last[2], 72.0863, epsilon = 1e-2);
        assert_relative_eq!(last[3], 15.5545, epsilon = 1e-2);

        // The last tenth of the horizon is already at equilibrium
        let rates = params.rates(100.0, &last);
        assert!(rates.iter().all(|r| r.abs() < 1e-2), "{rates:?}");
    }

    #[test]
    fn test_bioremediation_extracted_series() {
        let reactor = Reactor::default_for(ModelKind::Bioremediation);
        let y0 = reactor.default_initial_state();

        let series: ExtractedSeries = reactor
            .integrate(&y0, &SimulationSetup::bioremediation())
            .unwrap();

        assert_eq!(series.grid, PanelGrid::new(2, 2));
        assert_eq!(series.panels.len(), 4);
        assert_eq!(series.get("nitrifier_biomass").unwrap().len(), 1000);
        assert_eq!(series.get("ammonia").unwrap()[0], 0.0);
    }

    #[test]
    fn test_rbc_reference_run() {
        // ARRANGE
        let params = RbcParameters::default();
        let y0: Vec<f64> = RbcState::default().into();

        // ACT
        let series: ExtractedSeries = simulate(&params, &y0, &SimulationSetup::rbc()).unwrap();

        // ASSERT
        assert_eq!(series.time.len(), 100);
        assert_eq!(*series.time.last().unwrap(), 24.0);

        let finals = series.final_values();
        assert_eq!(finals[0].0, "cyanide");
        assert_relative_eq!(finals[0].1, 1.1304, epsilon = 1e-3);
        assert_relative_eq!(finals[1].1, 9.7453, epsilon = 1e-3);
        assert_relative_eq!(finals[2].1, 7.9835, epsilon = 1e-3);
    }

    /// With `Q_in = Q_out` the RBC settles where growth balances decay:
    /// `C* = K_s k_d / (mu_max - k_d)`.
    #[test]
    fn test_rbc_approaches_steady_state() {
        // ARRANGE
        let params = RbcParameters::default();
        let setup = SimulationSetupBuilder::default()
            .t1(500.0)
            .n_points(51)
            .build()
            .unwrap();

        // ACT
        let trajectory: Trajectory = simulate(&params, &[0.0, 10.0, 8.0], &setup).unwrap();

        // ASSERT
        let last = trajectory.final_state().unwrap();
        let rates = params.rates(500.0, &last);
        assert!(rates.iter().all(|r| r.abs() < 1e-3), "{rates:?}");

        let kinetics = params.kinetics;
        let c_star = kinetics.k_s * kinetics.k_d / (kinetics.mu_max - kinetics.k_d);
        assert_relative_eq!(last[0], c_star, epsilon = 1e-3);
        assert_relative_eq!(last[1], 9.8889, epsilon = 1e-3);
        assert_relative_eq!(last[2], 7.9835, epsilon = 1e-3);

        // Magnitudes shrink along the horizon
        let early = params.rates(0.0, &trajectory.state_at(1).unwrap());
        let norm = |r: &[f64]| r.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!(norm(&rates) < norm(&early));
    }

    #[test]
    fn test_methods_agree() {
        let params = RbcParameters::default();
        let y0 = [0.0, 10.0, 8.0];

        let dopri: Trajectory = simulate(&params, &y0, &SimulationSetup::rbc()).unwrap();
        let dop853: Trajectory = simulate(
            &params,
            &y0,
            &SimulationSetup::rbc().with_method(Method::Dop853),
        )
        .unwrap();

        for i in 0..3 {
            assert_series_eq(&dop853.component(i), &dopri.component(i));
        }
    }

    #[test]
    fn test_multi_species_reference_run() {
        let reactor = Reactor::default_for(ModelKind::MultiSpeciesRbc);
        let y0 = reactor.default_initial_state();
        assert_eq!(y0, vec![0.0, 10.0, 5.0, 8.0]);

        let trajectory: Trajectory = reactor.integrate(&y0, &SimulationSetup::rbc()).unwrap();
        let last = trajectory.final_state().unwrap();

        assert_relative_eq!(last[0], 1.05142, epsilon = 1e-3);
        assert_relative_eq!(last[1], 8.43069, epsilon = 1e-3);
        assert_relative_eq!(last[2], 3.71942, epsilon = 1e-3);
        assert_relative_eq!(last[3], 7.98359, epsilon = 1e-3);
        assert!(trajectory.excursions.is_empty());
    }

    /// Two identical species holding half the biomass each behave like one
    /// species holding all of it.
    #[test]
    fn test_identical_species_are_additive() {
        // ARRANGE
        let single = RbcParameters::default();
        let multi = MultiSpeciesRbcParameters::new(
            single.conditions.clone(),
            vec![single.kinetics, single.kinetics],
        )
        .unwrap();
        let setup = SimulationSetup::rbc();

        // ACT
        let single_run: Trajectory = simulate(&single, &[0.0, 10.0, 8.0], &setup).unwrap();
        let multi_run: Trajectory = simulate(&multi, &[0.0, 5.0, 5.0, 8.0], &setup).unwrap();

        // ASSERT
        assert_series_eq(&multi_run.component(0), &single_run.component(0));
        assert_series_eq(&multi_run.component(3), &single_run.component(2));

        let total: Vec<f64> = multi_run
            .component(1)
            .iter()
            .zip(multi_run.component(2))
            .map(|(a, b)| a + b)
            .collect();
        assert_series_eq(&total, &single_run.component(1));
        assert_series_eq(&multi_run.component(1), &multi_run.component(2));
    }

    #[test]
    fn test_species_order_invariance() {
        // ARRANGE
        let params = MultiSpeciesRbcParameters::default();
        let swapped = params.permuted(&[1, 0]).unwrap();
        let setup = SimulationSetup::rbc();

        // ACT
        let run: ExtractedSeries = simulate(&params, &[0.0, 10.0, 5.0, 8.0], &setup).unwrap();
        let swapped_run: ExtractedSeries =
            simulate(&swapped, &[0.0, 5.0, 10.0, 8.0], &setup).unwrap();

        // ASSERT
        for name in ["cyanide", "oxygen"] {
            assert_series_eq(swapped_run.get(name).unwrap(), run.get(name).unwrap());
        }
        assert_series_eq(
            swapped_run.get("species_1_biomass").unwrap(),
            run.get("species_2_biomass").unwrap(),
        );
        assert_series_eq(
            swapped_run.get("species_2_biomass").unwrap(),
            run.get("species_1_biomass").unwrap(),
        );
    }

    #[test]
    fn test_single_species_multi_model_matches_rbc() {
        let single = RbcParameters::default();
        let multi =
            MultiSpeciesRbcParameters::new(single.conditions.clone(), vec![single.kinetics])
                .unwrap();
        let setup = SimulationSetup::rbc();

        let a: Trajectory = simulate(&single, &[0.0, 10.0, 8.0], &setup).unwrap();
        let b: Trajectory = simulate(&multi, &[0.0, 10.0, 8.0], &setup).unwrap();

        for i in 0..3 {
            assert_series_eq(&b.component(i), &a.component(i));
        }
    }

    /// Counts right-hand side evaluations and always fails validation.
    struct Misconfigured {
        evaluations: Cell<usize>,
    }

    impl ReactorModel for Misconfigured {
        fn name(&self) -> &'static str {
            "misconfigured"
        }

        fn state_len(&self) -> usize {
            1
        }

        fn component_names(&self) -> Vec<String> {
            vec!["x".to_string()]
        }

        fn validate(&self) -> Result<(), ConfigurationError> {
            Err(ConfigurationError::NegativeParameter {
                name: "Q".to_string(),
                value: -1.0,
            })
        }

        fn derivative(&self, _t: f64, _y: &[f64], dy: &mut [f64]) {
            self.evaluations.set(self.evaluations.get() + 1);
            dy[0] = 0.0;
        }

        fn extract(&self, trajectory: &Trajectory) -> Result<ExtractedSeries, SimulationError> {
            Err(SimulationError::ShapeMismatch {
                expected: 1,
                found: trajectory.n_components(),
            })
        }
    }

    #[test]
    fn test_configuration_error_before_integration() {
        // Species vectors of different lengths
        let result = MultiSpeciesRbcParameters::from_vectors(
            RbcConditions::default(),
            vec![0.5, 0.3],
            vec![10.0, 15.0, 20.0],
            vec![0.05, 0.03],
            vec![0.5, 0.4],
            vec![1.5, 1.2],
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::SpeciesLengthMismatch {
                field: "K_s",
                expected: 2,
                found: 3
            })
        ));

        // The driver validates before evaluating the model
        let model = Misconfigured {
            evaluations: Cell::new(0),
        };
        let result = integrate(&model, &[1.0], &SimulationSetup::rbc());
        assert!(matches!(
            result,
            Err(SimulationError::Configuration(
                ConfigurationError::NegativeParameter { .. }
            ))
        ));
        assert_eq!(model.evaluations.get(), 0);
    }

    #[test]
    fn test_negative_volume_is_rejected() {
        let reactor = Reactor::Bioremediation(BioremediationParameters {
            v: -100.0,
            ..Default::default()
        });
        let result = reactor.integrate::<Trajectory>(&[0.0, 0.0, 1.0, 1.0], &SimulationSetup::rbc());
        assert!(matches!(result, Err(SimulationError::Configuration(_))));
    }

    #[test]
    fn test_initial_biomass_length_mismatch() {
        let params = MultiSpeciesRbcParameters::default();
        let result = integrate(&params, &[0.0, 10.0, 5.0, 1.0, 8.0], &SimulationSetup::rbc());
        assert!(matches!(
            result,
            Err(SimulationError::Configuration(ConfigurationError::StateLength {
                expected: 4,
                found: 5
            }))
        ));
    }

    /// `dy/dt = y^2` blows up at `t = 1` for `y(0) = 1`.
    struct BlowUp;

    impl ReactorModel for BlowUp {
        fn name(&self) -> &'static str {
            "blow_up"
        }

        fn state_len(&self) -> usize {
            1
        }

        fn component_names(&self) -> Vec<String> {
            vec!["y".to_string()]
        }

        fn validate(&self) -> Result<(), ConfigurationError> {
            Ok(())
        }

        fn derivative(&self, _t: f64, y: &[f64], dy: &mut [f64]) {
            dy[0] = y[0] * y[0];
        }

        fn extract(&self, trajectory: &Trajectory) -> Result<ExtractedSeries, SimulationError> {
            Err(SimulationError::ShapeMismatch {
                expected: 1,
                found: trajectory.n_components(),
            })
        }
    }

    /// `y = 1 / (1 - t)` blows up at t = 1. The grid steps over the
    /// singularity, so the last completed point is 18/19.
    #[test]
    fn test_solver_failure_reports_progress() {
        // ARRANGE
        let setup = SimulationSetupBuilder::default()
            .t1(2.0)
            .n_points(20)
            .build()
            .unwrap();

        // ACT
        let result = integrate(&BlowUp, &[1.0], &setup);

        // ASSERT
        match result {
            Err(SimulationError::Integration {
                t_reached, state, ..
            }) => {
                assert!(t_reached < 1.0 && t_reached > 0.5, "t_reached = {t_reached}");
                assert_relative_eq!(t_reached, 18.0 / 19.0, epsilon = 1e-12);
                assert_eq!(state.len(), 1);
                assert_relative_eq!(state[0], 1.0 / (1.0 - t_reached), max_relative = 1e-3);
            }
            other => panic!("expected an integration error, got {other:?}"),
        }
    }

    #[test]
    fn test_explicit_points_stop_before_singularity() {
        let setup = SimulationSetupBuilder::default()
            .t1(2.0)
            .t_eval(vec![0.0, 0.5, 0.9, 1.5, 2.0])
            .build()
            .unwrap();

        let result = integrate(&BlowUp, &[1.0], &setup);

        assert!(matches!(
            result,
            Err(SimulationError::Integration { t_reached, .. }) if t_reached == 0.9
        ));
    }

    #[test]
    fn test_negative_excursions_are_reported() {
        // Without reaeration the biological demand drains oxygen below zero
        let params = RbcParameters {
            conditions: RbcConditions {
                o_star: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };

        let trajectory: Trajectory = simulate(&params, &[0.0, 10.0, 0.0], &SimulationSetup::rbc()).unwrap();

        assert_eq!(trajectory.len(), 100);
        assert_eq!(trajectory.excursions.len(), 1);
        let excursion = &trajectory.excursions[0];
        assert_eq!(excursion.component, "oxygen");
        assert!(excursion.value < 0.0);
    }
}
