//! Integration driver.
//!
//! Validates a run, integrates a [`ReactorModel`] over the evaluation grid of a
//! [`SimulationSetup`] and collects the states into a [`Trajectory`].
//!
//! The grid is integrated interval by interval with a fresh adaptive stepper
//! per interval. Every stored sample therefore lies on a requested time, and a
//! failing interval leaves the last completed evaluation point as the
//! reported progress.

use log::{debug, info, warn};
use ode_solvers::{Dop853, Dopri5};

use crate::models::reactor::ReactorModel;
use crate::simulation::{
    error::SimulationError,
    output::OutputFormat,
    result::{IntegrationStats, Trajectory},
    setup::{Method, SimulationSetup},
    system::{ReactorSystem, State},
};

/// Integrates `model` from `y0` and returns the raw trajectory.
///
/// All configuration checks run before the first right-hand side
/// evaluation. Negative components do not abort the run; they are reported
/// in [`Trajectory::excursions`].
///
/// # Arguments
///
/// * `model` - The reactor model to integrate
/// * `y0` - Initial state in the layout of `model`
/// * `setup` - Time span, evaluation grid, tolerances and method
///
/// # Returns
///
/// Returns the trajectory on the evaluation grid, or
/// [`SimulationError::Integration`] with the last evaluation point reached if
/// the solver gives up.
pub fn integrate<M: ReactorModel + ?Sized>(
    model: &M,
    y0: &[f64],
    setup: &SimulationSetup,
) -> Result<Trajectory, SimulationError> {
    model.validate()?;
    model.validate_state(y0)?;
    setup.validate()?;

    let times = setup.evaluation_times();
    info!(
        "Integrating {} model over [{}, {}] at {} points ({})",
        model.name(),
        setup.t0,
        setup.t1,
        times.len(),
        setup.method
    );

    let mut stats = IntegrationStats::default();
    let mut samples = Vec::with_capacity(times.len());
    let mut t = setup.t0;
    let mut y = State::from_column_slice(y0);

    for &t_next in times.iter() {
        if t_next > t {
            let y_next = integrate_interval(model, setup, t, t_next, &y, &mut stats)
                .and_then(|y_next| {
                    if y_next.iter().all(|value| value.is_finite()) {
                        Ok(y_next)
                    } else {
                        Err(format!("state became non-finite before t = {t_next}"))
                    }
                })
                .map_err(|reason| SimulationError::Integration {
                    reason,
                    t_reached: t,
                    state: y.as_slice().to_vec(),
                })?;

            y = y_next;
            t = t_next;
        }
        samples.push(y.as_slice().to_vec());
    }

    debug!("Solver statistics: {stats}");

    let trajectory = Trajectory::from_samples(times, &samples, model.component_names(), stats);
    for excursion in trajectory.excursions.iter() {
        warn!(
            "Component '{}' became negative: {:.3e} at t = {}",
            excursion.component, excursion.value, excursion.time
        );
    }

    info!(
        "Finished {} model: {} samples, {} accepted steps",
        model.name(),
        trajectory.len(),
        trajectory.stats.accepted_steps
    );

    Ok(trajectory)
}

/// Integrates `model` and converts the trajectory into the output format `O`.
///
/// # Examples
///
/// ```
/// use bioreactor::prelude::*;
///
/// let params = RbcParameters::default();
/// let series: ExtractedSeries =
///     simulate(&params, &[0.0, 10.0, 8.0], &SimulationSetup::rbc()).unwrap();
///
/// assert_eq!(series.names(), vec!["cyanide", "biomass", "oxygen"]);
/// ```
pub fn simulate<M, O>(model: &M, y0: &[f64], setup: &SimulationSetup) -> Result<O, SimulationError>
where
    M: ReactorModel + ?Sized,
    O: OutputFormat,
{
    let trajectory = integrate(model, y0, setup)?;
    O::create_output(trajectory, model)
}

/// Integrates one interval `[t_start, t_end]` and returns the state at `t_end`.
///
/// The stepper runs slightly past `t_end` with a single dense output stride
/// over the interval, so the sample at `t_end` is always emitted even when
/// the last step lands a rounding error short of it.
fn integrate_interval<M: ReactorModel + ?Sized>(
    model: &M,
    setup: &SimulationSetup,
    t_start: f64,
    t_end: f64,
    y: &State,
    stats: &mut IntegrationStats,
) -> Result<State, String> {
    let stride = t_end - t_start;
    let x_end = t_end + stride * 1e-9 + t_end.abs() * f64::EPSILON * 4.0;
    let system = ReactorSystem::new(model);

    macro_rules! run_stepper {
        ($stepper:ident) => {{
            let mut stepper = $stepper::new(
                system,
                t_start,
                x_end,
                stride,
                y.clone(),
                setup.rtol,
                setup.atol,
            );
            let interval_stats = stepper.integrate().map_err(|err| err.to_string())?;
            stats.accumulate(&interval_stats);
            stepper.y_out().last().cloned()
        }};
    }

    let y_end = match setup.method {
        Method::Dopri5 => run_stepper!(Dopri5),
        Method::Dop853 => run_stepper!(Dop853),
    };

    y_end.ok_or_else(|| format!("solver produced no output on [{t_start}, {t_end}]"))
}
