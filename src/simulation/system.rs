//! Adapter exposing a [`ReactorModel`] to the `ode_solvers` steppers.

use ode_solvers::*;

use crate::models::reactor::ReactorModel;

/// Type alias for the state vector used by the steppers
pub(crate) type State = DVector<f64>;
/// Type alias for time values used by the steppers
type Time = f64;

/// Borrows a reactor model for the duration of one integration interval.
pub(crate) struct ReactorSystem<'a, M: ReactorModel + ?Sized> {
    model: &'a M,
}

impl<'a, M: ReactorModel + ?Sized> ReactorSystem<'a, M> {
    pub(crate) fn new(model: &'a M) -> Self {
        Self { model }
    }
}

impl<M: ReactorModel + ?Sized> System<f64, State> for ReactorSystem<'_, M> {
    fn system(&self, t: Time, y: &State, dy: &mut State) {
        self.model.derivative(t, y.as_slice(), dy.as_mut_slice());
    }
}
