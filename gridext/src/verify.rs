use tracing::{debug, trace};

use crate::{
    dataset::Dataset,
    errors::{Error, Result},
    select::{select_variable, Cadence},
};

/// Check that the last reporting period of every data variable is an exact copy of the period
/// before it.
///
/// Only the last two periods are compared, whatever fill in mode produced them. After `extend`
/// the last period is always a copy of the most recent original period. With no fill in that is
/// the period right before it. With fill in the period before it is another copy, so the check
/// only confirms that the last two copies agree. Positions that are NaN on both sides count as
/// equal. Variables without the time dimension compare equal to themselves.
///
pub fn verify(dataset: &Dataset, cadence: Cadence, time_axis: &str) -> Result<()> {
    for variable in &dataset.variables {
        let source = select_variable(dataset, &variable.name, cadence, 1, time_axis)?;
        let extension = select_variable(dataset, &variable.name, cadence, 0, time_axis)?;
        trace!(variable = %variable.name, source = ?source.values, "source period");

        let (max, min) = extension.values.diff_extrema(&source.values)?;
        debug!(variable = %variable.name, max, min, "compared last two periods");
        if max != 0.0 || min != 0.0 {
            return Err(Error::VerificationFailure {
                variable: variable.name.clone(),
                max,
                min,
            });
        }
    }

    Ok(())
}
