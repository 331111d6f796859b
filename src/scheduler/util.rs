use super::TimetableOptions;
use crate::error::SchedError;
use crate::model::Slot;

pub(super) fn validate_period(period: u32, opts: TimetableOptions) -> Result<(), SchedError> {
    if period == 0 {
        return Err(SchedError::InvalidInput(
            "period number must be positive".to_string(),
        ));
    }
    if let Some(max) = opts.max_period {
        if period > max {
            return Err(SchedError::InvalidInput(format!(
                "period number {period} exceeds the last period ({max})"
            )));
        }
    }
    Ok(())
}

pub(super) fn grid_order(a: &Slot, b: &Slot) -> std::cmp::Ordering {
    (a.weekday, a.period).cmp(&(b.weekday, b.period))
}
