use super::error::CutError;

/// Rounding policy for millisecond-to-second conversion.
///
/// Segment starts are floored so a cut never advances past the true boundary;
/// segment ends are ceiled so a cut never truncates trailing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Floor,
    Ceil,
}

/// Format a millisecond offset as a zero-padded clock string.
///
/// Returns `HH:MM:SS` when `include_hours` is set, `MM:SS` otherwise. Without
/// the hour field the minutes wrap modulo 60, so callers cutting media longer
/// than an hour must ask for hours.
pub fn clock_timestamp(
    offset_ms: i64,
    rounding: Rounding,
    include_hours: bool,
) -> Result<String, CutError> {
    if offset_ms < 0 {
        return Err(CutError::InvalidTimestamp(offset_ms));
    }

    let seconds = match rounding {
        Rounding::Floor => offset_ms / 1000,
        Rounding::Ceil => (offset_ms + 999) / 1000,
    };

    if include_hours {
        Ok(format!(
            "{:02}:{:02}:{:02}",
            seconds / 3600,
            (seconds / 60) % 60,
            seconds % 60
        ))
    } else {
        Ok(format!("{:02}:{:02}", (seconds / 60) % 60, seconds % 60))
    }
}
