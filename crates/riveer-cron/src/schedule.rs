use std::str::FromStr;

use crate::error::CronError;

/// Parses a standard 5-field cron expression (`minute hour
/// day_of_month month_of_year day_of_week`) into a [`cron::Schedule`].
///
/// Resolves the field-order ambiguity in favor of the standard order,
/// matching `original_source/src/core/cron.py::_parse_cron`'s newer
/// variant. Missing trailing positions default to `*` ("every"), same
/// as `_parse_cron`'s `parts.get(i, "*")`, so e.g. `"*/5 * *"` is
/// equivalent to `"*/5 * * * *"`. More than 5 fields is still rejected.
/// The `cron` crate itself requires a leading seconds field, so a
/// literal `0` is prepended before parsing.
pub fn parse_schedule(expression: &str) -> Result<cron::Schedule, CronError> {
  let mut fields: Vec<&str> = expression.split_whitespace().collect();
  if fields.len() > 5 {
    return Err(CronError::InvalidSchedule {
      expression: expression.to_string(),
      message: format!("expected at most 5 fields (minute hour day_of_month month_of_year day_of_week), got {}", fields.len()),
    });
  }
  fields.resize(5, "*");

  let with_seconds = format!("0 {}", fields.join(" "));
  cron::Schedule::from_str(&with_seconds).map_err(|e| CronError::InvalidSchedule {
    expression: expression.to_string(),
    message: e.to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_standard_five_field_expression() {
    assert!(parse_schedule("*/5 * * * *").is_ok());
  }

  #[test]
  fn missing_trailing_fields_default_to_every() {
    let short = parse_schedule("*/5 * *").unwrap();
    let full = parse_schedule("*/5 * * * *").unwrap();
    assert_eq!(short.to_string(), full.to_string());
  }

  #[test]
  fn rejects_too_many_fields() {
    let err = parse_schedule("* * * * * *").unwrap_err();
    assert!(matches!(err, CronError::InvalidSchedule { .. }));
  }
}
