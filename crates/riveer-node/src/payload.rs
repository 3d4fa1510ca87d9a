use serde_json::{Map, Value};

/// The data a node's `function` receives and returns.
///
/// A single dict-shaped result (`Record`) is promoted to a length-1
/// `Sequence` wherever a receiver needs to iterate records.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
  Record(Map<String, Value>),
  Sequence(Vec<Map<String, Value>>),
}

impl Payload {
  /// Returns the payload as a slice of records, promoting a bare record.
  pub fn as_records(&self) -> Vec<&Map<String, Value>> {
    match self {
      Payload::Record(r) => vec![r],
      Payload::Sequence(s) => s.iter().collect(),
    }
  }

  pub fn into_records(self) -> Vec<Map<String, Value>> {
    match self {
      Payload::Record(r) => vec![r],
      Payload::Sequence(s) => s,
    }
  }

  pub fn is_empty(&self) -> bool {
    match self {
      Payload::Record(r) => r.is_empty(),
      Payload::Sequence(s) => s.is_empty(),
    }
  }
}

impl From<Map<String, Value>> for Payload {
  fn from(value: Map<String, Value>) -> Self {
    Payload::Record(value)
  }
}

impl From<Vec<Map<String, Value>>> for Payload {
  fn from(value: Vec<Map<String, Value>>) -> Self {
    Payload::Sequence(value)
  }
}

impl From<Payload> for Value {
  fn from(value: Payload) -> Self {
    match value {
      Payload::Record(r) => Value::Object(r),
      Payload::Sequence(s) => Value::Array(s.into_iter().map(Value::Object).collect()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn record_promotes_to_single_element_sequence() {
    let mut record = Map::new();
    record.insert("a".into(), Value::from(1));
    let payload = Payload::Record(record.clone());

    assert_eq!(payload.as_records(), vec![&record]);
  }

  #[test]
  fn sequence_returns_all_records() {
    let records = vec![Map::new(), Map::new()];
    let payload = Payload::Sequence(records.clone());

    assert_eq!(payload.as_records().len(), 2);
  }
}
