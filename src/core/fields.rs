//! Record builder: root-field and extra registration plus assembly
//!
//! Root fields land at the top level of the record; extras land inside
//! the `data` sub-map. Both surfaces are first-registration-wins and are
//! evaluated once per record.

use super::level::Level;
use super::record::{interpolate, Record};
use serde_json::{Map, Value};

/// A nullary producer evaluated once per record.
pub type Producer = Box<dyn Fn() -> Value + Send + Sync>;

#[derive(Default)]
pub struct RecordBuilder {
    fields: Vec<(String, Producer)>,
    extras: Vec<(String, Producer)>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a root-field producer. First registration wins; returns
    /// whether the producer was actually installed.
    pub fn add_field(&mut self, name: impl Into<String>, producer: Producer) -> bool {
        let name = name.into();
        if self.fields.iter().any(|(n, _)| *n == name) {
            return false;
        }
        self.fields.push((name, producer));
        true
    }

    /// Register an extra producer (lands under `data`). First wins.
    pub fn add_extra(&mut self, name: impl Into<String>, producer: Producer) -> bool {
        let name = name.into();
        if self.extras.iter().any(|(n, _)| *n == name) {
            return false;
        }
        self.extras.push((name, producer));
        true
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn extra_count(&self) -> usize {
        self.extras.len()
    }

    /// Assemble a finished record.
    ///
    /// Root producers are evaluated into the record top level; extras are
    /// merged into the call-site context with the call argument winning on
    /// collision. The message template is interpolated against the union
    /// of the merged data and the root fields.
    pub fn build(
        &self,
        context: &str,
        level: Level,
        message: &str,
        call_context: &Map<String, Value>,
    ) -> Record {
        let mut fields = Map::new();
        for (name, producer) in &self.fields {
            fields.insert(name.clone(), producer());
        }

        let mut data = call_context.clone();
        for (name, producer) in &self.extras {
            if !data.contains_key(name) {
                data.insert(name.clone(), producer());
            }
        }

        let mut lookup = data.clone();
        for (key, value) in &fields {
            if !lookup.contains_key(key) {
                lookup.insert(key.clone(), value.clone());
            }
        }

        let mut record = Record::new(context, level, interpolate(message, &lookup));
        record.fields = fields;
        record.data = data;
        record
    }
}

impl std::fmt::Debug for RecordBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordBuilder")
            .field("fields", &self.fields.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .field("extras", &self.extras.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}
