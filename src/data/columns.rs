use std::collections::HashMap;

use csv::StringRecord;

#[derive(Clone, Debug, Default)]
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
    headers: Vec<String>,
}

impl ColumnIndex {
    pub fn from_headers(headers: &StringRecord) -> Self {
        let headers = headers
            .iter()
            .map(|name| name.trim().to_owned())
            .collect::<Vec<_>>();

        let mut positions = HashMap::with_capacity(headers.len());
        for (index, name) in headers.iter().enumerate() {
            positions.entry(name.clone()).or_insert(index);
        }

        Self { positions, headers }
    }

    pub fn with_aliases(mut self, aliases: &[(&str, &str)]) -> Self {
        for (alias, canonical) in aliases {
            if self.positions.contains_key(*canonical) {
                continue;
            }
            if let Some(index) = self.positions.get(*alias).copied() {
                self.positions.insert((*canonical).to_owned(), index);
                if let Some(header) = self.headers.get_mut(index) {
                    *header = (*canonical).to_owned();
                }
            }
        }
        self
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|name| !self.positions.contains_key(*name))
            .collect()
    }

    pub fn text(&self, record: &StringRecord, name: &str) -> String {
        self.position(name)
            .and_then(|index| record.get(index))
            .map(|value| value.trim().to_owned())
            .unwrap_or_default()
    }

    pub fn number(&self, record: &StringRecord, name: &str) -> f64 {
        coerce_number(&self.text(record, name))
    }

    pub fn integer(&self, record: &StringRecord, name: &str) -> i64 {
        coerce_integer(&self.text(record, name))
    }
}

pub fn coerce_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Integer coercion truncates toward zero after numeric parsing, so `"12.9"`
/// reads as `12`.
pub fn coerce_integer(raw: &str) -> i64 {
    coerce_number(raw).trunc() as i64
}
