use std::collections::BTreeMap;

/// One sheet's worth of data: a column per region, a row per period.
///
/// Rows are keyed by period in a `BTreeMap`; every row holds one slot per
/// column so a region missing a period simply leaves `None` in that slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedTable {
    name: String,
    columns: Vec<String>,
    rows: BTreeMap<String, Vec<Option<f64>>>,
}

impl ConsolidatedTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Outer-join a column into the table.
    ///
    /// If `label` is already a column its values are replaced by the new ones
    /// and `true` is returned.
    pub fn merge_column<I>(&mut self, label: &str, values: I) -> bool
    where
        I: IntoIterator<Item = (String, Option<f64>)>,
    {
        let (idx, replaced) = match self.columns.iter().position(|c| c == label) {
            Some(idx) => {
                for row in self.rows.values_mut() {
                    row[idx] = None;
                }
                (idx, true)
            }
            None => {
                self.columns.push(label.to_string());
                for row in self.rows.values_mut() {
                    row.push(None);
                }
                (self.columns.len() - 1, false)
            }
        };

        let width = self.columns.len();
        for (period, value) in values {
            let row = self
                .rows
                .entry(period)
                .or_insert_with(|| vec![None; width]);
            row[idx] = value;
        }

        replaced
    }

    /// Periods, newest first.
    pub fn periods_desc(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().rev().map(String::as_str)
    }

    /// Rows, newest period first.
    pub fn rows_desc(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.rows
            .iter()
            .rev()
            .map(|(period, values)| (period.as_str(), values.as_slice()))
    }

    pub fn value(&self, period: &str, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(period).and_then(|row| row[idx])
    }
}
