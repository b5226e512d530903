use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A grouping key value. Integers order before text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyValue {
    Int(i64),
    Text(String),
}

impl KeyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            KeyValue::Text(s) => Some(s),
            KeyValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            KeyValue::Int(i) => Some(*i),
            KeyValue::Text(_) => None,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Int(i) => write!(f, "{}", i),
            KeyValue::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for KeyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            KeyValue::Int(i) => serializer.serialize_i64(*i),
            KeyValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::Text(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        KeyValue::Text(value)
    }
}

impl From<i32> for KeyValue {
    fn from(value: i32) -> Self {
        KeyValue::Int(value as i64)
    }
}

impl From<u32> for KeyValue {
    fn from(value: u32) -> Self {
        KeyValue::Int(value as i64)
    }
}

/// Named selector producing a grouping key from a row.
pub struct GroupKey<R> {
    name: &'static str,
    select: fn(&R) -> Option<KeyValue>,
}

impl<R> GroupKey<R> {
    pub const fn new(name: &'static str, select: fn(&R) -> Option<KeyValue>) -> Self {
        Self { name, select }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn select(&self, row: &R) -> Option<KeyValue> {
        (self.select)(row)
    }
}

impl<R> Clone for GroupKey<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for GroupKey<R> {}

impl<R> fmt::Debug for GroupKey<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupKey({})", self.name)
    }
}

/// Named selector producing a numeric value from a row.
pub struct ValueColumn<R> {
    name: &'static str,
    select: fn(&R) -> Option<f64>,
}

impl<R> ValueColumn<R> {
    pub const fn new(name: &'static str, select: fn(&R) -> Option<f64>) -> Self {
        Self { name, select }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Selected value; NaN and infinities count as null.
    pub fn select(&self, row: &R) -> Option<f64> {
        (self.select)(row).filter(|v| v.is_finite())
    }
}

impl<R> Clone for ValueColumn<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ValueColumn<R> {}

impl<R> fmt::Debug for ValueColumn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueColumn({})", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    /// Mean of non-null values; null when the group has none.
    Mean,
    /// Number of non-null values, reported as `<column>_count`.
    Count,
}

impl Reducer {
    fn output_name(&self, column: &str) -> String {
        match self {
            Reducer::Mean => column.to_string(),
            Reducer::Count => format!("{}_count", column),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn finish(&self, reducer: Reducer) -> Option<f64> {
        match reducer {
            Reducer::Mean if self.count == 0 => None,
            Reducer::Mean => Some(self.sum / self.count as f64),
            Reducer::Count => Some(self.count as f64),
        }
    }
}

/// One output row: the key tuple and the reduced values.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    keys: Vec<(&'static str, KeyValue)>,
    values: Vec<(String, Option<f64>)>,
    rows: usize,
}

impl GroupRow {
    pub fn key(&self, name: &str) -> Option<&KeyValue> {
        self.keys.iter().find(|(k, _)| *k == name).map(|(_, v)| v)
    }

    pub fn key_str(&self, name: &str) -> Option<&str> {
        self.key(name).and_then(KeyValue::as_str)
    }

    pub fn key_int(&self, name: &str) -> Option<i64> {
        self.key(name).and_then(KeyValue::as_int)
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(k, _)| k == name)
            .and_then(|(_, v)| *v)
    }

    /// Number of input rows in the group, nulls included.
    pub fn rows(&self) -> usize {
        self.rows
    }
}

impl Serialize for GroupRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.keys.len() + self.values.len()))?;
        for (name, value) in &self.keys {
            map.serialize_entry(name, value)?;
        }
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Group-by configuration: which keys to group on and how to reduce values.
/// One pass yields a [`GroupRow`] per key tuple in ascending key order. Rows
/// with a null key are excluded and reducers ignore nulls.
#[derive(Debug, Clone)]
pub struct Aggregation<R> {
    keys: Vec<GroupKey<R>>,
    values: Vec<(ValueColumn<R>, Reducer)>,
}

impl<R> Aggregation<R> {
    pub fn group_by(keys: &[GroupKey<R>]) -> Self {
        Self {
            keys: keys.to_vec(),
            values: Vec::new(),
        }
    }

    pub fn reduce(mut self, column: ValueColumn<R>, reducer: Reducer) -> Self {
        self.values.push((column, reducer));
        self
    }

    pub fn mean(self, column: ValueColumn<R>) -> Self {
        self.reduce(column, Reducer::Mean)
    }

    pub fn count(self, column: ValueColumn<R>) -> Self {
        self.reduce(column, Reducer::Count)
    }

    /// Run the grouped reduce over `rows`.
    pub fn run<'a, I>(&self, rows: I) -> Vec<GroupRow>
    where
        I: IntoIterator<Item = &'a R>,
        R: 'a,
    {
        let mut groups: BTreeMap<Vec<KeyValue>, (usize, Vec<Accumulator>)> = BTreeMap::new();

        for row in rows {
            let Some(key) = self
                .keys
                .iter()
                .map(|k| k.select(row))
                .collect::<Option<Vec<KeyValue>>>()
            else {
                continue;
            };

            let (count, accumulators) = groups
                .entry(key)
                .or_insert_with(|| (0, vec![Accumulator::default(); self.values.len()]));
            *count += 1;
            for ((column, _), accumulator) in self.values.iter().zip(accumulators.iter_mut()) {
                accumulator.push(column.select(row));
            }
        }

        groups
            .into_iter()
            .map(|(key, (rows, accumulators))| GroupRow {
                keys: self.keys.iter().map(|k| k.name).zip(key).collect(),
                values: self
                    .values
                    .iter()
                    .zip(accumulators)
                    .map(|((column, reducer), acc)| {
                        (reducer.output_name(column.name), acc.finish(*reducer))
                    })
                    .collect(),
                rows,
            })
            .collect()
    }
}

/// Split rows into groups by key tuple without reducing them, in ascending
/// key order. Rows with a null key are excluded.
pub fn partition<'a, R, I>(keys: &[GroupKey<R>], rows: I) -> BTreeMap<Vec<KeyValue>, Vec<&'a R>>
where
    I: IntoIterator<Item = &'a R>,
    R: 'a,
{
    let mut groups: BTreeMap<Vec<KeyValue>, Vec<&'a R>> = BTreeMap::new();
    for row in rows {
        if let Some(key) = keys.iter().map(|k| k.select(row)).collect::<Option<Vec<_>>>() {
            groups.entry(key).or_default().push(row);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_keeps_rows() {
        let rows = vec![row("b", Some(1), Some(1.0)), row("a", Some(1), None), row("b", None, None)];
        let groups = partition(&[GROUP], &rows);

        let sizes: Vec<(String, usize)> = groups
            .iter()
            .map(|(k, v)| (k[0].to_string(), v.len()))
            .collect();
        assert_eq!(sizes, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    struct Row {
        group: &'static str,
        year: Option<i32>,
        value: Option<f64>,
    }

    fn select_group(r: &Row) -> Option<KeyValue> {
        Some(KeyValue::from(r.group))
    }

    fn select_year(r: &Row) -> Option<KeyValue> {
        r.year.map(KeyValue::from)
    }

    fn select_value(r: &Row) -> Option<f64> {
        r.value
    }

    const GROUP: GroupKey<Row> = GroupKey::new("group", select_group);
    const YEAR: GroupKey<Row> = GroupKey::new("year", select_year);
    const VALUE: ValueColumn<Row> = ValueColumn::new("value", select_value);

    fn row(group: &'static str, year: Option<i32>, value: Option<f64>) -> Row {
        Row { group, year, value }
    }

    #[test]
    fn test_mean_ignores_nulls() {
        let rows = vec![row("a", Some(1), Some(1.0)), row("a", Some(1), None), row("a", Some(1), Some(3.0))];
        let result = Aggregation::group_by(&[GROUP]).mean(VALUE).run(&rows);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].value("value"), Some(2.0));
        assert_eq!(result[0].rows(), 3);
    }

    #[test]
    fn test_all_null_group_yields_null() {
        let rows = vec![row("a", Some(1), None), row("b", Some(1), Some(f64::NAN))];
        let result = Aggregation::group_by(&[GROUP]).mean(VALUE).run(&rows);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].value("value"), None);
        assert_eq!(result[1].value("value"), None);
    }

    #[test]
    fn test_composite_keys_sorted_and_null_keys_dropped() {
        let rows = vec![
            row("b", Some(2015), Some(4.0)),
            row("a", Some(2016), Some(2.0)),
            row("a", Some(2015), Some(1.0)),
            row("a", None, Some(100.0)),
        ];
        let result = Aggregation::group_by(&[GROUP, YEAR]).mean(VALUE).run(&rows);

        let keys: Vec<(Option<&str>, Option<i64>)> = result
            .iter()
            .map(|r| (r.key_str("group"), r.key_int("year")))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Some("a"), Some(2015)),
                (Some("a"), Some(2016)),
                (Some("b"), Some(2015))
            ]
        );
    }

    #[test]
    fn test_count_reducer_and_serialization() {
        let rows = vec![row("a", Some(1), Some(1.0)), row("a", Some(1), None)];
        let result = Aggregation::group_by(&[GROUP])
            .mean(VALUE)
            .count(VALUE)
            .run(&rows);

        let json = serde_json::to_value(&result[0]).unwrap();
        assert_eq!(json, serde_json::json!({"group": "a", "value": 1.0, "value_count": 1.0}));
    }
}
