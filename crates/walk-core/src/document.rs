//! The trajectory document written by the driver and read by the animator.
//!
//! In memory the document is a tree of typed records. The string keys of the JSON form
//! (`TEMP_<t>`, `R_<i>`) exist only at the serialization boundary:
//!
//! ```text
//! { "<model>": { "TEMP_<t>": { "R_<i>": [[decisions...], [[x, y]...]] } } }
//! ```
//!
//! Key order is preserved in both directions.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DocumentError, WalkError};

pub const TEMPERATURE_KEY_PREFIX: &str = "TEMP_";
pub const TRIAL_KEY_PREFIX: &str = "R_";
pub const MODEL_ID_DELIMITER: char = ':';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i64; 2]", into = "[i64; 2]")]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, (dx, dy): (i64, i64)) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl From<[i64; 2]> for Position {
    fn from([x, y]: [i64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Position> for [i64; 2] {
    fn from(p: Position) -> Self {
        [p.x, p.y]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

type TrialWire = (Vec<String>, Vec<Position>);

/// One walk: the raw reply for every step and the position at the start of that step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TrialWire", into = "TrialWire")]
pub struct TrialRecord {
    pub decisions: Vec<String>,
    pub positions: Vec<Position>,
}

impl From<TrialWire> for TrialRecord {
    fn from((decisions, positions): TrialWire) -> Self {
        Self {
            decisions,
            positions,
        }
    }
}

impl From<TrialRecord> for TrialWire {
    fn from(t: TrialRecord) -> Self {
        (t.decisions, t.positions)
    }
}

impl TrialRecord {
    pub fn push(&mut self, position: Position, decision: String) {
        self.positions.push(position);
        self.decisions.push(decision);
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// `TEMP_<t>`, with the float always carrying a decimal point (`0.0`, `0.2`, `1.0`).
pub fn temperature_label(temperature: f64) -> String {
    format!("{TEMPERATURE_KEY_PREFIX}{temperature:?}")
}

pub fn trial_label(index: usize) -> String {
    format!("{TRIAL_KEY_PREFIX}{index}")
}

fn parse_temperature_label(label: &str) -> Option<f64> {
    label
        .strip_prefix(TEMPERATURE_KEY_PREFIX)
        .and_then(|t| t.parse().ok())
}

fn parse_trial_label(label: &str) -> Option<usize> {
    label
        .strip_prefix(TRIAL_KEY_PREFIX)
        .and_then(|i| i.parse().ok())
}

/// All trials run at one temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureBucket {
    pub temperature: f64,
    pub label: String,
    pub trials: Vec<TrialRecord>,
    /// Wall-clock time of the batch. Not persisted; zero after a load.
    pub elapsed: Duration,
}

impl TemperatureBucket {
    pub fn new(temperature: f64) -> Self {
        Self {
            temperature,
            label: temperature_label(temperature),
            trials: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn trial(&self, index: usize) -> Result<&TrialRecord, DocumentError> {
        self.trials
            .get(index)
            .ok_or_else(|| DocumentError::TrialNotFound {
                label: self.label.clone(),
                index,
            })
    }
}

/// One model's sweep over temperatures.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRun {
    pub model: String,
    pub buckets: Vec<TemperatureBucket>,
}

impl ModelRun {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            buckets: Vec::new(),
        }
    }

    pub fn bucket(&self, temperature: f64) -> Result<&TemperatureBucket, DocumentError> {
        self.bucket_by_label(&temperature_label(temperature))
    }

    pub fn bucket_by_label(&self, label: &str) -> Result<&TemperatureBucket, DocumentError> {
        self.buckets
            .iter()
            .find(|b| b.label == label)
            .ok_or_else(|| DocumentError::TemperatureNotFound {
                model: self.model.clone(),
                label: label.to_string(),
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkDocument {
    pub runs: Vec<ModelRun>,
}

impl WalkDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a run, replacing any earlier run for the same model in place.
    pub fn insert(&mut self, run: ModelRun) {
        match self.runs.iter_mut().find(|r| r.model == run.model) {
            Some(existing) => *existing = run,
            None => self.runs.push(run),
        }
    }

    pub fn model(&self, model: &str) -> Result<&ModelRun, DocumentError> {
        self.runs
            .iter()
            .find(|r| r.model == model)
            .ok_or_else(|| DocumentError::ModelNotFound(model.to_string()))
    }

    /// Positions of trials `0..rounds` for one (model, temperature) pair.
    pub fn paths(
        &self,
        model: &str,
        temperature: f64,
        rounds: usize,
    ) -> Result<Vec<Vec<Position>>, DocumentError> {
        let bucket = self.model(model)?.bucket(temperature)?;
        (0..rounds)
            .map(|i| bucket.trial(i).map(|t| t.positions.clone()))
            .collect()
    }

    pub fn to_json_string(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Writes the whole document in one go, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let write_err = |source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let file = File::create(path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush().map_err(write_err)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let file = File::open(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// `<namespace>_<name>.json` from a `<namespace>:<name>` model id.
///
/// Only the first two segments are used, so `a:b:c` maps to `a_b.json`.
pub fn data_file_name(model: &str) -> Result<String, WalkError> {
    let mut parts = model.split(MODEL_ID_DELIMITER);
    match (parts.next(), parts.next()) {
        (Some(namespace), Some(name)) => Ok(format!("{namespace}_{name}.json")),
        _ => Err(WalkError::MalformedModelId(model.to_string())),
    }
}

pub fn data_file_path(data_dir: &Path, model: &str) -> Result<PathBuf, WalkError> {
    Ok(data_dir.join(data_file_name(model)?))
}

/// A JSON object read in document order.
struct OrderedEntries<V>(Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = OrderedEntries<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a json object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, V>()? {
                    entries.push((k, v));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

impl Serialize for TemperatureBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.trials.len()))?;
        for (i, trial) in self.trials.iter().enumerate() {
            map.serialize_entry(&trial_label(i), trial)?;
        }
        map.end()
    }
}

impl Serialize for WalkDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.runs.len()))?;
        for run in &self.runs {
            let buckets: Vec<(&str, &TemperatureBucket)> =
                run.buckets.iter().map(|b| (b.label.as_str(), b)).collect();
            map.serialize_entry(&run.model, &BorrowedEntries(&buckets))?;
        }
        map.end()
    }
}

/// A JSON object written in slice order.
struct BorrowedEntries<'a, V>(&'a [(&'a str, V)]);

impl<V: Serialize> Serialize for BorrowedEntries<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

type DocumentWire = OrderedEntries<OrderedEntries<OrderedEntries<TrialRecord>>>;

fn bucket_from_wire(
    label: String,
    trials: OrderedEntries<TrialRecord>,
) -> Result<TemperatureBucket, String> {
    let temperature = parse_temperature_label(&label)
        .ok_or_else(|| format!("malformed temperature key {label:?}"))?;

    let mut indexed = trials
        .0
        .into_iter()
        .map(|(key, trial)| {
            parse_trial_label(&key)
                .map(|i| (i, trial))
                .ok_or_else(|| format!("malformed trial key {key:?} under {label}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    indexed.sort_by_key(|(i, _)| *i);
    if let Some((pos, (i, _))) = indexed.iter().enumerate().find(|(pos, (i, _))| pos != i) {
        return Err(format!(
            "trial keys under {label} are not contiguous: expected R_{pos}, found R_{i}"
        ));
    }

    Ok(TemperatureBucket {
        temperature,
        label,
        trials: indexed.into_iter().map(|(_, t)| t).collect(),
        elapsed: Duration::ZERO,
    })
}

impl<'de> Deserialize<'de> for WalkDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = DocumentWire::deserialize(deserializer)?;
        let runs = wire
            .0
            .into_iter()
            .map(|(model, buckets)| {
                let buckets = buckets
                    .0
                    .into_iter()
                    .map(|(label, trials)| bucket_from_wire(label, trials))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ModelRun { model, buckets })
            })
            .collect::<Result<Vec<_>, String>>()
            .map_err(serde::de::Error::custom)?;
        Ok(WalkDocument { runs })
    }
}
