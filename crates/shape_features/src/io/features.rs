use std::fs::{self, OpenOptions};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, ShapeError},
    types::FeatureVector,
};

/// A feature vector tagged with the name of the object it describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub label: String,
    pub features: FeatureVector,
}

impl FeatureRecord {
    pub fn new(label: impl Into<String>, features: FeatureVector) -> Self {
        Self {
            label: label.into(),
            features,
        }
    }

    /// `label,f0,...,f8`
    pub fn to_string_record(&self) -> StringRecord {
        let mut record = StringRecord::new();
        record.push_field(&self.label);
        for value in self.features.as_slice() {
            record.push_field(&value.to_string());
        }
        record
    }

    pub fn from_string_record(record: &StringRecord) -> Result<Self> {
        let mut fields = record.iter();
        let label = fields
            .next()
            .filter(|l| !l.is_empty())
            .ok_or_else(|| ShapeError::MalformedRecord("missing label".to_string()))?;

        let values = fields
            .map(|f| {
                f.trim()
                    .parse::<f64>()
                    .map_err(|e| ShapeError::MalformedRecord(format!("{f:?}: {e}")))
            })
            .collect::<Result<Vec<f64>>>()?;

        let values: [f64; FeatureVector::LEN] = values.try_into().map_err(|v: Vec<f64>| {
            ShapeError::MalformedRecord(format!(
                "expected {} values, got {}",
                FeatureVector::LEN,
                v.len()
            ))
        })?;

        Ok(Self::new(label, FeatureVector::from_array(values)))
    }
}

/// Append one record to a CSV file, creating it when missing.
pub fn append_csv<P: AsRef<Path>>(path: P, record: &FeatureRecord) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(&record.to_string_record())?;
    writer.flush()?;
    Ok(())
}

/// Read every record of a CSV file written by [`append_csv`].
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<FeatureRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    reader
        .records()
        .map(|record| FeatureRecord::from_string_record(&record?))
        .collect()
}

/// Save records as pretty JSON.
pub fn save_json<P: AsRef<Path>>(path: P, records: &[FeatureRecord]) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(records)?)?;
    Ok(())
}
