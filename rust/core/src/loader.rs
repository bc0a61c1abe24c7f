// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-cloud loading
//!
//! Reads `(longitude, latitude, elevation)` records from header-driven CSV
//! exports or JSON arrays. Column names are resolved through a [`CsvSchema`]
//! so both the water-level (`Longitude,Latitude,Water_Level`) and the terrain
//! (`longitude,latitude,elevation`) exports load through the same path.
//!
//! Lines are located with [memchr](https://docs.rs/memchr) and numbers are
//! parsed with [fast-float](https://docs.rs/fast-float).

use crate::error::{Error, Result};
use crate::sample::{PointCloud, Sample};
use rustc_hash::FxHashMap;
use std::path::Path;

/// Column names used to read samples out of a CSV header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvSchema {
    pub longitude: String,
    pub latitude: String,
    pub elevation: String,
}

impl CsvSchema {
    pub fn new(
        longitude: impl Into<String>,
        latitude: impl Into<String>,
        elevation: impl Into<String>,
    ) -> Self {
        Self {
            longitude: longitude.into(),
            latitude: latitude.into(),
            elevation: elevation.into(),
        }
    }

    /// SWOT water surface elevation export
    pub fn water_level() -> Self {
        Self::new("Longitude", "Latitude", "Water_Level")
    }

    /// Terrain elevation export
    pub fn elevation() -> Self {
        Self::new("longitude", "latitude", "elevation")
    }

    /// Built-in schemas, in detection order
    pub fn builtin() -> [Self; 2] {
        [Self::water_level(), Self::elevation()]
    }

    fn columns(&self) -> [&str; 3] {
        [&self.longitude, &self.latitude, &self.elevation]
    }

    /// Pick the first built-in schema whose columns are all present in `header`.
    ///
    /// When none matches, the error names the first missing column of the
    /// closest schema together with the keys that are available.
    pub fn detect(header: &[String]) -> Result<Self> {
        let mut best: Option<(usize, Self)> = None;

        for schema in Self::builtin() {
            let present = schema
                .columns()
                .into_iter()
                .filter(|column| header.iter().any(|h| h == column))
                .count();
            if present == 3 {
                return Ok(schema);
            }
            if best.as_ref().map_or(true, |(count, _)| present > *count) {
                best = Some((present, schema));
            }
        }

        let (_, closest) = best.unwrap_or_else(|| (0, Self::water_level()));
        let missing = closest
            .columns()
            .into_iter()
            .find(|column| !header.iter().any(|h| h == column))
            .unwrap_or(closest.longitude.as_str())
            .to_string();

        Err(Error::MissingField {
            field: missing,
            available: header.to_vec(),
        })
    }

    /// Resolve the column index of every field of the schema
    fn resolve(&self, header: &[String]) -> Result<[usize; 3]> {
        let index: FxHashMap<&str, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut resolved = [0usize; 3];
        for (slot, column) in resolved.iter_mut().zip(self.columns()) {
            *slot = *index.get(column).ok_or_else(|| Error::MissingField {
                field: column.to_string(),
                available: header.to_vec(),
            })?;
        }
        Ok(resolved)
    }
}

/// Iterate over lines of a byte buffer, yielding (1-based line number, line)
/// with trailing `\r` removed
fn lines(bytes: &[u8]) -> impl Iterator<Item = (usize, &[u8])> {
    let mut start = 0usize;
    let mut line_no = 0usize;
    let mut done = false;

    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let remaining = &bytes[start..];
        let line = match memchr::memchr(b'\n', remaining) {
            Some(offset) => {
                start += offset + 1;
                &remaining[..offset]
            }
            None => {
                done = true;
                remaining
            }
        };
        line_no += 1;
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        Some((line_no, line))
    })
}

/// Split a CSV line on commas, trimming whitespace and surrounding quotes
fn split_fields(line: &[u8]) -> Vec<&[u8]> {
    let mut fields = Vec::with_capacity(4);
    let mut start = 0usize;
    for comma in memchr::memchr_iter(b',', line) {
        fields.push(clean_field(&line[start..comma]));
        start = comma + 1;
    }
    fields.push(clean_field(&line[start..]));
    fields
}

#[inline]
fn clean_field(field: &[u8]) -> &[u8] {
    let field = field.trim_ascii();
    field
        .strip_prefix(b"\"")
        .and_then(|f| f.strip_suffix(b"\""))
        .unwrap_or(field)
}

fn parse_header(line: &[u8]) -> Vec<String> {
    // Excel exports prepend a UTF-8 byte order mark
    let line = line.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(line);
    split_fields(line)
        .into_iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

#[inline]
fn parse_value(raw: &[u8], line: usize, field: &str) -> Result<f64> {
    match fast_float::parse::<f64, _>(raw) {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::InvalidValue {
            line,
            field: field.to_string(),
            value: String::from_utf8_lossy(raw).into_owned(),
        }),
    }
}

#[inline]
fn field_at<'a>(fields: &[&'a [u8]], idx: usize, name: &str, header: &[String]) -> Result<&'a [u8]> {
    fields.get(idx).copied().ok_or_else(|| Error::MissingField {
        field: name.to_string(),
        available: header.to_vec(),
    })
}

/// Parse CSV bytes, detecting the schema from the header
pub fn parse_csv(bytes: &[u8]) -> Result<PointCloud> {
    parse_csv_inner(bytes, None)
}

/// Parse CSV bytes with an explicit schema
pub fn parse_csv_with_schema(bytes: &[u8], schema: &CsvSchema) -> Result<PointCloud> {
    parse_csv_inner(bytes, Some(schema))
}

fn parse_csv_inner(bytes: &[u8], schema: Option<&CsvSchema>) -> Result<PointCloud> {
    let mut lines = lines(bytes).filter(|(_, line)| !line.trim_ascii().is_empty());

    let header = match lines.next() {
        Some((_, line)) => parse_header(line),
        None => {
            return Err(Error::MissingField {
                field: schema
                    .map(|s| s.longitude.clone())
                    .unwrap_or_else(|| CsvSchema::water_level().longitude),
                available: Vec::new(),
            })
        }
    };

    let schema = match schema {
        Some(schema) => schema.clone(),
        None => CsvSchema::detect(&header)?,
    };
    let [lon_idx, lat_idx, elev_idx] = schema.resolve(&header)?;

    // Rough estimate: ~40 bytes per record
    let mut cloud = Vec::with_capacity(bytes.len() / 40);

    for (line_no, line) in lines {
        let fields = split_fields(line);

        let longitude = parse_value(
            field_at(&fields, lon_idx, &schema.longitude, &header)?,
            line_no,
            &schema.longitude,
        )?;
        let latitude = parse_value(
            field_at(&fields, lat_idx, &schema.latitude, &header)?,
            line_no,
            &schema.latitude,
        )?;
        let elevation = parse_value(
            field_at(&fields, elev_idx, &schema.elevation, &header)?,
            line_no,
            &schema.elevation,
        )?;

        cloud.push(Sample::new(longitude, latitude, elevation));
    }

    Ok(cloud)
}

/// Parse a JSON array of `{longitude, latitude, elevation}` objects
pub fn parse_json(bytes: &[u8]) -> Result<PointCloud> {
    let records: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_slice(bytes)?;
    let mut cloud = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let field = |name: &str| -> Result<f64> {
            let value = record.get(name).ok_or_else(|| Error::MissingField {
                field: name.to_string(),
                available: record.keys().cloned().collect(),
            })?;
            value
                .as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| Error::InvalidValue {
                    line: i + 1,
                    field: name.to_string(),
                    value: value.to_string(),
                })
        };
        cloud.push(Sample::new(
            field("longitude")?,
            field("latitude")?,
            field("elevation")?,
        ));
    }

    Ok(cloud)
}

/// Load a point cloud from disk.
///
/// Files ending in `.json` are read as JSON arrays, everything else as CSV
/// with schema detection.
pub fn load_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let cloud = if is_json {
        parse_json(&bytes)?
    } else {
        parse_csv(&bytes)?
    };

    tracing::info!(
        path = %path.display(),
        total = cloud.len(),
        "Loaded point cloud"
    );

    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATER_LEVEL_CSV: &str = "Longitude,Latitude,Water_Level\n\
        -79.00,43.80,74.21\n\
        -78.95,43.82,74.25\r\n\
        \n\
        -78.90,43.85,74.30\n";

    #[test]
    fn test_parse_water_level_csv() {
        let cloud = parse_csv(WATER_LEVEL_CSV.as_bytes()).unwrap();
        assert_eq!(cloud.len(), 3);
        assert_eq!(cloud[0], Sample::new(-79.0, 43.8, 74.21));
        assert_eq!(cloud[1].latitude, 43.82);
        assert_eq!(cloud[2].elevation, 74.30);
    }

    #[test]
    fn test_parse_elevation_csv_with_reordered_columns() {
        let csv = "elevation,latitude,longitude\n120.5,43.7,-79.1\n";
        let cloud = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(cloud, vec![Sample::new(-79.1, 43.7, 120.5)]);
    }

    #[test]
    fn test_header_with_bom_and_quotes() {
        let csv = "\u{feff}\"Longitude\",\"Latitude\",\"Water_Level\"\n1.0,2.0,3.0";
        let cloud = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(cloud, vec![Sample::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn test_missing_column_lists_available_keys() {
        let csv = "Longitude,Latitude,Depth\n1.0,2.0,3.0\n";
        match parse_csv(csv.as_bytes()) {
            Err(Error::MissingField { field, available }) => {
                assert_eq!(field, "Water_Level");
                assert_eq!(available, vec!["Longitude", "Latitude", "Depth"]);
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_short_row_is_missing_field() {
        let csv = "longitude,latitude,elevation\n1.0,2.0\n";
        let result = parse_csv(csv.as_bytes());
        assert!(matches!(result, Err(Error::MissingField { ref field, .. }) if field == "elevation"));
    }

    #[test]
    fn test_invalid_number_reports_line() {
        let csv = "longitude,latitude,elevation\n1.0,2.0,3.0\n1.0,abc,3.0\n";
        match parse_csv(csv.as_bytes()) {
            Err(Error::InvalidValue { line, field, value }) => {
                assert_eq!(line, 3);
                assert_eq!(field, "latitude");
                assert_eq!(value, "abc");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_explicit_schema() {
        let csv = "x,y,wse\n5.0,6.0,7.0\n";
        let schema = CsvSchema::new("x", "y", "wse");
        let cloud = parse_csv_with_schema(csv.as_bytes(), &schema).unwrap();
        assert_eq!(cloud, vec![Sample::new(5.0, 6.0, 7.0)]);
    }

    #[test]
    fn test_parse_json_cloud() {
        let json = r#"[
            {"longitude": -79.0, "latitude": 43.8, "elevation": 10.0},
            {"longitude": -78.9, "latitude": 43.9, "elevation": 12.5}
        ]"#;
        let cloud = parse_json(json.as_bytes()).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud[1].elevation, 12.5);
    }

    #[test]
    fn test_parse_json_missing_field() {
        let json = r#"[{"longitude": -79.0, "latitude": 43.8}]"#;
        match parse_json(json.as_bytes()) {
            Err(Error::MissingField { field, available }) => {
                assert_eq!(field, "elevation");
                assert_eq!(available.len(), 2);
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_is_missing_field() {
        assert!(matches!(parse_csv(b""), Err(Error::MissingField { .. })));
    }
}
