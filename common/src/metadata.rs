//! Disease metadata table
//!
//! Loaded once from the disease/solution sheet and read-only afterwards.
//! Lookup is exact on normalized keys; fuzzy matching belongs to the
//! reconciliation check only.

use crate::csv::parse_csv_line;
use crate::error::{Error, Result};
use crate::names::{normalize_name, NormalizedName};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placeholder for a field the source does not provide
pub const UNKNOWN: &str = "Unknown";

/// Descriptive fields for one disease
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub disease: String,
    pub plant_name: String,
    pub scientific_name: String,
    pub causal_agent: String,
    pub cause: String,
    pub solution: String,
    pub medicine_usage: String,
}

impl Default for MetadataRecord {
    fn default() -> Self {
        Self {
            disease: UNKNOWN.into(),
            plant_name: UNKNOWN.into(),
            scientific_name: UNKNOWN.into(),
            causal_agent: UNKNOWN.into(),
            cause: UNKNOWN.into(),
            solution: UNKNOWN.into(),
            medicine_usage: UNKNOWN.into(),
        }
    }
}

impl MetadataRecord {
    /// Record with every field unknown except the disease name
    pub fn unknown(disease: &str) -> Self {
        Self {
            disease: or_unknown(disease),
            ..Default::default()
        }
    }

    pub(crate) fn set(&mut self, column: Column, value: String) {
        match column {
            Column::Disease => self.disease = value,
            Column::PlantName => self.plant_name = value,
            Column::ScientificName => self.scientific_name = value,
            Column::CausalAgent => self.causal_agent = value,
            Column::Cause => self.cause = value,
            Column::Solution => self.solution = value,
            Column::MedicineUsage => self.medicine_usage = value,
        }
    }

    pub(crate) fn get(&self, column: Column) -> &str {
        match column {
            Column::Disease => &self.disease,
            Column::PlantName => &self.plant_name,
            Column::ScientificName => &self.scientific_name,
            Column::CausalAgent => &self.causal_agent,
            Column::Cause => &self.cause,
            Column::Solution => &self.solution,
            Column::MedicineUsage => &self.medicine_usage,
        }
    }

    /// Number of fields that carry a real value
    pub fn known_fields(&self) -> usize {
        [
            &self.disease,
            &self.plant_name,
            &self.scientific_name,
            &self.causal_agent,
            &self.cause,
            &self.solution,
            &self.medicine_usage,
        ]
        .iter()
        .filter(|v| !is_unknown(v))
        .count()
    }
}

/// Empty cells become "Unknown"
pub fn or_unknown(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        UNKNOWN.to_string()
    } else {
        value.to_string()
    }
}

pub fn is_unknown(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(UNKNOWN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Column {
    Disease,
    PlantName,
    ScientificName,
    CausalAgent,
    Cause,
    Solution,
    MedicineUsage,
}

impl Column {
    pub(crate) const ALL: [Column; 7] = [
        Column::PlantName,
        Column::ScientificName,
        Column::Disease,
        Column::CausalAgent,
        Column::Cause,
        Column::Solution,
        Column::MedicineUsage,
    ];

    /// Label used when rendering a record
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Column::PlantName => "Plant Name",
            Column::ScientificName => "Plant Scientific Name",
            Column::Disease => "Disease",
            Column::CausalAgent => "Causal Agent",
            Column::Cause => "Cause of Disease",
            Column::Solution => "Solution",
            Column::MedicineUsage => "Use of Medicine",
        }
    }
}

/// Normalized header spellings accepted for each column
const COLUMN_ALIASES: &[(Column, &[&str])] = &[
    (Column::Disease, &["disease", "disease_name"]),
    (Column::PlantName, &["plant_name", "plant"]),
    (Column::ScientificName, &["plant_scientific_name", "scientific_name"]),
    (Column::CausalAgent, &["causal_agent", "agent"]),
    (Column::Cause, &["cause_of_disease", "cause", "causes"]),
    (Column::Solution, &["solution", "solutions", "treatment"]),
    (Column::MedicineUsage, &["use_of_medicine", "medicine_usage", "medicine", "medicines"]),
];

pub(crate) fn column_for_header(header: &str) -> Option<Column> {
    let key = normalize_name(header);
    COLUMN_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&key.as_str()))
        .map(|(column, _)| *column)
}

/// Metadata rows indexed by normalized disease and plant names
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    records: Vec<MetadataRecord>,
    by_disease: HashMap<NormalizedName, usize>,
    by_plant: HashMap<NormalizedName, usize>,
}

impl MetadataTable {
    /// Builds the table from a header row and data rows.
    ///
    /// # Returns
    /// * `Err(InvalidMetadata)` - the header has no "Disease" column
    pub fn from_rows<I, R, S>(header: &[S], rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let columns: Vec<Option<Column>> = header
            .iter()
            .map(|h| column_for_header(h.as_ref()))
            .collect();

        if !columns.contains(&Some(Column::Disease)) {
            let found = header
                .iter()
                .map(|h| h.as_ref().trim())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(Error::InvalidMetadata(format!(
                "required column 'Disease' is missing (found: {})",
                found
            )));
        }

        let mut table = Self::default();

        for row in rows {
            let mut record = MetadataRecord::default();
            let mut disease_cell = String::new();

            for (cell, column) in row.as_ref().iter().zip(&columns) {
                let Some(column) = column else { continue };
                let cell = cell.as_ref();
                if *column == Column::Disease {
                    disease_cell = cell.trim().to_string();
                }
                record.set(*column, or_unknown(cell));
            }

            // rows without a disease name carry nothing to look up
            if disease_cell.is_empty() {
                continue;
            }
            table.insert(record);
        }

        Ok(table)
    }

    /// Parses CSV content whose first line is the header
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut lines = content.lines().filter(|l| !l.trim().is_empty());
        let header = lines
            .next()
            .map(parse_csv_line)
            .ok_or_else(|| Error::InvalidMetadata("empty sheet".into()))?;
        let rows: Vec<Vec<String>> = lines.map(parse_csv_line).collect();
        Self::from_rows(&header, rows)
    }

    fn insert(&mut self, record: MetadataRecord) {
        let disease_key = NormalizedName::new(&record.disease);
        // first row wins on duplicate keys
        if self.by_disease.contains_key(&disease_key) {
            return;
        }

        let position = self.records.len();
        self.by_disease.insert(disease_key, position);
        if !is_unknown(&record.plant_name) {
            self.by_plant
                .entry(NormalizedName::new(&record.plant_name))
                .or_insert(position);
        }
        self.records.push(record);
    }

    /// Exact lookup by disease name, then by plant name
    pub fn metadata_for(&self, name: &NormalizedName) -> Option<&MetadataRecord> {
        self.by_disease
            .get(name)
            .or_else(|| self.by_plant.get(name))
            .map(|&i| &self.records[i])
    }

    /// `metadata_for` with a lookup error instead of `None`
    pub fn lookup(&self, name: &NormalizedName) -> Result<&MetadataRecord> {
        self.metadata_for(name)
            .ok_or_else(|| Error::MetadataNotFound(name.to_string()))
    }

    /// Normalized disease names in sheet order
    pub fn disease_names(&self) -> Vec<NormalizedName> {
        self.records
            .iter()
            .map(|r| NormalizedName::new(&r.disease))
            .collect()
    }

    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CSV: &str = r#"Plant Name,Plant Scientific Name,Disease,Causal Agent,Cause of Disease,Solution,Use of Medicine
Tomato,Solanum lycopersicum,Early Blight,Alternaria solani,"Warm, humid weather",Apply copper fungicide,Spray every 7 days
Apple,Malus domestica,Apple Scab,Venturia inaequalis,Wet spring,Remove fallen leaves,
Potato,Solanum tuberosum,,Unknown,,,
Tomato,Solanum lycopersicum,early_blight,Duplicate,Duplicate,Duplicate,Duplicate
"#;

    #[test]
    fn test_load_csv() {
        let table = MetadataTable::from_csv_str(TEST_CSV).unwrap();
        // empty disease row skipped, duplicate ignored
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_metadata_for_exact_normalized() {
        let table = MetadataTable::from_csv_str(TEST_CSV).unwrap();
        let record = table.metadata_for(&NormalizedName::new("EARLY_blight")).unwrap();
        assert_eq!(record.solution, "Apply copper fungicide");
        assert_eq!(record.cause, "Warm, humid weather");
        assert_eq!(record.causal_agent, "Alternaria solani");
    }

    #[test]
    fn test_metadata_for_plant_name() {
        let table = MetadataTable::from_csv_str(TEST_CSV).unwrap();
        let record = table.metadata_for(&NormalizedName::new("apple")).unwrap();
        assert_eq!(record.disease, "Apple Scab");
    }

    #[test]
    fn test_no_substring_matching() {
        let table = MetadataTable::from_csv_str(TEST_CSV).unwrap();
        assert!(table.metadata_for(&NormalizedName::new("blight")).is_none());
        assert!(table.metadata_for(&NormalizedName::new("tomato_early_blight")).is_none());
    }

    #[test]
    fn test_empty_cells_are_unknown() {
        let table = MetadataTable::from_csv_str(TEST_CSV).unwrap();
        let record = table.lookup(&NormalizedName::new("apple scab")).unwrap();
        assert_eq!(record.medicine_usage, UNKNOWN);
        assert_eq!(record.known_fields(), 6);
    }

    #[test]
    fn test_lookup_not_found() {
        let table = MetadataTable::from_csv_str(TEST_CSV).unwrap();
        let err = table.lookup(&NormalizedName::new("leaf_mold")).unwrap_err();
        assert!(matches!(err, Error::MetadataNotFound(ref k) if k == "leaf_mold"));
    }

    #[test]
    fn test_missing_disease_column() {
        let csv = "Plant,Solution\nTomato,Water less\n";
        let err = MetadataTable::from_csv_str(csv).unwrap_err();
        assert!(matches!(err, Error::InvalidMetadata(_)));
        assert!(format!("{}", err).contains("Disease"));
    }

    #[test]
    fn test_empty_sheet() {
        assert!(MetadataTable::from_csv_str("").is_err());
    }

    #[test]
    fn test_disease_names_normalized() {
        let table = MetadataTable::from_csv_str(TEST_CSV).unwrap();
        let names: Vec<String> = table.disease_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["early_blight", "apple_scab"]);
    }

    #[test]
    fn test_only_disease_column() {
        let header = ["Disease"];
        let rows = vec![vec!["Leaf Mold"]];
        let table = MetadataTable::from_rows(&header, rows).unwrap();
        let record = table.metadata_for(&NormalizedName::new("leaf mold")).unwrap();
        assert_eq!(record.disease, "Leaf Mold");
        assert_eq!(record.solution, UNKNOWN);
    }
}
