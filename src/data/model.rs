use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// FieldValue – a single cell of a loaded export row
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as it arrives from a spreadsheet or CSV
/// export. Exports are loosely typed: numbers may come in as numeric strings
/// and dates as day serials, so accessors do the coercion.
/// Using `BTreeMap` / `BTreeSet` downstream so `FieldValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put FieldValue in BTreeSet --

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use FieldValue::*;
        fn discriminant(v: &FieldValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for FieldValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::String(s) => s.hash(state),
            FieldValue::Integer(i) => i.hash(state),
            FieldValue::Float(f) => f.to_bits().hash(state),
            FieldValue::Bool(b) => b.hash(state),
            FieldValue::Null => {}
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Null => write!(f, "-"),
        }
    }
}

impl FieldValue {
    /// Interpret the value as an `f64`. Numeric strings coerce; a value
    /// that is absent or non-numeric yields `None`, never NaN.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) if v.is_finite() => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::String(s) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => None,
            },
            _ => None,
        }
    }

    /// Textual form for identity/categorical columns; `None` for Null.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

// ---------------------------------------------------------------------------
// HeatRecord – one furnace cycle (colada) as loaded
// ---------------------------------------------------------------------------

/// A single furnace process cycle: raw column name → value, one row of the
/// source export.
#[derive(Debug, Clone, Default)]
pub struct HeatRecord {
    pub fields: BTreeMap<String, FieldValue>,
}

impl HeatRecord {
    pub fn new(fields: BTreeMap<String, FieldValue>) -> Self {
        HeatRecord { fields }
    }

    /// Raw value of a column, `Null` treated as absent.
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column).filter(|v| !v.is_null())
    }

    /// Numeric reading of a column (numbers and numeric strings).
    pub fn numeric(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(FieldValue::as_f64)
    }

    /// Textual reading of a column.
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).and_then(FieldValue::as_text)
    }
}

// ---------------------------------------------------------------------------
// FurnaceDataset – the complete loaded export
// ---------------------------------------------------------------------------

/// The full parsed export with pre-computed column indices. The per-column
/// unique value sets drive the filter option lists (available steel grades,
/// product families, heat ids).
#[derive(Debug, Clone, Default)]
pub struct FurnaceDataset {
    /// All heats (rows), in file order.
    pub records: Vec<HeatRecord>,
    /// Ordered list of column names seen across all rows.
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<FieldValue>>,
}

impl FurnaceDataset {
    /// Build column indices from the loaded rows.
    pub fn from_records(records: Vec<HeatRecord>) -> Self {
        let mut column_names_set: BTreeSet<String> = BTreeSet::new();
        let mut unique_values: BTreeMap<String, BTreeSet<FieldValue>> = BTreeMap::new();

        for rec in &records {
            for (col, val) in &rec.fields {
                column_names_set.insert(col.clone());
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }
        let column_names: Vec<String> = column_names_set.into_iter().collect();
        FurnaceDataset {
            records,
            column_names,
            unique_values,
        }
    }

    /// Sorted non-null textual values of a column (filter option list).
    pub fn options(&self, column: &str) -> Vec<String> {
        self.unique_values
            .get(column)
            .map(|vals| vals.iter().filter_map(FieldValue::as_text).collect())
            .unwrap_or_default()
    }

    /// Number of heats.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// FurnaceProfile – per-furnace-type column mapping
// ---------------------------------------------------------------------------

/// Column mapping for one furnace type. The exports of the different
/// furnaces carry the same roles under different column names; one generic
/// pipeline parameterised by a profile replaces per-furnace copies of the
/// filtering and metric logic.
#[derive(Debug, Clone)]
pub struct FurnaceProfile {
    pub name: &'static str,
    /// Heat / colada identifier column.
    pub heat_column: Option<&'static str>,
    /// Cycle start instant (serial number or date string).
    pub start_column: &'static str,
    /// Cycle end instant; falls back to the start when absent.
    pub end_column: Option<&'static str>,
    /// Steel grade column; when `None` the grade comes from the
    /// variable-schedule join.
    pub grade_column: Option<&'static str>,
    /// Product family / group column.
    pub family_column: Option<&'static str>,
    /// Binary status column: 1 = optimized, 0 = pending.
    pub status_column: Option<&'static str>,
    /// Total consumption for the substitution metric; when `None` the
    /// original sub-measurement doubles as the total (direct pair form).
    pub total_column: Option<&'static str>,
    /// Original (operator) sub-measurement.
    pub original_column: Option<&'static str>,
    /// Optimized (model) sub-measurement.
    pub optimized_column: Option<&'static str>,
    /// Precomputed improvement percentage carried by some exports; used as
    /// fallback when the measurement triple is incomplete.
    pub reported_pct_column: Option<&'static str>,
}

impl FurnaceProfile {
    /// Electric-arc furnace export: per-heat kWh totals with a TAP-stage
    /// sub-consumption pair, grade and family carried inline.
    pub fn eaf() -> Self {
        FurnaceProfile {
            name: "EAF",
            heat_column: Some("colada"),
            start_column: "fecha_colada",
            end_column: None,
            grade_column: Some("grado_acero"),
            family_column: Some("familia"),
            status_column: Some("Status"),
            total_column: Some("kwh_total"),
            original_column: Some("kwh_tap4_original"),
            optimized_column: Some("kwh_tap4_optimo"),
            reported_pct_column: Some("mejora_kwh_pct"),
        }
    }

    /// Pit furnace export: start/end window, direct original/optimized
    /// consumption pair, grade resolved through the schedule join.
    pub fn pit() -> Self {
        FurnaceProfile {
            name: "PIT",
            heat_column: None,
            start_column: "Fecha_inicio",
            end_column: Some("Fecha_final"),
            grade_column: None,
            family_column: None,
            status_column: Some("Status"),
            total_column: None,
            original_column: Some("Consumo_original"),
            optimized_column: Some("Consumo_optimizado"),
            reported_pct_column: Some("Mejora_estimada_porcentaje"),
        }
    }
}
