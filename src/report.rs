use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;

use crate::domain::ReportKind;
use crate::error::PokedexError;
use crate::flatten::{Cell, FlatTable, FlatTableRow};
use crate::store::write_bytes_atomic;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRows {
    pub kind: ReportKind,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub chosen_versions: Vec<String>,
}

/// A source column of the flat table, the header it is written under, and how its
/// cell is turned into text.
pub struct ColumnSpec<'a> {
    pub source: &'a str,
    pub header: &'a str,
    pub render: fn(&Cell) -> String,
}

impl<'a> ColumnSpec<'a> {
    pub const fn new(source: &'a str, header: &'a str) -> Self {
        Self {
            source,
            header,
            render: render_cell,
        }
    }

    pub const fn with(source: &'a str, header: &'a str, render: fn(&Cell) -> String) -> Self {
        Self {
            source,
            header,
            render,
        }
    }
}

pub fn project(kind: ReportKind, table: &FlatTable, settings: &ReportSettings) -> ReportRows {
    match kind {
        ReportKind::Membership => membership(table, &settings.chosen_versions),
        ReportKind::TypeSlots => type_slots(table),
        ReportKind::Bmi => bmi(table),
        ReportKind::Capitalized => capitalized(table),
        ReportKind::Sprites => sprites(table),
    }
}

pub fn select_columns<F>(
    kind: ReportKind,
    table: &FlatTable,
    columns: &[ColumnSpec<'_>],
    keep: F,
) -> ReportRows
where
    F: Fn(&FlatTableRow) -> bool,
{
    let header = columns
        .iter()
        .map(|column| column.header.to_string())
        .collect();
    let rows = table
        .rows()
        .iter()
        .filter(|row| keep(*row))
        .map(|row| {
            columns
                .iter()
                .map(|column| (column.render)(row.get(column.source)))
                .collect()
        })
        .collect();
    ReportRows { kind, header, rows }
}

pub fn membership(table: &FlatTable, chosen_versions: &[String]) -> ReportRows {
    const COLUMNS: [ColumnSpec<'static>; 6] = [
        ColumnSpec::new("name", "name"),
        ColumnSpec::new("id", "id"),
        ColumnSpec::new("base_experience", "base_experience"),
        ColumnSpec::new("weight", "weight"),
        ColumnSpec::new("height", "height"),
        ColumnSpec::new("order", "order"),
    ];
    select_columns(ReportKind::Membership, table, &COLUMNS, |row| {
        game_versions(row.get("game_indices"))
            .iter()
            .any(|version| chosen_versions.iter().any(|chosen| chosen == version))
    })
}

/// Version names out of a `game_indices` cell; anything unexpected yields none.
pub fn game_versions(cell: &Cell) -> Vec<&str> {
    cell.value()
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.pointer("/version/name").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

pub fn type_slots(table: &FlatTable) -> ReportRows {
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let (slot1, slot2) = slot_names(row.get("types"));
            vec![render_cell(row.get("name")), slot1, slot2]
        })
        .collect();
    ReportRows {
        kind: ReportKind::TypeSlots,
        header: vec![
            "POKEMON_NAME".to_string(),
            "SLOT1_NAME".to_string(),
            "SLOT2_NAME".to_string(),
        ],
        rows,
    }
}

/// Type names for slots 1 and 2. An entry's `slot` field wins over its position. PokeAPI
/// lists `types` in slot order, so both give the same columns for its data.
pub fn slot_names(cell: &Cell) -> (String, String) {
    let mut slots = [String::new(), String::new()];
    let Some(entries) = cell.value().and_then(Value::as_array) else {
        let [slot1, slot2] = slots;
        return (slot1, slot2);
    };
    for (position, entry) in entries.iter().enumerate() {
        let slot = entry
            .get("slot")
            .and_then(Value::as_u64)
            .map(|slot| slot as usize)
            .unwrap_or(position + 1);
        let Some(name) = entry.pointer("/type/name").and_then(Value::as_str) else {
            continue;
        };
        if (1..=slots.len()).contains(&slot) {
            slots[slot - 1] = name.to_string();
        }
    }
    let [slot1, slot2] = slots;
    (slot1, slot2)
}

pub fn bmi(table: &FlatTable) -> ReportRows {
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let weight = decimal_units(row.get("weight"));
            let height = decimal_units(row.get("height"));
            let ratio = match (weight, height) {
                (Some(weight), Some(height)) if height != 0.0 => Some(round2(weight / height)),
                _ => None,
            };
            vec![
                render_cell(row.get("name")),
                weight.map(render_float).unwrap_or_default(),
                height.map(render_float).unwrap_or_default(),
                ratio.map(render_float).unwrap_or_default(),
            ]
        })
        .collect();
    ReportRows {
        kind: ReportKind::Bmi,
        header: vec![
            "name".to_string(),
            "weight".to_string(),
            "height".to_string(),
            "bmi(kg/m)".to_string(),
        ],
        rows,
    }
}

/// PokeAPI reports weight in hectograms and height in decimetres.
fn decimal_units(cell: &Cell) -> Option<f64> {
    cell.value().and_then(Value::as_f64).map(|raw| raw / 10.0)
}

/// Two decimals, exact halves to even (`0.125` -> `0.12`).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

pub fn capitalized(table: &FlatTable) -> ReportRows {
    const COLUMNS: [ColumnSpec<'static>; 1] =
        [ColumnSpec::with("name", "name", render_capitalized)];
    select_columns(ReportKind::Capitalized, table, &COLUMNS, |_| true)
}

fn render_capitalized(cell: &Cell) -> String {
    capitalize(&render_cell(cell))
}

/// First character upper case, the rest lower case.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub fn sprites(table: &FlatTable) -> ReportRows {
    const COLUMNS: [ColumnSpec<'static>; 1] =
        [ColumnSpec::new("sprites.front_default", "front_default_url")];
    select_columns(ReportKind::Sprites, table, &COLUMNS, |_| true)
}

pub fn render_cell(cell: &Cell) -> String {
    match cell {
        Cell::Missing | Cell::Present(Value::Null) => String::new(),
        Cell::Present(Value::String(text)) => text.clone(),
        Cell::Present(Value::Bool(flag)) => (if *flag { "True" } else { "False" }).to_string(),
        Cell::Present(Value::Number(number)) => {
            if let Some(int) = number.as_i64() {
                int.to_string()
            } else if let Some(int) = number.as_u64() {
                int.to_string()
            } else {
                number.as_f64().map(render_float).unwrap_or_default()
            }
        }
        Cell::Present(other) => other.to_string(),
    }
}

/// Shortest round-trip form, keeping a trailing `.0` on integral values.
pub fn render_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: Utf8PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: Utf8PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    pub fn path(&self, kind: ReportKind) -> Utf8PathBuf {
        self.output_dir.join(kind.file_name())
    }

    pub fn write(&self, report: &ReportRows) -> Result<Utf8PathBuf, PokedexError> {
        let path = self.path(report.kind);
        let content = to_csv(report).map_err(|message| PokedexError::ReportWrite {
            file: path.to_string(),
            message,
        })?;
        write_bytes_atomic(&path, &content)?;
        Ok(path)
    }
}

pub fn to_csv(report: &ReportRows) -> Result<Vec<u8>, String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(&report.header)
        .map_err(|err| err.to_string())?;
    for row in &report.rows {
        writer.write_record(row).map_err(|err| err.to_string())?;
    }
    writer.into_inner().map_err(|err| err.to_string())
}
