use camino::Utf8PathBuf;
use serde_json::{Value, json};

use pokedex_reports::domain::ReportKind;
use pokedex_reports::flatten::{Cell, FlatTable, build_table};
use pokedex_reports::report::{
    ColumnSpec, ReportSettings, ReportWriter, bmi, capitalize, membership, project, render_cell,
    round2, select_columns, slot_names, sprites, to_csv, type_slots,
};

fn table(records: &[Value]) -> FlatTable {
    build_table(records).unwrap()
}

fn chosen() -> Vec<String> {
    ["red", "blue", "leafgreen", "white"]
        .iter()
        .map(|name| name.to_string())
        .collect()
}

#[test]
fn bmi_scales_and_rounds() {
    let rows = bmi(&table(&[json!({"name": "bulbasaur", "weight": 690, "height": 7})]));
    assert_eq!(rows.header, vec!["name", "weight", "height", "bmi(kg/m)"]);
    assert_eq!(rows.rows, vec![vec!["bulbasaur", "69.0", "0.7", "98.57"]]);
}

#[test]
fn bmi_rounds_half_cents_to_even() {
    let rows = bmi(&table(&[
        json!({"name": "a", "weight": 1, "height": 8}),
        json!({"name": "b", "weight": 2, "height": 16}),
    ]));
    assert_eq!(rows.rows[0], vec!["a", "0.1", "0.8", "0.12"]);
    assert_eq!(rows.rows[1], vec!["b", "0.2", "1.6", "0.12"]);
}

#[test]
fn round2_ties_go_to_even_digit() {
    assert_eq!(round2(0.125), 0.12);
    assert_eq!(round2(0.135), 0.14);
    assert_eq!(round2(98.5714), 98.57);
    assert_eq!(round2(-0.125), -0.12);
}

#[test]
fn bmi_tolerates_missing_and_zero_height() {
    let rows = bmi(&table(&[
        json!({"name": "a", "weight": 10, "height": 0}),
        json!({"name": "b"}),
    ]));
    assert_eq!(rows.rows[0], vec!["a", "1.0", "0.0", ""]);
    assert_eq!(rows.rows[1], vec!["b", "", "", ""]);
}

#[test]
fn capitalization() {
    assert_eq!(capitalize("bulbasaur"), "Bulbasaur");
    assert_eq!(capitalize("IVYSAUR"), "Ivysaur");

    let rows = project(
        ReportKind::Capitalized,
        &table(&[json!({"name": "bulbasaur"}), json!({"name": "IVYSAUR"})]),
        &ReportSettings {
            chosen_versions: chosen(),
        },
    );
    assert_eq!(rows.header, vec!["name"]);
    assert_eq!(rows.rows, vec![vec!["Bulbasaur"], vec!["Ivysaur"]]);
}

#[test]
fn membership_tolerates_missing_game_indices() {
    let records = [
        json!({
            "name": "bulbasaur", "id": 1, "base_experience": 64, "weight": 69, "height": 7, "order": 1,
            "game_indices": [{"game_index": 153, "version": {"name": "red"}}]
        }),
        json!({"name": "meltan", "id": 808, "base_experience": 150, "weight": 80, "height": 2, "order": 1180}),
        json!({
            "name": "chikorita", "id": 152, "base_experience": 64, "weight": 64, "height": 9, "order": 227,
            "game_indices": [{"game_index": 152, "version": {"name": "gold"}}]
        }),
    ];
    let rows = membership(&table(&records), &chosen());

    assert_eq!(
        rows.header,
        vec!["name", "id", "base_experience", "weight", "height", "order"]
    );
    assert_eq!(rows.rows, vec![vec!["bulbasaur", "1", "64", "69", "7", "1"]]);
}

#[test]
fn type_slots_fill_blanks() {
    let rows = type_slots(&table(&[
        json!({"name": "bulbasaur", "types": [
            {"slot": 2, "type": {"name": "poison"}},
            {"slot": 1, "type": {"name": "grass"}}
        ]}),
        json!({"name": "charmander", "types": [{"slot": 1, "type": {"name": "fire"}}]}),
        json!({"name": "unknown"}),
    ]));

    assert_eq!(rows.header, vec!["POKEMON_NAME", "SLOT1_NAME", "SLOT2_NAME"]);
    assert_eq!(
        rows.rows,
        vec![
            vec!["bulbasaur", "grass", "poison"],
            vec!["charmander", "fire", ""],
            vec!["unknown", "", ""],
        ]
    );
}

#[test]
fn slot_position_is_used_without_slot_field() {
    let cell = Cell::Present(json!([{"type": {"name": "water"}}, {"type": {"name": "ice"}}]));
    assert_eq!(slot_names(&cell), ("water".to_string(), "ice".to_string()));
}

#[test]
fn missing_sprite_keeps_row() {
    let rows = sprites(&table(&[
        json!({"name": "a", "sprites": {"front_default": "https://example.test/a.png"}}),
        json!({"name": "b", "sprites": {"front_default": null}}),
        json!({"name": "c"}),
    ]));
    assert_eq!(rows.header, vec!["front_default_url"]);
    assert_eq!(
        rows.rows,
        vec![vec!["https://example.test/a.png"], vec![""], vec![""]]
    );
}

#[test]
fn declarative_selection_renames() {
    const COLUMNS: [ColumnSpec<'static>; 2] = [
        ColumnSpec::new("species.name", "species"),
        ColumnSpec::new("id", "ID"),
    ];
    let rows = select_columns(
        ReportKind::Membership,
        &table(&[json!({"id": 7, "species": {"name": "squirtle"}}), json!({"id": 8})]),
        &COLUMNS,
        |row| row.get("id") != &Cell::Present(json!(8)),
    );
    assert_eq!(rows.header, vec!["species", "ID"]);
    assert_eq!(rows.rows, vec![vec!["squirtle", "7"]]);
}

#[test]
fn cell_rendering() {
    assert_eq!(render_cell(&Cell::Missing), "");
    assert_eq!(render_cell(&Cell::Present(Value::Null)), "");
    assert_eq!(render_cell(&Cell::Present(json!(12))), "12");
    assert_eq!(render_cell(&Cell::Present(json!(1.5))), "1.5");
    assert_eq!(render_cell(&Cell::Present(json!(true))), "True");
    assert_eq!(render_cell(&Cell::Present(json!([1, 2]))), "[1,2]");
}

#[test]
fn csv_has_header_and_quotes() {
    let rows = type_slots(&table(&[json!({"name": "mr, mime"})]));
    let csv = String::from_utf8(to_csv(&rows).unwrap()).unwrap();
    assert_eq!(csv, "POKEMON_NAME,SLOT1_NAME,SLOT2_NAME\n\"mr, mime\",,\n");
}

#[test]
fn writer_places_report_under_output_dir() {
    let temp = tempfile::tempdir().unwrap();
    let output = Utf8PathBuf::from_path_buf(temp.path().join("delivery")).unwrap();
    let writer = ReportWriter::new(output.clone());

    let rows = bmi(&table(&[]));
    let path = writer.write(&rows).unwrap();

    assert_eq!(path, output.join("pokemon_bmi.csv"));
    assert_eq!(
        std::fs::read_to_string(path.as_std_path()).unwrap(),
        "name,weight,height,bmi(kg/m)\n"
    );
}
