use assert_matches::assert_matches;
use serde_json::{Value, json};

use pokedex_reports::error::PokedexError;
use pokedex_reports::flatten::{Cell, build_table, flatten};

#[test]
fn flat_record_is_unchanged() {
    let record = json!({"a": 1, "b": "two", "c": [1, 2, 3], "d": null});
    let row = flatten(&record).unwrap();

    let expected = record.as_object().unwrap();
    assert_eq!(row.len(), expected.len());
    for (key, value) in expected {
        assert_eq!(row.get(key), Some(value));
    }
}

#[test]
fn nested_maps_become_dotted_columns() {
    let row = flatten(&json!({
        "name": "bulbasaur",
        "species": {"name": "bulbasaur", "url": "https://example.test/species/1/"},
        "sprites": {"front_default": null}
    }))
    .unwrap();

    assert_eq!(row["species.name"], json!("bulbasaur"));
    assert_eq!(row["species.url"], json!("https://example.test/species/1/"));
    assert_eq!(row["sprites.front_default"], Value::Null);
    assert!(!row.contains_key("species"));
}

#[test]
fn column_union_marks_absence() {
    let table = build_table(&[json!({"a": 1, "b": 2}), json!({"a": 3, "c": 4})]).unwrap();

    let columns: Vec<&str> = table.columns().collect();
    assert_eq!(columns, vec!["a", "b", "c"]);

    let rows = table.rows();
    assert_eq!(rows[0].get("c"), &Cell::Missing);
    assert_eq!(rows[1].get("b"), &Cell::Missing);
    assert_eq!(rows[0].get("b"), &Cell::Present(json!(2)));
    assert_eq!(rows[1].get("c"), &Cell::Present(json!(4)));
    assert!(rows.iter().all(|row| row.cells().count() == 3));
}

#[test]
fn null_is_not_missing() {
    let table = build_table(&[json!({"a": null}), json!({"b": 1})]).unwrap();
    let rows = table.rows();

    assert_eq!(rows[0].get("a"), &Cell::Present(Value::Null));
    assert_eq!(rows[1].get("a"), &Cell::Missing);
    assert!(rows[0].get("a").is_blank());
    assert_eq!(rows[0].get("never_seen"), &Cell::Missing);
    assert!(!table.has_column("never_seen"));
}

#[test]
fn row_order_follows_input() {
    let records: Vec<Value> = ["bulbasaur", "ivysaur", "venusaur"]
        .iter()
        .map(|name| json!({"name": name}))
        .collect();
    let table = build_table(&records).unwrap();

    let names: Vec<&Cell> = table.rows().iter().map(|row| row.get("name")).collect();
    assert_eq!(
        names,
        vec![
            &Cell::Present(json!("bulbasaur")),
            &Cell::Present(json!("ivysaur")),
            &Cell::Present(json!("venusaur")),
        ]
    );
}

#[test]
fn empty_input_gives_empty_table() {
    let table = build_table(&[]).unwrap();
    assert!(table.is_empty());
    assert_eq!(table.columns().count(), 0);
}

#[test]
fn non_object_record_is_rejected() {
    assert_matches!(
        build_table(&[json!({"a": 1}), json!([1, 2])]),
        Err(PokedexError::InvalidRecord(1))
    );
}
