use std::fs;
use tempfile::tempdir;

use typecodec_cli::commands::{decode, encode};
use typecodec_cli::{MapStyle, RegistryOptions};
use typecodec_core::Token;

fn write_file<P: AsRef<std::path::Path>>(p: P, s: &str) {
    fs::write(p, s.as_bytes()).unwrap();
}

const DOCUMENT: &str = r#"{"name":"probe","tags":["a","b"],"depth":-3.5,"ok":true,"none":null}"#;

#[test]
fn encode_then_decode_restores_document() {
    let td = tempdir().unwrap();
    let doc_path = td.path().join("doc.json");
    let dump_path = td.path().join("doc.tokens.json");
    let out_path = td.path().join("out.json");
    write_file(&doc_path, DOCUMENT);

    let options = RegistryOptions::default();
    encode::execute(
        doc_path.to_str().unwrap(),
        Some(dump_path.to_str().unwrap()),
        "json.value",
        &options,
    )
    .unwrap();

    let tokens: Vec<Token> = serde_json::from_str(&fs::read_to_string(&dump_path).unwrap()).unwrap();
    assert_eq!(tokens.first(), Some(&Token::StartElement("obj".into())));
    assert_eq!(tokens.last(), Some(&Token::EndElement));

    decode::execute(
        dump_path.to_str().unwrap(),
        Some(out_path.to_str().unwrap()),
        "json.value",
        false,
        &options,
    )
    .unwrap();

    assert_eq!(fs::read_to_string(&out_path).unwrap(), DOCUMENT);
}

#[test]
fn top_level_object_as_string_map() {
    let td = tempdir().unwrap();
    let doc_path = td.path().join("doc.json");
    let dump_path = td.path().join("doc.tokens.json");
    write_file(&doc_path, r#"{"b":1,"a":2}"#);

    encode::execute(
        doc_path.to_str().unwrap(),
        Some(dump_path.to_str().unwrap()),
        "map<string, json.value>",
        &RegistryOptions::default(),
    )
    .unwrap();

    let tokens: Vec<Token> = serde_json::from_str(&fs::read_to_string(&dump_path).unwrap()).unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::StartElement("b".into()),
            Token::Number("1".into()),
            Token::EndElement,
            Token::StartElement("a".into()),
            Token::Number("2".into()),
            Token::EndElement,
        ]
    );
}

#[test]
fn general_map_style_wraps_entries() {
    let td = tempdir().unwrap();
    let doc_path = td.path().join("doc.json");
    let dump_path = td.path().join("doc.tokens.json");
    let out_path = td.path().join("out.json");
    write_file(&doc_path, r#"{"k":"v"}"#);

    let options = RegistryOptions {
        map_style: MapStyle::General,
        ..Default::default()
    };
    encode::execute(
        doc_path.to_str().unwrap(),
        Some(dump_path.to_str().unwrap()),
        "map<string, json.value>",
        &options,
    )
    .unwrap();

    let tokens: Vec<Token> = serde_json::from_str(&fs::read_to_string(&dump_path).unwrap()).unwrap();
    assert_eq!(tokens[0], Token::StartElement("_".into()));
    assert_eq!(tokens[1], Token::StartElement("key".into()));

    decode::execute(
        dump_path.to_str().unwrap(),
        Some(out_path.to_str().unwrap()),
        "map<string, json.value>",
        false,
        &options,
    )
    .unwrap();
    assert_eq!(fs::read_to_string(&out_path).unwrap(), r#"{"k":"v"}"#);
}

#[test]
fn config_file_relabels_tokens() {
    let td = tempdir().unwrap();
    let config_path = td.path().join("config.json");
    let doc_path = td.path().join("doc.json");
    let dump_path = td.path().join("doc.tokens.json");
    write_file(&config_path, r#"{"elem_name":"item"}"#);
    write_file(&doc_path, "[1]");

    let options = RegistryOptions {
        config: Some(config_path.to_str().unwrap().to_string()),
        ..Default::default()
    };
    encode::execute(
        doc_path.to_str().unwrap(),
        Some(dump_path.to_str().unwrap()),
        "json.value",
        &options,
    )
    .unwrap();

    let tokens: Vec<Token> = serde_json::from_str(&fs::read_to_string(&dump_path).unwrap()).unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::StartElement("arr".into()),
            Token::StartElement("item".into()),
            Token::Number("1".into()),
            Token::EndElement,
            Token::EndElement,
        ]
    );
}

#[test]
fn depth_limit_rejects_deep_document() {
    let td = tempdir().unwrap();
    let doc_path = td.path().join("doc.json");
    let dump_path = td.path().join("doc.tokens.json");
    write_file(&doc_path, "[[[[[[1]]]]]]");

    let shallow = RegistryOptions {
        max_depth: Some(3),
        ..Default::default()
    };
    assert!(encode::execute(
        doc_path.to_str().unwrap(),
        Some(dump_path.to_str().unwrap()),
        "json.value",
        &shallow,
    )
    .is_err());

    let unbounded = RegistryOptions {
        max_depth: Some(0),
        ..Default::default()
    };
    encode::execute(
        doc_path.to_str().unwrap(),
        Some(dump_path.to_str().unwrap()),
        "json.value",
        &unbounded,
    )
    .unwrap();
}

#[test]
fn decode_rejects_malformed_dump() {
    let td = tempdir().unwrap();
    let dump_path = td.path().join("bad.tokens.json");
    let out_path = td.path().join("out.json");
    write_file(
        &dump_path,
        r#"[{"kind":"start_element","value":"arr"},{"kind":"number","value":"1"}]"#,
    );

    let err = decode::execute(
        dump_path.to_str().unwrap(),
        Some(out_path.to_str().unwrap()),
        "json.value",
        false,
        &RegistryOptions::default(),
    )
    .unwrap_err();

    assert!(format!("{:#}", err).contains("Failed to decode"));
    assert!(!out_path.exists());
}

#[test]
fn missing_input_reports_path() {
    let err = encode::execute(
        "/nonexistent/doc.json",
        None,
        "json.value",
        &RegistryOptions::default(),
    )
    .unwrap_err();

    assert!(err.to_string().contains("/nonexistent/doc.json"));
}

#[test]
fn number_text_is_kept_end_to_end() {
    let td = tempdir().unwrap();
    let doc_path = td.path().join("doc.json");
    let dump_path = td.path().join("doc.tokens.json");
    let out_path = td.path().join("out.json");
    let input = r#"{"price":1.50,"hundred":1e2,"huge":1e400}"#;
    write_file(&doc_path, input);

    let options = RegistryOptions::default();
    encode::execute(
        doc_path.to_str().unwrap(),
        Some(dump_path.to_str().unwrap()),
        "json.value",
        &options,
    )
    .unwrap();

    let tokens: Vec<Token> = serde_json::from_str(&fs::read_to_string(&dump_path).unwrap()).unwrap();
    assert!(tokens.contains(&Token::Number("1.50".into())));
    assert!(tokens.contains(&Token::Number("1e400".into())));

    decode::execute(
        dump_path.to_str().unwrap(),
        Some(out_path.to_str().unwrap()),
        "json.value",
        false,
        &options,
    )
    .unwrap();
    assert_eq!(fs::read_to_string(&out_path).unwrap(), input);
}
