//! Property-based tests using proptest

use indexmap::IndexMap;
use proptest::prelude::*;
use std::sync::Arc;
use typecodec_core::{
    codec::{NumberCodec, StringCodec},
    containers::MapCodec,
    json::build,
    CodecContext, CodecRegistry, Codec, JsonValue, RegistryBuilder, Token, TokenReader,
    TokenWriter, TypeDescriptor,
};

fn registry() -> CodecRegistry {
    RegistryBuilder::new()
        .register_map::<u32, String>(TypeDescriptor::U32, TypeDescriptor::STRING)
        .and_then(|b| b.register_string_map::<i64>(TypeDescriptor::I64))
        .unwrap()
        .build()
}

fn string_map() -> TypeDescriptor {
    TypeDescriptor::map(TypeDescriptor::STRING, TypeDescriptor::I64)
}

fn entries<K: std::hash::Hash + Eq, V>(pairs: Vec<(K, V)>) -> IndexMap<K, V> {
    // First occurrence wins, so the generated order is the insertion order
    let mut map = IndexMap::new();
    for (k, v) in pairs {
        map.entry(k).or_insert(v);
    }
    map
}

fn json_value() -> impl Strategy<Value = JsonValue> {
    let leaf = prop_oneof![
        Just(JsonValue::Null),
        any::<bool>().prop_map(JsonValue::Bool),
        any::<i64>().prop_map(|n| build::num(n)),
        "[a-z]{0,8}".prop_map(|s| build::str(s)),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(|items| build::arr(items)),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..6).prop_map(|fields| {
                let fields: Vec<(String, JsonValue)> = entries(fields).into_iter().collect();
                build::obj(fields).unwrap_or(JsonValue::Null)
            }),
        ]
    })
}

proptest! {
    #[test]
    fn prop_map_round_trip_keeps_order(
        pairs in prop::collection::vec((any::<u32>(), ".{0,12}"), 0..32)
    ) {
        let registry = registry();
        let desc = TypeDescriptor::map(TypeDescriptor::U32, TypeDescriptor::STRING);
        let map = entries(pairs);

        let tokens = registry.to_tokens(&desc, &map).unwrap();
        let back: IndexMap<u32, String> = registry.from_tokens(&desc, &tokens).unwrap();

        prop_assert!(back.iter().eq(map.iter()));
    }

    #[test]
    fn prop_string_map_matches_general_codec(
        pairs in prop::collection::vec(("[a-zA-Z0-9_]{1,10}", any::<i64>()), 0..32)
    ) {
        let registry = registry();
        let map = entries(pairs);

        let general: MapCodec<String, i64> = MapCodec::new(
            string_map(),
            Arc::new(StringCodec),
            Arc::new(NumberCodec::<i64>::new(TypeDescriptor::I64)),
        );
        let mut out = TokenWriter::new();
        general.encode(&map, &mut out, &mut CodecContext::new(&registry)).unwrap();
        let tokens = out.into_tokens();
        let via_general = general
            .decode(&mut TokenReader::new(&tokens), &mut CodecContext::new(&registry))
            .unwrap();

        let special_tokens = registry.to_tokens(&string_map(), &map).unwrap();
        let via_special: IndexMap<String, i64> =
            registry.from_tokens(&string_map(), &special_tokens).unwrap();

        prop_assert!(via_general.iter().eq(via_special.iter()));
        prop_assert!(via_special.iter().eq(map.iter()));
    }

    #[test]
    fn prop_json_round_trip(value in json_value()) {
        let registry = registry();
        let tokens = registry.to_tokens(&TypeDescriptor::JSON_VALUE, &value).unwrap();
        let back: JsonValue = registry.from_tokens(&TypeDescriptor::JSON_VALUE, &tokens).unwrap();

        prop_assert_eq!(back, value);
    }

    #[test]
    fn prop_obj_rejects_any_repeat(
        names in prop::collection::vec("[a-c]", 1..8)
    ) {
        let fields: Vec<(String, JsonValue)> =
            names.iter().map(|n| build::field(n.clone(), build::nul())).collect();
        let has_repeat = names.iter().enumerate().any(|(i, n)| names[..i].contains(n));

        prop_assert_eq!(build::obj(fields).is_err(), has_repeat);
    }

    #[test]
    fn prop_decode_never_panics(
        kinds in prop::collection::vec((0u8..6, "[_a-z]{0,5}"), 0..64)
    ) {
        let registry = registry();
        let tokens: Vec<Token> = kinds
            .into_iter()
            .map(|(kind, text)| match kind {
                0 => Token::StartElement(text),
                1 => Token::EndElement,
                2 => Token::Null,
                3 => Token::Bool(text.len() % 2 == 0),
                4 => Token::Number(text.len().to_string()),
                _ => Token::String(text),
            })
            .collect();

        let map = TypeDescriptor::map(TypeDescriptor::U32, TypeDescriptor::STRING);
        let _ = registry.from_tokens::<IndexMap<u32, String>>(&map, &tokens);
        let _ = registry.from_tokens::<IndexMap<String, i64>>(&string_map(), &tokens);
        let _ = registry.from_tokens::<JsonValue>(&TypeDescriptor::JSON_VALUE, &tokens);
    }
}
