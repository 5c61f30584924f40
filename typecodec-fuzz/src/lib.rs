//! Fuzzing entry points for typecodec-core decoders
//!
//! Raw fuzzer bytes are mapped onto an arbitrary token stream, which is then
//! fed to several decoders. Decoding may fail but must never panic.
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Wrap `fuzz_decode_tokens` in a fuzz target and run it

use typecodec_core::{
    CodecRegistry, Dynamic, JsonValue, RegistryBuilder, Token, TypeDescriptor,
};
use indexmap::IndexMap;

const LABELS: [&str; 6] = ["_", "key", "value", "elem", "arr", "obj"];

/// Map bytes onto tokens, two bytes per token (kind selector, payload)
pub fn tokens_from_bytes(data: &[u8]) -> Vec<Token> {
    data.chunks(2)
        .map(|pair| {
            let payload = pair.get(1).copied().unwrap_or(0);
            match pair[0] % 7 {
                0 => Token::StartElement(LABELS[payload as usize % LABELS.len()].to_string()),
                1 => Token::EndElement,
                2 => Token::Null,
                3 => Token::Bool(payload & 1 == 1),
                4 => Token::Number(payload.to_string()),
                5 => Token::Number(format!("-{}.{}", payload, payload)),
                _ => Token::String(char::from(payload).to_string()),
            }
        })
        .collect()
}

fn fuzz_registry() -> CodecRegistry {
    RegistryBuilder::new()
        .register_map::<String, i32>(TypeDescriptor::STRING, TypeDescriptor::I32)
        .and_then(|b| b.register_string_map::<JsonValue>(TypeDescriptor::JSON_VALUE))
        .and_then(|b| b.register_array::<Dynamic>(TypeDescriptor::OBJECT))
        .expect("fuzz registry")
        .build()
}

/// Decode arbitrary bytes as several target types; must never panic
pub fn fuzz_decode_tokens(data: &[u8]) {
    let registry = fuzz_registry();
    let tokens = tokens_from_bytes(data);

    let _ = registry.from_tokens::<JsonValue>(&TypeDescriptor::JSON_VALUE, &tokens);
    let _ = registry.from_tokens::<Dynamic>(&TypeDescriptor::OBJECT, &tokens);
    let _ = registry.from_tokens::<IndexMap<String, i32>>(
        &TypeDescriptor::map(TypeDescriptor::STRING, TypeDescriptor::I32),
        &tokens,
    );
    let _ = registry.from_tokens::<IndexMap<String, JsonValue>>(
        &TypeDescriptor::map(TypeDescriptor::STRING, TypeDescriptor::JSON_VALUE),
        &tokens,
    );
    let _ = registry.from_tokens::<Vec<Dynamic>>(
        &TypeDescriptor::array(TypeDescriptor::OBJECT),
        &tokens,
    );
}

/// Decode a token dump in its JSON form; must never panic
pub fn fuzz_decode_json_dump(data: &[u8]) {
    let Ok(tokens) = serde_json::from_slice::<Vec<Token>>(data) else {
        return;
    };
    let registry = fuzz_registry();
    let _ = registry.from_tokens::<JsonValue>(&TypeDescriptor::JSON_VALUE, &tokens);
}
