//! Canonical block encoding and SHA-256 hashing for minichain
//!
//! The canonical form is the sorted-key JSON text the ledger has always
//! hashed: `", "` between elements, `": "` between a key and its value, and
//! every character outside printable ASCII written as a `\uXXXX` escape.
//! Floats use the shortest round-trip digits, switching to exponent form
//! (`1e+16`, `1e-05`) below `1e-4` and from `1e16` up.
//! Two blocks with equal field values always produce identical bytes, no
//! matter how the values were assembled.

use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

use crate::blockchain::Block;
use crate::transaction::Transaction;

/// SHA-256 of `bytes` as 64 lowercase hex characters.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Hash of a block: SHA-256 over its canonical bytes.
pub fn hash_block(block: &Block) -> String {
    sha256_hex(canonical_string(block).as_bytes())
}

/// Canonical text of a block. This is also the proof-of-work context used by
/// server-side mining.
pub fn canonical_string(block: &Block) -> String {
    canonical_json(&block_value(block))
}

pub fn canonical_bytes(block: &Block) -> Vec<u8> {
    canonical_string(block).into_bytes()
}

/// Canonical text of an arbitrary JSON value. Object keys are emitted in
/// lexicographic order at every depth, independent of insertion order.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn block_value(block: &Block) -> Value {
    let mut map = Map::new();
    map.insert("index".to_string(), Value::from(block.index));
    map.insert(
        "timestamp".to_string(),
        Number::from_f64(block.timestamp).map_or(Value::Null, Value::Number),
    );
    map.insert(
        "transactions".to_string(),
        Value::Array(block.transactions.iter().map(transaction_value).collect()),
    );
    map.insert("proof".to_string(), Value::from(block.proof));
    map.insert(
        "previous_hash".to_string(),
        Value::String(block.previous_hash.clone()),
    );
    Value::Object(map)
}

fn transaction_value(tx: &Transaction) -> Value {
    let mut map = Map::new();
    map.insert("sender".to_string(), Value::String(tx.sender.clone()));
    map.insert("recipient".to_string(), Value::String(tx.recipient.clone()));
    map.insert("amount".to_string(), Value::Number(tx.amount.clone()));
    Value::Object(map)
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) if n.is_f64() => write_float(out, &n.to_string()),
        Value::Number(n) => {
            let _ = write!(out, "{}", n);
        }
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_string(out, key);
                out.push_str(": ");
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

/// Re-renders the shortest digits of a float in the canonical layout.
fn write_float(out: &mut String, shortest: &str) {
    let (negative, body) = match shortest.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, shortest),
    };
    let (mantissa, exponent) = match body.split_once(|c: char| c == 'e' || c == 'E') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (body, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    // value = 0.digits * 10^point
    let mut point = int_part.len() as i32 + exponent;
    let all_digits = format!("{}{}", int_part, frac_part);
    let unpadded = all_digits.trim_start_matches('0');
    point -= (all_digits.len() - unpadded.len()) as i32;
    let digits = unpadded.trim_end_matches('0');

    if negative {
        out.push('-');
    }
    if digits.is_empty() {
        out.push_str("0.0");
        return;
    }

    let scientific = point - 1;
    if !(-4..16).contains(&scientific) {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let sign = if scientific < 0 { '-' } else { '+' };
        let _ = write!(out, "e{}{:02}", sign, scientific.abs());
    } else if point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-point) as usize));
        out.push_str(digits);
    } else if point as usize >= digits.len() {
        out.push_str(digits);
        out.extend(std::iter::repeat('0').take(point as usize - digits.len()));
        out.push_str(".0");
    } else {
        let (whole, fraction) = digits.split_at(point as usize);
        out.push_str(whole);
        out.push('.');
        out.push_str(fraction);
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{:04x}", unit);
                }
            }
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixed_genesis() -> Block {
        Block {
            index: 1,
            timestamp: 1672531200.0,
            transactions: vec![],
            proof: 100,
            previous_hash: "1".to_string(),
        }
    }

    #[test]
    fn test_genesis_canonical_string() {
        assert_eq!(
            canonical_string(&fixed_genesis()),
            r#"{"index": 1, "previous_hash": "1", "proof": 100, "timestamp": 1672531200.0, "transactions": []}"#
        );
    }

    #[test]
    fn test_genesis_hash_is_stable() {
        let block = fixed_genesis();
        let expected = "4faecf85cb9bbcb7ce8d365695284b3165bb7013de03cb54c1a82f3fba4e4229";
        assert_eq!(hash_block(&block), expected);
        assert_eq!(hash_block(&block), hash_block(&block.clone()));
    }

    #[test]
    fn test_hash_shape() {
        let hash = sha256_hex(b"abc0");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(
            hash,
            "56abfbd7d2ea606e667945422de5a368b8b0272b8f29081cb058b594dd7e3249"
        );
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let a: Value = serde_json::from_str(
            r#"{"proof": 7, "index": 2, "transactions": [{"amount": 5, "sender": "0", "recipient": "alice"}], "previous_hash": "ab", "timestamp": 1.5}"#,
        )
        .unwrap();
        let b: Value = serde_json::from_str(
            r#"{"timestamp": 1.5, "previous_hash": "ab", "index": 2, "proof": 7, "transactions": [{"recipient": "alice", "sender": "0", "amount": 5}]}"#,
        )
        .unwrap();
        assert_eq!(canonical_json(&a), canonical_json(&b));

        let block = Block {
            index: 2,
            timestamp: 1.5,
            transactions: vec![Transaction::new("0", "alice", 5)],
            proof: 7,
            previous_hash: "ab".to_string(),
        };
        assert_eq!(canonical_string(&block), canonical_json(&a));
    }

    #[test]
    fn test_nested_sorting_and_escaping() {
        let value = json!({"b": "é", "a": [{"z": 1, "y": -2.5}]});
        assert_eq!(
            canonical_json(&value),
            r#"{"a": [{"y": -2.5, "z": 1}], "b": "\u00e9"}"#
        );

        let emoji = json!({"k": "😀\"\n"});
        assert_eq!(canonical_json(&emoji), r#"{"k": "\ud83d\ude00\"\n"}"#);
    }

    #[test]
    fn test_transactions_change_the_hash() {
        let empty = fixed_genesis();
        let mut with_tx = fixed_genesis();
        with_tx.transactions.push(Transaction::new("0", "alice", 5));
        assert_ne!(hash_block(&empty), hash_block(&with_tx));
        assert_eq!(canonical_bytes(&empty), canonical_string(&empty).into_bytes());
    }

    #[test]
    fn test_float_layout() {
        let cases = [
            (1e16, "1e+16"),
            (1e-7, "1e-07"),
            (1.5e-5, "1.5e-05"),
            (0.0001, "0.0001"),
            (1e22, "1e+22"),
            (123.45, "123.45"),
            (-2.5, "-2.5"),
            (1.0, "1.0"),
            (-0.0, "-0.0"),
            (9999999999999998.0, "9999999999999998.0"),
            (1.2345678901234568e17, "1.2345678901234568e+17"),
        ];
        for (value, expected) in cases {
            assert_eq!(canonical_json(&json!(value)), expected, "{}", value);
        }
        assert_eq!(canonical_json(&json!(10_000_000_000_000_000u64)), "10000000000000000");
    }
}
