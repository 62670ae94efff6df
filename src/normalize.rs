// src/normalize.rs

use crate::error::{ImportError, Result};
use crate::models::{NormalizedRecord, Record};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

// 除 id 外不做类型校验，非字符串的值按文本入库
#[derive(Debug, Deserialize)]
struct RawDocument {
    id: Option<Value>,
    device_ip_addr: Option<Value>,
    timestamp: Option<Value>,
    country: Option<Value>,
    keyboard: Option<Value>,
    passwords: Option<Value>,
    domain_names: Option<Value>,
    services: Option<Value>,
    usernames: Option<Value>,
    email_addresses: Option<Value>,
}

/// 将一个 JSON 文档解析为主记录和五个子集合
pub fn normalize(bytes: &[u8]) -> Result<NormalizedRecord> {
    let raw: RawDocument = serde_json::from_slice(bytes)?;
    let id = coerce_id(raw.id.as_ref())?;

    Ok(NormalizedRecord {
        record: Record {
            id,
            device_ip_addr: raw.device_ip_addr.and_then(as_text),
            timestamp: raw.timestamp.as_ref().and_then(Value::as_str).and_then(parse_date),
            country: raw.country.and_then(as_text),
            keyboard: raw.keyboard.and_then(as_text),
        },
        passwords: as_list(raw.passwords),
        domain_names: as_list(raw.domain_names),
        services: as_list(raw.services),
        usernames: as_list(raw.usernames),
        email_addresses: as_list(raw.email_addresses),
    })
}

fn as_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// null/缺失为空列表；单个标量视为只有一个元素
fn as_list(value: Option<Value>) -> Vec<Option<String>> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().map(as_text).collect(),
        Some(other) => vec![as_text(other)],
    }
}

// 2^63，i64 的上界（不含）
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn coerce_id(value: Option<&Value>) -> Result<i64> {
    let value = value.ok_or(ImportError::MissingId)?;
    let invalid = || ImportError::InvalidId(value.to_string());

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64().map(f64::trunc) {
                Some(f) if f.is_finite() && f >= -I64_BOUND && f < I64_BOUND => Ok(f as i64),
                _ => Err(invalid()),
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// 只接受 YYYY-MM-DD（月、日可不补零），其他一律视为无日期
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.split('-').collect();
    let well_formed = parts.len() == 3
        && parts[0].len() == 4
        && (1..=2).contains(&parts[1].len())
        && (1..=2).contains(&parts[2].len())
        && parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit()));
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn minimal_document_defaults_everything_else() {
        let doc = normalize(br#"{"id": 414700, "passwords": ["abc123"], "usernames": ["bob"]}"#).unwrap();

        assert_eq!(doc.record.id, 414700);
        assert_eq!(doc.record.device_ip_addr, None);
        assert_eq!(doc.record.timestamp, None);
        assert_eq!(doc.record.country, None);
        assert_eq!(doc.record.keyboard, None);
        assert_eq!(doc.passwords, texts(&["abc123"]));
        assert_eq!(doc.usernames, texts(&["bob"]));
        assert!(doc.domain_names.is_empty());
        assert!(doc.services.is_empty());
        assert!(doc.email_addresses.is_empty());
        assert_eq!(doc.child_count(), 2);
    }

    #[test]
    fn full_document() {
        let doc = normalize(
            br#"{
                "id": "42",
                "device_ip_addr": "10.0.0.1",
                "timestamp": "2020-03-01",
                "country": "DE",
                "keyboard": "de-DE",
                "domain_names": ["example.com"],
                "services": ["https://example.com/login", "https://mail.example.com"],
                "email_addresses": ["bob@example.com"]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.record.id, 42);
        assert_eq!(doc.record.device_ip_addr.as_deref(), Some("10.0.0.1"));
        assert_eq!(doc.record.timestamp, NaiveDate::from_ymd_opt(2020, 3, 1));
        assert_eq!(doc.record.country.as_deref(), Some("DE"));
        assert_eq!(doc.record.keyboard.as_deref(), Some("de-DE"));
        assert_eq!(doc.child_count(), 4);
    }

    #[test]
    fn null_collections_are_empty() {
        let doc = normalize(br#"{"id": 1, "passwords": null, "services": null}"#).unwrap();
        assert!(doc.passwords.is_empty());
        assert!(doc.services.is_empty());
    }

    #[test]
    fn bad_timestamps_become_absent() {
        for ts in [
            r#""01/03/2020""#,
            r#""2020-13-01""#,
            r#""""#,
            r#""2020-03-01T10:00:00""#,
            r#"" 2020-03-01""#,
            r#""+2020-03-01""#,
            r#""20-03-01""#,
            r#""2020-003-01""#,
            "12345",
            "null",
        ] {
            let json = format!(r#"{{"id": 1, "timestamp": {}}}"#, ts);
            let doc = normalize(json.as_bytes()).unwrap();
            assert_eq!(doc.record.timestamp, None, "timestamp {}", ts);
        }
    }

    #[test]
    fn unpadded_month_and_day_are_accepted() {
        assert_eq!(parse_date("2020-3-1"), NaiveDate::from_ymd_opt(2020, 3, 1));
        assert_eq!(parse_date("2020-03-01"), NaiveDate::from_ymd_opt(2020, 3, 1));
    }

    #[test]
    fn non_string_values_are_kept_as_text() {
        let doc = normalize(
            br#"{"id": 1, "country": 49, "keyboard": true, "device_ip_addr": null,
                 "passwords": [123456, "abc", null], "usernames": "solo"}"#,
        )
        .unwrap();

        assert_eq!(doc.record.country.as_deref(), Some("49"));
        assert_eq!(doc.record.keyboard.as_deref(), Some("true"));
        assert_eq!(doc.record.device_ip_addr, None);
        assert_eq!(doc.passwords, vec![Some("123456".to_string()), Some("abc".to_string()), None]);
        assert_eq!(doc.usernames, texts(&["solo"]));
        assert_eq!(doc.child_count(), 4);
    }

    #[test]
    fn id_coercion() {
        assert_eq!(normalize(br#"{"id": " 7 "}"#).unwrap().record.id, 7);
        assert_eq!(normalize(br#"{"id": 9.0}"#).unwrap().record.id, 9);
        assert_eq!(normalize(br#"{"id": 9.9}"#).unwrap().record.id, 9);
    }

    #[test]
    fn missing_or_invalid_id_fails() {
        assert!(matches!(normalize(br#"{"passwords": ["x"]}"#), Err(ImportError::MissingId)));
        assert!(matches!(normalize(br#"{"id": null}"#), Err(ImportError::MissingId)));
        assert!(matches!(normalize(br#"{"id": "abc"}"#), Err(ImportError::InvalidId(_))));
        assert!(matches!(normalize(br#"{"id": true}"#), Err(ImportError::InvalidId(_))));
        assert!(matches!(normalize(br#"{"id": [1]}"#), Err(ImportError::InvalidId(_))));
    }

    #[test]
    fn out_of_range_id_fails() {
        assert_eq!(normalize(br#"{"id": 9223372036854775807}"#).unwrap().record.id, i64::MAX);
        assert_eq!(normalize(br#"{"id": -9223372036854775808}"#).unwrap().record.id, i64::MIN);
        for id in ["9223372036854775808", "9223372036854775900", "1e19", "-1e19", r#""9223372036854775808""#] {
            let json = format!(r#"{{"id": {}}}"#, id);
            assert!(matches!(normalize(json.as_bytes()), Err(ImportError::InvalidId(_))), "id {}", id);
        }
    }

    #[test]
    fn malformed_json_fails() {
        assert!(matches!(normalize(b"{\"id\": 1,"), Err(ImportError::Json(_))));
        assert!(matches!(normalize(b"[1, 2]"), Err(ImportError::Json(_))));
    }
}
