use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

/// 解析后端返回的日期：既可能是 `2025-03-01`，也可能是带时间的 ISO 8601 字符串
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    None
}

/// 可选日期字段的宽松反序列化，无法识别的值视为缺失
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => parse_flexible_date(&s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_timestamped_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1);
        assert_eq!(parse_flexible_date("2025-03-01"), expected);
        assert_eq!(parse_flexible_date("2025-03-01T09:30:00"), expected);
        assert_eq!(parse_flexible_date("2025-03-01T09:30:00.123Z"), expected);
        assert_eq!(parse_flexible_date("2025-03-01 09:30:00"), expected);
    }

    #[test]
    fn test_unrecognised_dates_are_none() {
        assert_eq!(parse_flexible_date(""), None);
        assert_eq!(parse_flexible_date("01/03/2025"), None);
    }
}
