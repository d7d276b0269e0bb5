use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::errors::{PortalError, Result};
use crate::utils::validate::validate_sort_param;

// 后端各接口的页码基准并不统一：评价列表从 0 开始，部分旧接口从 1 开始。
// 用两个独立的类型区分，避免在调用处隐式加减一。

/// 从 0 开始的页码
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct ZeroBasedPage(#[serde(deserialize_with = "deserialize_page_index")] pub u32);

/// 从 1 开始的页码
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct OneBasedPage(#[serde(deserialize_with = "deserialize_page_index")] pub u32);

impl ZeroBasedPage {
    pub const FIRST: ZeroBasedPage = ZeroBasedPage(0);

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn to_one_based(self) -> OneBasedPage {
        OneBasedPage(self.0.saturating_add(1))
    }
}

impl OneBasedPage {
    pub const FIRST: OneBasedPage = OneBasedPage(1);

    /// 0 不是合法的 1 基页码，按第一页处理
    pub fn new(page: u32) -> Self {
        OneBasedPage(page.max(1))
    }

    pub fn number(self) -> u32 {
        self.0
    }

    pub fn to_zero_based(self) -> ZeroBasedPage {
        ZeroBasedPage(self.0.saturating_sub(1))
    }
}

impl Default for OneBasedPage {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for ZeroBasedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for OneBasedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 归一化后的列表：无论后端返回何种包装结构，列表页面只消费这一种形态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct NormalizedPage<T> {
    pub list: Vec<T>,
    pub total: u64,
}

impl<T> NormalizedPage<T> {
    pub fn empty() -> Self {
        Self {
            list: Vec::new(),
            total: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// 按给定页大小计算总页数
    pub fn total_pages(&self, size: u32) -> u64 {
        if size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(size))
    }
}

impl<T> Default for NormalizedPage<T> {
    fn default() -> Self {
        Self::empty()
    }
}

// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// 排序参数，以 `field,direction` 形式传给后端
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/pagination.ts")]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// 评价列表默认按评价日期倒序（最新在前）
    pub fn most_recent_first() -> Self {
        Self::new("evaluationDate", SortDirection::Desc)
    }

    /// 解析 `field,direction`，方向缺省为升序
    pub fn parse(raw: &str) -> Result<Self> {
        validate_sort_param(raw).map_err(PortalError::validation)?;
        let mut parts = raw.trim().splitn(2, ',');
        let field = parts.next().unwrap_or_default().trim().to_string();
        let direction = match parts.next().map(|d| d.trim().to_ascii_lowercase()) {
            Some(d) if d == "desc" => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        Ok(Self { field, direction })
    }

    pub fn to_param(&self) -> String {
        format!("{},{}", self.field, self.direction)
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::most_recent_first()
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_param())
    }
}

// 自定义反序列化函数，支持字符串到页码的转换
fn deserialize_page_index<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{Error, Unexpected, Visitor};

    struct PageVisitor;

    impl<'de> Visitor<'de> for PageVisitor {
        type Value = u32;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non-negative integer or a string containing one")
        }

        fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E>
        where
            E: Error,
        {
            u32::try_from(value).map_err(|_| Error::invalid_value(Unexpected::Signed(value), &self))
        }

        fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E>
        where
            E: Error,
        {
            u32::try_from(value)
                .map_err(|_| Error::invalid_value(Unexpected::Unsigned(value), &self))
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: Error,
        {
            value
                .trim()
                .parse()
                .map_err(|_| Error::invalid_value(Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(PageVisitor)
}
