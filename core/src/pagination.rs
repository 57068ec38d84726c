//! Page metadata extracted from paginated API payloads.
//!
//! A paginated payload is an object carrying `total`, `per_page`,
//! `current_page` and a `data` array. Items are kept as plain JSON; no entity
//! projection happens here.

use serde::Serialize;
use serde_json::Value;

use crate::error::TransformError;

pub const PAGINATION_FIELDS: [&str; 4] = ["total", "per_page", "current_page", "data"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated {
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub last_page: u64,
    pub items: Vec<Value>,
}

impl Paginated {
    /// Build a view from a decoded payload. `None` stands for a body that
    /// did not decode and fails like an empty object would.
    pub fn from_payload(payload: Option<&Value>) -> Result<Self, TransformError> {
        let field = |name: &str| payload.and_then(|p| p.get(name));

        let total = field("total").and_then(as_count);
        let per_page = field("per_page").and_then(as_count);
        let current_page = field("current_page").and_then(as_count);
        let data = field("data").and_then(Value::as_array);

        match (total, per_page, current_page, data) {
            (Some(total), Some(per_page), Some(current_page), Some(data)) => Ok(Self {
                total,
                per_page,
                current_page,
                last_page: last_page(total, per_page),
                items: data.clone(),
            }),
            (total, per_page, current_page, data) => {
                let present = [
                    total.is_some(),
                    per_page.is_some(),
                    current_page.is_some(),
                    data.is_some(),
                ];
                let missing = PAGINATION_FIELDS
                    .iter()
                    .zip(present)
                    .filter(|(_, ok)| !ok)
                    .map(|(name, _)| name.to_string())
                    .collect();
                Err(TransformError::MissingPaginationFields(missing))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page
    }

    /// 1-based position of the first item on this page across all pages.
    /// `None` for an empty page or when the position does not fit in `u64`.
    pub fn first_item(&self) -> Option<u64> {
        if self.items.is_empty() {
            return None;
        }
        self.current_page
            .checked_sub(1)?
            .checked_mul(self.per_page)?
            .checked_add(1)
    }

    pub fn last_item(&self) -> Option<u64> {
        let first = self.first_item()?;
        let count = u64::try_from(self.items.len()).ok()?;
        first.checked_add(count.checked_sub(1)?)
    }
}

/// Non-negative integer, or a string holding one.
fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn last_page(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        return 1;
    }
    total.div_ceil(per_page).max(1)
}
