use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Every successful response is `{ "success": true, ...payload }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Success<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Success<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Failure envelope: `{ "success": false, "error": "..." }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Failure {
    pub success: bool,
    pub error: String,
}

impl Failure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Payload of responses that carry nothing besides `success`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Empty {}

/// A monetary amount in integer cents.
///
/// Serialized as a plain JSON number in major units: `500` for 500.00,
/// `12.5` for 12.50.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Amount(pub i64);

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.0 as f64 / 100.0)
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let major = f64::deserialize(deserializer)?;
        Ok(Self((major * 100.0).round() as i64))
    }
}

/// An amount as sent by clients: a JSON number or a numeric string.
///
/// Parsing into cents (and rejecting more than two decimals) is left to the
/// server so the error surfaces as a validation failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl fmt::Display for AmountInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Reads an optional query parameter, treating `?key=` like an absent key.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
    }

    /// Request body of `POST /transactions`.
    ///
    /// `type`, `category` and `amount` are required; they are optional here
    /// so a missing field yields the API's own error message.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionNew {
        #[serde(rename = "type")]
        pub kind: Option<String>,
        pub category: Option<String>,
        pub amount: Option<AmountInput>,
        pub description: Option<String>,
        /// RFC3339 timestamp or `YYYY-MM-DD`; defaults to now.
        pub date: Option<String>,
    }

    /// Request body of `PUT /transactions`. Absent fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub id: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<String>,
        pub category: Option<String>,
        pub amount: Option<AmountInput>,
        pub description: Option<String>,
        pub date: Option<String>,
    }

    /// Request body of `DELETE /transactions`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionDelete {
        pub id: Option<String>,
    }

    /// Query string of `GET /transactions`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        #[serde(default, deserialize_with = "blank_as_none")]
        pub page: Option<u64>,
        #[serde(default, deserialize_with = "blank_as_none")]
        pub limit: Option<u64>,
        pub search: Option<String>,
        /// `date`, `-date`, `amount` or `-amount`.
        pub sort: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: Uuid,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub category: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pub description: Option<String>,
        pub amount: Amount,
        pub date: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionResponse {
        pub transaction: TransactionView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        /// Matches across all pages.
        pub total: u64,
        pub page: u64,
        pub limit: u64,
        pub transactions: Vec<TransactionView>,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTotal {
        pub category: String,
        pub total: Amount,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyTrendPoint {
        pub year: i32,
        pub month: u32,
        pub income: Amount,
        pub expense: Amount,
    }

    /// Response of `GET /transactions/stats`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerStats {
        pub income: Amount,
        pub expense: Amount,
        pub categories: Vec<CategoryTotal>,
        pub monthly: Vec<MonthlyTrendPoint>,
    }

    /// Response of `GET /dashboard`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Dashboard {
        /// `YYYY-MM`
        pub month: String,
        pub income: Amount,
        pub expense: Amount,
        pub balance: Amount,
        pub categories: Vec<CategoryTotal>,
        pub monthly: Vec<MonthlyTrendPoint>,
        pub budgets: Vec<super::budget::BudgetSummaryEntry>,
    }

    /// Query string of `GET /dashboard`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DashboardQuery {
        pub month: Option<String>,
    }
}

pub mod budget {
    use super::*;

    /// Request body of `POST /budgets`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub category: Option<String>,
        pub limit: Option<AmountInput>,
        /// `YYYY-MM`
        pub month: Option<String>,
    }

    /// Request body of `PUT /budgets`. Absent fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub id: Option<String>,
        pub category: Option<String>,
        pub limit: Option<AmountInput>,
        pub month: Option<String>,
    }

    /// Query string of `DELETE /budgets`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetDelete {
        pub id: Option<String>,
    }

    /// Query string of `GET /budgets` and `GET /budgets/summary`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MonthQuery {
        pub month: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetView {
        pub id: Uuid,
        pub category: String,
        pub limit: Amount,
        pub month: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetResponse {
        pub budget: BudgetView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetListResponse {
        pub budgets: Vec<BudgetView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetSummaryEntry {
        /// Id of the budget being summarised.
        pub id: Uuid,
        pub category: String,
        pub limit: Amount,
        pub spent: Amount,
        /// Negative once the budget is exceeded.
        pub remaining: Amount,
        pub over_budget: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetSummaryResponse {
        pub summary: Vec<BudgetSummaryEntry>,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn amount_is_a_plain_number() {
        assert_eq!(serde_json::to_value(Amount(500_00)).unwrap(), json!(500));
        assert_eq!(serde_json::to_value(Amount(12_50)).unwrap(), json!(12.5));
        assert_eq!(serde_json::to_value(Amount(-100_00)).unwrap(), json!(-100));
        assert_eq!(serde_json::from_value::<Amount>(json!(12.34)).unwrap(), Amount(1234));
    }

    #[test]
    fn amount_input_accepts_numbers_and_strings() {
        let number: AmountInput = serde_json::from_value(json!(500)).unwrap();
        assert_eq!(number.to_string(), "500");
        let decimal: AmountInput = serde_json::from_value(json!(12.5)).unwrap();
        assert_eq!(decimal.to_string(), "12.5");
        let text: AmountInput = serde_json::from_value(json!("12,50")).unwrap();
        assert_eq!(text.to_string(), "12,50");
        assert!(serde_json::from_value::<AmountInput>(json!(true)).is_err());
    }

    #[test]
    fn blank_paging_params_count_as_missing() {
        let list: transaction::TransactionList =
            serde_json::from_value(json!({ "page": "", "limit": " 5 " })).unwrap();
        assert_eq!(list.page, None);
        assert_eq!(list.limit, Some(5));

        let absent: transaction::TransactionList = serde_json::from_value(json!({})).unwrap();
        assert_eq!((absent.page, absent.limit), (None, None));

        assert!(
            serde_json::from_value::<transaction::TransactionList>(json!({ "page": "two" }))
                .is_err()
        );
    }

    #[test]
    fn envelope_flattens_payload() {
        let body = Success::new(budget::BudgetSummaryResponse {
            summary: vec![budget::BudgetSummaryEntry {
                id: Uuid::nil(),
                category: "Food".to_string(),
                limit: Amount(1000_00),
                spent: Amount(1100_00),
                remaining: Amount(-100_00),
                over_budget: true,
            }],
        });
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["summary"][0]["overBudget"], json!(true));
        assert_eq!(value["summary"][0]["remaining"], json!(-100));

        let empty = serde_json::to_value(Success::new(Empty {})).unwrap();
        assert_eq!(empty, json!({ "success": true }));
    }

    #[test]
    fn transaction_kind_is_serialized_as_type() {
        let body: transaction::TransactionNew = serde_json::from_value(json!({
            "type": "expense",
            "category": "Food",
            "amount": 500,
        }))
        .unwrap();
        assert_eq!(body.kind.as_deref(), Some("expense"));
        assert!(body.date.is_none());
    }
}
