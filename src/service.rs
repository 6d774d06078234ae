//! Expense service domain logic.
//!
//! The only component permitted to mutate the store. All store access goes
//! through a single async mutex, so the whole-document read-modify-write
//! sequence cannot interleave between concurrent requests.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::ApiError;
use crate::model::{parse_expense_date, Expense};
use crate::store::ExpenseStore;
use crate::validate::{validate, ValidExpenseInput};

/// Sort order for expense listings, keyed by the expense `date` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    DateDesc,
    DateAsc,
}

impl SortOrder {
    /// Parse a query-string sort token. Unrecognized tokens fall back to
    /// most-recent-first.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some("date_asc") => SortOrder::DateAsc,
            _ => SortOrder::DateDesc,
        }
    }
}

/// Result of a creation request, distinguishing a fresh record from an
/// idempotent replay that matched an existing one.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created(Expense),
    AlreadyExists(Expense),
}

impl CreateOutcome {
    pub fn expense(&self) -> &Expense {
        match self {
            CreateOutcome::Created(e) | CreateOutcome::AlreadyExists(e) => e,
        }
    }
}

#[derive(Clone)]
pub struct ExpenseService {
    store: Arc<Mutex<ExpenseStore>>,
}

impl ExpenseService {
    pub fn new(store: ExpenseStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Create an expense from a raw JSON payload.
    ///
    /// Validation failures are returned before any store access. A payload
    /// carrying a non-empty idempotency key that matches an existing record
    /// short-circuits: the existing record is returned and no write occurs,
    /// which makes retried creation requests safe to repeat.
    pub async fn create(&self, payload: &serde_json::Value) -> Result<CreateOutcome, ApiError> {
        let input = validate(payload).map_err(ApiError::InvalidInput)?;

        let store = self.store.lock().await;
        let mut expenses = store.read_all();

        if let Some(key) = input.idempotency_key.as_deref().filter(|k| !k.is_empty()) {
            if let Some(existing) = expenses
                .iter()
                .find(|e| e.idempotency_key.as_deref() == Some(key))
            {
                info!("Idempotency key matched existing expense {}", existing.id);
                return Ok(CreateOutcome::AlreadyExists(existing.clone()));
            }
        }

        let expense = new_expense(input);
        expenses.push(expense.clone());
        store.write_all(&expenses).map_err(ApiError::StoreFailure)?;

        info!("Created expense {} in category {}", expense.id, expense.category);
        Ok(CreateOutcome::Created(expense))
    }

    /// List expenses, optionally filtered by exact category, ordered by the
    /// expense date.
    pub async fn list(&self, category: Option<&str>, sort: SortOrder) -> Vec<Expense> {
        let store = self.store.lock().await;
        let mut expenses = store.read_all();

        if let Some(category) = category {
            expenses.retain(|e| e.category == category);
        }

        // Unparseable stored dates (hand-edited files) sort before everything
        expenses.sort_by_key(|e| {
            parse_expense_date(&e.date)
                .map(|d| d.timestamp_millis())
                .unwrap_or(i64::MIN)
        });
        if sort == SortOrder::DateDesc {
            expenses.reverse();
        }

        expenses
    }

    /// Delete an expense by id.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        if id.is_empty() {
            return Err(ApiError::MissingIdentifier);
        }

        let store = self.store.lock().await;
        if store.delete_by_id(id).map_err(ApiError::StoreFailure)? {
            info!("Deleted expense {}", id);
            Ok(())
        } else {
            Err(ApiError::NotFound)
        }
    }
}

fn new_expense(input: ValidExpenseInput) -> Expense {
    Expense {
        id: Expense::generate_id(),
        amount: input.amount,
        category: input.category,
        description: input.description,
        date: input.date,
        created_at: Utc::now(),
        idempotency_key: input.idempotency_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup_test_service() -> (ExpenseService, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = ExpenseStore::new(temp_dir.path().join("expenses.json"));
        store.ensure_initialized().expect("Failed to initialize store");
        (ExpenseService::new(store), temp_dir)
    }

    fn payload(amount: f64, category: &str, date: &str) -> serde_json::Value {
        json!({
            "amount": amount,
            "category": category,
            "description": format!("{} expense", category),
            "date": date,
        })
    }

    #[tokio::test]
    async fn test_create_appends_one_record() {
        let (service, _temp_dir) = setup_test_service();

        let outcome = service
            .create(&payload(42.50, "Food", "2024-01-15T00:00:00Z"))
            .await
            .unwrap();

        let created = match outcome {
            CreateOutcome::Created(e) => e,
            CreateOutcome::AlreadyExists(_) => panic!("expected a fresh record"),
        };
        assert!(!created.id.is_empty());
        assert_eq!(created.amount, 42.50);

        let all = service.list(None, SortOrder::DateDesc).await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, created.id);
    }

    #[tokio::test]
    async fn test_created_ids_are_unique() {
        let (service, _temp_dir) = setup_test_service();

        let first = service
            .create(&payload(1.0, "Food", "2024-01-15T00:00:00Z"))
            .await
            .unwrap();
        let second = service
            .create(&payload(2.0, "Food", "2024-01-16T00:00:00Z"))
            .await
            .unwrap();

        assert_ne!(first.expense().id, second.expense().id);
        assert_eq!(service.list(None, SortOrder::DateDesc).await.len(), 2);
    }

    #[tokio::test]
    async fn test_idempotent_replay_returns_same_record() {
        let (service, _temp_dir) = setup_test_service();
        let mut body = payload(42.50, "Food", "2024-01-15T00:00:00Z");
        body["idempotencyKey"] = json!("retry-abc");

        let first = service.create(&body).await.unwrap();
        let second = service.create(&body).await.unwrap();
        let third = service.create(&body).await.unwrap();

        assert!(matches!(first, CreateOutcome::Created(_)));
        assert!(matches!(second, CreateOutcome::AlreadyExists(_)));
        assert_eq!(first.expense(), second.expense());
        assert_eq!(first.expense(), third.expense());

        // Collection size unchanged by the replays
        assert_eq!(service.list(None, SortOrder::DateDesc).await.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_create_distinct_records() {
        let (service, _temp_dir) = setup_test_service();
        let mut first = payload(10.0, "Food", "2024-01-15T00:00:00Z");
        first["idempotencyKey"] = json!("key-1");
        let mut second = payload(10.0, "Food", "2024-01-15T00:00:00Z");
        second["idempotencyKey"] = json!("key-2");

        service.create(&first).await.unwrap();
        service.create(&second).await.unwrap();

        assert_eq!(service.list(None, SortOrder::DateDesc).await.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_payload_does_not_touch_store() {
        let (service, _temp_dir) = setup_test_service();
        let body = payload(-5.0, "Food", "2024-01-15T00:00:00Z");

        let err = service.create(&body).await.unwrap_err();

        match err {
            ApiError::InvalidInput(errors) => {
                assert!(errors.field_errors.contains_key("amount"));
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
        assert!(service.list(None, SortOrder::DateDesc).await.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_by_exact_category() {
        let (service, _temp_dir) = setup_test_service();
        service
            .create(&payload(10.0, "Food", "2024-01-15T00:00:00Z"))
            .await
            .unwrap();
        service
            .create(&payload(20.0, "Travel", "2024-01-16T00:00:00Z"))
            .await
            .unwrap();
        service
            .create(&payload(30.0, "Food", "2024-01-17T00:00:00Z"))
            .await
            .unwrap();

        let food = service.list(Some("Food"), SortOrder::DateDesc).await;
        assert_eq!(food.len(), 2);
        assert!(food.iter().all(|e| e.category == "Food"));

        // Case-sensitive, no partial match
        assert!(service.list(Some("food"), SortOrder::DateDesc).await.is_empty());
        assert!(service.list(Some("Foo"), SortOrder::DateDesc).await.is_empty());

        assert_eq!(service.list(None, SortOrder::DateDesc).await.len(), 3);
    }

    #[tokio::test]
    async fn test_list_sort_orders() {
        let (service, _temp_dir) = setup_test_service();
        for date in ["2024-01-16T00:00:00Z", "2024-01-14T00:00:00Z", "2024-01-15T00:00:00Z"] {
            service.create(&payload(10.0, "Food", date)).await.unwrap();
        }

        let desc = service.list(None, SortOrder::DateDesc).await;
        let desc_dates: Vec<&str> = desc.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(
            desc_dates,
            vec!["2024-01-16T00:00:00Z", "2024-01-15T00:00:00Z", "2024-01-14T00:00:00Z"]
        );

        let asc = service.list(None, SortOrder::DateAsc).await;
        let asc_dates: Vec<&str> = asc.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(
            asc_dates,
            vec!["2024-01-14T00:00:00Z", "2024-01-15T00:00:00Z", "2024-01-16T00:00:00Z"]
        );
    }

    #[tokio::test]
    async fn test_list_sorts_mixed_date_formats() {
        let (service, _temp_dir) = setup_test_service();
        service.create(&payload(1.0, "Food", "2024-01-15")).await.unwrap();
        service
            .create(&payload(2.0, "Food", "2024-01-15T12:00:00Z"))
            .await
            .unwrap();

        let desc = service.list(None, SortOrder::DateDesc).await;
        assert_eq!(desc[0].date, "2024-01-15T12:00:00Z");
        assert_eq!(desc[1].date, "2024-01-15");
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let (service, _temp_dir) = setup_test_service();
        let outcome = service
            .create(&payload(10.0, "Food", "2024-01-15T00:00:00Z"))
            .await
            .unwrap();
        let id = outcome.expense().id.clone();

        service.delete(&id).await.unwrap();

        let remaining = service.list(None, SortOrder::DateDesc).await;
        assert!(remaining.iter().all(|e| e.id != id));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let (service, _temp_dir) = setup_test_service();

        let err = service.delete("no-such-id").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_empty_id_is_missing_identifier() {
        let (service, _temp_dir) = setup_test_service();

        let err = service.delete("").await.unwrap_err();
        assert!(matches!(err, ApiError::MissingIdentifier));
    }

    #[test]
    fn test_sort_order_token_fallback() {
        assert_eq!(SortOrder::from_token(Some("date_asc")), SortOrder::DateAsc);
        assert_eq!(SortOrder::from_token(Some("date_desc")), SortOrder::DateDesc);
        assert_eq!(SortOrder::from_token(Some("bogus")), SortOrder::DateDesc);
        assert_eq!(SortOrder::from_token(None), SortOrder::DateDesc);
    }
}
