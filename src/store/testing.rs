use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::in_memory::InMemoryCustomerStore;
use super::traits::{CustomerStore, StoreError};
use crate::domain::{Customer, CustomerId};

/// In-memory customer store that can refuse saves and slow down lookups
#[derive(Default)]
pub(crate) struct FaultyCustomerStore {
    inner: InMemoryCustomerStore,
    fail_saves: AtomicBool,
    lookup_delay: Duration,
}

impl FaultyCustomerStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_lookup_delay(delay: Duration) -> Self {
        Self {
            lookup_delay: delay,
            ..Self::default()
        }
    }

    pub(crate) fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CustomerStore for FaultyCustomerStore {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_last_name(&self, last_name: &str) -> Result<Option<Customer>, StoreError> {
        if !self.lookup_delay.is_zero() {
            tokio::time::sleep(self.lookup_delay).await;
        }
        self.inner.find_by_last_name(last_name).await
    }

    async fn find_by_first_name(&self, first_name: &str) -> Result<Option<Customer>, StoreError> {
        self.inner.find_by_first_name(first_name).await
    }

    async fn save(&self, customer: Customer) -> Result<Customer, StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("customer store offline".into()));
        }
        self.inner.save(customer).await
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.inner.delete_all().await
    }

    async fn find_all(&self) -> Result<Vec<Customer>, StoreError> {
        self.inner.find_all().await
    }

    async fn restore(&self, id: CustomerId, previous: Option<Customer>) -> Result<(), StoreError> {
        self.inner.restore(id, previous).await
    }
}
