use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;

use concierge_providers::{Filter, RecordStore};

use crate::domain::repo::VoucherStore;
use crate::domain::voucher::VoucherRecord;

const VOUCHERS_TABLE: &str = "vouchers";

/// Voucher lookup backed by the generic record store.
pub struct StoreVoucherRepo {
    store: Arc<dyn RecordStore>,
}

impl StoreVoucherRepo {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl VoucherStore for StoreVoucherRepo {
    async fn find_by_code(&self, code: &str) -> anyhow::Result<Option<VoucherRecord>> {
        let rows = self
            .store
            .select(VOUCHERS_TABLE, &Filter::new().eq("code", code))
            .await
            .context("voucher lookup")?;

        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        let record: VoucherRecord =
            serde_json::from_value(row).context("decode voucher row")?;
        Ok(Some(record))
    }
}
