use async_trait::async_trait;

use crate::domain::voucher::VoucherRecord;

/// Read-only voucher lookup.
///
/// Usage counts are never written here; redemption accounting belongs to
/// the administrative surface that owns the table.
#[async_trait]
pub trait VoucherStore: Send + Sync {
    async fn find_by_code(&self, code: &str) -> anyhow::Result<Option<VoucherRecord>>;
}
