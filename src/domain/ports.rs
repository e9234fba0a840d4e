use crate::config::fiscal::FiscalWindow;
use crate::domain::model::TransactionPage;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// One page of the remote transaction search. The pagination loop is generic
/// over this so it can run against a scripted in-memory source in tests.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn fetch_page(
        &self,
        agency_full_name: &str,
        window: &FiscalWindow,
        page: u32,
    ) -> Result<TransactionPage>;
}
