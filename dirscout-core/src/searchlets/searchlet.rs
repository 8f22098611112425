//! The uniform search contract shared by listers and their combinators.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ScoutResult;

/// A cancellable search returning absolute paths in result order.
///
/// Cancellation is cooperative: implementations check the token at their
/// natural boundaries and return whatever is final at that point. A cancelled
/// search is not an error.
#[async_trait]
pub trait Searchlet: Send + Sync {
    /// Short, stable identifier of the search-let kind.
    fn name(&self) -> &'static str;

    /// One-line description of the configured search.
    fn summary(&self) -> String;

    /// Precondition check run before every search.
    fn check(&self) -> ScoutResult<()> {
        Ok(())
    }

    /// Performs the search itself; callers go through [`Searchlet::search`].
    async fn do_search(&self, cancel: &CancellationToken) -> ScoutResult<Vec<String>>;

    async fn search(&self, cancel: &CancellationToken) -> ScoutResult<Vec<String>> {
        self.check()?;
        self.do_search(cancel).await
    }
}
