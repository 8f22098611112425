//! Runs several searches in sequence and concatenates their results.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ScoutError, ScoutResult};
use crate::searchlets::searchlet::Searchlet;

pub struct MultiSearch {
    searches: Vec<Box<dyn Searchlet>>,
}

impl MultiSearch {
    #[must_use]
    pub fn new(searches: Vec<Box<dyn Searchlet>>) -> Self {
        Self { searches }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.searches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.searches.is_empty()
    }
}

#[async_trait]
impl Searchlet for MultiSearch {
    fn name(&self) -> &'static str {
        "multi"
    }

    fn summary(&self) -> String {
        let parts: Vec<String> = self
            .searches
            .iter()
            .map(|search: &Box<dyn Searchlet>| search.summary())
            .collect();

        format!("union of [{}]", parts.join(" | "))
    }

    fn check(&self) -> ScoutResult<()> {
        if self.searches.is_empty() {
            return Err(ScoutError::MissingSubSearch);
        }

        Ok(())
    }

    async fn do_search(&self, cancel: &CancellationToken) -> ScoutResult<Vec<String>> {
        let mut combined: Vec<String> = Vec::new();

        for (position, search) in self.searches.iter().enumerate() {
            if cancel.is_cancelled() {
                debug!(completed = position, "Multi search cancelled");
                break;
            }

            let found: Vec<String> = search
                .search(cancel)
                .await
                .map_err(|e: ScoutError| ScoutError::sub_search_failed(position + 1, e))?;

            combined.extend(found);
        }

        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<String>);

    #[async_trait]
    impl Searchlet for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn summary(&self) -> String {
            self.0.join(",")
        }

        async fn do_search(&self, _cancel: &CancellationToken) -> ScoutResult<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl Searchlet for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn summary(&self) -> String {
            "failing".to_string()
        }

        async fn do_search(&self, _cancel: &CancellationToken) -> ScoutResult<Vec<String>> {
            Err(ScoutError::task_join("failing", "disk on fire"))
        }
    }

    /// Cancels the shared token once it has produced its result.
    struct CancelsAfter(CancellationToken, &'static str);

    #[async_trait]
    impl Searchlet for CancelsAfter {
        fn name(&self) -> &'static str {
            "cancels_after"
        }

        fn summary(&self) -> String {
            self.1.to_string()
        }

        async fn do_search(&self, _cancel: &CancellationToken) -> ScoutResult<Vec<String>> {
            self.0.cancel();
            Ok(vec![self.1.to_string()])
        }
    }

    fn fixed(items: &[&str]) -> Box<dyn Searchlet> {
        Box::new(Fixed(items.iter().map(|s| (*s).to_string()).collect()))
    }

    #[tokio::test]
    async fn concatenates_in_configured_order() {
        let search = MultiSearch::new(vec![fixed(&["x"]), fixed(&["y"])]);

        let found = search.search(&CancellationToken::new()).await.unwrap();

        assert_eq!(found, ["x", "y"]);
    }

    #[tokio::test]
    async fn failure_names_the_sub_search() {
        let search = MultiSearch::new(vec![fixed(&["x"]), Box::new(Failing)]);

        let err = search.search(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, ScoutError::SubSearchFailed { index: 2, .. }));
        assert!(err.to_string().contains("search #2"), "{err}");
        assert!(err.to_string().contains("disk on fire"), "{err}");
    }

    #[tokio::test]
    async fn empty_union_is_a_configuration_error() {
        let search = MultiSearch::new(Vec::new());

        let err = search.search(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, ScoutError::MissingSubSearch));
        assert_eq!(err.to_string(), "At least one sub-search must be supplied");
    }

    #[tokio::test]
    async fn cancellation_keeps_completed_results() {
        let cancel = CancellationToken::new();
        let search = MultiSearch::new(vec![
            Box::new(CancelsAfter(cancel.clone(), "first")),
            fixed(&["never"]),
        ]);

        let found = search.search(&cancel).await.unwrap();

        assert_eq!(found, ["first"]);
    }
}
