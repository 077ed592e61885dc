//! Condition-based waits over a [`RenderContext`].
//!
//! Every wait polls the DOM at a fixed interval until a condition holds or a
//! deadline passes. Query errors while polling count as "not there yet",
//! since the widget rebuilds its DOM between states.

use crate::error::NavigationError;
use crate::renderer::{ElementPath, RenderContext};
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

async fn count_or_zero(ctx: &dyn RenderContext, scope: Option<&ElementPath>, selector: &str) -> usize {
    match ctx.count(scope, selector).await {
        Ok(n) => n,
        Err(e) => {
            trace!("query {selector} failed while waiting: {e}");
            0
        }
    }
}

/// Poll until at least `min` elements match. Returns the last count seen,
/// which is below `min` when the deadline passed.
pub async fn wait_for_count(
    ctx: &dyn RenderContext,
    scope: Option<&ElementPath>,
    selector: &str,
    min: usize,
    timeout: Duration,
    poll: Duration,
) -> usize {
    let deadline = Instant::now() + timeout;
    loop {
        let n = count_or_zero(ctx, scope, selector).await;
        if n >= min || Instant::now() >= deadline {
            return n;
        }
        tokio::time::sleep(poll).await;
    }
}

/// Poll until at least `min` elements match and the count held steady
/// across two consecutive polls, so late rows are not cut off.
/// Returns the last count seen.
pub async fn wait_for_stable_count(
    ctx: &dyn RenderContext,
    scope: Option<&ElementPath>,
    selector: &str,
    min: usize,
    timeout: Duration,
    poll: Duration,
) -> usize {
    let deadline = Instant::now() + timeout;
    let mut previous = None;
    loop {
        let n = count_or_zero(ctx, scope, selector).await;
        if n >= min && previous == Some(n) {
            return n;
        }
        if Instant::now() >= deadline {
            return n;
        }
        previous = Some(n);
        tokio::time::sleep(poll).await;
    }
}

/// Wait for a required control. Absence is a navigation failure.
pub async fn wait_for_selector(
    ctx: &dyn RenderContext,
    what: &'static str,
    selector: &str,
    timeout: Duration,
    poll: Duration,
) -> Result<usize, NavigationError> {
    let n = wait_for_count(ctx, None, selector, 1, timeout, poll).await;
    if n == 0 {
        return Err(NavigationError::Timeout {
            what,
            selector: selector.to_string(),
            waited_ms: timeout.as_millis(),
        });
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::mock::MockWidget;

    const POLL: Duration = Duration::from_millis(1);

    #[tokio::test]
    async fn test_wait_for_selector_times_out() {
        let widget = MockWidget::new(vec![], vec![]);
        let err = wait_for_selector(&widget, "frame", "iframe", Duration::from_millis(20), POLL)
            .await
            .unwrap_err();
        assert!(matches!(err, NavigationError::Timeout { what: "frame", .. }));
    }

    #[tokio::test]
    async fn test_wait_for_count_returns_early() {
        let mut widget = MockWidget::new(vec![], vec![]);
        widget.open_landing().await;
        let n = wait_for_count(&widget, None, "iframe", 1, Duration::from_secs(5), POLL).await;
        assert_eq!(n, 1);
    }

    #[tokio::test]
    async fn test_stable_count_waits_for_late_rows() {
        let mut widget = MockWidget::new(vec![MockWidget::place_rows(7)], vec![]);
        widget.reveal_rows_per_poll = Some(2);
        widget.open_place_panel(0);
        let n = wait_for_stable_count(
            &widget,
            None,
            &widget.selectors.panel_fields.clone(),
            5,
            Duration::from_secs(5),
            POLL,
        )
        .await;
        assert_eq!(n, 7);
    }
}
