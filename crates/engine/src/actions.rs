//! Bulk actions on the instances selected in the pager.

use tracing::{info, warn};

use timekeeper_core::StoreError;
use timekeeper_notify::{Notifier, Severity};
use timekeeper_store::BulkAction;

use crate::pager::{InstancePager, PagerError};

/// Apply `action` to the pager's selection in one bulk call.
///
/// On success the current page is reloaded, the selection cleared and the
/// pager settled in case the page emptied. Returns `None` when nothing is
/// selected. The selection survives a failed call. A failed reload after a
/// successful call is reported as [`PagerError::Refresh`].
pub async fn apply_bulk(
    notifier: &dyn Notifier,
    pager: &mut InstancePager<'_>,
    action: BulkAction,
) -> Option<Result<usize, PagerError>> {
    let ids = pager.selected_ids().to_vec();
    if ids.is_empty() {
        return None;
    }

    match pager.store().bulk_instances(action, &ids).await {
        Ok(affected) => {
            info!(%action, requested = ids.len(), affected = affected.len(), "bulk instance action");
            notifier
                .notify(
                    &format!("{} instance(s) {}", ids.len(), action.past_tense()),
                    Severity::Success,
                )
                .await;
            pager.clear_selection();
            let applied = ids.len();
            Some(refresh(pager).await.map(|()| applied).map_err(|e| match e {
                PagerError::Store(source) => {
                    warn!(%action, error = %source, "instance page refresh failed");
                    PagerError::Refresh { applied, source }
                }
                other => other,
            }))
        }
        Err(e) => {
            warn!(%action, error = %e, "bulk instance action failed");
            notify_failure(notifier, action, &e).await;
            Some(Err(PagerError::Store(e)))
        }
    }
}

async fn refresh(pager: &mut InstancePager<'_>) -> Result<(), PagerError> {
    pager.reload().await?;
    pager.settle_after_operation().await
}

async fn notify_failure(notifier: &dyn Notifier, action: BulkAction, err: &StoreError) {
    notifier
        .notify(
            &format!("Failed to {action} instances: {}", err.message()),
            Severity::Error,
        )
        .await;
}
