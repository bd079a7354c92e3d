//! Per-post expand/collapse with on-demand engagement detail.
//!
//! Only the expanded post has detail. Collapsing discards it, so expanding
//! the same post again fetches it again.

use crate::api::types::EngagementDetail;
use crate::event::{ApiResult, Effect, Request};
use crate::slot::{Generation, Slot};

#[derive(Debug, Default)]
pub struct DrillDown {
    expanded: Option<String>,
    detail: Slot<String, EngagementDetail>,
    show_fields: bool,
}

impl DrillDown {
    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    pub fn is_expanded(&self, post_id: &str) -> bool {
        self.expanded.as_deref() == Some(post_id)
    }

    pub fn detail(&self) -> Option<&EngagementDetail> {
        self.detail.data()
    }

    pub fn is_loading(&self) -> bool {
        self.detail.is_loading()
    }

    /// Whether the data-transparency panel is open.
    pub fn show_fields(&self) -> bool {
        self.show_fields
    }

    /// Expand `post_id`, or collapse it if it is already expanded.
    ///
    /// Expanding a different post supersedes any detail fetch in flight.
    pub fn toggle(&mut self, post_id: &str) -> Option<Effect> {
        if self.is_expanded(post_id) {
            self.collapse();
            return None;
        }
        self.expanded = Some(post_id.to_string());
        self.show_fields = false;
        Some(self.begin(post_id.to_string()))
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
        self.detail.invalidate();
        self.show_fields = false;
    }

    /// Forget the expanded post's detail so it is fetched again.
    pub fn invalidate_detail(&mut self) {
        self.detail.invalidate();
        self.show_fields = false;
    }

    pub fn toggle_fields(&mut self) {
        if self.detail.data().is_some() {
            self.show_fields = !self.show_fields;
        }
    }

    /// Apply a detail fetch. A failure degrades to an empty detail.
    pub fn apply(&mut self, generation: Generation, result: ApiResult<EngagementDetail>) -> bool {
        let detail = result.unwrap_or_else(|e| {
            tracing::warn!("failed to load engagements: {e}");
            EngagementDetail::default()
        });
        let applied = self.detail.resolve::<()>(generation, Ok(detail));
        if !applied {
            tracing::debug!(generation = generation.value(), "dropping stale engagement detail");
        }
        applied
    }

    /// Abandon an in-flight detail fetch; the post stays expanded.
    pub fn suspend(&mut self) {
        self.detail.cancel();
    }

    /// Re-issue the detail fetch for the expanded post if it was suspended.
    pub fn resume(&mut self) -> Option<Effect> {
        let post_id = self.expanded.clone()?;
        if !self.detail.needs_load(&post_id) {
            return None;
        }
        Some(self.begin(post_id))
    }

    fn begin(&mut self, post_id: String) -> Effect {
        let generation = self.detail.begin(post_id.clone());
        Effect::Fetch {
            generation,
            request: Request::PostDetail { post_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::ApiClientError;

    fn generation_of(effect: Option<Effect>) -> Generation {
        match effect {
            Some(Effect::Fetch {
                generation,
                request: Request::PostDetail { .. },
            }) => generation,
            other => panic!("expected detail fetch, got {other:?}"),
        }
    }

    fn detail(total: u64) -> EngagementDetail {
        EngagementDetail {
            total_count: total,
            ..Default::default()
        }
    }

    #[test]
    fn expand_collapse_expand_fetches_twice() {
        let mut dd = DrillDown::default();
        let mut fetches = 0;

        let g = generation_of(dd.toggle("p"));
        fetches += 1;
        assert!(dd.is_loading());
        assert!(dd.apply(g, Ok(detail(3))));
        assert_eq!(dd.detail().unwrap().total_count, 3);

        assert!(dd.toggle("p").is_none());
        assert!(dd.expanded().is_none());
        assert!(dd.detail().is_none());

        let g = generation_of(dd.toggle("p"));
        fetches += 1;
        assert!(dd.apply(g, Ok(detail(4))));
        assert_eq!(fetches, 2);
        assert_eq!(dd.detail().unwrap().total_count, 4);
    }

    #[test]
    fn failure_degrades_to_empty_detail() {
        let mut dd = DrillDown::default();
        let g = generation_of(dd.toggle("p"));
        let err = Arc::new(ApiClientError::Status {
            status: 500,
            body: String::new(),
        });
        assert!(dd.apply(g, Err(err)));
        assert_eq!(dd.detail(), Some(&EngagementDetail::default()));
        assert!(!dd.is_loading());
    }

    #[test]
    fn switching_posts_suppresses_earlier_detail() {
        let mut dd = DrillDown::default();
        let first = generation_of(dd.toggle("p1"));
        let second = generation_of(dd.toggle("p2"));

        assert!(dd.apply(second, Ok(detail(2))));
        assert!(!dd.apply(first, Ok(detail(1))));
        assert_eq!(dd.expanded(), Some("p2"));
        assert_eq!(dd.detail().unwrap().total_count, 2);
    }

    #[test]
    fn detail_arriving_after_collapse_is_dropped() {
        let mut dd = DrillDown::default();
        let g = generation_of(dd.toggle("p"));
        dd.toggle("p");
        assert!(!dd.apply(g, Ok(detail(1))));
        assert!(dd.detail().is_none());
    }

    #[test]
    fn suspend_then_resume_refetches() {
        let mut dd = DrillDown::default();
        let stale = generation_of(dd.toggle("p"));
        dd.suspend();
        assert_eq!(dd.expanded(), Some("p"));
        assert!(!dd.apply(stale, Ok(detail(1))));

        let fresh = generation_of(dd.resume());
        assert!(dd.apply(fresh, Ok(detail(5))));
        assert!(dd.resume().is_none());
    }

    #[test]
    fn fields_panel_resets_on_toggle() {
        let mut dd = DrillDown::default();
        let g = generation_of(dd.toggle("p"));
        dd.toggle_fields();
        assert!(!dd.show_fields(), "no panel while loading");
        dd.apply(g, Ok(detail(0)));
        dd.toggle_fields();
        assert!(dd.show_fields());
        dd.toggle("q");
        assert!(!dd.show_fields());
    }
}
