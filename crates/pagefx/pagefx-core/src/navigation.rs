//! The page transition pipeline.
//!
//! `Idle → Fetching → Exiting → Swapping → Entering → Idle`. A failed fetch or document
//! extraction settles in `Failed` instead, which accepts the next request like `Idle`.
//! Nothing in the live document or the session history changes before the snapshot is
//! in hand.

use serde::{Deserialize, Serialize};

use crate::animation::animate;
use crate::error::PageError;
use crate::fetch::{get_content, PageSnapshot};
use crate::host::{Host, Method, Selector};
use crate::viewport::ViewportObserver;
use crate::PageFx;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// Activation of a page-link anchor (or a programmatic call).
    Link,
    /// Browser back/forward.
    Popstate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub url: String,
    pub trigger: Trigger,
    /// Host clock reading when the request was issued, in ms.
    pub issued_at: f64,
}

impl NavigationRequest {
    pub fn link(url: impl Into<String>, issued_at: f64) -> Self {
        Self {
            url: url.into(),
            trigger: Trigger::Link,
            issued_at,
        }
    }

    pub fn popstate(url: impl Into<String>, issued_at: f64) -> Self {
        Self {
            url: url.into(),
            trigger: Trigger::Popstate,
            issued_at,
        }
    }

    #[inline]
    pub fn is_popstate(&self) -> bool {
        self.trigger == Trigger::Popstate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NavState {
    #[default]
    Idle,
    Fetching,
    Exiting,
    Swapping,
    Entering,
    Failed,
}

impl NavState {
    /// Whether a pipeline run currently owns the page.
    pub fn is_busy(&self) -> bool {
        !matches!(self, NavState::Idle | NavState::Failed)
    }
}

/// How a call to [`PageFx::navigate`] ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Completed,
    /// Link to the page already shown.
    Unchanged,
    /// Popstate that arrived mid-transition; it runs once the current one is done.
    Deferred,
}

/// Mutable state shared by the pipeline stages and the viewport callbacks.
#[derive(Debug)]
pub struct PipelineContext<E> {
    pub state: NavState,
    /// Set while a popstate-triggered run is between its start and the swap.
    pub popstate: bool,
    /// Latest popstate received while busy.
    pub deferred: Option<NavigationRequest>,
    pub observer: ViewportObserver<E>,
}

impl<E> Default for PipelineContext<E> {
    fn default() -> Self {
        Self {
            state: NavState::Idle,
            popstate: false,
            deferred: None,
            observer: ViewportObserver::default(),
        }
    }
}

impl<H: Host> PageFx<H> {
    /// Run the transition pipeline for `request`.
    ///
    /// While another run is in flight, link requests fail with `PageError::Busy` and
    /// popstate requests are deferred until the current run settles. Fetch and
    /// extraction failures leave the page untouched and are logged once here.
    pub async fn navigate(&self, request: NavigationRequest) -> Result<NavOutcome, PageError> {
        if !request.is_popstate() && request.url == self.host.location() {
            log::debug!("navigate: already at {}", request.url);
            return Ok(NavOutcome::Unchanged);
        }
        if let Some(outcome) = self.admit(&request)? {
            return Ok(outcome);
        }

        let result = self.run_pipeline(&request).await;
        let mut next = self.settle(&request, &result);
        while let Some(deferred) = next {
            let replay = self.run_pipeline(&deferred).await;
            next = self.settle(&deferred, &replay);
        }
        result.map(|()| NavOutcome::Completed)
    }

    /// Claim the pipeline for `request`, or decide what to do with it while busy.
    fn admit(&self, request: &NavigationRequest) -> Result<Option<NavOutcome>, PageError> {
        let mut ctx = self.ctx.borrow_mut();
        if ctx.state.is_busy() {
            if request.is_popstate() {
                log::debug!("navigate: deferring popstate to {}", request.url);
                ctx.deferred = Some(request.clone());
                return Ok(Some(NavOutcome::Deferred));
            }
            log::debug!("navigate: busy, dropping link to {}", request.url);
            return Err(PageError::Busy {
                url: request.url.clone(),
            });
        }
        begin(&mut ctx, request);
        Ok(None)
    }

    /// End the run in `Idle` or `Failed` and hand back a deferred request, already begun.
    fn settle(
        &self,
        request: &NavigationRequest,
        result: &Result<(), PageError>,
    ) -> Option<NavigationRequest> {
        let mut ctx = self.ctx.borrow_mut();
        ctx.state = match result {
            Ok(()) => {
                let took = self.host.now_ms() - request.issued_at;
                log::info!("navigated to {} in {took:.0}ms", request.url);
                NavState::Idle
            }
            Err(err) => {
                log::error!(
                    "navigation to {} failed ({}): {err}",
                    request.url,
                    err.category()
                );
                NavState::Failed
            }
        };
        ctx.popstate = false;

        let next = ctx.deferred.take()?;
        begin(&mut ctx, &next);
        Some(next)
    }

    async fn run_pipeline(&self, request: &NavigationRequest) -> Result<(), PageError> {
        let markers = &self.config.markers;
        let transitions = &self.config.transitions;

        let response = get_content(&self.host, &request.url, Method::Get).await?;
        let snapshot = PageSnapshot::extract(
            &self.host,
            &request.url,
            &response.body,
            &markers.main_content,
        )?;

        self.host.set_title(&snapshot.title);
        self.update_history(&snapshot.title, &request.url);

        self.set_state(NavState::Exiting);
        let old = self
            .host
            .query_first(None, &Selector::attr(&markers.main_content));
        if old.is_some() {
            animate(&self.host, old.as_ref(), Some(&transitions.exit), true).await;
        } else {
            log::warn!("navigate: no current [{}] to replace", markers.main_content);
        }

        self.set_state(NavState::Swapping);
        self.swap_content(old.as_ref(), &snapshot.content);

        self.set_state(NavState::Entering);
        animate(
            &self.host,
            Some(&snapshot.content),
            Some(&transitions.enter),
            false,
        )
        .await;
        self.register_viewport_items(Some(&snapshot.content));

        self.set_active_nav_item(&request.url);
        Ok(())
    }

    fn update_history(&self, title: &str, url: &str) {
        if self.ctx.borrow().popstate {
            self.host.replace_state(title, url);
        } else {
            self.host.push_state(title, url);
        }
    }

    fn swap_content(&self, old: Option<&H::Element>, new: &H::Element) {
        if let Some(old) = old {
            self.host.detach(old);
        }
        self.collapse_small_nav();
        self.host.append_child(&self.landmarks.main_wrapper, new);

        let popstate = std::mem::take(&mut self.ctx.borrow_mut().popstate);
        if !popstate {
            self.host.scroll_to_top();
        }
    }

    /// Mark the nav link whose resolved URL equals `url` as active, clear the rest.
    pub fn set_active_nav_item(&self, url: &str) {
        let active = &self.config.classes.active;
        for link in &self.landmarks.nav_links {
            if self.host.href(link).as_deref() == Some(url) {
                self.host.add_class(link, active);
            } else {
                self.host.remove_class(link, active);
            }
        }
    }

    fn set_state(&self, state: NavState) {
        log::trace!("pipeline -> {state:?}");
        self.ctx.borrow_mut().state = state;
    }
}

fn begin<E>(ctx: &mut PipelineContext<E>, request: &NavigationRequest) {
    ctx.state = NavState::Fetching;
    ctx.popstate = request.is_popstate();
    log::debug!("pipeline -> Fetching {}", request.url);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_states() {
        assert!(!NavState::Idle.is_busy());
        assert!(!NavState::Failed.is_busy());
        for s in [
            NavState::Fetching,
            NavState::Exiting,
            NavState::Swapping,
            NavState::Entering,
        ] {
            assert!(s.is_busy(), "{s:?} should be busy");
        }
    }

    #[test]
    fn request_constructors() {
        let link = NavigationRequest::link("/b", 1.0);
        assert!(!link.is_popstate());
        let pop = NavigationRequest::popstate("/a", 2.0);
        assert!(pop.is_popstate());
        assert_eq!(pop.issued_at, 2.0);
    }
}
