//! PageFitEstimator — advisory "does this fit on the page?" feedback for a preview.
//!
//! # Lifecycle
//! - Construction resolves a container id through a [`SurfaceHost`]. A missing
//!   container is logged and leaves the estimator inert: every method is a no-op.
//! - `update_content` swaps markup and style overrides, then schedules overflow checks.
//! - Checks run at several settling delays because a real layout engine reflows
//!   asynchronously after a content swap. Pending checks are aborted when new
//!   content arrives, on `clear`, and on drop; the last applied verdict wins.
//!
//! # Verdicts
//! Every heuristic runs on every pass. A heuristic that fails to measure is
//! logged and contributes nothing; any overflow verdict marks the pass as
//! overflowing. Nothing here returns an error: overflow never blocks submission.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::preview::heuristics::{Heuristic, HeuristicOutcome, HeuristicSettings};
use crate::preview::metric_surface::DEFAULT_PAGE_BACKGROUND;
use crate::preview::surface::{MountLayout, PreviewSurface, SurfaceHost, ERROR_BORDER};
use crate::preview::template::PageTemplate;

pub const PLACEHOLDER_MARKUP: &str =
    r#"<div style="text-align: center; color: #999; padding: 100px 20px;">Select content to preview</div>"#;

pub const DEFAULT_TITLE: &str = "A5 Print Preview";

// ────────────────────────────────────────────────────────────────────────────
// Options
// ────────────────────────────────────────────────────────────────────────────

/// When overflow checks run after a content change.
#[derive(Debug, Clone, PartialEq)]
pub enum SettleSchedule {
    /// Evaluate once, synchronously. For surfaces whose layout is synchronous.
    Immediate,
    /// Evaluate after each delay, counted from the content change.
    Delayed(Vec<Duration>),
}

impl Default for SettleSchedule {
    fn default() -> Self {
        SettleSchedule::Delayed(vec![
            Duration::from_millis(10),
            Duration::from_millis(100),
            Duration::from_millis(300),
        ])
    }
}

/// Style overrides applied with new content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviewStyles {
    /// Page surface background.
    pub background_color: Option<String>,
    /// Content surface text colour.
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviewOptions {
    pub show_label: bool,
    pub show_overflow_warning: bool,
    pub title: Option<String>,
    /// Styles applied by [`PageFitEstimator::create_preview`].
    pub styles: PreviewStyles,
    #[serde(skip)]
    pub settle: SettleSchedule,
    #[serde(skip)]
    pub template: PageTemplate,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            show_label: true,
            show_overflow_warning: true,
            title: Some(DEFAULT_TITLE.to_string()),
            styles: PreviewStyles::default(),
            settle: SettleSchedule::default(),
            template: PageTemplate::default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reports
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeuristicResult {
    pub heuristic: Heuristic,
    pub number: usize,
    pub outcome: HeuristicOutcome,
}

/// Aggregate of one measurement pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverflowReport {
    pub overflowing: bool,
    /// `"Method N: reason"` for every heuristic that reported overflow.
    pub details: Vec<String>,
    pub results: Vec<HeuristicResult>,
}

impl OverflowReport {
    pub fn from_results(results: Vec<HeuristicResult>) -> Self {
        let details: Vec<String> = results
            .iter()
            .filter_map(|r| match &r.outcome {
                HeuristicOutcome::Verdict(v) if v.overflow => {
                    Some(format!("Method {}: {}", r.number, v.reason))
                }
                _ => None,
            })
            .collect();
        Self {
            overflowing: !details.is_empty(),
            details,
            results,
        }
    }

    /// Banner text for this report; `None` when nothing overflowed.
    pub fn banner_text(&self, page_name: &str) -> Option<String> {
        if self.details.is_empty() {
            return None;
        }
        Some(format!(
            "⚠️ Content exceeds {page_name} page boundaries. {}. Consider reducing content or splitting into multiple pages.",
            self.details.join("; ")
        ))
    }
}

fn default_banner_text(page_name: &str) -> String {
    format!(
        "⚠️ Content exceeds {page_name} page boundaries. Consider reducing content or splitting into multiple pages."
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Session
// ────────────────────────────────────────────────────────────────────────────

/// Mutable state shared between the estimator and its scheduled checks.
struct Session {
    surface: Box<dyn PreviewSurface>,
    settings: HeuristicSettings,
    page_name: &'static str,
    warning_enabled: bool,
    /// Last `(overflowing, banner text)` written to the surface.
    applied: Option<(bool, Option<String>)>,
    last_report: Option<OverflowReport>,
    /// Bumped whenever content changes or the preview is cleared; delayed checks
    /// scheduled for an older generation do nothing.
    generation: u64,
}

impl Session {
    fn evaluate(&mut self) -> OverflowReport {
        let results: Vec<HeuristicResult> = Heuristic::ALL
            .iter()
            .map(|&heuristic| {
                let outcome = heuristic.evaluate(self.surface.as_mut(), &self.settings);
                if let HeuristicOutcome::Unavailable { error } = &outcome {
                    warn!(
                        method = heuristic.number(),
                        %error,
                        "A5 preview overflow check method failed"
                    );
                }
                HeuristicResult {
                    heuristic,
                    number: heuristic.number(),
                    outcome,
                }
            })
            .collect();

        let report = OverflowReport::from_results(results);
        self.apply(&report);
        self.last_report = Some(report.clone());
        report
    }

    fn apply(&mut self, report: &OverflowReport) {
        if !self.warning_enabled {
            return;
        }
        let state = (report.overflowing, report.banner_text(self.page_name));
        if self.applied.as_ref() == Some(&state) {
            return;
        }
        if state.0 {
            self.surface.set_warning(true, state.1.as_deref());
            self.surface.set_border(Some(ERROR_BORDER));
        } else {
            self.hide_warning();
        }
        self.applied = Some(state);
    }

    fn hide_warning(&mut self) {
        if !self.warning_enabled {
            return;
        }
        self.surface.set_warning(false, None);
        self.surface.set_border(None);
        self.applied = Some((false, None));
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Evaluates unless content changed since `generation` was read.
fn evaluate_if_current(session: &Mutex<Session>, generation: u64) -> Option<OverflowReport> {
    let mut session = lock(session);
    (session.generation == generation).then(|| session.evaluate())
}

// ────────────────────────────────────────────────────────────────────────────
// Estimator
// ────────────────────────────────────────────────────────────────────────────

pub struct PageFitEstimator {
    container_id: String,
    options: PreviewOptions,
    /// `None` when the container was not found.
    session: Option<Arc<Mutex<Session>>>,
    pending: Vec<JoinHandle<()>>,
}

impl PageFitEstimator {
    /// Mounts a preview on the container registered as `container_id`.
    pub fn new(host: &mut dyn SurfaceHost, container_id: &str, options: PreviewOptions) -> Self {
        match host.find_surface(container_id) {
            Some(surface) => Self::attach(surface, container_id, options),
            None => {
                error!(container_id, "preview container not found");
                Self {
                    container_id: container_id.to_string(),
                    options,
                    session: None,
                    pending: Vec::new(),
                }
            }
        }
    }

    /// Mounts a preview on a surface the caller already holds.
    pub fn attach(
        mut surface: Box<dyn PreviewSurface>,
        container_id: &str,
        options: PreviewOptions,
    ) -> Self {
        let template = options.template;
        surface.mount(&MountLayout {
            title: options.title.clone().filter(|t| !t.is_empty()),
            placeholder: PLACEHOLDER_MARKUP.to_string(),
            label: options.show_label.then(|| template.label()),
            warning: options
                .show_overflow_warning
                .then(|| default_banner_text(template.name)),
        });

        let session = Session {
            surface,
            settings: HeuristicSettings::for_template(&template),
            page_name: template.name,
            warning_enabled: options.show_overflow_warning,
            applied: None,
            last_report: None,
            generation: 0,
        };

        Self {
            container_id: container_id.to_string(),
            options,
            session: Some(Arc::new(Mutex::new(session))),
            pending: Vec::new(),
        }
    }

    /// Mounts a preview and, when `content` is non-empty, shows it with `options.styles`.
    pub fn create_preview(
        host: &mut dyn SurfaceHost,
        container_id: &str,
        content: &str,
        options: PreviewOptions,
    ) -> Self {
        let styles = options.styles.clone();
        let mut estimator = Self::new(host, container_id, options);
        if !content.is_empty() {
            estimator.update_content(content, &styles);
        }
        estimator
    }

    pub fn is_mounted(&self) -> bool {
        self.session.is_some()
    }

    /// Replaces the displayed markup, applies style overrides and re-checks overflow.
    pub fn update_content(&mut self, content: &str, styles: &PreviewStyles) {
        let Some(session) = &self.session else {
            return;
        };
        {
            let mut session = lock(session);
            if let Some(background) = &styles.background_color {
                session.surface.set_page_background(background);
            }
            if let Some(color) = &styles.color {
                session.surface.set_text_color(color);
            }
            session.surface.set_markup(content);
            session.generation += 1;
        }
        self.check_overflow();
    }

    /// Schedules overflow evaluation per the settle schedule, replacing pending checks.
    pub fn check_overflow(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        if !self.options.show_overflow_warning {
            return;
        }
        self.cancel_pending();

        let delays = match &self.options.settle {
            SettleSchedule::Immediate => {
                lock(&session).evaluate();
                return;
            }
            SettleSchedule::Delayed(delays) => delays,
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(
                container_id = %self.container_id,
                "no async runtime; evaluating overflow immediately"
            );
            lock(&session).evaluate();
            return;
        };

        let generation = lock(&session).generation;
        for &delay in delays {
            let session = Arc::clone(&session);
            self.pending.push(runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                let measured =
                    tokio::task::spawn_blocking(move || evaluate_if_current(&session, generation))
                        .await;
                if let Err(e) = measured {
                    warn!(error = %e, "A5 preview overflow check task failed");
                }
            }));
        }
        debug!(
            container_id = %self.container_id,
            checks = self.pending.len(),
            "scheduled overflow checks"
        );
    }

    /// Runs one measurement pass now and applies its verdict.
    pub fn run_overflow_checks(&self) -> Option<OverflowReport> {
        let session = self.session.as_ref()?;
        Some(lock(session).evaluate())
    }

    /// Restores the placeholder and default background, hides the warning and
    /// drops pending checks.
    pub fn clear(&mut self) {
        self.cancel_pending();
        let Some(session) = &self.session else {
            return;
        };
        let mut session = lock(session);
        session.generation += 1;
        session.surface.set_markup(PLACEHOLDER_MARKUP);
        session.surface.set_page_background(DEFAULT_PAGE_BACKGROUND);
        session.hide_warning();
    }

    /// Currently displayed markup, verbatim. Empty when inert.
    pub fn get_content(&self) -> String {
        match &self.session {
            Some(session) => lock(session).surface.markup(),
            None => String::new(),
        }
    }

    pub fn last_report(&self) -> Option<OverflowReport> {
        let session = self.session.as_ref()?;
        lock(session).last_report.clone()
    }

    /// Reads the surface under the session lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&dyn PreviewSurface) -> R) -> Option<R> {
        let session = self.session.as_ref()?;
        let session = lock(session);
        Some(f(session.surface.as_ref()))
    }

    pub fn pending_checks(&self) -> usize {
        self.pending.iter().filter(|h| !h.is_finished()).count()
    }

    fn cancel_pending(&mut self) {
        for handle in self.pending.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for PageFitEstimator {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
