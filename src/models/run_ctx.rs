//! The context object threaded through a run (spec §3, §5).
//!
//! `RunCtx` is created once at startup and handed to every inspection as
//! a shared reference. Per the design note replacing the original's
//! process-wide mutable globals with explicit context-passing, nothing
//! here is a singleton; the only mutation any inspection is allowed to
//! perform is appending to the result sink and raising the watermark,
//! so those two pieces of state live behind `RefCell`/`Cell` and
//! everything else is a plain immutable field reachable through `&RunCtx`.

use std::cell::{Cell, Ref, RefCell};
use std::path::PathBuf;

use crate::config::{Config, VendorData};
use crate::models::peer::PeerSet;
use crate::models::pkg::Pkg;
use crate::models::result::{ResultParams, ResultRecord};
use crate::models::severity::Severity;

pub struct RunCtx {
    pub config: Config,
    pub vendor_data: VendorData,
    pub workdir: PathBuf,
    pub before_build: Option<String>,
    pub after_build: Option<String>,
    pub packages: Vec<Pkg>,
    pub peers: PeerSet,
    /// Bitmask of enabled inspections, indices assigned by the registry
    /// (spec §4.4 "(id_bit, name, single_build_ok, driver)").
    pub enabled_mask: u64,
    /// Severity at or above which the run's exit code reflects failure
    /// (`--threshold`, spec §6). Default `Verify`.
    pub threshold: Severity,
    results: RefCell<Vec<ResultRecord>>,
    worst: Cell<Severity>,
}

impl RunCtx {
    pub fn new(config: Config, vendor_data: VendorData, workdir: PathBuf) -> Self {
        RunCtx {
            config,
            vendor_data,
            workdir,
            before_build: None,
            after_build: None,
            packages: Vec::new(),
            peers: PeerSet::new(),
            enabled_mask: u64::MAX,
            threshold: Severity::Verify,
            results: RefCell::new(Vec::new()),
            worst: Cell::new(Severity::Ok),
        }
    }

    /// Append a result and raise the watermark if warranted (spec §5
    /// "add_result"). `Skip`/`Diagnostic` results are always appended but
    /// never raise the watermark (`Severity::is_orthogonal`).
    pub fn add_result(&self, params: ResultParams) {
        let severity = params.severity;
        self.results.borrow_mut().push(params.into());
        if !severity.is_orthogonal() && severity > self.worst.get() {
            self.worst.set(severity);
        }
    }

    /// True iff no result recorded so far for `inspection` has severity
    /// `>= max_severity` (spec §4.5 `results_suppressed`). `Diagnostic`
    /// results are excluded from the check on either side: a diagnostic
    /// never counts as "a result at max_severity" and is never itself
    /// suppressed.
    pub fn results_suppressed(&self, inspection: &str, max_severity: Severity) -> bool {
        if max_severity == Severity::Diagnostic {
            return false;
        }
        !self.results().iter().any(|r| {
            r.inspection == inspection && r.severity != Severity::Diagnostic && r.severity >= max_severity
        })
    }

    pub fn results(&self) -> Ref<'_, Vec<ResultRecord>> {
        self.results.borrow()
    }

    pub fn worst(&self) -> Severity {
        self.worst.get()
    }

    /// Drop the accumulated result list (spec §5 "free_results", run at
    /// teardown). `Drop` on `RunCtx` would reclaim the same memory; this
    /// exists so callers (tests, a long-lived CLI session re-running a
    /// report) can clear results without dropping the whole context.
    pub fn free_results(&mut self) {
        self.results.borrow_mut().clear();
        self.worst.set(Severity::Ok);
    }

    pub fn exceeds_threshold(&self) -> bool {
        self.worst() >= self.threshold
    }
}
