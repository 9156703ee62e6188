//! Exactly-once pre-order walks over the units reachable from the root.
//!
//! Every operation resets the package visited set once at entry and takes
//! `&mut Package`, so two walks can never interleave on one package.

use crate::error::{SedaError, SedaResult};
use crate::model::{ArchiveUnit, Package};
use log::{info, warn};
use std::ops::ControlFlow;
use std::time::Instant;

/// Results and per-unit failures of a fallible bulk operation.
#[derive(Debug)]
pub struct BulkOutcome<T> {
    pub results: Vec<T>,
    /// Failures in visitation order, each carrying its unit id.
    pub failures: Vec<SedaError>,
}

impl<T> BulkOutcome<T> {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Counts units failing `predicate`; with `stop_on_first_failure` the walk
/// ends at the first failure and 1 is returned.
pub fn verify<P>(package: &mut Package, mut predicate: P, stop_on_first_failure: bool) -> usize
where
    P: FnMut(&ArchiveUnit) -> bool,
{
    let started_at = Instant::now();
    let mut failures = 0;
    walk(package, |unit| {
        if predicate(unit) {
            return ControlFlow::Continue(());
        }
        failures += 1;
        if stop_on_first_failure {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    info!(
        "event=verify module=service status=ok duration_ms={} failures={}",
        started_at.elapsed().as_millis(),
        failures
    );
    failures
}

/// Applies `transform` to every unit matching `predicate`, in visitation
/// order. The transform may mutate the unit.
pub fn collect<T, P, F>(package: &mut Package, mut predicate: P, mut transform: F) -> Vec<T>
where
    P: FnMut(&ArchiveUnit) -> bool,
    F: FnMut(&mut ArchiveUnit) -> T,
{
    let mut results = Vec::new();
    walk(package, |unit| {
        if predicate(unit) {
            results.push(transform(unit));
        }
        ControlFlow::Continue(())
    });
    results
}

/// Ids of the units matching `predicate`, in visitation order.
pub fn compliant_ids<P>(package: &mut Package, predicate: P) -> Vec<String>
where
    P: FnMut(&ArchiveUnit) -> bool,
{
    collect(package, predicate, |unit| unit.id().to_string())
}

/// Like [`collect`] with a fallible transform. Failures are recorded with
/// the unit id; the walk continues unless `stop_on_first_failure`.
pub fn try_collect<T, P, F>(
    package: &mut Package,
    mut predicate: P,
    mut transform: F,
    stop_on_first_failure: bool,
) -> BulkOutcome<T>
where
    P: FnMut(&ArchiveUnit) -> bool,
    F: FnMut(&mut ArchiveUnit) -> SedaResult<T>,
{
    let mut outcome = BulkOutcome {
        results: Vec::new(),
        failures: Vec::new(),
    };
    walk(package, |unit| {
        if !predicate(unit) {
            return ControlFlow::Continue(());
        }
        match transform(unit) {
            Ok(value) => outcome.results.push(value),
            Err(err) => {
                let err = err.in_unit(unit.id());
                warn!(
                    "event=bulk_transform module=service status=error unit_id={} error={}",
                    unit.id(),
                    err
                );
                outcome.failures.push(err);
                if stop_on_first_failure {
                    return ControlFlow::Break(());
                }
            }
        }
        ControlFlow::Continue(())
    });
    outcome
}

fn walk<V>(package: &mut Package, mut visit: V)
where
    V: FnMut(&mut ArchiveUnit) -> ControlFlow<()>,
{
    package.reset_visited();
    let mut stack: Vec<String> = package.root_children().iter().rev().cloned().collect();
    while let Some(id) = stack.pop() {
        if !package.mark_visited(&id) {
            continue;
        }
        let Ok(unit) = package.unit_mut(&id) else {
            warn!("event=walk module=service status=skip unit_id={} reason=unknown_id", id);
            continue;
        };
        if visit(unit).is_break() {
            return;
        }
        stack.extend(unit.children().iter().rev().cloned());
    }
}
