//! Structural normalization of the unit graph.
//!
//! # Responsibility
//! - Reject genuine cycles.
//! - Make the root hold exactly the units without a unit parent.
//! - Turn a DAG into one tree expansion plus a back-reference list.
//!
//! # Invariants
//! - Every walk here is iterative; nesting depth never grows the call stack.
//! - A second run on a normalized package changes nothing.

use crate::error::{SedaError, SedaResult};
use crate::model::package::RootPartition;
use crate::model::{BackReference, Package, ROOT_UNIT_ID};
use log::{info, warn};
use std::collections::HashMap;
use std::time::Instant;

/// Outcome of one normalization run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Units expanded by the walk, root excluded.
    pub expanded: usize,
    pub back_references: Vec<BackReference>,
    /// Root entries removed because they have a unit parent or repeat.
    pub detached_roots: Vec<String>,
    /// Parentless units appended to the root.
    pub adopted_roots: Vec<String>,
}

impl NormalizeReport {
    /// Whether the run changed the root child list.
    pub fn changed_root(&self) -> bool {
        !self.detached_roots.is_empty() || !self.adopted_roots.is_empty()
    }
}

/// Normalizes `package` in place and flags it normalized.
///
/// # Errors
/// - [`SedaError::Cycle`] when a unit is its own ancestor.
pub fn normalize(package: &mut Package) -> SedaResult<NormalizeReport> {
    let started_at = Instant::now();

    if let Err(err) = detect_cycles(package) {
        warn!(
            "event=normalize module=service status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        );
        return Err(err);
    }

    let RootPartition {
        kept: root,
        detached: detached_roots,
        adopted: adopted_roots,
    } = package.partition_root();
    if root.as_slice() != package.root_children() {
        package.set_root_children(root);
    }

    let (expanded, back_references) = expand(package)?;
    package.set_normalized(back_references.clone());

    info!(
        "event=normalize module=service status=ok duration_ms={} units={} back_references={} detached={} adopted={}",
        started_at.elapsed().as_millis(),
        expanded,
        back_references.len(),
        detached_roots.len(),
        adopted_roots.len()
    );
    Ok(NormalizeReport {
        expanded,
        back_references,
        detached_roots,
        adopted_roots,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

fn detect_cycles(package: &Package) -> SedaResult<()> {
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    for start in package.units() {
        if marks.contains_key(start.id()) {
            continue;
        }
        marks.insert(start.id(), Mark::InProgress);
        let mut stack: Vec<(&str, usize)> = vec![(start.id(), 0)];
        while let Some(frame) = stack.last_mut() {
            let unit = package.unit(frame.0)?;
            let Some(child) = unit.children().get(frame.1) else {
                marks.insert(frame.0, Mark::Done);
                stack.pop();
                continue;
            };
            frame.1 += 1;
            let child = child.as_str();
            match marks.get(child) {
                Some(Mark::InProgress) => {
                    let mut path: Vec<String> = stack
                        .iter()
                        .map(|(id, _)| *id)
                        .skip_while(|id| *id != child)
                        .map(str::to_string)
                        .collect();
                    path.push(child.to_string());
                    return Err(SedaError::Cycle {
                        unit_id: child.to_string(),
                        path,
                    });
                }
                Some(Mark::Done) => {}
                None => {
                    marks.insert(child, Mark::InProgress);
                    stack.push((child, 0));
                }
            }
        }
    }
    Ok(())
}

fn expand(package: &mut Package) -> SedaResult<(usize, Vec<BackReference>)> {
    package.reset_visited();
    let mut expanded = 0;
    let mut back_references = Vec::new();
    let mut stack: Vec<(String, usize)> = vec![(ROOT_UNIT_ID.to_string(), 0)];
    while let Some((parent_id, position)) = stack.pop() {
        let Some(child_id) = package.unit(&parent_id)?.children().get(position).cloned() else {
            continue;
        };
        stack.push((parent_id.clone(), position + 1));
        if package.mark_visited(&child_id) {
            expanded += 1;
            stack.push((child_id, 0));
        } else {
            back_references.push(BackReference {
                parent_id,
                child_id,
                position,
            });
        }
    }
    Ok((expanded, back_references))
}
