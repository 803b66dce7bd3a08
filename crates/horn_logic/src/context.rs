//! Per-run state of the backward engine.

use crate::error::{Error, Result};
use crate::variable::VariableId;

/// Mutable state threaded by `&mut` through one top-level backward search.
///
/// It tracks the discovery counter, the cycle root (the smallest discovery order among
/// in-progress variables some blocked rule depends on) and the variables whose rule
/// scan ended blocked, which must be settled when the root finishes.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// The discovery order handed to the next visited variable; never rewound in a run.
    next_order: usize,
    /// `None` stands for +infinity: no open cycle.
    root: Option<usize>,
    /// Variables left in progress by a blocked rule scan, in the order they finished.
    in_progress: Vec<VariableId>,
    depth: usize,
    deepest: usize,
    max_depth: Option<usize>,
}

impl ExecutionContext {
    /// Creates a context with no depth bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context that refuses to nest `OR` calls deeper than `max_depth`.
    pub fn with_max_depth(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Hands out the next discovery order.
    pub fn next_order(&mut self) -> usize {
        let order = self.next_order;
        self.next_order += 1;
        order
    }

    /// Returns the number of variables discovered so far.
    pub fn discovered(&self) -> usize {
        self.next_order
    }

    /// Returns the current cycle root, `None` when no cycle is open.
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    /// Lowers the cycle root to `order` if it is smaller.
    pub fn lower_root(&mut self, order: usize) {
        self.root = Some(self.root.map_or(order, |root| root.min(order)));
    }

    /// Returns `true` if `order` is the current cycle root.
    pub fn is_root(&self, order: usize) -> bool {
        self.root == Some(order)
    }

    /// Records a variable whose rule scan ended blocked.
    pub fn push_in_progress(&mut self, variable: VariableId) {
        self.in_progress.push(variable);
    }

    /// Returns the variables currently recorded as in progress.
    pub fn in_progress(&self) -> &[VariableId] {
        &self.in_progress
    }

    /// Closes the open cycle: hands back the recorded variables and clears the root.
    pub(crate) fn close_cycle(&mut self) -> Vec<VariableId> {
        self.root = None;
        std::mem::take(&mut self.in_progress)
    }

    /// Enters one level of `OR` nesting.
    pub(crate) fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if let Some(max_depth) = self.max_depth {
            if self.depth > max_depth {
                return Err(Error::MaxDepthExceeded { depth: max_depth });
            }
        }
        self.deepest = self.deepest.max(self.depth);
        Ok(())
    }

    /// Leaves one level of `OR` nesting.
    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Returns the deepest `OR` nesting reached so far.
    pub fn deepest(&self) -> usize {
        self.deepest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_are_monotonic() {
        let mut ctx = ExecutionContext::new();
        assert_eq!(ctx.next_order(), 0);
        assert_eq!(ctx.next_order(), 1);
        ctx.lower_root(0);
        ctx.close_cycle();
        assert_eq!(ctx.next_order(), 2);
        assert_eq!(ctx.discovered(), 3);
    }

    #[test]
    fn test_root_only_lowers() {
        let mut ctx = ExecutionContext::new();
        assert_eq!(ctx.root(), None);
        ctx.lower_root(4);
        ctx.lower_root(7);
        assert_eq!(ctx.root(), Some(4));
        ctx.lower_root(2);
        assert!(ctx.is_root(2));
        assert!(!ctx.is_root(4));
    }

    #[test]
    fn test_close_cycle_drains() {
        let mut ctx = ExecutionContext::new();
        ctx.lower_root(1);
        ctx.push_in_progress(VariableId(3));
        ctx.push_in_progress(VariableId(5));

        let drained = ctx.close_cycle();
        assert_eq!(drained, vec![VariableId(3), VariableId(5)]);
        assert!(ctx.in_progress().is_empty());
        assert_eq!(ctx.root(), None);
    }

    #[test]
    fn test_depth_limit() {
        let mut ctx = ExecutionContext::with_max_depth(Some(2));
        ctx.enter().unwrap();
        ctx.enter().unwrap();
        assert_eq!(
            ctx.enter(),
            Err(Error::MaxDepthExceeded { depth: 2 })
        );
        ctx.leave();
        ctx.leave();
        ctx.leave();
        assert_eq!(ctx.deepest(), 2);
    }
}
