//! Process-wide pool of detached menu buttons, keyed by role.
//!
//! The well-known popover buttons cannot be destroyed once they have been
//! shown: tearing one down leaves stale popover autohide state behind in
//! the toolkit, so a panel that goes away must *detach* its buttons and
//! park them here for the next panel to reclaim. The pool therefore
//! outlives every individual panel; stacks are created lazily per role and
//! never torn down for the lifetime of the process.
//!
//! Each role holds a stack: `release` pushes, `acquire_or_else` pops the
//! most recently released instance first. At any instant a button is either
//! embedded in exactly one panel or parked in exactly one stack, never
//! both.
//!
//! The pool is generic so its bookkeeping can be exercised without a
//! display server; the bar instantiates one global `RolePool<PanelButton>`
//! on the GTK main thread.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use super::menu_button::PanelButton;

/// Per-role stacks of reusable instances.
pub struct RolePool<T> {
    stacks: RefCell<HashMap<String, Vec<T>>>,
}

impl<T> RolePool<T> {
    pub fn new() -> Self {
        Self {
            stacks: RefCell::new(HashMap::new()),
        }
    }

    /// Reclaim the most recently released instance for `role`, or build a
    /// fresh one with `construct` if the stack is empty.
    ///
    /// The stack borrow is dropped before `construct` runs, so a
    /// constructor may itself touch the pool.
    pub fn acquire_or_else<F>(&self, role: &str, construct: F) -> T
    where
        F: FnOnce() -> T,
    {
        let reclaimed = self.stacks.borrow_mut().get_mut(role).and_then(Vec::pop);
        match reclaimed {
            Some(item) => {
                debug!("reusing pooled instance for role `{role}`");
                item
            }
            None => construct(),
        }
    }

    /// Park a detached instance on `role`'s stack. It becomes the first
    /// candidate for the next acquire.
    pub fn release(&self, role: &str, item: T) {
        self.stacks
            .borrow_mut()
            .entry(role.to_string())
            .or_default()
            .push(item);
    }

    /// Number of parked instances for `role`.
    pub fn parked(&self, role: &str) -> usize {
        self.stacks.borrow().get(role).map_or(0, Vec::len)
    }
}

impl<T> Default for RolePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static MENU_POOL: Rc<RolePool<PanelButton>> = Rc::new(RolePool::new());
}

impl RolePool<PanelButton> {
    /// The process-wide button pool. Main thread only.
    pub fn global() -> Rc<RolePool<PanelButton>> {
        MENU_POOL.with(Rc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructs_when_stack_empty() {
        let pool: RolePool<String> = RolePool::new();
        let item = pool.acquire_or_else("dateMenu", || "fresh".to_string());
        assert_eq!(item, "fresh");
        assert_eq!(pool.parked("dateMenu"), 0);
    }

    #[test]
    fn test_reuse_across_panel_recreation() {
        // Panel 1 builds a button, then releases it on teardown; panel 2
        // must get the same instance back, not a new construction.
        let pool: RolePool<String> = RolePool::new();
        let first = pool.acquire_or_else("dateMenu", || "original".to_string());
        pool.release("dateMenu", first);

        let second = pool.acquire_or_else("dateMenu", || "rebuilt".to_string());
        assert_eq!(second, "original");
    }

    #[test]
    fn test_lifo_reuse_order() {
        let pool: RolePool<String> = RolePool::new();
        pool.release("quickSettings", "a".to_string());
        pool.release("quickSettings", "b".to_string());

        assert_eq!(
            pool.acquire_or_else("quickSettings", || unreachable!()),
            "b"
        );
        assert_eq!(
            pool.acquire_or_else("quickSettings", || unreachable!()),
            "a"
        );
        assert_eq!(pool.parked("quickSettings"), 0);
    }

    #[test]
    fn test_roles_are_independent() {
        let pool: RolePool<&str> = RolePool::new();
        pool.release("activities", "act");
        assert_eq!(pool.parked("activities"), 1);
        assert_eq!(pool.parked("dateMenu"), 0);

        let item = pool.acquire_or_else("dateMenu", || "date");
        assert_eq!(item, "date");
        assert_eq!(pool.parked("activities"), 1);
    }

    #[test]
    fn test_acquire_removes_from_stack() {
        // An acquired item is no longer parked: it lives in exactly one
        // place at a time.
        let pool: RolePool<u32> = RolePool::new();
        pool.release("r", 7);
        let _ = pool.acquire_or_else("r", || 0);
        assert_eq!(pool.parked("r"), 0);
    }

    #[test]
    fn test_double_acquire_does_not_construct_twice() {
        // Mirrors the panel's acquire path: an occupied slot never
        // reaches the pool again, so a second acquire for the same role
        // builds nothing and inserts nothing.
        use super::super::status_area::SlotRegistry;
        use std::cell::Cell;

        let pool: RolePool<u32> = RolePool::new();
        let slots: SlotRegistry<u32> = SlotRegistry::new();
        let built = Cell::new(0u32);

        let acquire = |role: &str| {
            if slots.is_occupied(role) {
                return;
            }
            let item = pool.acquire_or_else(role, || {
                built.set(built.get() + 1);
                built.get()
            });
            slots.occupy(role, item).unwrap();
        };

        acquire("dateMenu");
        acquire("dateMenu");
        assert_eq!(built.get(), 1);

        // Teardown parks the widget; the next panel gets it back.
        let item = slots.vacate("dateMenu").unwrap();
        pool.release("dateMenu", item);
        acquire("dateMenu");
        assert_eq!(built.get(), 1);
        assert_eq!(slots.get("dateMenu"), Some(1));
        assert_eq!(pool.parked("dateMenu"), 0);
    }

    #[test]
    fn test_constructor_may_reenter_pool() {
        let pool: RolePool<u32> = RolePool::new();
        let item = pool.acquire_or_else("outer", || {
            pool.release("inner", 1);
            2
        });
        assert_eq!(item, 2);
        assert_eq!(pool.parked("inner"), 1);
    }
}
