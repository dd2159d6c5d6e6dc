//! Role-slot bookkeeping for the status area.
//!
//! Every menu button embedded in the strip occupies a named slot
//! ("dateMenu", "quickSettings", third-party roles...). A role holds at
//! most one active widget; registering a second one under an occupied role
//! is a contract violation surfaced as `Error::RoleConflict`.
//!
//! Like `RolePool`, the registry is generic so the slot semantics can be
//! tested without GTK; the panel instantiates it with `PanelButton`.

use std::cell::RefCell;
use std::collections::HashMap;

use slatebar_core::{Error, Result};

/// Which of the three regions a widget goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionName {
    Left,
    Center,
    Right,
}

impl RegionName {
    /// Resolve a user-supplied region name. Unrecognized names fall back
    /// to the right region.
    pub fn from_name(name: &str) -> Self {
        match name {
            "left" => RegionName::Left,
            "center" => RegionName::Center,
            _ => RegionName::Right,
        }
    }
}

/// role → active widget map.
pub struct SlotRegistry<T> {
    slots: RefCell<HashMap<String, T>>,
}

impl<T: Clone> SlotRegistry<T> {
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(HashMap::new()),
        }
    }

    /// Whether `role` currently has an active widget.
    pub fn is_occupied(&self, role: &str) -> bool {
        self.slots.borrow().contains_key(role)
    }

    /// The active widget for `role`, if any.
    pub fn get(&self, role: &str) -> Option<T> {
        self.slots.borrow().get(role).cloned()
    }

    /// Record `item` as the active widget for `role`.
    ///
    /// Fails with `RoleConflict` when the role is already occupied; the
    /// existing widget is left untouched.
    pub fn occupy(&self, role: &str, item: T) -> Result<()> {
        let mut slots = self.slots.borrow_mut();
        if slots.contains_key(role) {
            return Err(Error::RoleConflict(role.to_string()));
        }
        slots.insert(role.to_string(), item);
        Ok(())
    }

    /// Clear `role` and hand back its widget. Safe to call on a vacant
    /// role; callers use the `None` case as their reentrancy guard.
    pub fn vacate(&self, role: &str) -> Option<T> {
        self.slots.borrow_mut().remove(role)
    }
}

impl<T: Clone> Default for SlotRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupy_and_get() {
        let slots: SlotRegistry<&str> = SlotRegistry::new();
        assert!(!slots.is_occupied("dateMenu"));
        slots.occupy("dateMenu", "clock").unwrap();
        assert!(slots.is_occupied("dateMenu"));
        assert_eq!(slots.get("dateMenu"), Some("clock"));
    }

    #[test]
    fn test_second_occupy_is_role_conflict() {
        let slots: SlotRegistry<&str> = SlotRegistry::new();
        slots.occupy("x", "first").unwrap();

        let err = slots.occupy("x", "second").unwrap_err();
        assert!(matches!(err, Error::RoleConflict(role) if role == "x"));
        // The original occupant survives.
        assert_eq!(slots.get("x"), Some("first"));
    }

    #[test]
    fn test_vacate_then_reoccupy() {
        let slots: SlotRegistry<&str> = SlotRegistry::new();
        slots.occupy("x", "first").unwrap();
        assert_eq!(slots.vacate("x"), Some("first"));
        assert!(!slots.is_occupied("x"));
        slots.occupy("x", "second").unwrap();
        assert_eq!(slots.get("x"), Some("second"));
    }

    #[test]
    fn test_vacate_vacant_role_is_noop() {
        let slots: SlotRegistry<&str> = SlotRegistry::new();
        assert_eq!(slots.vacate("missing"), None);
        // Calling twice stays a no-op: this is the reentrancy guard for
        // destroy observers firing mid-release.
        assert_eq!(slots.vacate("missing"), None);
    }

    #[test]
    fn test_region_name_resolution() {
        assert_eq!(RegionName::from_name("left"), RegionName::Left);
        assert_eq!(RegionName::from_name("center"), RegionName::Center);
        assert_eq!(RegionName::from_name("right"), RegionName::Right);
        // Unrecognized names land in the right region.
        assert_eq!(RegionName::from_name("middle"), RegionName::Right);
        assert_eq!(RegionName::from_name(""), RegionName::Right);
    }
}
