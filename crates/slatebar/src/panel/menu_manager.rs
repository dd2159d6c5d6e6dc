//! Popover coordination for the strip's menu buttons.
//!
//! Every menu hosted by a panel is registered here. The manager enforces
//! open/close exclusivity (mapping one popover closes the others) and
//! answers the "is any menu open" question the drag gesture uses as its
//! modal check.

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::Popover;
use gtk4::glib::SignalHandlerId;
use gtk4::prelude::*;

struct Inner {
    menus: RefCell<Vec<(Popover, SignalHandlerId)>>,
}

#[derive(Clone)]
pub struct MenuManager {
    inner: Rc<Inner>,
}

impl MenuManager {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                menus: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Track `menu`. Mapping it will close every other tracked menu.
    pub fn add_menu(&self, menu: &Popover) {
        if self.inner.menus.borrow().iter().any(|(m, _)| m == menu) {
            return;
        }
        let manager = self.clone();
        let handler = menu.connect_map(move |shown| manager.close_others(shown));
        self.inner.menus.borrow_mut().push((menu.clone(), handler));
    }

    /// Stop tracking `menu` and disconnect its exclusivity handler.
    pub fn remove_menu(&self, menu: &Popover) {
        let mut menus = self.inner.menus.borrow_mut();
        if let Some(pos) = menus.iter().position(|(m, _)| m == menu) {
            let (menu, handler) = menus.remove(pos);
            menu.disconnect(handler);
        }
    }

    /// Whether any tracked menu is currently open.
    pub fn any_open(&self) -> bool {
        self.inner.menus.borrow().iter().any(|(m, _)| m.is_visible())
    }

    fn close_others(&self, shown: &Popover) {
        // Collect first: popdown fires closed handlers that may re-enter
        // the manager.
        let others: Vec<Popover> = self
            .inner
            .menus
            .borrow()
            .iter()
            .map(|(m, _)| m.clone())
            .filter(|m| m != shown)
            .collect();
        for menu in others {
            if menu.is_visible() {
                menu.popdown();
            }
        }
    }
}

impl Default for MenuManager {
    fn default() -> Self {
        Self::new()
    }
}
