//! PanelButton - the capability contract for status-area widgets.
//!
//! A `PanelButton` is a small container holding a flat toggle and,
//! optionally, a popover menu parented to it. The popover travels with the
//! button when it is detached from one panel's region and re-inserted into
//! another's, which is what makes the pooled checkout/return cycle work.
//!
//! Third-party widgets registered through `Panel::add_to_status_area` must
//! be (or subclass) this type; the panel checks with a downcast and
//! rejects anything else.

use std::cell::RefCell;

use gtk4::glib;
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct PanelButton {
        pub(super) toggle: RefCell<Option<gtk4::ToggleButton>>,
        pub(super) popover: RefCell<Option<gtk4::Popover>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for PanelButton {
        const NAME: &'static str = "SlatebarPanelButton";
        type Type = super::PanelButton;
        type ParentType = gtk4::Box;

        fn class_init(klass: &mut Self::Class) {
            klass.set_css_name("panel-menu-button");
        }
    }

    impl ObjectImpl for PanelButton {
        fn constructed(&self) {
            self.parent_constructed();

            let toggle = gtk4::ToggleButton::new();
            toggle.set_has_frame(false);

            let obj = self.obj().downgrade();
            toggle.connect_toggled(move |toggle| {
                let Some(obj) = obj.upgrade() else {
                    return;
                };
                let popover = obj.imp().popover.borrow().clone();
                if let Some(popover) = popover {
                    if toggle.is_active() {
                        popover.popup();
                    } else {
                        popover.popdown();
                    }
                }
            });

            self.obj().append(&toggle);
            *self.toggle.borrow_mut() = Some(toggle);
        }

        fn dispose(&self) {
            if let Some(popover) = self.popover.borrow_mut().take() {
                popover.unparent();
            }
        }
    }

    impl WidgetImpl for PanelButton {}
    impl BoxImpl for PanelButton {}
}

glib::wrapper! {
    pub struct PanelButton(ObjectSubclass<imp::PanelButton>)
        @extends gtk4::Box, gtk4::Widget,
        @implements gtk4::Accessible, gtk4::Buildable, gtk4::ConstraintTarget, gtk4::Orientable;
}

impl PanelButton {
    pub fn new() -> Self {
        glib::Object::builder().build()
    }

    /// Set the button face (icon, label, ...).
    pub fn set_content(&self, content: &impl IsA<gtk4::Widget>) {
        if let Some(toggle) = self.imp().toggle.borrow().as_ref() {
            toggle.set_child(Some(content));
        }
    }

    /// Attach (or clear) the button's menu. The popover is parented to the
    /// button itself so it follows the button across re-parenting.
    pub fn set_menu(&self, menu: Option<&gtk4::Popover>) {
        let previous = self.imp().popover.borrow_mut().take();
        if let Some(previous) = previous {
            previous.popdown();
            previous.unparent();
        }
        if let Some(menu) = menu {
            menu.set_parent(self);
            menu.set_autohide(true);

            // Keep the toggle in sync when the popover dismisses itself.
            let obj = self.downgrade();
            menu.connect_closed(move |_| {
                let Some(obj) = obj.upgrade() else {
                    return;
                };
                if let Some(toggle) = obj.imp().toggle.borrow().as_ref() {
                    toggle.set_active(false);
                }
            });

            *self.imp().popover.borrow_mut() = Some(menu.clone());
        }
    }

    /// The attached menu, if any.
    pub fn menu(&self) -> Option<gtk4::Popover> {
        self.imp().popover.borrow().clone()
    }

    /// Invoke `f` on every press of the button face. Fires in addition to
    /// any menu toggling.
    pub fn connect_activated<F>(&self, f: F)
    where
        F: Fn() + 'static,
    {
        if let Some(toggle) = self.imp().toggle.borrow().as_ref() {
            toggle.connect_clicked(move |_| f());
        }
    }

    /// Remove the button from whichever region currently holds it,
    /// without destroying it. No-op when unparented.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            if let Some(region) = parent.downcast_ref::<gtk4::Box>() {
                region.remove(self);
            } else {
                self.unparent();
            }
        }
    }
}

impl Default for PanelButton {
    fn default() -> Self {
        Self::new()
    }
}
