//! Book-keeping for the host listeners a widget holds.
//!
//! The host wires real DOM listeners; the widget records which ones it has
//! asked for so that every one acquired on mount/open is released on
//! destroy/close, and so that events for a hook that is not attached are
//! ignored.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    /// The editable surface.
    Surface,
    /// The dropdown panel.
    Dropdown,
    /// The document, while the dropdown is open or a mouse press is active.
    Document,
    /// Intersection observer watching the active dropdown option.
    Observer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hook {
    BeforeInput,
    KeyDown,
    Click,
    Scroll,
    MouseDown,
    MouseUp,
    MouseOver,
    SelectionChange,
    Focus,
    Blur,
    Composition,
    Intersection,
}

pub const SURFACE_HOOKS: [Hook; 9] = [
    Hook::BeforeInput,
    Hook::KeyDown,
    Hook::Click,
    Hook::Scroll,
    Hook::MouseDown,
    Hook::SelectionChange,
    Hook::Focus,
    Hook::Blur,
    Hook::Composition,
];

pub const DROPDOWN_HOOKS: [(ListenerTarget, Hook); 5] = [
    (ListenerTarget::Dropdown, Hook::MouseOver),
    (ListenerTarget::Dropdown, Hook::MouseDown),
    (ListenerTarget::Document, Hook::KeyDown),
    (ListenerTarget::Document, Hook::Click),
    (ListenerTarget::Observer, Hook::Intersection),
];

#[derive(Clone, Debug, Default)]
pub struct ListenerRegistry {
    attached: Vec<(ListenerTarget, Hook)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the listener was already attached.
    pub fn attach(&mut self, target: ListenerTarget, hook: Hook) -> bool {
        if self.is_attached(target, hook) {
            return false;
        }
        self.attached.push((target, hook));
        log::trace!(target: "mentions.listeners", "attach {target:?}/{hook:?}");
        true
    }

    pub fn detach(&mut self, target: ListenerTarget, hook: Hook) -> bool {
        let before = self.attached.len();
        self.attached.retain(|&(t, h)| (t, h) != (target, hook));
        let removed = self.attached.len() != before;
        if removed {
            log::trace!(target: "mentions.listeners", "detach {target:?}/{hook:?}");
        }
        removed
    }

    /// Detaches everything on `target`. Returns how many were removed.
    pub fn detach_target(&mut self, target: ListenerTarget) -> usize {
        let before = self.attached.len();
        self.attached.retain(|&(t, _)| t != target);
        before - self.attached.len()
    }

    pub fn is_attached(&self, target: ListenerTarget, hook: Hook) -> bool {
        self.attached.contains(&(target, hook))
    }

    pub fn count(&self, target: ListenerTarget) -> usize {
        self.attached.iter().filter(|(t, _)| *t == target).count()
    }

    pub fn total(&self) -> usize {
        self.attached.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_is_idempotent() {
        let mut reg = ListenerRegistry::new();
        assert!(reg.attach(ListenerTarget::Surface, Hook::Click));
        assert!(!reg.attach(ListenerTarget::Surface, Hook::Click));
        assert_eq!(reg.total(), 1);
    }

    #[test]
    fn detach_target_only_touches_that_target() {
        let mut reg = ListenerRegistry::new();
        for (t, h) in DROPDOWN_HOOKS {
            reg.attach(t, h);
        }
        reg.attach(ListenerTarget::Surface, Hook::Focus);
        assert_eq!(reg.detach_target(ListenerTarget::Document), 2);
        assert_eq!(reg.count(ListenerTarget::Dropdown), 2);
        assert!(reg.is_attached(ListenerTarget::Surface, Hook::Focus));
        assert!(reg.detach(ListenerTarget::Surface, Hook::Focus));
        assert!(!reg.detach(ListenerTarget::Surface, Hook::Focus));
    }
}
