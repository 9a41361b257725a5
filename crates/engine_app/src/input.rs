//! Input dispatch.
//!
//! The windowing backend reports [`InputEvent`]s after each frame. Mouse and
//! scroll events are forwarded to their handlers immediately. Key events
//! only update the set of held keys; the handlers bound to a key then fire
//! once per poll for as long as it stays down.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use engine_graphics::{InputEvent, Key, KeyAction};

use crate::context::FrameContext;

/// Application-defined identifier for a key binding.
pub type ActionId = u32;

pub type KeyHandler = Box<dyn FnMut(&mut FrameContext<'_>)>;
/// Receives absolute cursor position or scroll offsets.
pub type AxisHandler = Box<dyn FnMut(&mut FrameContext<'_>, f64, f64)>;

struct KeyBinding {
    action: ActionId,
    handler: KeyHandler,
}

#[derive(Default)]
pub struct InputManager {
    bindings: HashMap<Key, Vec<KeyBinding>>,
    /// Held keys in press order.
    held: Vec<Key>,
    mouse_move: Vec<AxisHandler>,
    scroll: Vec<AxisHandler>,
}

impl fmt::Debug for InputManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputManager")
            .field("bindings", &self.bindings.len())
            .field("held", &self.held)
            .field("mouse_move", &self.mouse_move.len())
            .field("scroll", &self.scroll.len())
            .finish()
    }
}

impl InputManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `key`. Several actions may share a key; they fire
    /// in registration order.
    pub fn register_key_action(
        &mut self,
        key: Key,
        action: ActionId,
        handler: impl FnMut(&mut FrameContext<'_>) + 'static,
    ) {
        debug!(?key, action, "key action registered");
        self.bindings.entry(key).or_default().push(KeyBinding {
            action,
            handler: Box::new(handler),
        });
    }

    /// Remove every binding for `action`. Returns how many were removed.
    pub fn unregister_action(&mut self, action: ActionId) -> usize {
        let mut removed = 0;
        for bindings in self.bindings.values_mut() {
            let before = bindings.len();
            bindings.retain(|binding| binding.action != action);
            removed += before - bindings.len();
        }
        removed
    }

    pub fn register_mouse_move_handler(
        &mut self,
        handler: impl FnMut(&mut FrameContext<'_>, f64, f64) + 'static,
    ) {
        self.mouse_move.push(Box::new(handler));
    }

    pub fn register_mouse_scroll_handler(
        &mut self,
        handler: impl FnMut(&mut FrameContext<'_>, f64, f64) + 'static,
    ) {
        self.scroll.push(Box::new(handler));
    }

    #[must_use]
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Apply one event.
    pub fn handle_event(&mut self, event: InputEvent, ctx: &mut FrameContext<'_>) {
        trace!(?event, "input event");
        match event {
            InputEvent::Key { key, action } => match action {
                KeyAction::Press | KeyAction::Repeat => {
                    if !self.held.contains(&key) {
                        self.held.push(key);
                    }
                }
                KeyAction::Release => self.held.retain(|&held| held != key),
            },
            InputEvent::MouseMoved { x, y } => {
                for handler in &mut self.mouse_move {
                    handler(ctx, x, y);
                }
            }
            InputEvent::Scrolled { dx, dy } => {
                for handler in &mut self.scroll {
                    handler(ctx, dx, dy);
                }
            }
            InputEvent::Resized { width, height } => {
                debug!(width, height, "window resized");
            }
            InputEvent::CloseRequested => ctx.request_shutdown(),
        }
    }

    /// Fire the handlers of every held key.
    pub fn dispatch_held(&mut self, ctx: &mut FrameContext<'_>) {
        for key in &self.held {
            if let Some(bindings) = self.bindings.get_mut(key) {
                for binding in bindings {
                    (binding.handler)(ctx);
                }
            }
        }
    }

    /// Apply a batch of events, then fire held-key handlers once.
    pub fn process(&mut self, events: Vec<InputEvent>, ctx: &mut FrameContext<'_>) {
        for event in events {
            self.handle_event(event, ctx);
        }
        self.dispatch_held(ctx);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use engine_component::World;

    use super::*;

    fn press(key: Key) -> InputEvent {
        InputEvent::Key {
            key,
            action: KeyAction::Press,
        }
    }

    fn release(key: Key) -> InputEvent {
        InputEvent::Key {
            key,
            action: KeyAction::Release,
        }
    }

    fn counter(input: &mut InputManager, key: Key, action: ActionId) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        input.register_key_action(key, action, move |_| seen.set(seen.get() + 1));
        count
    }

    #[test]
    fn test_held_key_fires_every_poll() {
        let mut input = InputManager::new();
        let w = counter(&mut input, Key::W, 1);
        let mut world = World::new();
        let mut shutdown = false;
        let mut ctx = FrameContext::new(&mut world, 0.016, 0, &mut shutdown);

        input.process(vec![press(Key::W)], &mut ctx);
        input.process(vec![], &mut ctx);
        input.process(vec![], &mut ctx);
        assert_eq!(w.get(), 3);

        input.process(vec![release(Key::W)], &mut ctx);
        input.process(vec![], &mut ctx);
        assert_eq!(w.get(), 3);
        assert!(!input.is_held(Key::W));
    }

    #[test]
    fn test_unbound_keys_and_unregister() {
        let mut input = InputManager::new();
        let a = counter(&mut input, Key::A, 7);
        let a2 = counter(&mut input, Key::A, 8);
        let mut world = World::new();
        let mut shutdown = false;
        let mut ctx = FrameContext::new(&mut world, 0.016, 0, &mut shutdown);

        input.process(vec![press(Key::A), press(Key::Space)], &mut ctx);
        assert_eq!((a.get(), a2.get()), (1, 1));

        assert_eq!(input.unregister_action(7), 1);
        input.process(vec![], &mut ctx);
        assert_eq!((a.get(), a2.get()), (1, 2));
    }

    #[test]
    fn test_mouse_and_scroll_handlers() {
        let mut input = InputManager::new();
        let last = Rc::new(Cell::new((0.0, 0.0)));
        let scrolled = Rc::new(Cell::new(0.0));
        let seen = Rc::clone(&last);
        input.register_mouse_move_handler(move |_, x, y| seen.set((x, y)));
        let seen = Rc::clone(&scrolled);
        input.register_mouse_scroll_handler(move |_, _, dy| seen.set(seen.get() + dy));

        let mut world = World::new();
        let mut shutdown = false;
        let mut ctx = FrameContext::new(&mut world, 0.016, 0, &mut shutdown);
        input.process(
            vec![
                InputEvent::MouseMoved { x: 10.0, y: 20.0 },
                InputEvent::Scrolled { dx: 0.0, dy: 1.5 },
                InputEvent::Scrolled { dx: 0.0, dy: -0.5 },
            ],
            &mut ctx,
        );
        assert_eq!(last.get(), (10.0, 20.0));
        assert_eq!(scrolled.get(), 1.0);
    }

    #[test]
    fn test_close_event_requests_shutdown() {
        let mut input = InputManager::new();
        let mut world = World::new();
        let mut shutdown = false;
        {
            let mut ctx = FrameContext::new(&mut world, 0.0, 0, &mut shutdown);
            input.process(vec![InputEvent::CloseRequested], &mut ctx);
        }
        assert!(shutdown);
    }
}
