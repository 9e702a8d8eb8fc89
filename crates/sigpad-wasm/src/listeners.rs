//! Window listeners for an active drag or resize.
//!
//! Each `attach` installs move / end / cancel / blur listeners on `window`
//! and returns a teardown that removes exactly those listeners. Teardown
//! usually runs from inside one of the listeners (the `pointerup` that ends
//! the gesture), so the removed closures are parked in a graveyard instead of
//! being dropped while they are executing. The graveyard is emptied on the
//! next attach.

use crate::{PadState, route_event};
use sigpad_editor::input::{InputEvent, Modality};
use sigpad_editor::listeners::{ListenerHost, Teardown};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Element, Event, PointerEvent, TouchEvent, Window};

type Listener = (&'static str, Closure<dyn FnMut(Event)>);

const POINTER_EVENTS: [&str; 4] = ["pointermove", "pointerup", "pointercancel", "blur"];
const TOUCH_EVENTS: [&str; 4] = ["touchmove", "touchend", "touchcancel", "blur"];

pub(crate) struct WindowHost {
    state: Weak<RefCell<PadState>>,
    /// The element placements are laid out in; pixel coordinates are
    /// relative to its top-left corner.
    overlay: Element,
    graveyard: Rc<RefCell<Vec<Listener>>>,
}

impl WindowHost {
    pub(crate) fn new(state: Weak<RefCell<PadState>>, overlay: Element) -> Self {
        Self {
            state,
            overlay,
            graveyard: Rc::default(),
        }
    }

    fn listener(&self, name: &'static str, modality: Modality) -> Closure<dyn FnMut(Event)> {
        let state = Weak::clone(&self.state);
        let overlay = self.overlay.clone();
        Closure::new(move |event: Event| {
            let Some(input) = to_input_event(name, &event, &overlay, modality) else {
                return;
            };
            // Keep touch moves from scrolling the page under the gesture.
            if matches!(input, InputEvent::Move { .. }) && event.cancelable() {
                event.prevent_default();
            }
            route_event(&state, &input);
        })
    }
}

impl ListenerHost for WindowHost {
    fn attach(&self, modality: Modality) -> Result<Teardown, String> {
        let window = web_sys::window().ok_or("no window")?;
        self.graveyard.borrow_mut().clear();

        let names = match modality {
            Modality::Pointer => POINTER_EVENTS,
            Modality::Touch => TOUCH_EVENTS,
        };
        let options = AddEventListenerOptions::new();
        options.set_passive(false);

        let mut installed: Vec<Listener> = Vec::with_capacity(names.len());
        for name in names {
            let closure = self.listener(name, modality);
            let added = window.add_event_listener_with_callback_and_add_event_listener_options(
                name,
                closure.as_ref().unchecked_ref(),
                &options,
            );
            if let Err(e) = added {
                // Roll back so a failed attach leaves nothing behind.
                let _ = remove_all(&window, &installed);
                return Err(format!("addEventListener({name}) failed: {e:?}"));
            }
            installed.push((name, closure));
        }

        let graveyard = Rc::clone(&self.graveyard);
        Ok(Teardown::new(move || {
            let result = remove_all(&window, &installed);
            graveyard.borrow_mut().extend(installed);
            result
        }))
    }
}

fn remove_all(window: &Window, listeners: &[Listener]) -> Result<(), String> {
    let mut first_error = None;
    for (name, closure) in listeners {
        if let Err(e) =
            window.remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
        {
            first_error.get_or_insert_with(|| format!("removeEventListener({name}) failed: {e:?}"));
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// Translate a window event into the controller's vocabulary, in overlay
/// pixels.
fn to_input_event(
    name: &str,
    event: &Event,
    overlay: &Element,
    modality: Modality,
) -> Option<InputEvent> {
    if name == "blur" || name.ends_with("cancel") {
        return Some(InputEvent::cancel(modality));
    }
    let (client_x, client_y) = match modality {
        Modality::Pointer => {
            let ev = event.dyn_ref::<PointerEvent>()?;
            (f64::from(ev.client_x()), f64::from(ev.client_y()))
        }
        Modality::Touch => {
            let ev = event.dyn_ref::<TouchEvent>()?;
            let touch = ev.changed_touches().get(0)?;
            (f64::from(touch.client_x()), f64::from(touch.client_y()))
        }
    };
    let rect = overlay.get_bounding_client_rect();
    let (x, y) = (client_x - rect.left(), client_y - rect.top());
    match name {
        "pointermove" | "touchmove" => Some(InputEvent::moved(x, y, modality)),
        "pointerup" | "touchend" => Some(InputEvent::end(x, y, modality)),
        _ => None,
    }
}
