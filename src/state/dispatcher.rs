//! Hold-duration dispatch of normalized input events.

use std::sync::MutexGuard;
use std::time::Instant;

use smallvec::SmallVec;

use crate::util::unlikely;

use super::AppState;
use super::axis::AxisMapper;
use super::types::*;

impl AppState {
    /// Feeds one normalized event through toggle, bindings and the axis mapper.
    ///
    /// Events of one source must arrive in order on that source's thread.
    pub fn handle_event(&self, event: InputEvent, now: Instant) {
        match event {
            InputEvent::ButtonDown(button) => self.on_button_down(button, now),
            InputEvent::ButtonUp(button) => self.on_button_up(button, now),
            InputEvent::AxisMoved(axis, value) => self.lock_axis().set(axis, value),
        }
    }

    fn on_button_down(&self, button: LogicalButton, now: Instant) {
        // The toggle button is handled before anything else so it can never be gated
        if unlikely(self.toggle_button == Some(button)) {
            match self.toggle.try_flip(now) {
                Some(true) => tracing::info!("Activated by {}", button),
                Some(false) => tracing::info!("Deactivated by {}", button),
                None => tracing::debug!("Toggle press on {} debounced", button),
            }
            return;
        }

        let clicks = self.is_click_button(button);
        let binding = self.bindings.get(&button);
        if !clicks && binding.is_none() {
            return;
        }

        let record = PressRecord {
            started: now,
            last_fired: now,
        };
        if self.pressed.insert_sync(button, record).is_err() {
            tracing::debug!("Duplicate press of {} ignored", button);
            return;
        }

        if clicks {
            self.fire(&Action::Click, button);
            return;
        }
        let Some(binding) = binding else {
            return;
        };

        if !binding.is_dual_action() {
            self.fire(&binding.tap, button);
        }
    }

    fn on_button_up(&self, button: LogicalButton, now: Instant) {
        let Some((_, record)) = self.pressed.remove_sync(&button) else {
            return;
        };
        if self.is_click_button(button) {
            return;
        }
        let Some(binding) = self.bindings.get(&button) else {
            return;
        };

        if let Some(hold) = &binding.hold {
            let held = now.saturating_duration_since(record.started);
            if held >= self.hold_threshold {
                tracing::debug!("{} held for {:?}", button, held);
                self.fire(hold, button);
            } else {
                self.fire(&binding.tap, button);
            }
        }
    }

    /// Fires the time-driven actions of one device: turbo repeats and stick output.
    pub fn tick(&self, device: DeviceKind, now: Instant) {
        let mut due: SmallVec<[(LogicalButton, Action); 4]> = SmallVec::new();
        let click_button = self.click_button.filter(|_| self.lock_axis().drives_cursor());

        self.pressed.retain_sync(|button, record| {
            if button.source.device() == device
                && click_button != Some(*button)
                && let Some(binding) = self.bindings.get(button)
                && !binding.is_dual_action()
                && let Some(period) = binding.repeat
                && now.saturating_duration_since(record.last_fired) >= period
            {
                record.last_fired = now;
                due.push((*button, binding.tap.clone()));
            }
            true
        });

        for (button, action) in due {
            self.fire(&action, button);
        }

        if device == DeviceKind::Gamepad && self.is_active() {
            let actions = self.lock_axis().tick(now);
            for action in actions {
                tracing::trace!("Stick action {}", action);
                self.sink.dispatch(action);
            }
        }
    }

    /// Drops every in-flight press of a device without firing anything.
    ///
    /// For the gamepad the stick state is zeroed as well.
    pub fn abandon(&self, device: DeviceKind) {
        let mut dropped = 0usize;
        self.pressed.retain_sync(|button, _| {
            if button.source.device() == device {
                dropped += 1;
                false
            } else {
                true
            }
        });

        if device == DeviceKind::Gamepad {
            self.lock_axis().reset();
        }

        if dropped > 0 {
            tracing::debug!("Abandoned {} in-flight press(es) on {}", dropped, device);
        }
    }

    /// The click button overrides its binding while a stick drives the cursor.
    #[inline]
    fn is_click_button(&self, button: LogicalButton) -> bool {
        self.click_button == Some(button) && self.lock_axis().drives_cursor()
    }

    #[inline]
    fn fire(&self, action: &Action, button: LogicalButton) {
        if unlikely(!self.is_active()) {
            tracing::debug!("Suppressed {} from {} while inactive", action, button);
            return;
        }
        self.sink.dispatch(action.clone());
    }

    #[inline]
    pub(crate) fn lock_axis(&self) -> MutexGuard<'_, AxisMapper> {
        self.axis_mapper
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
