//! Overlay reveal machine.
//!
//! Pointer activity walks the on-screen chrome through four tiers: hidden,
//! title, status, controls. Timers are plain deadline fields here; the
//! owning task sleeps until the earliest one and calls [`OverlaySM::on_deadline`].
//! Clearing a field cancels its timer, so a canceled or replaced deadline
//! can never fire late against newer state.

use std::time::Instant;

use crate::config::OverlayOptions;
use crate::events::OverlayLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayChange {
    pub from: OverlayLevel,
    pub to: OverlayLevel,
}

#[derive(Debug, Clone, Copy)]
struct PointerDown {
    level: OverlayLevel,
    at: Instant,
}

#[derive(Debug)]
pub struct OverlaySM {
    level: OverlayLevel,
    last_pointer_down: Option<PointerDown>,
    seen_identity: Option<usize>,
    status_at: Option<Instant>,
    controls_at: Option<Instant>,
    idle_at: Option<Instant>,
    opts: OverlayOptions,
}

impl OverlaySM {
    pub fn new(opts: OverlayOptions) -> Self {
        Self {
            level: OverlayLevel::Hidden,
            last_pointer_down: None,
            seen_identity: None,
            status_at: None,
            controls_at: None,
            idle_at: None,
            opts,
        }
    }

    pub fn level(&self) -> OverlayLevel {
        self.level
    }

    /// Pointer motion. From hidden this starts a reveal: title right away,
    /// status and controls on their delays. At any visible tier it only
    /// refreshes the idle deadline; a reveal already in progress keeps its
    /// pending deadlines and finishes.
    pub fn on_pointer_move(&mut self, now: Instant) -> Option<OverlayChange> {
        self.idle_at = Some(now + self.opts.idle_timeout);
        if self.level == OverlayLevel::Hidden {
            self.status_at = Some(now + self.opts.status_delay);
            self.controls_at = Some(now + self.opts.controls_delay);
            return self.goto(OverlayLevel::Title);
        }
        None
    }

    /// Pointer press. The pre-press level is snapshotted before anything
    /// else; content changes look back at that snapshot for a short grace
    /// window to tell a reveal caused by this press from chrome that was
    /// already showing. A press on hidden chrome jumps straight to the
    /// controls tier and drops the staged reveal deadlines.
    pub fn on_pointer_down(&mut self, now: Instant) -> Option<OverlayChange> {
        self.last_pointer_down = Some(PointerDown {
            level: self.level,
            at: now,
        });
        self.idle_at = Some(now + self.opts.idle_timeout);
        if self.level == OverlayLevel::Hidden {
            self.status_at = None;
            self.controls_at = None;
            return self.goto(OverlayLevel::Controls);
        }
        None
    }

    /// A different piece of content is now showing. The level that counts is
    /// the one in effect when the user last acted: the pointer-down snapshot
    /// if it is younger than the grace window, the current level otherwise.
    /// If that reference level is hidden the chrome collapses to the title
    /// tier so the new identity gets announced; otherwise nothing moves.
    pub fn on_content_changed(&mut self, identity: usize, now: Instant) -> Option<OverlayChange> {
        let previous = self.seen_identity.replace(identity);
        let previous = previous?;
        if previous == identity {
            return None;
        }
        let reference = match self.last_pointer_down {
            Some(press) if now.duration_since(press.at) < self.opts.pointer_grace => press.level,
            _ => self.level,
        };
        if reference != OverlayLevel::Hidden {
            return None;
        }
        self.idle_at = Some(now + self.opts.idle_timeout);
        self.goto(OverlayLevel::Title)
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.status_at, self.controls_at, self.idle_at]
            .into_iter()
            .flatten()
            .min()
    }

    /// Fires every deadline due at `now`, earliest first, and reports the
    /// overall level change. A late wakeup that covers several deadlines
    /// lands on the same level a punctual one would have.
    pub fn on_deadline(&mut self, now: Instant) -> Option<OverlayChange> {
        let from = self.level;
        while let Some(at) = self.next_deadline() {
            if at > now {
                break;
            }
            if self.status_at == Some(at) {
                self.status_at = None;
                self.level = OverlayLevel::Status;
            } else if self.controls_at == Some(at) {
                self.controls_at = None;
                self.level = OverlayLevel::Controls;
            } else {
                self.idle_at = None;
                self.level = OverlayLevel::Hidden;
            }
        }
        (self.level != from).then_some(OverlayChange {
            from,
            to: self.level,
        })
    }

    fn goto(&mut self, to: OverlayLevel) -> Option<OverlayChange> {
        if self.level == to {
            return None;
        }
        let change = OverlayChange {
            from: self.level,
            to,
        };
        self.level = to;
        Some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::OverlayLevel::{Controls, Hidden, Status, Title};
    use std::time::Duration;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn sm() -> (OverlaySM, Instant) {
        // Defaults: status 200ms, controls 500ms, idle 3s, grace 500ms.
        (OverlaySM::new(OverlayOptions::default()), Instant::now())
    }

    #[test]
    fn first_motion_reveals_title_and_stages_the_reveal() {
        let (mut sm, t0) = sm();
        let change = sm.on_pointer_move(t0);
        assert_eq!(
            change,
            Some(OverlayChange {
                from: Hidden,
                to: Title
            })
        );
        assert_eq!(sm.next_deadline(), Some(t0 + ms(200)));

        let change = sm.on_deadline(t0 + ms(200));
        assert_eq!(
            change,
            Some(OverlayChange {
                from: Title,
                to: Status
            })
        );
        assert_eq!(sm.next_deadline(), Some(t0 + ms(500)));

        let change = sm.on_deadline(t0 + ms(500));
        assert_eq!(
            change,
            Some(OverlayChange {
                from: Status,
                to: Controls
            })
        );
        // Only the idle reset is left.
        assert_eq!(sm.next_deadline(), Some(t0 + ms(3000)));
    }

    #[test]
    fn motion_while_visible_only_refreshes_idle() {
        let (mut sm, t0) = sm();
        sm.on_pointer_move(t0);
        assert_eq!(sm.on_pointer_move(t0 + ms(100)), None);

        // The staged reveal kept its original deadlines.
        assert_eq!(sm.on_deadline(t0 + ms(200)).map(|c| c.to), Some(Status));
        assert_eq!(sm.on_deadline(t0 + ms(500)).map(|c| c.to), Some(Controls));
        // The idle reset moved with the second motion.
        assert_eq!(sm.next_deadline(), Some(t0 + ms(3100)));
    }

    #[test]
    fn idle_reset_hides_the_chrome() {
        let (mut sm, t0) = sm();
        sm.on_pointer_move(t0);
        sm.on_deadline(t0 + ms(200));
        sm.on_deadline(t0 + ms(500));

        let change = sm.on_deadline(t0 + ms(3000));
        assert_eq!(
            change,
            Some(OverlayChange {
                from: Controls,
                to: Hidden
            })
        );
        assert_eq!(sm.next_deadline(), None);
    }

    #[test]
    fn press_on_hidden_chrome_jumps_to_controls() {
        let (mut sm, t0) = sm();
        let change = sm.on_pointer_down(t0);
        assert_eq!(
            change,
            Some(OverlayChange {
                from: Hidden,
                to: Controls
            })
        );
        // The staged reveal is gone; only the idle reset remains.
        assert_eq!(sm.next_deadline(), Some(t0 + ms(3000)));
        assert_eq!(sm.on_deadline(t0 + ms(3000)).map(|c| c.to), Some(Hidden));
    }

    #[test]
    fn press_while_visible_keeps_the_level() {
        let (mut sm, t0) = sm();
        sm.on_pointer_move(t0);
        assert_eq!(sm.on_pointer_down(t0 + ms(50)), None);
        assert_eq!(sm.level(), Title);

        // Reveal deadlines still fire on schedule, idle follows the press.
        assert_eq!(sm.on_deadline(t0 + ms(200)).map(|c| c.to), Some(Status));
        assert_eq!(sm.on_deadline(t0 + ms(500)).map(|c| c.to), Some(Controls));
        assert_eq!(sm.next_deadline(), Some(t0 + ms(3050)));
    }

    #[test]
    fn content_change_right_after_press_collapses_to_title() {
        let (mut sm, t0) = sm();
        assert_eq!(sm.on_content_changed(0, t0), None);

        // Press on hidden chrome jumps to controls; the content change lands
        // 100ms later, well inside the grace window, so the snapshot level
        // (hidden) wins and the chrome collapses to the title tier.
        sm.on_pointer_down(t0 + ms(10));
        let change = sm.on_content_changed(1, t0 + ms(110));
        assert_eq!(
            change,
            Some(OverlayChange {
                from: Controls,
                to: Title
            })
        );
        assert_eq!(sm.next_deadline(), Some(t0 + ms(110) + ms(3000)));
    }

    #[test]
    fn content_change_after_grace_window_uses_current_level() {
        let (mut sm, t0) = sm();
        sm.on_content_changed(0, t0);
        sm.on_pointer_down(t0 + ms(10));

        // 600ms after the press the snapshot is stale; the current level
        // (controls) is the reference and nothing moves.
        assert_eq!(sm.on_content_changed(1, t0 + ms(610)), None);
        assert_eq!(sm.level(), Controls);
    }

    #[test]
    fn content_change_at_rest_announces_the_title() {
        let (mut sm, t0) = sm();
        sm.on_content_changed(0, t0);

        let change = sm.on_content_changed(1, t0 + ms(50));
        assert_eq!(
            change,
            Some(OverlayChange {
                from: Hidden,
                to: Title
            })
        );
        // No staged reveal: only the idle reset is pending.
        assert_eq!(sm.next_deadline(), Some(t0 + ms(50) + ms(3000)));
    }

    #[test]
    fn content_change_with_same_identity_does_nothing() {
        let (mut sm, t0) = sm();
        sm.on_content_changed(7, t0);
        assert_eq!(sm.on_content_changed(7, t0 + ms(100)), None);
        assert_eq!(sm.level(), Hidden);
        assert_eq!(sm.next_deadline(), None);
    }

    #[test]
    fn first_identity_is_recorded_without_a_reveal() {
        let (mut sm, t0) = sm();
        assert_eq!(sm.on_content_changed(3, t0), None);
        assert_eq!(sm.level(), Hidden);
    }

    #[test]
    fn late_wakeup_fires_all_due_deadlines_in_order() {
        let (mut sm, t0) = sm();
        sm.on_pointer_move(t0);

        // One wakeup past both reveal deadlines aggregates the walk.
        let change = sm.on_deadline(t0 + ms(600));
        assert_eq!(
            change,
            Some(OverlayChange {
                from: Title,
                to: Controls
            })
        );
        assert_eq!(sm.next_deadline(), Some(t0 + ms(3000)));
    }

    #[test]
    fn deadline_before_due_time_is_a_no_op() {
        let (mut sm, t0) = sm();
        sm.on_pointer_move(t0);
        assert_eq!(sm.on_deadline(t0 + ms(100)), None);
        assert_eq!(sm.level(), Title);
        assert_eq!(sm.next_deadline(), Some(t0 + ms(200)));
    }
}
