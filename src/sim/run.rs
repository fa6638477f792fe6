//! Run state machine
//!
//! Idle → Running → {Paused, GameOver}; Paused → CountingDown → Running;
//! GameOver → Running (restart) or Idle (home). Only `Running` lets ticks
//! through.

use serde::{Deserialize, Serialize};

use super::score;
use super::state::{RunPhase, RunSummary, World};

/// Actions that trigger phase transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunAction {
    /// Start or restart a run
    Start,
    Pause,
    /// Begin the resume countdown
    Resume,
    /// Countdown reached its end
    CountdownDone,
    /// The player hit an obstacle
    Collide,
    /// Leave to the menus
    GoHome,
}

/// Result of a transition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionResult {
    pub success: bool,
    pub from: RunPhase,
    pub to: RunPhase,
    pub action: RunAction,
}

impl RunPhase {
    /// Next phase for an action, if the action is valid here
    pub fn after(self, action: RunAction) -> Option<RunPhase> {
        match (self, action) {
            (RunPhase::Idle, RunAction::Start) => Some(RunPhase::Running),
            (RunPhase::GameOver, RunAction::Start) => Some(RunPhase::Running),

            (RunPhase::Running, RunAction::Pause) => Some(RunPhase::Paused),
            (RunPhase::Running, RunAction::Collide) => Some(RunPhase::GameOver),

            (RunPhase::Paused, RunAction::Resume) => Some(RunPhase::CountingDown),
            (RunPhase::CountingDown, RunAction::CountdownDone) => Some(RunPhase::Running),

            (RunPhase::Paused, RunAction::GoHome) => Some(RunPhase::Idle),
            (RunPhase::CountingDown, RunAction::GoHome) => Some(RunPhase::Idle),
            (RunPhase::GameOver, RunAction::GoHome) => Some(RunPhase::Idle),

            _ => None,
        }
    }

    /// Whether the simulation pipeline executes in this phase
    pub fn is_live(self) -> bool {
        self == RunPhase::Running
    }
}

/// What the countdown overlay shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownDisplay {
    Number(u8),
    Go,
}

impl std::fmt::Display for CountdownDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CountdownDisplay::Number(n) => write!(f, "{n}"),
            CountdownDisplay::Go => f.write_str("GO!"),
        }
    }
}

/// Resume countdown: N, N-1, ..., 1, GO!, then done. Advanced by a fixed
/// one-second timer, not by frame ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    /// Numbers left to show; zero means GO! is showing
    remaining: u8,
    finished: bool,
}

impl Countdown {
    pub fn new(from: u8) -> Self {
        Self {
            remaining: from,
            finished: false,
        }
    }

    pub fn display(&self) -> CountdownDisplay {
        if self.remaining == 0 {
            CountdownDisplay::Go
        } else {
            CountdownDisplay::Number(self.remaining)
        }
    }

    /// Advance one step; returns false once the countdown has run out
    pub fn step(&mut self) -> bool {
        if self.remaining == 0 {
            self.finished = true;
        } else {
            self.remaining -= 1;
        }
        !self.finished
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl World {
    /// Attempt a transition and perform its side effects
    pub fn apply(&mut self, action: RunAction) -> TransitionResult {
        let from = self.phase;
        let Some(to) = from.after(action) else {
            log::warn!("Ignored {action:?} while {from:?}");
            return TransitionResult {
                success: false,
                from,
                to: from,
                action,
            };
        };

        match action {
            RunAction::Start => self.reset_run(),
            RunAction::Pause => {}
            RunAction::Resume => {
                self.countdown = Some(Countdown::new(self.tuning.countdown_from));
            }
            RunAction::CountdownDone => {
                self.countdown = None;
                // The paused interval must not show up as one giant tick
                self.clock.reset();
            }
            RunAction::Collide => {
                let summary = RunSummary {
                    final_score: score::finalize(self.sim.score),
                    previous_best: self.best_score,
                };
                self.best_score = self.best_score.max(summary.final_score);
                self.last_run = Some(summary);
            }
            RunAction::GoHome => {
                self.countdown = None;
                self.obstacles.clear();
            }
        }

        self.phase = to;
        log::info!("Run phase {from:?} -> {to:?}");
        TransitionResult {
            success: true,
            from,
            to,
            action,
        }
    }

    /// Start (or restart) a run
    pub fn start(&mut self) -> TransitionResult {
        self.apply(RunAction::Start)
    }

    /// Pause button: pauses while running, starts the countdown while paused,
    /// and is ignored while already counting down
    pub fn toggle_pause(&mut self) -> TransitionResult {
        match self.phase {
            RunPhase::Paused => self.apply(RunAction::Resume),
            _ => self.apply(RunAction::Pause),
        }
    }

    /// Called by the one-second countdown timer. Returns the display to show,
    /// or `None` once the run has resumed (or no countdown is active).
    pub fn countdown_tick(&mut self) -> Option<CountdownDisplay> {
        if self.phase != RunPhase::CountingDown {
            return None;
        }
        let countdown = self.countdown.as_mut()?;
        let still_counting = countdown.step();
        let display = countdown.display();
        if still_counting {
            Some(display)
        } else {
            self.apply(RunAction::CountdownDone);
            None
        }
    }

    /// Current countdown text, if counting down
    pub fn countdown_display(&self) -> Option<CountdownDisplay> {
        self.countdown.as_ref().map(Countdown::display)
    }
}
