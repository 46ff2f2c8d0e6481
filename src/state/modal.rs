/// Modal shell state
///
/// The shell cycles `Closed → Opening → Open → Closing → Closed`. Time is
/// fed in by the caller (`tick`), so transitions are deterministic and the
/// UI layer only has to forward frame ticks.
use std::time::Duration;

use super::viewport::ViewportClass;

/// Enter animation (ease-out, fade in and grow from 95%)
pub const ENTER_DURATION: Duration = Duration::from_millis(300);

/// Leave animation (ease-in, fade out and shrink to 95%)
pub const LEAVE_DURATION: Duration = Duration::from_millis(200);

const MIN_SCALE: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Closed,
    Opening,
    Open,
    Closing,
}

/// What asked the modal to close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    CloseButton,
    Backdrop,
    Escape,
    /// The owner closed it, e.g. after a selection
    Programmatic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModalState {
    phase: ModalPhase,
    /// 0.0 = fully hidden, 1.0 = fully shown
    progress: f32,
}

impl Default for ModalState {
    fn default() -> Self {
        Self {
            phase: ModalPhase::Closed,
            progress: 0.0,
        }
    }
}

impl ModalState {
    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    /// Drive the modal from the owner's `visible` flag.
    ///
    /// Returns true when this started a transition. Flipping direction
    /// mid-animation keeps the current progress.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        let next = match (visible, self.phase) {
            (true, ModalPhase::Closed | ModalPhase::Closing) => ModalPhase::Opening,
            (false, ModalPhase::Open | ModalPhase::Opening) => ModalPhase::Closing,
            _ => return false,
        };
        log::debug!("Modal {:?} -> {:?}", self.phase, next);
        self.phase = next;
        true
    }

    /// Close request from any affordance. Ignored unless the modal is
    /// showing or on its way in.
    pub fn request_close(&mut self, reason: CloseReason) -> bool {
        let changed = self.set_visible(false);
        if changed {
            log::debug!("Modal close requested ({:?})", reason);
        }
        changed
    }

    /// Advance the running animation. Returns the new phase when an
    /// animation finished during this tick.
    pub fn tick(&mut self, elapsed: Duration) -> Option<ModalPhase> {
        match self.phase {
            ModalPhase::Opening => {
                self.progress += elapsed.as_secs_f32() / ENTER_DURATION.as_secs_f32();
                if self.progress >= 1.0 {
                    self.progress = 1.0;
                    self.phase = ModalPhase::Open;
                    return Some(self.phase);
                }
            }
            ModalPhase::Closing => {
                self.progress -= elapsed.as_secs_f32() / LEAVE_DURATION.as_secs_f32();
                if self.progress <= 0.0 {
                    self.progress = 0.0;
                    self.phase = ModalPhase::Closed;
                    return Some(self.phase);
                }
            }
            ModalPhase::Open | ModalPhase::Closed => {}
        }
        None
    }

    /// Anything to draw at all
    pub fn is_visible(&self) -> bool {
        self.phase != ModalPhase::Closed
    }

    /// Selections are only honoured once fully open
    pub fn is_interactive(&self) -> bool {
        self.phase == ModalPhase::Open
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, ModalPhase::Opening | ModalPhase::Closing)
    }

    /// Eased opacity. Ease-out on the way in and ease-in on the way out
    /// share the same curve over `progress`, so reversals do not jump.
    pub fn opacity(&self) -> f32 {
        let remaining = 1.0 - self.progress;
        1.0 - remaining * remaining
    }

    pub fn scale(&self) -> f32 {
        MIN_SCALE + (1.0 - MIN_SCALE) * self.opacity()
    }
}

/// Width preset of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalSize {
    /// Confirmation dialogs: title plus footer buttons, narrow
    Small,
    Medium,
    Md,
}

impl ModalSize {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "small" => Some(ModalSize::Small),
            "medium" => Some(ModalSize::Medium),
            "md" => Some(ModalSize::Md),
            _ => None,
        }
    }
}

/// Corner radius preset of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounded {
    Sm,
    Md,
    Lg,
    Xl,
    #[default]
    Xl2,
    Xl3,
    Full,
}

impl Rounded {
    /// Unknown values fall back to the default (`2xl`)
    pub fn parse(value: &str) -> Self {
        match value {
            "sm" => Rounded::Sm,
            "md" => Rounded::Md,
            "lg" => Rounded::Lg,
            "xl" => Rounded::Xl,
            "2xl" => Rounded::Xl2,
            "3xl" => Rounded::Xl3,
            "full" => Rounded::Full,
            other => {
                log::warn!("Unknown modal rounding {:?}, using 2xl", other);
                Rounded::default()
            }
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            Rounded::Sm => 2.0,
            Rounded::Md => 6.0,
            Rounded::Lg => 8.0,
            Rounded::Xl => 12.0,
            Rounded::Xl2 => 16.0,
            Rounded::Xl3 => 24.0,
            Rounded::Full => 9999.0,
        }
    }
}

/// Static presentation of a modal shell
#[derive(Debug, Clone, PartialEq)]
pub struct ModalConfig {
    pub title: String,
    pub size: Option<ModalSize>,
    pub rounded: Rounded,
}

impl ModalConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            size: None,
            rounded: Rounded::default(),
        }
    }

    pub fn size(mut self, size: ModalSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn rounded(mut self, rounded: Rounded) -> Self {
        self.rounded = rounded;
        self
    }

    fn is_small(&self) -> bool {
        self.size == Some(ModalSize::Small)
    }

    pub fn show_divider(&self) -> bool {
        !self.is_small()
    }

    pub fn show_close_button(&self) -> bool {
        !self.is_small()
    }

    pub fn center_title(&self) -> bool {
        self.is_small()
    }

    /// Upper bound on the panel width
    pub fn max_width(&self, viewport: ViewportClass) -> f32 {
        match (self.size, viewport) {
            (Some(ModalSize::Small), ViewportClass::Desktop) => 320.0,
            (Some(ModalSize::Md), ViewportClass::Desktop) => 480.0,
            (Some(ModalSize::Small | ModalSize::Md), ViewportClass::Mobile) => 256.0,
            (Some(ModalSize::Medium) | None, _) => 1152.0,
        }
    }
}
