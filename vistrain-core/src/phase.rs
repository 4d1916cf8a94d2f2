/// Lifecycle of a training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    /// Trial generated, stimulus not yet on screen (peripheral reveal delay).
    Fixation,
    /// Stimulus shown, response window open.
    Response,
    /// Outcome shown; input locked until the window closes.
    Feedback,
    /// Suspended from the stored phase.
    Paused(PausedFrom),
    Complete,
}

/// Phase a paused session resumes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PausedFrom {
    Fixation,
    Response,
    Feedback,
}

impl SessionPhase {
    pub fn allows_input(&self) -> bool {
        matches!(self, Self::Response)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Fixation | Self::Response | Self::Feedback)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused(_))
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// The paused form of a running phase; other phases cannot pause.
    pub fn paused(&self) -> Option<Self> {
        let from = match self {
            Self::Fixation => PausedFrom::Fixation,
            Self::Response => PausedFrom::Response,
            Self::Feedback => PausedFrom::Feedback,
            _ => return None,
        };
        Some(Self::Paused(from))
    }

    pub fn resumed(&self) -> Option<Self> {
        match self {
            Self::Paused(PausedFrom::Fixation) => Some(Self::Fixation),
            Self::Paused(PausedFrom::Response) => Some(Self::Response),
            Self::Paused(PausedFrom::Feedback) => Some(Self::Feedback),
            _ => None,
        }
    }
}
