use serde::{Deserialize, Serialize};

/// Which of the two pins an action refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pin {
    Starting,
    Destination,
}

/// Step of the guided start → destination → draw flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    SearchStarting,
    ConfirmStarting,
    SearchDestination,
    ConfirmDestination,
    ConfirmBoth,
    Draw,
    Done,
    /// Read-only look at a previously drawn path.
    ViewPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    GeocodeFound,
    Confirm { destination_preset: bool },
    SearchFocused,
    UploadSucceeded,
    ViewPath,
    CloseView,
}

impl Phase {
    pub const FORWARD: [Phase; 7] = [
        Phase::SearchStarting,
        Phase::ConfirmStarting,
        Phase::SearchDestination,
        Phase::ConfirmDestination,
        Phase::ConfirmBoth,
        Phase::Draw,
        Phase::Done,
    ];

    /// Next phase for `event`, or `None` when the event means nothing here.
    pub fn transition(self, event: PhaseEvent) -> Option<Phase> {
        use PhaseEvent as E;

        let next = match (self, event) {
            (Phase::SearchStarting, E::GeocodeFound) => Phase::ConfirmStarting,
            (Phase::ConfirmStarting, E::Confirm { destination_preset }) => {
                if destination_preset {
                    Phase::ConfirmBoth
                } else {
                    Phase::SearchDestination
                }
            }
            (Phase::ConfirmStarting, E::SearchFocused) => Phase::SearchStarting,
            (Phase::SearchDestination, E::GeocodeFound) => Phase::ConfirmDestination,
            (Phase::ConfirmDestination, E::Confirm { .. }) => Phase::ConfirmBoth,
            (Phase::ConfirmDestination, E::SearchFocused) => Phase::SearchDestination,
            (Phase::ConfirmBoth, E::Confirm { .. }) => Phase::Draw,
            (Phase::Draw, E::UploadSucceeded) => Phase::Done,
            (Phase::Done, E::ViewPath) => Phase::ViewPath,
            (Phase::ViewPath, E::CloseView) => Phase::Done,
            _ => return None,
        };
        Some(next)
    }

    pub fn apply(self, event: PhaseEvent) -> Phase {
        self.transition(event).unwrap_or(self)
    }

    /// Pin looked up by the search box shown in this phase.
    pub fn search_target(self) -> Option<Pin> {
        match self {
            Phase::SearchStarting => Some(Pin::Starting),
            Phase::SearchDestination => Some(Pin::Destination),
            _ => None,
        }
    }

    /// Pin awaiting confirmation in this phase.
    pub fn confirm_target(self) -> Option<Pin> {
        match self {
            Phase::ConfirmStarting => Some(Pin::Starting),
            Phase::ConfirmDestination => Some(Pin::Destination),
            _ => None,
        }
    }

    /// Pins may still be moved before drawing starts.
    pub fn pins_editable(self) -> bool {
        matches!(
            self,
            Phase::ConfirmStarting
                | Phase::SearchDestination
                | Phase::ConfirmDestination
                | Phase::ConfirmBoth
        )
    }

    pub fn captures_pointer(self) -> bool {
        self == Phase::Draw
    }
}
