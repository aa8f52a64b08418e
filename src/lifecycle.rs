//! Host lifecycle signal
//!
//! An embedding host may tell the process whether it is in an interactive
//! edit/build phase or a live run phase. The phase only decides what happens
//! when a [`Dynamic`](crate::Dynamic) value turns out to have no codec at
//! encode time: raised as an error while editing, written as null (with a
//! warning) while live. Resolution never looks at it.

use std::sync::atomic::{AtomicBool, Ordering};

static LIVE: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HostPhase {
    /// No host, or the host is editing/building. The default.
    #[default]
    EditOrBuild,
    /// The host is running.
    Live,
}

impl HostPhase {
    /// Whether dynamic encode failures are swallowed in this phase.
    pub fn suppresses_dynamic_errors(self) -> bool {
        matches!(self, HostPhase::Live)
    }
}

pub fn host_phase() -> HostPhase {
    if LIVE.load(Ordering::Acquire) {
        HostPhase::Live
    } else {
        HostPhase::EditOrBuild
    }
}

pub fn set_host_phase(phase: HostPhase) {
    LIVE.store(phase == HostPhase::Live, Ordering::Release);
}

/// Called by the host once its runtime has started.
pub fn enter_live() {
    set_host_phase(HostPhase::Live);
}

/// Called by the host when its runtime is quitting.
pub fn exit_live() {
    set_host_phase(HostPhase::EditOrBuild);
}
