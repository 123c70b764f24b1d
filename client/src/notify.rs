use std::fmt;
use tracing::{info, warn};

/// Audible cues the client can request from the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    /// The server rejected a move as illegal.
    IllegalMove,
}

impl fmt::Display for SoundCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundCue::IllegalMove => f.write_str("illegal-move"),
        }
    }
}

/// User-visible side effects. Both calls are fire-and-forget.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
    fn play_sound(&self, cue: SoundCue);
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn alert(&self, message: &str) {
        (**self).alert(message)
    }

    fn play_sound(&self, cue: SoundCue) {
        (**self).play_sound(cue)
    }
}

/// Notifier for headless use: alerts and cues only reach the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        warn!(alert = message, "alert raised");
    }

    fn play_sound(&self, cue: SoundCue) {
        info!(%cue, "sound cue");
    }
}
