//! Alarm playback for completed timers
//!
//! Playback is best-effort: failures are logged and never reach the caller.

#[cfg(target_os = "macos")]
use std::process::Command;

/// Plays a named alarm sound
pub trait SoundPlayer {
    fn play(&self, sound: &str);
}

/// Plays macOS system sounds through `afplay`; silent on other platforms
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSound;

impl SoundPlayer for SystemSound {
    fn play(&self, sound: &str) {
        #[cfg(target_os = "macos")]
        {
            let path = format!("/System/Library/Sounds/{}.aiff", sound);
            // The tick loop never blocks on audio; a helper thread reaps the child
            match Command::new("afplay").arg(&path).spawn() {
                Ok(mut child) => {
                    std::thread::spawn(move || {
                        if let Err(e) = child.wait() {
                            tracing::debug!(error = %e, "afplay did not exit cleanly");
                        }
                    });
                }
                Err(e) => tracing::debug!(sound, error = %e, "alarm playback failed"),
            }
        }

        #[cfg(not(target_os = "macos"))]
        {
            tracing::debug!(sound, "alarm playback not supported on this platform");
        }
    }
}

/// Records every requested sound, for tests
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct RecordingSound {
    pub played: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
}

#[cfg(test)]
impl SoundPlayer for RecordingSound {
    fn play(&self, sound: &str) {
        self.played.borrow_mut().push(sound.to_string());
    }
}
