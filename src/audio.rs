//! Audio backend that runs on the tokio runtime without an output device.
//!
//! Buffering is a short delay (plus an existence check on the file when
//! asked to verify assets) and playback is a timer of fixed length. Events
//! go back to the event loop over an unbounded channel.

use chrono::Utc;
use log::debug;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::error::DrillError;
use crate::models::PromptRef;
use crate::playback::{AudioBackend, AudioEvent, AudioEventKind, Ticket};

pub struct SimulatedAudio {
    events: UnboundedSender<AudioEvent>,
    load_delay: Duration,
    prompt_duration: Duration,
    verify_files: bool,
    tasks: HashMap<Ticket, Vec<JoinHandle<()>>>,
}

impl SimulatedAudio {
    pub fn new(
        events: UnboundedSender<AudioEvent>,
        load_delay: Duration,
        prompt_duration: Duration,
        verify_files: bool,
    ) -> Self {
        Self {
            events,
            load_delay,
            prompt_duration,
            verify_files,
            tasks: HashMap::new(),
        }
    }

    /// Number of tickets that still hold tasks.
    pub fn live_tickets(&self) -> usize {
        self.tasks.len()
    }
}

impl AudioBackend for SimulatedAudio {
    fn load(&mut self, ticket: Ticket, prompt: &PromptRef) -> Result<(), DrillError> {
        let tx = self.events.clone();
        let delay = self.load_delay;
        let verify = self.verify_files;
        let path = PathBuf::from(prompt.as_str());

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let kind = if verify {
                match tokio::fs::metadata(&path).await {
                    Ok(meta) if meta.is_file() => AudioEventKind::Loaded,
                    Ok(_) => AudioEventKind::LoadFailed(format!("{} is not a file", path.display())),
                    Err(e) => AudioEventKind::LoadFailed(format!("{}: {}", path.display(), e)),
                }
            } else {
                AudioEventKind::Loaded
            };
            let _ = tx.send(AudioEvent::new(ticket, kind, Utc::now()));
        });

        self.tasks.entry(ticket).or_default().push(handle);
        Ok(())
    }

    fn play(&mut self, ticket: Ticket) -> Result<(), DrillError> {
        let Some(handles) = self.tasks.get_mut(&ticket) else {
            return Err(DrillError::Playback(format!(
                "ticket {} has nothing loaded",
                ticket.value()
            )));
        };

        let tx = self.events.clone();
        let duration = self.prompt_duration;
        handles.retain(|h| !h.is_finished());
        handles.push(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(AudioEvent::new(ticket, AudioEventKind::Finished, Utc::now()));
        }));
        Ok(())
    }

    fn stop(&mut self, ticket: Ticket) {
        if let Some(handles) = self.tasks.remove(&ticket) {
            debug!("stopping {} task(s) for ticket {}", handles.len(), ticket.value());
            for handle in handles {
                handle.abort();
            }
        }
    }
}

impl Drop for SimulatedAudio {
    fn drop(&mut self) {
        for (_, handles) in self.tasks.drain() {
            for handle in handles {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{PlaybackController, PlaybackSignal, PlaybackState};
    use tokio::sync::mpsc;

    fn backend(verify: bool) -> (SimulatedAudio, mpsc::UnboundedReceiver<AudioEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let audio = SimulatedAudio::new(tx, Duration::from_millis(5), Duration::from_millis(20), verify);
        (audio, rx)
    }

    #[tokio::test]
    async fn test_load_then_play_reports_finish() {
        let (audio, mut rx) = backend(false);
        let mut pc = PlaybackController::new(audio);

        let ticket = pc.load(&PromptRef::new("anything"));
        let loaded = rx.recv().await.unwrap();
        assert_eq!(loaded.ticket, ticket);
        assert_eq!(pc.handle_event(loaded), Some(PlaybackSignal::Ready));

        pc.play().unwrap();
        let finished = rx.recv().await.unwrap();
        assert_eq!(finished.kind, AudioEventKind::Finished);
        assert!(matches!(pc.handle_event(finished), Some(PlaybackSignal::Completed(_))));
        assert_eq!(pc.state(), PlaybackState::Ended);
    }

    #[tokio::test]
    async fn test_missing_file_fails_to_load() {
        let (mut audio, mut rx) = backend(true);
        let ticket = Ticket(1);
        audio.load(ticket, &PromptRef::new("/no/such/prompt.wav")).unwrap();

        let event = rx.recv().await.unwrap();
        assert!(matches!(event.kind, AudioEventKind::LoadFailed(_)));
    }

    #[tokio::test]
    async fn test_stop_cancels_pending_events() {
        let (mut audio, mut rx) = backend(false);
        let ticket = Ticket(1);
        audio.load(ticket, &PromptRef::new("q1")).unwrap();
        audio.stop(ticket);
        assert_eq!(audio.live_tickets(), 0);

        let waited = tokio::time::timeout(Duration::from_millis(60), rx.recv()).await;
        assert!(waited.is_err(), "no event should arrive after stop");
    }

    #[tokio::test]
    async fn test_play_without_load_is_refused() {
        let (mut audio, _rx) = backend(false);
        assert!(matches!(audio.play(Ticket(9)), Err(DrillError::Playback(_))));
    }
}
