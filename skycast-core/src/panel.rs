//! The panel itself: one owned state value, one update entry point,
//! and the runner that wires the fetch flow and the push channel to it.

use crate::{
    error::{FetchError, LocationError},
    fetch::WeatherFetcher,
    live::UpdateChannel,
    location::LocationResolver,
    model::WeatherSnapshot,
};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Either leg of the location-to-weather flow failing. Both collapse
/// into the same user-visible notice.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Everything that can mutate the panel state.
#[derive(Debug)]
pub enum PanelEvent {
    /// The one-shot fetch resolved, successfully or not.
    FetchResolved(Result<WeatherSnapshot, FetchFailure>),
    /// A push update arrived on the live channel.
    PushUpdate(WeatherSnapshot),
}

/// User-visible notification requested by a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    FetchFailed,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::FetchFailed => "Failed to fetch weather data.",
        }
    }
}

/// Derived view of the panel's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// First fetch still in flight.
    Loading,
    /// A snapshot is on display.
    Ready,
    /// The fetch failed and nothing has arrived on the push channel.
    Failed,
}

/// The panel's entire state: at most one snapshot, plus the loading
/// flag. All mutation goes through [`apply`](Self::apply) so the
/// last-writer-wins contract between the fetch and the push channel
/// lives in exactly one place.
#[derive(Debug, Clone)]
pub struct PanelState {
    snapshot: Option<WeatherSnapshot>,
    loading: bool,
}

impl PanelState {
    pub fn new() -> Self {
        Self { snapshot: None, loading: true }
    }

    /// Apply one event; returns a notice when the transition asks for a
    /// user-visible notification.
    pub fn apply(&mut self, event: PanelEvent) -> Option<Notice> {
        match event {
            PanelEvent::FetchResolved(Ok(snapshot)) => {
                self.loading = false;
                self.snapshot = Some(snapshot);
                None
            }
            PanelEvent::FetchResolved(Err(failure)) => {
                self.loading = false;
                tracing::error!(error = %failure, "weather fetch failed");
                Some(Notice::FetchFailed)
            }
            PanelEvent::PushUpdate(snapshot) => {
                // Wholesale replacement; the loading flag is untouched.
                self.snapshot = Some(snapshot);
                None
            }
        }
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.snapshot.is_some() {
            Phase::Ready
        } else {
            Phase::Failed
        }
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

impl Default for PanelState {
    fn default() -> Self {
        Self::new()
    }
}

/// Where error notices go. The CLI prints them to stderr; the original
/// surface was a toast.
pub trait Notifier {
    fn notify_error(&self, message: &str);
}

/// Resolve the position once, then fetch once. The one-shot flow behind
/// both `show` and the panel's initial load.
pub async fn fetch_snapshot(
    resolver: &dyn LocationResolver,
    fetcher: &WeatherFetcher,
) -> Result<WeatherSnapshot, FetchFailure> {
    let coord = resolver.resolve().await?;
    tracing::debug!(latitude = coord.latitude, longitude = coord.longitude, "position resolved");

    Ok(fetcher.fetch(coord).await?)
}

/// Run the panel until `shutdown` is cancelled.
///
/// Starts the location-to-weather fetch and the push subscription
/// together; multiplexes whichever resolves or delivers first into the
/// single state value and re-renders after every change. On shutdown
/// the in-flight fetch is abandoned via its cancellation token and the
/// subscription is closed, on every exit path.
pub async fn run_panel(
    resolver: Box<dyn LocationResolver>,
    fetcher: WeatherFetcher,
    channel: UpdateChannel,
    notifier: &dyn Notifier,
    mut on_render: impl FnMut(&PanelState),
    shutdown: CancellationToken,
) -> PanelState {
    let fetch_token = shutdown.child_token();
    let (fetch_tx, mut fetch_rx) = oneshot::channel();
    let fetch_task = tokio::spawn({
        let token = fetch_token.clone();
        async move {
            let result = tokio::select! {
                // Abandon the in-flight fetch on teardown; no update
                // may land after the panel is gone.
                _ = token.cancelled() => return,
                result = fetch_snapshot(resolver.as_ref(), &fetcher) => result,
            };
            let _ = fetch_tx.send(result);
        }
    });

    let mut sub = channel.subscribe();
    let mut state = PanelState::new();
    on_render(&state);

    let mut fetch_pending = true;
    let mut sub_open = true;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            resolved = &mut fetch_rx, if fetch_pending => {
                fetch_pending = false;
                if let Ok(result) = resolved {
                    if let Some(notice) = state.apply(PanelEvent::FetchResolved(result)) {
                        notifier.notify_error(notice.message());
                    }
                    on_render(&state);
                }
            }
            update = sub.recv(), if sub_open => {
                match update {
                    Some(snapshot) => {
                        state.apply(PanelEvent::PushUpdate(snapshot));
                        on_render(&state);
                    }
                    // Dropped connection, not recovered.
                    None => sub_open = false,
                }
            }
        }
    }

    fetch_token.cancel();
    let _ = fetch_task.await;
    sub.close().await;

    state
}
