use crate::state::messages::{NetworkRequest, NetworkResponse};
use ftc_api::aggregate::{Aggregator, LookupOutcome};
use ftc_api::lookup::LookupToken;
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Runs each lookup as its own task. A new request aborts the previous task,
/// so at most one lookup is in flight.
pub struct NetworkWorker {
    aggregator: Aggregator,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
    in_flight: Option<JoinHandle<()>>,
}

impl NetworkWorker {
    pub fn new(
        aggregator: Aggregator,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            aggregator,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
            in_flight: None,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            match request {
                NetworkRequest::LookupTeam { token, input } => {
                    self.start_lookup(token, input).await;
                }
            }
        }
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }

    async fn start_lookup(&mut self, token: LookupToken, input: String) {
        if let Some(previous) = self.in_flight.take()
            && !previous.is_finished()
        {
            debug!("abandoning superseded lookup");
            previous.abort();
        }

        self.start_loading_animation().await;

        let aggregator = self.aggregator.clone();
        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        self.in_flight = Some(tokio::spawn(async move {
            debug!("looking up team {input:?}");
            let outcome = aggregator.lookup(&input).await;
            let is_ok = !matches!(outcome, LookupOutcome::LookupFailed(_));
            stop_loading_animation(&responses, &is_loading, is_ok).await;

            if let Err(e) = responses
                .send(NetworkResponse::LookupCompleted { token, outcome })
                .await
            {
                error!("Failed to send network response: {e}");
            }
        }));
    }

    async fn start_loading_animation(&self) {
        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        // A ticker from an abandoned lookup is still running.
        if self.is_loading.swap(true, Ordering::Relaxed) {
            return;
        }

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }
}

async fn stop_loading_animation(
    responses: &mpsc::Sender<NetworkResponse>,
    is_loading: &AtomicBool,
    is_ok: bool,
) {
    is_loading.store(false, Ordering::Relaxed);
    tokio::time::sleep(Duration::from_millis(15)).await;

    let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
    let _ = responses
        .send(NetworkResponse::LoadingStateChanged {
            loading_state: LoadingState { is_loading: false, spinner_char },
        })
        .await;
}
