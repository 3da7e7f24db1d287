use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use search_ui::{
    EndpointError, ResponseSender, SuggestionRequest, SuggestionResponse, SuggestionSource,
};
use tokio::runtime::Handle;

use crate::client::{AutocompleteApi, CancellationSignal};
use crate::error::SearchApiError;

/// Runs suggestion requests on a tokio runtime and replies over the UI
/// channel.
///
/// A newer request for a store key cancels the one still in flight for that
/// key; cancelled requests send no response.
pub struct ApiSuggestionSource {
    api: Arc<AutocompleteApi>,
    runtime: Handle,
    in_flight: RefCell<HashMap<String, CancellationSignal>>,
}

impl ApiSuggestionSource {
    pub fn new(api: AutocompleteApi, runtime: Handle) -> Self {
        Self {
            api: Arc::new(api),
            runtime,
            in_flight: RefCell::new(HashMap::new()),
        }
    }

    pub fn api(&self) -> &AutocompleteApi {
        &self.api
    }

    /// Cancel every request still in flight.
    pub fn cancel_all(&self) {
        for (_, signal) in self.in_flight.borrow_mut().drain() {
            signal.store(true, Ordering::Release);
        }
    }
}

impl SuggestionSource for ApiSuggestionSource {
    fn dispatch(&self, request: SuggestionRequest, reply: ResponseSender) {
        let cancel: CancellationSignal = Arc::new(AtomicBool::new(false));
        if let Some(previous) = self
            .in_flight
            .borrow_mut()
            .insert(request.key.clone(), Arc::clone(&cancel))
        {
            previous.store(true, Ordering::Release);
        }

        tracing::trace!(
            key = %request.key,
            seq = request.seq,
            kind = request.kind.as_str(),
            "dispatching suggestion request"
        );

        let api = Arc::clone(&self.api);
        self.runtime.spawn(async move {
            let response = match api.query(&request, Some(&cancel)).await {
                Ok(sections) => SuggestionResponse::ok(&request, sections),
                Err(SearchApiError::Cancelled) => {
                    tracing::trace!(key = %request.key, seq = request.seq, "suggestion request cancelled");
                    return;
                }
                Err(error) => {
                    tracing::debug!(key = %request.key, seq = request.seq, %error, "suggestion request failed");
                    SuggestionResponse::failed(&request, EndpointError::from(&error))
                }
            };
            if reply.send(response).is_err() {
                tracing::debug!(key = %request.key, "response receiver dropped");
            }
        });
    }
}

impl Drop for ApiSuggestionSource {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
