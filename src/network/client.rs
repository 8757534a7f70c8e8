use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, error, info};

use super::regions::{RegionShape, parse_boundaries};
use super::types::{AnalysisRequest, AnalysisResponse, AnalysisResult, CentralityMetric, ServiceError};
use crate::error::AppError;

/// Inputs of one simulation request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationParams {
	pub disrupted: Vec<String>,
	pub auto_top_n: u32,
	pub centrality: CentralityMetric,
}

impl From<SimulationParams> for AnalysisRequest {
	fn from(params: SimulationParams) -> Self {
		Self {
			disrupted: params.disrupted,
			auto_top_n: params.auto_top_n,
			centrality_metric: params.centrality,
		}
	}
}

/// Carries an analysis request to the service.
#[allow(async_fn_in_trait)]
pub trait AnalysisTransport {
	async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AppError>;
}

#[derive(Clone, Debug)]
pub struct HttpTransport {
	client: reqwest::Client,
	url: String,
}

impl HttpTransport {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			url: url.into(),
		}
	}
}

impl AnalysisTransport for HttpTransport {
	async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AppError> {
		let response = self.client.post(&self.url).json(request).send().await?;
		let status = response.status();
		let body = response.text().await?;
		if !status.is_success() {
			let message = serde_json::from_str::<ServiceError>(&body)
				.map(|e| e.error)
				.unwrap_or(body);
			return Err(AppError::Status {
				status: status.as_u16(),
				message,
			});
		}
		decode_response(&body)
	}
}

/// Decodes a success body. A body carrying only `error` is a service
/// failure rather than a decode failure.
pub fn decode_response(body: &str) -> Result<AnalysisResponse, AppError> {
	match serde_json::from_str::<AnalysisResponse>(body) {
		Ok(response) => Ok(response),
		Err(err) => match serde_json::from_str::<ServiceError>(body) {
			Ok(service) => Err(AppError::Service(service.error)),
			Err(_) => Err(AppError::Decode(err)),
		},
	}
}

pub async fn fetch_boundaries(url: &str) -> Result<Vec<RegionShape>, AppError> {
	let body = reqwest::get(url).await?.error_for_status()?.text().await?;
	Ok(parse_boundaries(&body)?)
}

/// Collapses bursts of triggers: each `arm` supersedes the pending one and
/// only the token of the latest `arm` fires.
#[derive(Debug, Default)]
pub struct Coalescer {
	latest: AtomicU64,
	pending: Mutex<Option<SimulationParams>>,
}

impl Coalescer {
	pub fn arm(&self, params: SimulationParams) -> u64 {
		if let Ok(mut pending) = self.pending.lock() {
			*pending = Some(params);
		}
		self.latest.fetch_add(1, Ordering::SeqCst) + 1
	}

	/// Params to send when `token` is still the latest trigger.
	pub fn fire(&self, token: u64) -> Option<SimulationParams> {
		if self.latest.load(Ordering::SeqCst) != token {
			debug!("Simulation trigger {token} superseded");
			return None;
		}
		self.pending.lock().ok().and_then(|mut p| p.take())
	}

	/// Drops the pending trigger so no outstanding token fires.
	pub fn cancel(&self) {
		self.latest.fetch_add(1, Ordering::SeqCst);
		if let Ok(mut pending) = self.pending.lock() {
			*pending = None;
		}
	}
}

/// Numbers outbound requests so a late answer to an older one is dropped.
#[derive(Debug, Default)]
pub struct RequestSequencer {
	issued: AtomicU64,
}

impl RequestSequencer {
	pub fn issue(&self) -> u64 {
		self.issued.fetch_add(1, Ordering::SeqCst) + 1
	}

	pub fn is_latest(&self, seq: u64) -> bool {
		self.issued.load(Ordering::SeqCst) == seq
	}
}

struct ClientInner<T> {
	transport: T,
	coalescer: Coalescer,
	sequencer: RequestSequencer,
	in_flight: AtomicU64,
}

/// Issues simulation requests. Cheap to clone; clones share coalescing and
/// sequencing state.
pub struct SimulationClient<T> {
	inner: Arc<ClientInner<T>>,
}

impl<T> Clone for SimulationClient<T> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T: AnalysisTransport> SimulationClient<T> {
	pub fn new(transport: T) -> Self {
		Self {
			inner: Arc::new(ClientInner {
				transport,
				coalescer: Coalescer::default(),
				sequencer: RequestSequencer::default(),
				in_flight: AtomicU64::new(0),
			}),
		}
	}

	pub fn coalescer(&self) -> &Coalescer {
		&self.inner.coalescer
	}

	pub fn in_flight(&self) -> u64 {
		self.inner.in_flight.load(Ordering::SeqCst)
	}

	/// Cancels the pending trigger and marks every issued request stale.
	pub fn invalidate(&self) {
		self.inner.coalescer.cancel();
		let seq = self.inner.sequencer.issue();
		debug!("Simulation requests up to #{seq} invalidated");
	}

	/// Sends one request. `Ok(None)` means a newer request was issued while
	/// this one was pending and its answer must not be applied.
	pub async fn execute(&self, params: SimulationParams) -> Result<Option<AnalysisResult>, AppError> {
		let seq = self.inner.sequencer.issue();
		let request = AnalysisRequest::from(params);
		info!(
			"Simulation #{seq}: {} disrupted, auto top {}, {}",
			request.disrupted.len(),
			request.auto_top_n,
			request.centrality_metric.as_str()
		);

		self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
		let response = self.inner.transport.analyze(&request).await;
		self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);

		if !self.inner.sequencer.is_latest(seq) {
			match response {
				Ok(_) => info!("Discarding stale response to simulation #{seq}"),
				Err(e) => debug!("Discarding stale failure of simulation #{seq}: {e}"),
			}
			return Ok(None);
		}
		let response = response.inspect_err(|e| error!("Simulation #{seq} failed: {e}"))?;
		Ok(Some(response.into()))
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use tokio::sync::Notify;

	use super::*;

	fn response_json(disrupted: &[&str]) -> String {
		serde_json::json!({
			"before": {"nodes": 2, "edges": 1, "largest_component": 2, "efficiency": 1.0},
			"after": {"nodes": 1, "edges": 0, "largest_component": 1, "efficiency": 0.0},
			"disrupted_list": disrupted,
			"stranded_list": [],
			"community_count": 1,
			"airports_geo": {"features": []},
			"routes_geo": {"features": []},
		})
		.to_string()
	}

	struct EchoTransport;

	impl AnalysisTransport for EchoTransport {
		async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AppError> {
			let codes: Vec<&str> = request.disrupted.iter().map(String::as_str).collect();
			decode_response(&response_json(&codes))
		}
	}

	/// First call blocks until the second one has answered, then fails when
	/// `fail_first` is set.
	struct ReorderingTransport {
		calls: Cell<u32>,
		gate: Notify,
		fail_first: bool,
	}

	impl AnalysisTransport for ReorderingTransport {
		async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AppError> {
			let call = self.calls.get();
			self.calls.set(call + 1);
			if call == 0 {
				self.gate.notified().await;
				if self.fail_first {
					return Err(AppError::Status {
						status: 502,
						message: "old request timed out".into(),
					});
				}
			} else {
				self.gate.notify_one();
			}
			let codes: Vec<&str> = request.disrupted.iter().map(String::as_str).collect();
			decode_response(&response_json(&codes))
		}
	}

	struct FailingTransport;

	impl AnalysisTransport for FailingTransport {
		async fn analyze(&self, _: &AnalysisRequest) -> Result<AnalysisResponse, AppError> {
			Err(AppError::Status {
				status: 500,
				message: "graph unavailable".into(),
			})
		}
	}

	fn params(codes: &[&str]) -> SimulationParams {
		SimulationParams {
			disrupted: codes.iter().map(|s| s.to_string()).collect(),
			..Default::default()
		}
	}

	#[tokio::test]
	async fn execute_returns_result() {
		let client = SimulationClient::new(EchoTransport);
		let result = client.execute(params(&["JFK"])).await.unwrap().unwrap();
		assert_eq!(result.confirmed_disrupted, vec!["JFK"]);
		assert_eq!(client.in_flight(), 0);
	}

	#[tokio::test]
	async fn stale_response_is_discarded() {
		let client = SimulationClient::new(ReorderingTransport {
			calls: Cell::new(0),
			gate: Notify::new(),
			fail_first: false,
		});
		let (first, second) = tokio::join!(
			client.execute(params(&["JFK"])),
			client.execute(params(&["LAX"]))
		);

		assert!(first.unwrap().is_none());
		let second = second.unwrap().unwrap();
		assert_eq!(second.confirmed_disrupted, vec!["LAX"]);
	}

	#[tokio::test]
	async fn stale_failure_is_discarded() {
		let client = SimulationClient::new(ReorderingTransport {
			calls: Cell::new(0),
			gate: Notify::new(),
			fail_first: true,
		});
		let (first, second) = tokio::join!(
			client.execute(params(&["JFK"])),
			client.execute(params(&["LAX"]))
		);

		assert!(first.unwrap().is_none());
		assert_eq!(second.unwrap().unwrap().confirmed_disrupted, vec!["LAX"]);
	}

	/// Answers once the shared gate opens.
	struct GatedTransport {
		gate: Rc<Notify>,
	}

	impl AnalysisTransport for GatedTransport {
		async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AppError> {
			self.gate.notified().await;
			let codes: Vec<&str> = request.disrupted.iter().map(String::as_str).collect();
			decode_response(&response_json(&codes))
		}
	}

	#[tokio::test]
	async fn invalidate_discards_in_flight_response() {
		let gate = Rc::new(Notify::new());
		let client = SimulationClient::new(GatedTransport { gate: gate.clone() });
		let (outcome, ()) = tokio::join!(client.execute(params(&["JFK"])), async {
			while client.in_flight() == 0 {
				tokio::task::yield_now().await;
			}
			client.invalidate();
			gate.notify_one();
		});

		assert!(outcome.unwrap().is_none());
		assert_eq!(client.in_flight(), 0);
	}

	#[test]
	fn invalidate_cancels_pending_trigger() {
		let client = SimulationClient::new(EchoTransport);
		let token = client.coalescer().arm(params(&["JFK"]));
		client.invalidate();
		assert_eq!(client.coalescer().fire(token), None);
	}

	#[tokio::test]
	async fn failure_is_propagated() {
		let client = SimulationClient::new(FailingTransport);
		let err = client.execute(params(&[])).await.unwrap_err();
		assert!(err.to_string().contains("graph unavailable"));
	}

	#[test]
	fn coalescer_fires_only_latest_trigger() {
		let coalescer = Coalescer::default();
		let first = coalescer.arm(params(&["JFK"]));
		let second = coalescer.arm(params(&["JFK", "LAX"]));

		assert_eq!(coalescer.fire(first), None);
		assert_eq!(coalescer.fire(second), Some(params(&["JFK", "LAX"])));
		assert_eq!(coalescer.fire(second), None);
	}

	#[test]
	fn sequencer_tracks_latest() {
		let sequencer = RequestSequencer::default();
		let a = sequencer.issue();
		assert!(sequencer.is_latest(a));
		let b = sequencer.issue();
		assert!(!sequencer.is_latest(a));
		assert!(sequencer.is_latest(b));
	}

	#[test]
	fn error_body_is_a_service_error() {
		let err = decode_response(r#"{"error": "bad metric"}"#).unwrap_err();
		assert!(matches!(err, AppError::Service(ref m) if m == "bad metric"));

		let err = decode_response("not json").unwrap_err();
		assert!(matches!(err, AppError::Decode(_)));
	}
}
