//! Simulated engine session.
//!
//! Keeps the device graph in memory and completes asynchronous device calls
//! either inline or when the test drains them with [`SimulatedSession::run_pending`].
//! Locks are never held while a caller-supplied callback runs.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use url::Url;

use broadcast_core::models::config::{AspectMode, LogLevel};
use broadcast_core::models::devices::{DeviceDescriptor, MixerSlotConfiguration};
use broadcast_core::models::error::EngineError;
use broadcast_core::models::state::EngineState;
use broadcast_core::models::stats::TransmissionStatistics;
use broadcast_core::traits::broadcast_engine::{
    DeviceCallback, EngineSession, ImageSource, QuiescenceCallback,
};
use broadcast_core::traits::engine_listener::EngineListener;

use crate::image_source::SimImageSource;

const ERROR_DOMAIN: &str = "SimulatedBroadcastErrorDomain";

/// When asynchronous device callbacks fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Before the engine call returns.
    Immediate,
    /// When the test calls `run_pending`.
    Manual,
}

/// Preview handle produced by the simulated session.
#[derive(Debug, Clone, PartialEq)]
pub struct SimPreview {
    pub camera_urn: Option<String>,
    pub aspect_mode: AspectMode,
    pub mirrored: bool,
}

enum Task {
    Quiescence(QuiescenceCallback),
    Completion(Box<dyn FnOnce() + Send + 'static>),
}

#[derive(Default)]
struct DeviceGraph {
    attached: Vec<DeviceDescriptor>,
    gains: HashMap<String, f32>,
    slots: Vec<MixerSlotConfiguration>,
    /// Source ids attached per slot name.
    live_sources: HashMap<String, Vec<String>>,
    max_live_per_slot: usize,
    mutations_in_flight: usize,
    overlapping_mutations: usize,
    history: Vec<String>,
}

impl DeviceGraph {
    fn begin_mutation(&mut self, entry: String) {
        if self.mutations_in_flight > 0 {
            log::warn!("Device mutation '{}' overlaps one in flight", entry);
            self.overlapping_mutations += 1;
        }
        self.mutations_in_flight += 1;
        self.history.push(entry);
    }

    fn end_mutation(&mut self) {
        self.mutations_in_flight = self.mutations_in_flight.saturating_sub(1);
    }

    fn is_attached(&self, urn: &str) -> bool {
        self.attached.iter().any(|d| d.urn == urn)
    }
}

struct Connection {
    state: EngineState,
    destination: Option<Url>,
    stream_key: Option<String>,
    start_calls: usize,
    stop_calls: usize,
}

struct SessionShared {
    id: String,
    dispatch: Dispatch,
    catalog: Vec<DeviceDescriptor>,
    listener: Arc<dyn EngineListener>,
    graph: Mutex<DeviceGraph>,
    connection: Mutex<Connection>,
    tasks: Mutex<VecDeque<Task>>,
    sources: Mutex<Vec<Arc<SimImageSource>>>,
    previews: Mutex<Vec<SimPreview>>,
    log_level: Mutex<Option<LogLevel>>,
    ready: AtomicBool,
    connect_on_start: AtomicBool,
    exchange_failure: Mutex<Option<EngineError>>,
    start_failure: Mutex<Option<EngineError>>,
}

impl SessionShared {
    fn is_busy(&self) -> bool {
        self.graph.lock().mutations_in_flight > 0
    }

    fn complete_exchange(
        &self,
        old: &DeviceDescriptor,
        new: &DeviceDescriptor,
    ) -> Result<DeviceDescriptor, EngineError> {
        let failure = self.exchange_failure.lock().take();
        let mut graph = self.graph.lock();
        graph.end_mutation();
        if let Some(e) = failure {
            return Err(e);
        }
        let Some(index) = graph.attached.iter().position(|d| d.urn == old.urn) else {
            return Err(EngineError::new(
                -2,
                ERROR_DOMAIN,
                format!("{} is not attached", old.urn),
            ));
        };
        graph.attached[index] = new.clone();
        Ok(new.clone())
    }

    fn complete_attach(&self, source_id: &str, slot_name: &str) -> Result<(), EngineError> {
        let mut graph = self.graph.lock();
        graph.end_mutation();
        if !graph.slots.iter().any(|s| s.name == slot_name) {
            return Err(EngineError::new(
                -3,
                ERROR_DOMAIN,
                format!("no mixer slot named {}", slot_name),
            ));
        }
        let live = graph.live_sources.entry(slot_name.to_string()).or_default();
        live.push(source_id.to_string());
        let count = live.len();
        graph.max_live_per_slot = graph.max_live_per_slot.max(count);
        Ok(())
    }

    fn complete_detach(&self, source_id: &str) {
        let mut graph = self.graph.lock();
        graph.end_mutation();
        for live in graph.live_sources.values_mut() {
            live.retain(|id| id != source_id);
        }
    }
}

/// An in-memory engine session. Clones share state.
#[derive(Clone)]
pub struct SimulatedSession {
    shared: Arc<SessionShared>,
}

impl SimulatedSession {
    pub(crate) fn new(
        id: String,
        dispatch: Dispatch,
        catalog: Vec<DeviceDescriptor>,
        descriptors: &[DeviceDescriptor],
        listener: Arc<dyn EngineListener>,
    ) -> Self {
        Self {
            shared: Arc::new(SessionShared {
                id,
                dispatch,
                catalog,
                listener,
                graph: Mutex::new(DeviceGraph {
                    attached: descriptors.to_vec(),
                    ..DeviceGraph::default()
                }),
                connection: Mutex::new(Connection {
                    state: EngineState::Disconnected,
                    destination: None,
                    stream_key: None,
                    start_calls: 0,
                    stop_calls: 0,
                }),
                tasks: Mutex::new(VecDeque::new()),
                sources: Mutex::new(Vec::new()),
                previews: Mutex::new(Vec::new()),
                log_level: Mutex::new(None),
                ready: AtomicBool::new(true),
                connect_on_start: AtomicBool::new(true),
                exchange_failure: Mutex::new(None),
                start_failure: Mutex::new(None),
            }),
        }
    }

    fn dispatch(&self, task: Task) {
        match self.shared.dispatch {
            Dispatch::Immediate => run(task),
            Dispatch::Manual => self.shared.tasks.lock().push_back(task),
        }
    }

    /// Fire queued callbacks in order until none remain. Returns how many ran.
    ///
    /// A quiescence callback waits at the back of the queue while a device
    /// mutation is still in flight.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        let mut deferred = 0;
        loop {
            let (task, remaining) = {
                let mut tasks = self.shared.tasks.lock();
                let Some(task) = tasks.pop_front() else {
                    break;
                };
                (task, tasks.len())
            };

            if matches!(task, Task::Quiescence(_)) && self.shared.is_busy() {
                self.shared.tasks.lock().push_back(task);
                deferred += 1;
                if deferred > remaining {
                    log::warn!("Quiescence blocked by a mutation that never completes");
                    break;
                }
                continue;
            }

            deferred = 0;
            run(task);
            ran += 1;
        }
        ran
    }

    pub fn pending_tasks(&self) -> usize {
        self.shared.tasks.lock().len()
    }

    // -- Probes --

    pub fn attached_camera(&self) -> Option<DeviceDescriptor> {
        self.shared
            .graph
            .lock()
            .attached
            .iter()
            .find(|d| d.is_camera())
            .cloned()
    }

    pub fn gain(&self, urn: &str) -> Option<f32> {
        self.shared.graph.lock().gains.get(urn).copied()
    }

    pub fn mixer_slots(&self) -> Vec<MixerSlotConfiguration> {
        self.shared.graph.lock().slots.clone()
    }

    /// Ids of the sources currently attached to `slot`.
    pub fn live_sources(&self, slot: &str) -> Vec<String> {
        self.shared
            .graph
            .lock()
            .live_sources
            .get(slot)
            .cloned()
            .unwrap_or_default()
    }

    /// Most sources ever attached to a single slot at once.
    pub fn max_live_sources_per_slot(&self) -> usize {
        self.shared.graph.lock().max_live_per_slot
    }

    /// Mutations begun while another was still in flight.
    pub fn overlapping_mutations(&self) -> usize {
        self.shared.graph.lock().overlapping_mutations
    }

    /// Every device mutation and gain change, in call order.
    pub fn history(&self) -> Vec<String> {
        self.shared.graph.lock().history.clone()
    }

    pub fn created_sources(&self) -> Vec<Arc<SimImageSource>> {
        self.shared.sources.lock().clone()
    }

    pub fn previews(&self) -> Vec<SimPreview> {
        self.shared.previews.lock().clone()
    }

    pub fn log_level(&self) -> Option<LogLevel> {
        *self.shared.log_level.lock()
    }

    pub fn connection_state(&self) -> EngineState {
        self.shared.connection.lock().state
    }

    pub fn destination(&self) -> Option<(Url, String)> {
        let connection = self.shared.connection.lock();
        Some((connection.destination.clone()?, connection.stream_key.clone()?))
    }

    pub fn start_calls(&self) -> usize {
        self.shared.connection.lock().start_calls
    }

    pub fn stop_calls(&self) -> usize {
        self.shared.connection.lock().stop_calls
    }

    // -- Scripting --

    pub fn set_ready(&self, ready: bool) {
        self.shared.ready.store(ready, Ordering::SeqCst);
    }

    /// When false, `start` only reaches `Connecting`.
    pub fn set_connect_on_start(&self, connect: bool) {
        self.shared.connect_on_start.store(connect, Ordering::SeqCst);
    }

    pub fn fail_next_exchange(&self, error: EngineError) {
        *self.shared.exchange_failure.lock() = Some(error);
    }

    pub fn fail_next_start(&self, error: EngineError) {
        *self.shared.start_failure.lock() = Some(error);
    }

    pub fn emit_state(&self, state: EngineState) {
        self.shared.connection.lock().state = state;
        self.shared.listener.on_state_changed(state, &self.shared.id);
    }

    pub fn emit_error(&self, error: &EngineError) {
        self.shared.listener.on_error(error, &self.shared.id);
    }

    pub fn emit_audio_stats(&self, peak: f64, rms: f64) {
        self.shared.listener.on_audio_stats(peak, rms);
    }

    pub fn emit_statistics(&self, statistics: &TransmissionStatistics) {
        self.shared.listener.on_transmission_statistics(statistics);
    }

    pub fn emit_network_health(&self, health: f64) {
        self.shared.listener.on_network_health_changed(health);
    }

    pub fn emit_broadcast_quality(&self, quality: f64) {
        self.shared.listener.on_broadcast_quality_changed(quality);
    }

    pub fn emit_media_services_lost(&self) {
        self.shared.listener.on_media_services_lost();
    }

    pub fn emit_media_services_reset(&self) {
        self.shared.listener.on_media_services_reset();
    }

    pub fn emit_audio_session_interrupted(&self) {
        self.shared.listener.on_audio_session_interrupted();
    }

    pub fn emit_audio_session_resumed(&self) {
        self.shared.listener.on_audio_session_resumed();
    }
}

fn run(task: Task) {
    match task {
        Task::Quiescence(callback) => callback(),
        Task::Completion(callback) => callback(),
    }
}

impl EngineSession for SimulatedSession {
    type Preview = SimPreview;

    fn session_id(&self) -> String {
        self.shared.id.clone()
    }

    fn is_ready(&self) -> bool {
        self.shared.ready.load(Ordering::SeqCst)
    }

    fn set_log_level(&self, level: LogLevel) {
        *self.shared.log_level.lock() = Some(level);
    }

    fn start(&self, destination: &Url, stream_key: &str) -> Result<(), EngineError> {
        if let Some(e) = self.shared.start_failure.lock().take() {
            return Err(e);
        }
        {
            let mut connection = self.shared.connection.lock();
            if matches!(connection.state, EngineState::Connecting | EngineState::Connected) {
                log::debug!("Session {} already {:?}", self.shared.id, connection.state);
                return Ok(());
            }
            connection.destination = Some(destination.clone());
            connection.stream_key = Some(stream_key.to_string());
            connection.start_calls += 1;
        }

        self.emit_state(EngineState::Connecting);
        if self.shared.connect_on_start.load(Ordering::SeqCst) {
            self.emit_state(EngineState::Connected);
        }
        Ok(())
    }

    fn stop(&self) {
        let was_live = {
            let mut connection = self.shared.connection.lock();
            connection.stop_calls += 1;
            matches!(connection.state, EngineState::Connecting | EngineState::Connected)
        };
        if was_live {
            self.emit_state(EngineState::Disconnected);
        }
    }

    fn await_device_changes(&self, on_quiescent: QuiescenceCallback) {
        self.dispatch(Task::Quiescence(on_quiescent));
    }

    fn list_available_devices(&self) -> Vec<DeviceDescriptor> {
        self.shared.catalog.clone()
    }

    fn list_attached_devices(&self) -> Vec<DeviceDescriptor> {
        self.shared.graph.lock().attached.clone()
    }

    fn exchange_device(
        &self,
        old: &DeviceDescriptor,
        new: &DeviceDescriptor,
        on_complete: DeviceCallback<Result<DeviceDescriptor, EngineError>>,
    ) {
        self.shared
            .graph
            .lock()
            .begin_mutation(format!("exchange {} -> {}", old.urn, new.urn));

        let shared = Arc::clone(&self.shared);
        let old = old.clone();
        let new = new.clone();
        self.dispatch(Task::Completion(Box::new(move || {
            let result = shared.complete_exchange(&old, &new);
            on_complete(result);
        })));
    }

    fn set_gain(&self, device: &DeviceDescriptor, gain: f32) -> Result<(), EngineError> {
        let mut graph = self.shared.graph.lock();
        if !graph.is_attached(&device.urn) {
            return Err(EngineError::new(
                -2,
                ERROR_DOMAIN,
                format!("{} is not attached", device.urn),
            ));
        }
        if !device.is_microphone() {
            return Err(EngineError::new(
                -4,
                ERROR_DOMAIN,
                format!("{} has no gain", device.urn),
            ));
        }
        graph.gains.insert(device.urn.clone(), gain);
        graph.history.push(format!("set-gain {} {}", device.urn, gain));
        Ok(())
    }

    fn preview(&self, aspect_mode: AspectMode, mirrored: bool) -> Result<SimPreview, EngineError> {
        let preview = SimPreview {
            camera_urn: self.attached_camera().map(|d| d.urn),
            aspect_mode,
            mirrored,
        };
        self.shared.previews.lock().push(preview.clone());
        Ok(preview)
    }

    fn add_mixer_slot(&self, slot: &MixerSlotConfiguration) -> Result<(), EngineError> {
        let mut graph = self.shared.graph.lock();
        match graph.slots.iter_mut().find(|s| s.name == slot.name) {
            Some(existing) => *existing = slot.clone(),
            None => graph.slots.push(slot.clone()),
        }
        graph.history.push(format!("add-slot {}", slot.name));
        Ok(())
    }

    fn create_image_source(&self, name: &str) -> Result<Arc<dyn ImageSource>, EngineError> {
        let source = Arc::new(SimImageSource::new(name));
        self.shared.sources.lock().push(Arc::clone(&source));
        let source: Arc<dyn ImageSource> = source;
        Ok(source)
    }

    fn attach_image_source(
        &self,
        source: Arc<dyn ImageSource>,
        slot_name: &str,
        on_complete: DeviceCallback<Result<(), EngineError>>,
    ) {
        self.shared
            .graph
            .lock()
            .begin_mutation(format!("attach {} {}", slot_name, source.id()));

        let shared = Arc::clone(&self.shared);
        let slot_name = slot_name.to_string();
        self.dispatch(Task::Completion(Box::new(move || {
            let result = shared.complete_attach(source.id(), &slot_name);
            on_complete(result);
        })));
    }

    fn detach_image_source(&self, source: Arc<dyn ImageSource>, on_complete: DeviceCallback<()>) {
        self.shared
            .graph
            .lock()
            .begin_mutation(format!("detach {}", source.id()));

        let shared = Arc::clone(&self.shared);
        self.dispatch(Task::Completion(Box::new(move || {
            shared.complete_detach(source.id());
            on_complete(());
        })));
    }
}
