use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::PreviewSettings;
use crate::models::devices::{DeviceDescriptor, DevicePosition, MixerSlotConfiguration, StillFrame};
use crate::session::registry::{find_attached, select_next_camera, AttachedDeviceRegistry, SlotSourceRegistry};
use crate::traits::broadcast_engine::EngineSession;

/// Callback receiving a freshly created preview.
pub type PreviewCallback<P> = Box<dyn FnOnce(P) + Send + 'static>;

/// A unit of device-graph work, run only once the engine reports quiescence.
pub enum DeviceOperation<P> {
    /// Set the attached microphone's gain to 0 or 1.
    SetMuted(bool),
    /// Exchange the attached camera for the next one. With a `target`, the
    /// swap is skipped when the attached camera is already there.
    SwapCamera {
        target: Option<DevicePosition>,
        on_preview: PreviewCallback<P>,
    },
    /// Configure a mixer slot and bind a new image source showing `frame`.
    AttachSlot {
        slot: MixerSlotConfiguration,
        frame: StillFrame,
    },
    FetchPreview {
        on_preview: PreviewCallback<P>,
    },
}

impl<P> DeviceOperation<P> {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SetMuted(_) => "set-muted",
            Self::SwapCamera { .. } => "swap-camera",
            Self::AttachSlot { .. } => "attach-slot",
            Self::FetchPreview { .. } => "fetch-preview",
        }
    }
}

/// Device state shared by the controller and in-flight operations.
///
/// Registry access goes through the mutexes here and nowhere else.
pub struct DeviceContext<S: EngineSession> {
    session: Arc<S>,
    devices: Mutex<AttachedDeviceRegistry>,
    slots: Mutex<SlotSourceRegistry>,
    preview: Mutex<PreviewSettings>,
    closed: AtomicBool,
}

impl<S: EngineSession> DeviceContext<S> {
    pub fn new(session: Arc<S>, devices: AttachedDeviceRegistry, preview: PreviewSettings) -> Self {
        Self {
            session,
            devices: Mutex::new(devices),
            slots: Mutex::new(SlotSourceRegistry::default()),
            preview: Mutex::new(preview),
            closed: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &Arc<S> {
        &self.session
    }

    pub fn attached_devices(&self) -> AttachedDeviceRegistry {
        self.devices.lock().clone()
    }

    pub fn live_slot_count(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn has_slot_source(&self, name: &str) -> bool {
        self.slots.lock().contains(name)
    }

    pub fn set_preview_settings(&self, settings: PreviewSettings) {
        *self.preview.lock() = settings;
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Release every owned source and forget attached devices.
    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.slots.lock().clear();
        self.devices.lock().clear();
    }

    fn preview(&self) -> Option<S::Preview> {
        let settings = *self.preview.lock();
        match self.session.preview(settings.aspect_mode, settings.mirrored) {
            Ok(preview) => Some(preview),
            Err(e) => {
                log::warn!("Failed to create camera preview: {}", e);
                None
            }
        }
    }

    fn attached(&self, urn: Option<&str>) -> Option<DeviceDescriptor> {
        let urn = urn?;
        let attached = self.session.list_attached_devices();
        find_attached(&attached, urn).cloned()
    }

    fn set_muted(&self, muted: bool) {
        let urn = self.devices.lock().microphone_urn().map(str::to_owned);
        let Some(microphone) = self.attached(urn.as_deref()) else {
            log::warn!("No attached microphone to {}", if muted { "mute" } else { "unmute" });
            return;
        };
        if !microphone.is_microphone() {
            log::warn!("Device {} is not an audio device", microphone.urn);
            return;
        }

        let gain = if muted { 0.0 } else { 1.0 };
        if let Err(e) = self.session.set_gain(&microphone, gain) {
            log::warn!("Failed to set gain on {}: {}", microphone.urn, e);
        }
    }

    fn swap_camera(
        self: &Arc<Self>,
        target: Option<DevicePosition>,
        on_preview: PreviewCallback<S::Preview>,
        done: Completion<S>,
    ) {
        let urn = self.devices.lock().camera_urn().map(str::to_owned);
        let Some(attached) = self.attached(urn.as_deref()) else {
            log::warn!("No attached camera to swap");
            return;
        };
        if target == Some(attached.position) {
            log::debug!("Camera {} already at {:?}", attached.urn, attached.position);
            return;
        }

        let available = self.session.list_available_devices();
        let Some(next) = select_next_camera(&attached, &available).cloned() else {
            log::warn!("No camera available opposite {}", attached.urn);
            return;
        };

        let context = Arc::clone(self);
        let old_urn = attached.urn.clone();
        let next_urn = next.urn.clone();
        self.session.exchange_device(
            &attached,
            &next,
            Box::new(move |result| {
                let _done = done;
                let camera = match result {
                    Ok(camera) => camera,
                    Err(e) => {
                        log::warn!("Camera exchange {} -> {} failed: {}", old_urn, next_urn, e);
                        return;
                    }
                };
                if context.is_closed() {
                    return;
                }

                log::info!("Swapped camera {} -> {}", old_urn, camera.urn);
                context.devices.lock().set_camera(camera.urn);
                if let Some(preview) = context.preview() {
                    on_preview(preview);
                }
            }),
        );
    }

    fn attach_slot(self: &Arc<Self>, slot: MixerSlotConfiguration, frame: StillFrame, done: Completion<S>) {
        if let Err(e) = self.session.add_mixer_slot(&slot) {
            log::warn!("Failed to configure mixer slot {}: {}", slot.name, e);
            return;
        }

        let previous = self.slots.lock().take(&slot.name);
        match previous {
            Some(source) => {
                log::debug!("Detaching source {} from slot {}", source.id(), slot.name);
                let context = Arc::clone(self);
                self.session.detach_image_source(
                    source,
                    Box::new(move |()| {
                        if context.is_closed() {
                            return;
                        }
                        context.attach_new_source(slot, frame, done);
                    }),
                );
            }
            None => self.attach_new_source(slot, frame, done),
        }
    }

    fn attach_new_source(self: &Arc<Self>, slot: MixerSlotConfiguration, frame: StillFrame, done: Completion<S>) {
        let source = match self.session.create_image_source(&slot.name) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("Failed to create image source for slot {}: {}", slot.name, e);
                return;
            }
        };

        let context = Arc::clone(self);
        let name = slot.name.clone();
        self.session.attach_image_source(
            Arc::clone(&source),
            &slot.name,
            Box::new(move |result| {
                let _done = done;
                if let Err(e) = result {
                    log::warn!("Failed to attach image source to slot {}: {}", name, e);
                    return;
                }
                if context.is_closed() {
                    return;
                }

                if let Err(e) = source.submit_frame(&frame) {
                    log::warn!("Failed to push frame into slot {}: {}", name, e);
                }
                if let Some(displaced) = context.slots.lock().insert(&name, source) {
                    log::warn!("Slot {} displaced live source {}", name, displaced.id());
                }
            }),
        );
    }

    fn execute(self: &Arc<Self>, operation: DeviceOperation<S::Preview>, done: Completion<S>) {
        if self.is_closed() {
            return;
        }
        match operation {
            DeviceOperation::SetMuted(muted) => self.set_muted(muted),
            DeviceOperation::SwapCamera { target, on_preview } => {
                self.swap_camera(target, on_preview, done)
            }
            DeviceOperation::AttachSlot { slot, frame } => self.attach_slot(slot, frame, done),
            DeviceOperation::FetchPreview { on_preview } => {
                if let Some(preview) = self.preview() {
                    on_preview(preview);
                }
            }
        }
    }
}

struct QueueState<P> {
    pending: VecDeque<DeviceOperation<P>>,
    in_flight: bool,
    pumping: bool,
    closed: bool,
}

struct PipelineCore<S: EngineSession> {
    context: Arc<DeviceContext<S>>,
    queue: Mutex<QueueState<S::Preview>>,
}

impl<S: EngineSession> PipelineCore<S> {
    /// Dispatch queued operations while none is in flight.
    ///
    /// Re-entrant calls (an operation completing synchronously inside
    /// dispatch) return immediately and leave the loop to the outer caller.
    fn pump(self: &Arc<Self>) {
        {
            let mut queue = self.queue.lock();
            if queue.pumping {
                return;
            }
            queue.pumping = true;
        }

        loop {
            let operation = {
                let mut queue = self.queue.lock();
                let next = if queue.in_flight || queue.closed {
                    None
                } else {
                    queue.pending.pop_front()
                };
                match next {
                    Some(operation) => {
                        queue.in_flight = true;
                        operation
                    }
                    None => {
                        queue.pumping = false;
                        return;
                    }
                }
            };
            self.dispatch(operation);
        }
    }

    fn dispatch(self: &Arc<Self>, operation: DeviceOperation<S::Preview>) {
        log::debug!("Awaiting device quiescence for {}", operation.label());
        let core = Arc::downgrade(self);
        self.context.session.await_device_changes(Box::new(move || {
            let Some(core) = core.upgrade() else {
                return;
            };
            let context = Arc::clone(&core.context);
            context.execute(operation, Completion { core });
        }));
    }

    fn finish(self: &Arc<Self>) {
        self.queue.lock().in_flight = false;
        self.pump();
    }
}

/// Marks the in-flight operation finished when dropped, releasing the next one.
///
/// Operations hand it to their final engine callback; early returns drop it
/// on the spot.
struct Completion<S: EngineSession> {
    core: Arc<PipelineCore<S>>,
}

impl<S: EngineSession> Drop for Completion<S> {
    fn drop(&mut self) {
        self.core.finish();
    }
}

/// Serializes device-graph mutations behind the engine's quiescence barrier.
///
/// Operations run one at a time in enqueue order; the next one is dispatched
/// only after the previous one's last engine callback has fired.
pub struct DevicePipeline<S: EngineSession> {
    core: Arc<PipelineCore<S>>,
}

impl<S: EngineSession> DevicePipeline<S> {
    pub fn new(context: Arc<DeviceContext<S>>) -> Self {
        Self {
            core: Arc::new(PipelineCore {
                context,
                queue: Mutex::new(QueueState {
                    pending: VecDeque::new(),
                    in_flight: false,
                    pumping: false,
                    closed: false,
                }),
            }),
        }
    }

    pub fn context(&self) -> &Arc<DeviceContext<S>> {
        &self.core.context
    }

    pub fn enqueue(&self, operation: DeviceOperation<S::Preview>) {
        {
            let mut queue = self.core.queue.lock();
            if queue.closed {
                log::debug!("Dropping {} on closed pipeline", operation.label());
                return;
            }
            queue.pending.push_back(operation);
        }
        self.core.pump();
    }

    /// Operations waiting behind the one in flight.
    pub fn pending_len(&self) -> usize {
        self.core.queue.lock().pending.len()
    }

    /// Drop queued work and release all registries. Later callbacks are no-ops.
    pub fn close(&self) {
        let dropped = {
            let mut queue = self.core.queue.lock();
            queue.closed = true;
            std::mem::take(&mut queue.pending)
        };
        if !dropped.is_empty() {
            log::debug!("Discarded {} pending device operations", dropped.len());
        }
        self.core.context.close();
    }
}

impl<S: EngineSession> Drop for DevicePipeline<S> {
    fn drop(&mut self) {
        self.close();
    }
}
