mod common;

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};

use broadcast_core::host::events::{
    ON_BROADCAST_ERROR, ON_BROADCAST_STATE_CHANGED, ON_ERROR, ON_IS_BROADCAST_READY,
    ON_MEDIA_SERVICES_WERE_LOST,
};
use broadcast_core::{
    CustomVideoConfig, EngineError, EngineSession, EventEmitter, JsonEventDelegate,
    SessionController,
};
use broadcast_sim::SimulatedEngine;

use common::{DESTINATION, STREAM_KEY};

#[derive(Default)]
struct CapturingEmitter {
    events: Mutex<Vec<(String, Value)>>,
}

impl CapturingEmitter {
    fn named(&self, name: &str) -> Vec<Value> {
        self.events
            .lock()
            .iter()
            .filter(|(event, _)| event == name)
            .map(|(_, payload)| payload.clone())
            .collect()
    }
}

impl EventEmitter for CapturingEmitter {
    fn emit(&self, event: &str, payload: Value) {
        self.events.lock().push((event.to_string(), payload));
    }
}

fn json_controller(
    engine: &SimulatedEngine,
) -> (SessionController<SimulatedEngine>, Arc<CapturingEmitter>) {
    let emitter = Arc::new(CapturingEmitter::default());
    let controller = SessionController::new(engine.clone(), JsonEventDelegate::new(emitter.clone()));
    (controller, emitter)
}

#[test]
fn connection_lifecycle_reaches_host_as_json() {
    let engine = SimulatedEngine::new();
    let (mut controller, emitter) = json_controller(&engine);

    controller.initiate().unwrap();
    controller.start(DESTINATION, STREAM_KEY).unwrap();
    controller.stop();

    let session_id = engine.last_session().unwrap().session_id();
    assert_eq!(emitter.named(ON_IS_BROADCAST_READY), vec![json!({"isReady": true})]);
    assert_eq!(
        emitter.named(ON_BROADCAST_STATE_CHANGED),
        vec![
            json!({"stateStatus": "CONNECTING"}),
            json!({"stateStatus": "CONNECTED", "metadata": {"sessionId": session_id}}),
            json!({"stateStatus": "DISCONNECTED"}),
        ]
    );
}

#[test]
fn failed_initiate_reports_message_and_not_ready() {
    let engine = SimulatedEngine::new();
    let (mut controller, emitter) = json_controller(&engine);
    controller
        .set_video_config(Some(CustomVideoConfig {
            width: Some(720),
            ..CustomVideoConfig::default()
        }))
        .unwrap();

    assert!(controller.initiate().is_err());

    assert_eq!(emitter.named(ON_IS_BROADCAST_READY), vec![json!({"isReady": false})]);
    let messages = emitter.named(ON_ERROR);
    assert_eq!(messages.len(), 1);
    assert!(messages[0]["message"].as_str().unwrap().contains("width"));
}

#[test]
fn engine_error_reaches_host_as_exception() {
    let engine = SimulatedEngine::new();
    let (mut controller, emitter) = json_controller(&engine);
    controller.initiate().unwrap();
    let session = engine.last_session().unwrap();

    session.emit_error(
        &EngineError::new(-1009, "NSURLErrorDomain", "The Internet connection appears to be offline.")
            .fatal(),
    );
    session.emit_media_services_lost();

    assert_eq!(
        emitter.named(ON_BROADCAST_ERROR),
        vec![json!({
            "exception": {
                "code": -1009,
                "type": "NSURLErrorDomain",
                "detail": "The Internet connection appears to be offline.",
                "source": null,
                "isFatal": true,
                "sessionId": session.session_id()
            }
        })]
    );
    assert_eq!(emitter.named(ON_MEDIA_SERVICES_WERE_LOST), vec![json!({})]);
}
