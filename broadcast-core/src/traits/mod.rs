pub mod broadcast_delegate;
pub mod broadcast_engine;
pub mod engine_listener;
pub mod slot_view;
