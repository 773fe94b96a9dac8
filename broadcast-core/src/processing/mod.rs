pub mod config_resolver;
pub mod slot_layout;
