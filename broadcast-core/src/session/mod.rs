pub mod controller;
pub mod forwarder;
pub mod pipeline;
pub mod registry;
