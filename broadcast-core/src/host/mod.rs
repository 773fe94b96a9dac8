pub mod events;
pub mod props;
