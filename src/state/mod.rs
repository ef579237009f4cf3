pub mod app_settings;
pub mod app_state;
pub mod autofill;
pub mod debounce;
pub mod messages;
pub mod modal;
pub mod network;
