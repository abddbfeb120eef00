pub mod client_wizard;
pub mod components;
pub mod roster;
