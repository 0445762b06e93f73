// Built-in roles and preset configurations offered to clients.
// Static data only; nothing here calls the LLM.

pub mod handlers;
pub mod presets;
pub mod roles;
