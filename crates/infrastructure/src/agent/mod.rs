mod composite;
mod console;
mod hook;
mod recording;

pub use composite::CompositeAgent;
pub use console::ConsoleAgent;
pub use hook::HookAgent;
pub use recording::RecordingAgent;
