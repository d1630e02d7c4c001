// Session persistence: key-value backends, startup restore, debounced writer.

pub mod load;
pub mod scheduler;
pub mod store;

pub use load::{load_session, RestoredSession};
pub use scheduler::PersistScheduler;
pub use store::{KeyValueStore, MemoryStore, RedisStore};

pub const RESUME_KEY: &str = "resumeData";
pub const SETTINGS_KEY: &str = "settings";
pub const THEME_KEY: &str = "theme";
