// Pure editing core: path mutation, generation history, skill merge, and the
// document-wide invariants they rely on.
// Nothing in here touches the session, storage, or the network.

pub mod history;
pub mod normalize;
pub mod path;
pub mod skills;

pub use history::{can_undo, record_and_replace, undo};
pub use normalize::{keep_entry_id, normalize, reject_entry_id_edit};
pub use path::{EditError, FieldPath};
pub use skills::merge_skills;
