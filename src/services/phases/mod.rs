//! Pure phase engines of the reflection pipeline.
//!
//! Invocation order is fixed: presence, optional response shaping, silence,
//! continuity, voice, closing. Each engine borrows its inputs immutably and
//! returns an owned descriptor.

pub mod closing;
pub mod continuity;
pub mod presence;
pub mod response_shaper;
pub mod silence;
pub mod voice;

pub use closing::decide_closing;
pub use continuity::decide_continuity;
pub use presence::build_presence;
pub use response_shaper::shape_response;
pub use silence::decide_silence;
pub use voice::apply_voice;
