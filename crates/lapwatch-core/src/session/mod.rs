//! Everything periodic around the timer engine: sampling, color cycling and
//! debounced persistence, driven from one task.

mod debounce;
mod driver;
mod palette;

pub use debounce::Debounce;
pub use driver::{
    Frame, NullObserver, Session, SessionCommand, SessionHandle, SessionObserver, SessionOptions,
};
pub use palette::{Backdrop, Palette};
