pub mod annotation;
pub mod stack;
pub mod touch;
pub mod viewport;

pub use annotation::AnnotationSurface;
pub use stack::StackController;
pub use touch::SwipeTracker;
pub use viewport::Viewport;
