mod logging;

pub use logging::TracingObserver;
