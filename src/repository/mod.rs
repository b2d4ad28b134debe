pub mod cache;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod transport;
