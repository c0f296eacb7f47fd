/// Time source used for page load measurement.
///
/// Values are milliseconds on an arbitrary but fixed origin. Implementations
/// should prefer a monotonic source.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> f64;
}
