pub mod clock;
pub mod errors;
pub mod retry;
pub mod shutdown;

pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{DateRule, DomainError, DomainResult};
pub use retry::{retry_transient, RetryConfig};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};
