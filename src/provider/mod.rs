// Provider module: payload wire types plus the HTTP and mock implementations.

pub mod mock;
pub mod payload;
pub mod traits;
pub mod yahoo;

pub use mock::MockProvider;
pub use traits::DataProvider;
pub use yahoo::YahooProvider;
