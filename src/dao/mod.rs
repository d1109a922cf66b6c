/// Live-record storage backends and their shared contract.
pub mod scoreboard_store;
/// Storage abstraction layer shared by every backend.
pub mod storage;
