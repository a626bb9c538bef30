pub mod coordinator;
pub mod render;
pub mod state;
pub mod stream;

pub use coordinator::ViewCoordinator;
pub use render::render;
pub use state::{AcquisitionMode, ViewState};
pub use stream::LiveStreamManager;
