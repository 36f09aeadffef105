// Vulkan state management

pub mod frame;
pub mod framebuffer;
pub mod swapchain;
pub mod swapchain_resources;
pub mod sync;
pub mod sync_manager;

pub use frame::{present_needs_recreate, AcquireOutcome, FrameTracker};
pub use framebuffer::{DepthBuffer, Framebuffer};
pub use swapchain::Swapchain;
pub use swapchain_resources::SwapchainResources;
pub use sync::{Fence, FrameSync, Semaphore};
pub use sync_manager::SyncManager;
