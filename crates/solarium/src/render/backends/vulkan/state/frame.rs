//! Frame-in-flight bookkeeping
//!
//! Tracks which frame slot is recording and which slot last submitted work
//! against each swapchain image, and classifies acquire/present results.

use ash::vk;

use crate::render::backends::vulkan::{VulkanError, VulkanResult};

/// Rotating frame slot plus per-image ownership
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTracker {
    max_frames_in_flight: usize,
    current_frame: usize,
    images_in_flight: Vec<Option<usize>>,
}

impl FrameTracker {
    /// Start at slot 0 with no image owned
    pub fn new(max_frames_in_flight: usize, image_count: usize) -> Self {
        Self {
            max_frames_in_flight: max_frames_in_flight.max(1),
            current_frame: 0,
            images_in_flight: vec![None; image_count],
        }
    }

    /// Slot currently being recorded
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Number of slots
    pub fn max_frames_in_flight(&self) -> usize {
        self.max_frames_in_flight
    }

    /// Move to the next slot
    pub fn advance(&mut self) {
        self.current_frame = (self.current_frame + 1) % self.max_frames_in_flight;
    }

    /// Record the current slot as owner of `image_index`
    ///
    /// Returns the previous owner when it is another slot whose fence must
    /// be waited on before the image can be reused.
    pub fn claim_image(&mut self, image_index: usize) -> Option<usize> {
        if image_index >= self.images_in_flight.len() {
            self.images_in_flight.resize(image_index + 1, None);
        }
        let previous = self.images_in_flight[image_index].replace(self.current_frame);
        previous.filter(|&slot| slot != self.current_frame)
    }

    /// Slot that last used `image_index`, if any
    pub fn image_owner(&self, image_index: usize) -> Option<usize> {
        self.images_in_flight.get(image_index).copied().flatten()
    }

    /// Forget all ownership, sized for a new swapchain
    pub fn reset_images(&mut self, image_count: usize) {
        self.images_in_flight.clear();
        self.images_in_flight.resize(image_count, None);
    }
}

/// Result of asking the swapchain for the next image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// An image was acquired
    Ready {
        /// Index into the swapchain images
        image_index: u32,
        /// The swapchain no longer matches the surface exactly
        suboptimal: bool,
    },
    /// The swapchain must be recreated before rendering
    OutOfDate,
}

impl AcquireOutcome {
    /// Classify the raw `vkAcquireNextImageKHR` result
    pub fn from_result(result: Result<(u32, bool), vk::Result>) -> VulkanResult<Self> {
        match result {
            Ok((image_index, suboptimal)) => Ok(Self::Ready {
                image_index,
                suboptimal,
            }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(Self::OutOfDate),
            Err(e) => Err(VulkanError::Api(e)),
        }
    }
}

/// Whether the swapchain must be rebuilt after presenting
///
/// `result` is the raw `vkQueuePresentKHR` outcome, `Ok(true)` meaning
/// suboptimal. A pending resize forces a rebuild and is cleared whenever a
/// rebuild is requested.
pub fn present_needs_recreate(result: Result<bool, vk::Result>, framebuffer_resized: &mut bool) -> VulkanResult<bool> {
    let recreate = match result {
        Ok(suboptimal) => suboptimal || *framebuffer_resized,
        Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => true,
        Err(e) => return Err(VulkanError::Api(e)),
    };
    if recreate {
        *framebuffer_resized = false;
    }
    Ok(recreate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_wrap_around() {
        let mut tracker = FrameTracker::new(2, 3);
        assert_eq!(tracker.current_frame(), 0);
        tracker.advance();
        assert_eq!(tracker.current_frame(), 1);
        tracker.advance();
        assert_eq!(tracker.current_frame(), 0);
    }

    #[test]
    fn zero_slots_is_treated_as_one() {
        let mut tracker = FrameTracker::new(0, 2);
        assert_eq!(tracker.max_frames_in_flight(), 1);
        tracker.advance();
        assert_eq!(tracker.current_frame(), 0);
    }

    #[test]
    fn claiming_reports_the_other_slot_still_using_an_image() {
        let mut tracker = FrameTracker::new(2, 3);

        // Slot 0 takes image 1
        assert_eq!(tracker.claim_image(1), None);
        tracker.advance();

        // Slot 1 gets image 1 back before slot 0 finished
        assert_eq!(tracker.claim_image(1), Some(0));
        assert_eq!(tracker.image_owner(1), Some(1));
    }

    #[test]
    fn reclaiming_from_the_same_slot_needs_no_extra_wait() {
        let mut tracker = FrameTracker::new(1, 2);
        assert_eq!(tracker.claim_image(0), None);
        tracker.advance();
        assert_eq!(tracker.claim_image(0), None);
    }

    #[test]
    fn reset_clears_ownership_and_resizes() {
        let mut tracker = FrameTracker::new(2, 2);
        tracker.claim_image(0);
        tracker.claim_image(1);
        tracker.reset_images(4);

        for image in 0..4 {
            assert_eq!(tracker.image_owner(image), None);
        }
        assert_eq!(tracker.image_owner(4), None);
    }

    #[test]
    fn out_of_range_images_grow_the_table() {
        let mut tracker = FrameTracker::new(2, 0);
        assert_eq!(tracker.claim_image(2), None);
        assert_eq!(tracker.image_owner(2), Some(0));
    }

    #[test]
    fn acquire_results_are_classified() {
        assert_eq!(
            AcquireOutcome::from_result(Ok((2, false))).unwrap(),
            AcquireOutcome::Ready {
                image_index: 2,
                suboptimal: false
            }
        );
        assert_eq!(
            AcquireOutcome::from_result(Err(vk::Result::ERROR_OUT_OF_DATE_KHR)).unwrap(),
            AcquireOutcome::OutOfDate
        );
        assert!(matches!(
            AcquireOutcome::from_result(Err(vk::Result::ERROR_DEVICE_LOST)),
            Err(VulkanError::Api(vk::Result::ERROR_DEVICE_LOST))
        ));
    }

    #[test]
    fn present_recreates_on_out_of_date_suboptimal_or_resize() {
        let present = |result, resized: bool| {
            let mut flag = resized;
            present_needs_recreate(result, &mut flag)
        };
        assert!(!present(Ok(false), false).unwrap());
        assert!(present(Ok(true), false).unwrap());
        assert!(present(Ok(false), true).unwrap());
        assert!(present(Err(vk::Result::ERROR_OUT_OF_DATE_KHR), false).unwrap());
        assert!(present(Err(vk::Result::ERROR_SURFACE_LOST_KHR), false).is_err());
    }

    #[test]
    fn resize_flag_is_cleared_once_a_rebuild_is_requested() {
        let mut resized = true;
        assert!(present_needs_recreate(Ok(false), &mut resized).unwrap());
        assert!(!resized);

        // Next frame presents normally
        assert!(!present_needs_recreate(Ok(false), &mut resized).unwrap());

        resized = true;
        assert!(present_needs_recreate(Err(vk::Result::ERROR_OUT_OF_DATE_KHR), &mut resized).unwrap());
        assert!(!resized);
    }

    #[test]
    fn resize_flag_survives_a_failed_present() {
        let mut resized = true;
        assert!(present_needs_recreate(Err(vk::Result::ERROR_DEVICE_LOST), &mut resized).is_err());
        assert!(resized);
    }
}
