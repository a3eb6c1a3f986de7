use crate::error::Result;
use crate::gfx::GraphicsContext;

use super::renderer::FrameOutcome;

/// Running counts of frame outcomes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: u64,
    pub skipped: u64,
    pub aborted: u64,
}

impl FrameStats {
    /// Books the result of [`SceneRenderer::render_frame`](super::SceneRenderer::render_frame)
    /// and returns whether the frame should be presented.
    ///
    /// A failed frame is logged and its draws discarded through
    /// [`GraphicsContext::abort_frame`]; it still presents, as a cleared frame.
    pub fn settle(&mut self, gfx: &mut dyn GraphicsContext, result: Result<FrameOutcome>) -> bool {
        match result {
            Ok(FrameOutcome::Drawn { .. }) => {
                self.drawn += 1;
                true
            }
            Ok(FrameOutcome::Skipped) => {
                self.skipped += 1;
                false
            }
            Err(e) => {
                self.aborted += 1;
                log::error!("frame aborted: {e}");
                gfx.abort_frame();
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::gfx::recording::{GfxCall, RecordingContext};

    #[test]
    fn drawn_frame_presents() {
        let mut gfx = RecordingContext::new();
        let mut stats = FrameStats::default();
        assert!(stats.settle(&mut gfx, Ok(FrameOutcome::Drawn { draw_calls: 2 })));
        assert_eq!(stats, FrameStats { drawn: 1, skipped: 0, aborted: 0 });
        assert!(gfx.calls().is_empty());
    }

    #[test]
    fn skipped_frame_does_not_present() {
        let mut gfx = RecordingContext::new();
        let mut stats = FrameStats::default();
        assert!(!stats.settle(&mut gfx, Ok(FrameOutcome::Skipped)));
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn stack_errors_abort_and_present_cleared() {
        let mut gfx = RecordingContext::new();
        let mut stats = FrameStats::default();

        assert!(stats.settle(&mut gfx, Err(RenderError::EmptyStack)));
        assert!(stats.settle(&mut gfx, Err(RenderError::UnbalancedStack { depth: 1 })));

        assert_eq!(stats.aborted, 2);
        assert_eq!(gfx.calls(), &[GfxCall::AbortFrame, GfxCall::AbortFrame]);
    }

    #[test]
    fn abort_follows_partially_recorded_frame() {
        let mut gfx = RecordingContext::new();
        gfx.clear();
        gfx.draw_arrays(0, 12);
        let mut stats = FrameStats::default();

        stats.settle(&mut gfx, Err(RenderError::EmptyStack));
        assert_eq!(gfx.calls().last(), Some(&GfxCall::AbortFrame));
    }
}
