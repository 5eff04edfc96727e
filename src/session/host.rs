use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::foundation::core::Canvas;

/// Identifier of one scheduled frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(pub u64);

/// Identifier of a registered resize listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// View lifecycle collaborator an [`AnimationLoop`](crate::session::animation::AnimationLoop)
/// is mounted into.
///
/// The host owns scheduling. It hands each requested frame back through
/// `AnimationLoop::on_frame`, and delivers viewport changes through `AnimationLoop::on_resize`
/// for as long as the loop's listener is registered.
pub trait ViewHost {
    /// Current viewport size in pixels.
    fn viewport(&self) -> Canvas;

    /// Schedule one frame callback at the next refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Drop a scheduled callback. Unknown or already-delivered handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);

    fn add_resize_listener(&mut self) -> ListenerId;

    fn remove_resize_listener(&mut self, id: ListenerId);
}

impl<H: ViewHost + ?Sized> ViewHost for &mut H {
    fn viewport(&self) -> Canvas {
        (**self).viewport()
    }

    fn request_frame(&mut self) -> FrameHandle {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        (**self).cancel_frame(handle)
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        (**self).add_resize_listener()
    }

    fn remove_resize_listener(&mut self, id: ListenerId) {
        (**self).remove_resize_listener(id)
    }
}

/// One-way cancellation flag shared between a loop and whoever may stop it.
///
/// Clones observe the same flag. Once cancelled it stays cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
