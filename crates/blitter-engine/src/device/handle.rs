macro_rules! device_handle {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Resource kind, used in error messages.
            pub const KIND: &'static str = $kind;

            /// Wraps a backend-assigned id.
            #[inline]
            pub const fn from_raw(id: u64) -> Self {
                Self(id)
            }

            #[inline]
            pub const fn id(self) -> u64 {
                self.0
            }

            #[inline]
            pub(crate) fn unknown(self) -> crate::error::RenderError {
                crate::error::RenderError::UnknownHandle(Self::KIND, self.0)
            }
        }
    };
}

device_handle!(
    /// GPU image (texture, canvas or presentation buffer).
    ImageHandle,
    "image"
);
device_handle!(
    /// GPU vertex or index buffer.
    BufferHandle,
    "buffer"
);
device_handle!(
    /// Compiled pipeline, bound to its target and resources.
    PipelineHandle,
    "pipeline"
);

/// Monotonic id source shared by the backends. Ids start at 1.
#[derive(Debug, Default)]
pub(crate) struct HandleAllocator {
    next: u64,
}

impl HandleAllocator {
    pub(crate) fn next(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}
