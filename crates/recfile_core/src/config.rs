//! Container configuration.

/// Configuration for container writers and readers.
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Bytes of encoded frames a writer buffers before appending them to
    /// the backend (0 = append every frame immediately).
    pub write_buffer_size: usize,

    /// Initial size of a reader's read buffer. Grows for larger frames.
    pub read_buffer_size: usize,

    /// Maximum encoded size of a single record a writer accepts.
    ///
    /// Readers bound frames by the container's own end frame instead, so a
    /// container written with a raised limit stays readable.
    pub max_record_size: u32,

    /// Whether `close` syncs the backend to durable storage.
    pub sync_on_close: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            write_buffer_size: 64 * 1024,       // 64 KB
            read_buffer_size: 64 * 1024,        // 64 KB
            max_record_size: 16 * 1024 * 1024, // 16 MB
            sync_on_close: true,
        }
    }
}

impl ContainerConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the writer buffer size.
    #[must_use]
    pub const fn write_buffer_size(mut self, size: usize) -> Self {
        self.write_buffer_size = size;
        self
    }

    /// Sets the initial reader buffer size.
    #[must_use]
    pub const fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Sets the maximum encoded record size accepted on write.
    #[must_use]
    pub const fn max_record_size(mut self, size: u32) -> Self {
        self.max_record_size = size;
        self
    }

    /// Sets whether `close` syncs to durable storage.
    #[must_use]
    pub const fn sync_on_close(mut self, value: bool) -> Self {
        self.sync_on_close = value;
        self
    }
}
