/*!
# Galaxy 3D State Cache

Backend-agnostic state caching for the Galaxy 3D rendering engine.

Every piece of GPU state the renderer needs (render passes, graphics pipelines,
layouts, samplers, framebuffers, descriptor sets) is described by a small packed
descriptor with byte-exact equality and hashing. Caches map those descriptors to
backend objects so each distinct state is created once and reused afterwards.

## Architecture

- **descriptor**: packed, hashable descriptions of GPU objects
- **transition**: per-word dirty bits of the graphics pipeline descriptor
- **cache**: descriptor-keyed object caches and their hit/miss statistics
- **GraphicsPipelineTracker**: working pipeline state with transition shortcuts

Backend crates (Vulkan) supply the object creation closures and own the resulting
native handles.
*/

#[macro_use]
mod macros;

// Internal modules
mod error;
mod log;
mod format;
mod serial;
mod state;
mod descriptor;
mod transition;
mod config;
mod cache;
mod pipeline_tracker;

#[cfg(test)]
mod test_support;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::{SamplerFeatures, StateCacheConfig};

    // Pipeline state tracking
    pub use crate::pipeline_tracker::{GraphicsPipelineTracker, PipelineSource};

    // Logging sub-module (types only; cache_* macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger, StateCacheLog};
    }

    pub mod format {
        pub use crate::format::*;
    }

    pub mod serial {
        pub use crate::serial::*;
    }

    pub mod state {
        pub use crate::state::*;
    }

    pub mod descriptor {
        pub use crate::descriptor::*;
    }

    pub mod transition {
        pub use crate::transition::*;
    }

    pub mod cache {
        pub use crate::cache::*;
    }
}

// Re-export math library at crate root
pub use glam;
