//! Two-level render pass cache
//!
//! The outer key is the compatible description (formats, samples, resolve layout); the
//! inner key is the load/store ops. Pipelines only need a compatible render pass, so the
//! compatible lookup accepts any inner entry.

use rustc_hash::FxHashMap;

use crate::cache::stats::{CacheStats, CacheStatsAccumulator, CacheType};
use crate::descriptor::{AttachmentOpsArray, PackedAttachmentIndex, RenderPassDesc};
use crate::error::{Error, Result};
use crate::state::ImageLayout;

pub struct RenderPassCache<R> {
    payload: FxHashMap<RenderPassDesc, FxHashMap<AttachmentOpsArray, R>>,
    compatible_stats: CacheStats,
    with_ops_stats: CacheStats,
}

impl<R> RenderPassCache<R> {
    pub fn new() -> Self {
        Self {
            payload: FxHashMap::default(),
            compatible_stats: CacheStats::new(),
            with_ops_stats: CacheStats::new(),
        }
    }

    /// Any render pass compatible with `desc`
    ///
    /// On a miss the render pass is created with load/store ops and attachment-optimal
    /// layouts through the with-ops path.
    pub fn get_compatible_render_pass<F>(&mut self, desc: &RenderPassDesc, create: F) -> Result<&R>
    where
        F: FnOnce(&RenderPassDesc, &AttachmentOpsArray) -> Result<R>,
    {
        let has_compatible = self.payload.get(desc).is_some_and(|inner| !inner.is_empty());
        if !has_compatible {
            self.compatible_stats.miss();
            let ops = default_attachment_ops(desc);
            return self.get_render_pass_with_ops(desc, &ops, create);
        }

        self.compatible_stats.hit();
        self.payload
            .get(desc)
            .and_then(|inner| inner.values().next())
            .ok_or_else(|| Error::InvalidResource("compatible render pass bucket is empty".to_string()))
    }

    /// The render pass matching both `desc` and `ops` exactly
    pub fn get_render_pass_with_ops<F>(&mut self, desc: &RenderPassDesc, ops: &AttachmentOpsArray, create: F) -> Result<&R>
    where
        F: FnOnce(&RenderPassDesc, &AttachmentOpsArray) -> Result<R>,
    {
        let exists = self.payload.get(desc).is_some_and(|inner| inner.contains_key(ops));
        if exists {
            self.with_ops_stats.hit();
        } else {
            self.with_ops_stats.miss();
            let render_pass = create(desc, ops)?;
            self.payload.entry(*desc).or_default().insert(*ops, render_pass);
        }

        self.payload
            .get(desc)
            .and_then(|inner| inner.get(ops))
            .ok_or_else(|| Error::InvalidResource("render pass entry missing after insert".to_string()))
    }

    /// Number of compatible descriptions
    pub fn compatible_len(&self) -> usize {
        self.payload.len()
    }

    /// Number of render passes across all compatible descriptions
    pub fn len(&self) -> usize {
        self.payload.values().map(FxHashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn compatible_stats(&self) -> &CacheStats {
        &self.compatible_stats
    }

    pub fn with_ops_stats(&self) -> &CacheStats {
        &self.with_ops_stats
    }

    /// Drop every render pass
    pub fn destroy(&mut self) {
        self.payload.clear();
    }

    pub fn accumulate_cache_stats(&mut self, accumulator: &mut dyn CacheStatsAccumulator) {
        self.compatible_stats.drain_into(CacheType::CompatibleRenderPass, accumulator);
        self.with_ops_stats.drain_into(CacheType::RenderPassWithOps, accumulator);
    }
}

impl<R> Default for RenderPassCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Load/store ops used when only compatibility matters
pub fn default_attachment_ops(desc: &RenderPassDesc) -> AttachmentOpsArray {
    let mut ops = AttachmentOpsArray::new();
    let mut color_count = 0;
    for (_, packed) in desc.packed_color_indices() {
        ops.init_with_load_store(
            PackedAttachmentIndex::new(packed as u32),
            ImageLayout::ColorAttachment,
            ImageLayout::ColorAttachment,
        );
        color_count += 1;
    }

    if desc.has_depth_stencil_attachment() {
        ops.init_with_load_store(
            PackedAttachmentIndex::new(color_count),
            ImageLayout::DepthStencilAttachment,
            ImageLayout::DepthStencilAttachment,
        );
    }
    ops
}

#[cfg(test)]
#[path = "render_pass_cache_tests.rs"]
mod tests;
