//! Working pipeline state of one command stream
//!
//! The tracker owns the descriptor that state changes are applied to and the transition
//! bits those changes accumulated since the last bound pipeline. Resolving the pipeline
//! first probes the bound pipeline's transitions and only falls back to the full cache
//! lookup when no recorded transition matches.

use std::sync::Arc;

use crate::cache::{GraphicsPipelineCache, PipelineCacheId, PipelineHandle};
use crate::cache_trace;
use crate::config::StateCacheConfig;
use crate::descriptor::GraphicsPipelineDesc;
use crate::error::Result;
use crate::serial::Serial;
use crate::transition::GraphicsPipelineTransitionBits;

const SOURCE: &str = "galaxy3d::GraphicsPipelineTracker";

/// How `resolve_pipeline` found the pipeline it returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineSource {
    /// No state changed since the last resolve
    Unchanged,
    /// A recorded transition of the bound pipeline matched
    Transition,
    /// Full cache lookup hit
    CacheHit,
    /// Cache miss, the pipeline was created
    Created,
}

/// Pipeline the tracker resolved last, and the cache that owns it
struct BoundPipeline {
    cache_id: PipelineCacheId,
    handle: PipelineHandle,
    desc: Arc<GraphicsPipelineDesc>,
}

pub struct GraphicsPipelineTracker {
    desc: GraphicsPipelineDesc,
    dirty_bits: GraphicsPipelineTransitionBits,
    current: Option<BoundPipeline>,
    enable_transitions: bool,
}

impl GraphicsPipelineTracker {
    /// Tracker starting from the default pipeline state
    pub fn new(config: &StateCacheConfig) -> Self {
        let mut desc = GraphicsPipelineDesc::new();
        desc.init_defaults();
        Self::with_desc(desc, config.enable_pipeline_transitions)
    }

    pub fn with_desc(desc: GraphicsPipelineDesc, enable_transitions: bool) -> Self {
        Self {
            desc,
            dirty_bits: GraphicsPipelineTransitionBits::empty(),
            current: None,
            enable_transitions,
        }
    }

    pub fn desc(&self) -> &GraphicsPipelineDesc {
        &self.desc
    }

    pub fn dirty_bits(&self) -> GraphicsPipelineTransitionBits {
        self.dirty_bits
    }

    pub fn current_pipeline(&self) -> Option<PipelineHandle> {
        self.current.as_ref().map(|bound| bound.handle)
    }

    /// Stored cache key of the bound pipeline
    pub fn current_desc(&self) -> Option<&Arc<GraphicsPipelineDesc>> {
        self.current.as_ref().map(|bound| &bound.desc)
    }

    /// Apply a state change through the descriptor's `update_*` mutators
    ///
    /// ```ignore
    /// tracker.update(|desc, bits| desc.update_line_width(bits, 2.0));
    /// ```
    pub fn update<F>(&mut self, mutate: F)
    where
        F: FnOnce(&mut GraphicsPipelineDesc, &mut GraphicsPipelineTransitionBits),
    {
        mutate(&mut self.desc, &mut self.dirty_bits);
    }

    /// Forget the bound pipeline
    pub fn invalidate(&mut self) {
        self.current = None;
        self.dirty_bits.reset();
    }

    /// Pipeline matching the working descriptor
    ///
    /// Records a transition from the previously bound pipeline whenever a full lookup was
    /// needed, and stamps the resolved pipeline with `queue_serial`. A bound pipeline that
    /// `cache` does not hold (another cache, or one destroyed since) is dropped and the
    /// working descriptor goes through the full lookup.
    pub fn resolve_pipeline<P, F>(
        &mut self,
        cache: &mut GraphicsPipelineCache<P>,
        queue_serial: Serial,
        create: F,
    ) -> Result<(PipelineHandle, PipelineSource)>
    where
        F: FnOnce(&GraphicsPipelineDesc) -> Result<P>,
    {
        let cache_id = cache.id();
        if let Some(bound) = &self.current {
            if !cache.contains(bound.cache_id, bound.handle) {
                cache_trace!(SOURCE, "Bound pipeline is not in this cache, doing a full lookup");
                self.current = None;
            }
        }
        let previous = self.current.as_ref().map(|bound| bound.handle);

        let (handle, source) = match previous {
            Some(handle) if self.dirty_bits.is_empty() => (handle, PipelineSource::Unchanged),
            Some(source_handle) => {
                let transition = if self.enable_transitions {
                    cache.find_transition(source_handle, self.dirty_bits, &self.desc)
                } else {
                    None
                };

                match transition {
                    Some((key, target)) => {
                        cache_trace!(SOURCE, "Transition hit ({} dirty words)", self.dirty_bits.count());
                        self.current = Some(BoundPipeline { cache_id, handle: target, desc: key });
                        (target, PipelineSource::Transition)
                    }
                    None => {
                        let (key, target, source) = self.lookup(cache, create)?;
                        if self.enable_transitions {
                            cache.add_transition(source_handle, self.dirty_bits, Arc::clone(&key), target)?;
                        }
                        self.current = Some(BoundPipeline { cache_id, handle: target, desc: key });
                        (target, source)
                    }
                }
            }
            None => {
                let (key, target, source) = self.lookup(cache, create)?;
                self.current = Some(BoundPipeline { cache_id, handle: target, desc: key });
                (target, source)
            }
        };

        if let Some(helper) = cache.helper_mut(handle) {
            helper.update_serial(queue_serial);
        }
        self.dirty_bits.reset();
        Ok((handle, source))
    }

    fn lookup<P, F>(
        &self,
        cache: &mut GraphicsPipelineCache<P>,
        create: F,
    ) -> Result<(Arc<GraphicsPipelineDesc>, PipelineHandle, PipelineSource)>
    where
        F: FnOnce(&GraphicsPipelineDesc) -> Result<P>,
    {
        let mut created = false;
        let (key, handle) = cache.get_pipeline(&self.desc, |desc| {
            created = true;
            create(desc)
        })?;
        let source = if created { PipelineSource::Created } else { PipelineSource::CacheHit };
        Ok((key, handle, source))
    }
}

#[cfg(test)]
#[path = "pipeline_tracker_tests.rs"]
mod tests;
