//! Graphics pipeline cache and per-pipeline transition lists
//!
//! Keys are stored behind `Arc` so a caller can keep the stored descriptor of the bound
//! pipeline across later insertions. Pipelines live in a `SlotMap`, which gives each one a
//! stable handle for transitions to point at.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::cache::stats::{CacheStats, CacheStatsAccumulator, CacheType};
use crate::cache_debug;
use crate::descriptor::GraphicsPipelineDesc;
use crate::error::{Error, Result};
use crate::serial::Serial;
use crate::transition::{transition_match, GraphicsPipelineTransitionBits};

const SOURCE: &str = "galaxy3d::cache::GraphicsPipelineCache";

new_key_type! {
    /// Stable handle of a cached graphics pipeline
    pub struct PipelineHandle;
}

/// Identity of one `GraphicsPipelineCache`, unique for the process lifetime
///
/// Handles of different caches can compare equal, so holders of a handle keep the id of
/// the cache that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineCacheId(u64);

impl PipelineCacheId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Recorded shortcut from one pipeline to another
#[derive(Debug, Clone)]
pub struct GraphicsPipelineTransition {
    pub bits: GraphicsPipelineTransitionBits,
    /// Stored key of the target pipeline
    pub desc: Arc<GraphicsPipelineDesc>,
    pub target: PipelineHandle,
}

/// A cached pipeline plus its outgoing transitions
pub struct PipelineHelper<P> {
    pipeline: P,
    serial: Serial,
    transitions: Vec<GraphicsPipelineTransition>,
}

impl<P> PipelineHelper<P> {
    fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            serial: Serial::INVALID,
            transitions: Vec::new(),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Queue serial of the last submission using this pipeline
    pub fn serial(&self) -> Serial {
        self.serial
    }

    pub fn update_serial(&mut self, serial: Serial) {
        self.serial = serial;
    }

    pub fn transitions(&self) -> &[GraphicsPipelineTransition] {
        &self.transitions
    }

    /// First recorded transition with the same bits whose descriptor agrees with `desc` on
    /// every flagged word
    pub fn find_transition(
        &self,
        bits: GraphicsPipelineTransitionBits,
        desc: &GraphicsPipelineDesc,
    ) -> Option<&GraphicsPipelineTransition> {
        self.transitions
            .iter()
            .find(|transition| transition_match(transition.bits, bits, &transition.desc, desc))
    }

    pub fn add_transition(
        &mut self,
        bits: GraphicsPipelineTransitionBits,
        desc: Arc<GraphicsPipelineDesc>,
        target: PipelineHandle,
    ) {
        self.transitions.push(GraphicsPipelineTransition { bits, desc, target });
    }
}

/// `GraphicsPipelineDesc` -> pipeline cache
pub struct GraphicsPipelineCache<P> {
    id: PipelineCacheId,
    keys: FxHashMap<Arc<GraphicsPipelineDesc>, PipelineHandle>,
    pipelines: SlotMap<PipelineHandle, PipelineHelper<P>>,
    stats: CacheStats,
}

impl<P> GraphicsPipelineCache<P> {
    pub fn new() -> Self {
        Self {
            id: PipelineCacheId::next(),
            keys: FxHashMap::default(),
            pipelines: SlotMap::with_key(),
            stats: CacheStats::new(),
        }
    }

    pub fn id(&self) -> PipelineCacheId {
        self.id
    }

    /// Whether `handle` names a pipeline of this cache
    pub fn contains(&self, id: PipelineCacheId, handle: PipelineHandle) -> bool {
        id == self.id && self.pipelines.contains_key(handle)
    }

    /// Stored key and handle of the pipeline for `desc`, creating it on a miss
    pub fn get_pipeline<F>(&mut self, desc: &GraphicsPipelineDesc, create: F) -> Result<(Arc<GraphicsPipelineDesc>, PipelineHandle)>
    where
        F: FnOnce(&GraphicsPipelineDesc) -> Result<P>,
    {
        if let Some((key, handle)) = self.keys.get_key_value(desc) {
            self.stats.hit();
            return Ok((Arc::clone(key), *handle));
        }

        self.stats.miss();
        let pipeline = create(desc)?;
        let entry = self.insert(desc, pipeline);
        cache_debug!(SOURCE, "Created graphics pipeline #{}", self.pipelines.len());
        Ok(entry)
    }

    /// Insert a pipeline created elsewhere, without counting a lookup
    ///
    /// Returns the existing entry if `desc` is already cached; `pipeline` is dropped then.
    pub fn populate(&mut self, desc: &GraphicsPipelineDesc, pipeline: P) -> (Arc<GraphicsPipelineDesc>, PipelineHandle) {
        if let Some((key, handle)) = self.keys.get_key_value(desc) {
            return (Arc::clone(key), *handle);
        }
        self.insert(desc, pipeline)
    }

    fn insert(&mut self, desc: &GraphicsPipelineDesc, pipeline: P) -> (Arc<GraphicsPipelineDesc>, PipelineHandle) {
        let key = Arc::new(*desc);
        let handle = self.pipelines.insert(PipelineHelper::new(pipeline));
        self.keys.insert(Arc::clone(&key), handle);
        (key, handle)
    }

    pub fn helper(&self, handle: PipelineHandle) -> Option<&PipelineHelper<P>> {
        self.pipelines.get(handle)
    }

    pub fn helper_mut(&mut self, handle: PipelineHandle) -> Option<&mut PipelineHelper<P>> {
        self.pipelines.get_mut(handle)
    }

    pub fn pipeline(&self, handle: PipelineHandle) -> Option<&P> {
        self.pipelines.get(handle).map(PipelineHelper::pipeline)
    }

    /// Probe the transitions of `source` for `(bits, desc)`
    pub fn find_transition(
        &self,
        source: PipelineHandle,
        bits: GraphicsPipelineTransitionBits,
        desc: &GraphicsPipelineDesc,
    ) -> Option<(Arc<GraphicsPipelineDesc>, PipelineHandle)> {
        self.pipelines
            .get(source)?
            .find_transition(bits, desc)
            .map(|transition| (Arc::clone(&transition.desc), transition.target))
    }

    /// Record that applying `bits` to `source` leads to `target`
    pub fn add_transition(
        &mut self,
        source: PipelineHandle,
        bits: GraphicsPipelineTransitionBits,
        target_desc: Arc<GraphicsPipelineDesc>,
        target: PipelineHandle,
    ) -> Result<()> {
        let helper = self
            .pipelines
            .get_mut(source)
            .ok_or_else(|| Error::InvalidResource("unknown source pipeline handle".to_string()))?;
        helper.add_transition(bits, target_desc, target);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Drop every pipeline and transition
    pub fn destroy(&mut self) {
        self.keys.clear();
        self.pipelines.clear();
    }

    pub fn accumulate_cache_stats(&mut self, accumulator: &mut dyn CacheStatsAccumulator) {
        self.stats.drain_into(CacheType::GraphicsPipeline, accumulator);
    }
}

impl<P> Default for GraphicsPipelineCache<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "pipeline_cache_tests.rs"]
mod tests;
