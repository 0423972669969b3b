//! Render-pass bookkeeping for the immediate context.
//!
//! wgpu fixes load ops when a pass begins, while the immediate interface
//! issues clears and constant writes between draws. Calls are buffered into
//! [`PassRecord`]s and handed out in batches for encoding.

/// A recorded pass command; draws are the only ones that consume state.
pub(crate) trait PassStep: Clone {
    fn is_draw(&self) -> bool;
}

/// Render pass being assembled over views of type `V`.
#[derive(Debug)]
pub(crate) struct PassRecord<V, C> {
    pub color: V,
    pub depth: Option<V>,
    pub color_load: wgpu::LoadOp<wgpu::Color>,
    pub depth_load: wgpu::LoadOp<f32>,
    pub commands: Vec<C>,
}

impl<V: Clone, C: PassStep> PassRecord<V, C> {
    fn new(color: V, depth: Option<V>) -> Self {
        Self {
            color,
            depth,
            color_load: wgpu::LoadOp::Load,
            depth_load: wgpu::LoadOp::Load,
            commands: Vec::new(),
        }
    }

    fn has_draws(&self) -> bool {
        self.commands.iter().any(PassStep::is_draw)
    }

    /// Same targets, loaded rather than cleared, with bound state replayed.
    fn continuation(&self) -> Self {
        let mut next = Self::new(self.color.clone(), self.depth.clone());
        next.commands = self
            .commands
            .iter()
            .filter(|c| !c.is_draw())
            .cloned()
            .collect();
        next
    }
}

#[derive(Debug)]
pub(crate) struct PassQueue<V, C> {
    passes: Vec<PassRecord<V, C>>,
    pending_draws: bool,
}

impl<V, C> Default for PassQueue<V, C> {
    fn default() -> Self {
        Self {
            passes: Vec::new(),
            pending_draws: false,
        }
    }
}

impl<V: Clone, C: PassStep> PassQueue<V, C> {
    /// Starts a pass on new targets.
    pub fn begin(&mut self, color: V, depth: Option<V>) {
        self.passes.push(PassRecord::new(color, depth));
    }

    /// Appends to the current pass. Returns `false` when no targets are set.
    pub fn push(&mut self, command: C) -> bool {
        let Some(pass) = self.passes.last_mut() else {
            return false;
        };
        self.pending_draws |= command.is_draw();
        pass.commands.push(command);
        true
    }

    /// Pass whose load ops may still change, split off if the current one
    /// already drew.
    pub fn clearable(&mut self) -> Option<&mut PassRecord<V, C>> {
        let last = self.passes.last()?;
        if last.has_draws() {
            let next = last.continuation();
            self.passes.push(next);
        }
        self.passes.last_mut()
    }

    /// Passes that must be submitted before a host write to a buffer the
    /// recorded draws read. Empty when nothing has drawn since the last
    /// batch. Recording continues on the same targets.
    pub fn take_before_write(&mut self) -> Vec<PassRecord<V, C>> {
        if !self.pending_draws {
            return Vec::new();
        }
        let batch = std::mem::take(&mut self.passes);
        if let Some(last) = batch.last() {
            self.passes.push(last.continuation());
        }
        self.pending_draws = false;
        batch
    }

    /// Every recorded pass; the queue is empty afterwards.
    pub fn take_all(&mut self) -> Vec<PassRecord<V, C>> {
        self.pending_draws = false;
        std::mem::take(&mut self.passes)
    }

    #[cfg(test)]
    fn passes(&self) -> &[PassRecord<V, C>] {
        &self.passes
    }

    #[cfg(test)]
    fn has_pending_draws(&self) -> bool {
        self.pending_draws
    }
}
