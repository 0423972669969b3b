use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::gfx::{BufferAccess, DrawAttribs};

/// One command as seen by the capture backend, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureCommand {
    SetRenderTargets {
        color_size: (u32, u32),
        depth: bool,
    },
    ClearRenderTarget {
        rgba: [f32; 4],
    },
    ClearDepthStencil {
        depth: f32,
    },
    SetPipeline {
        name: String,
    },
    SetVertexBuffer {
        slot: u32,
        buffer: u32,
    },
    SetIndexBuffer {
        buffer: u32,
        format: wgpu::IndexFormat,
    },
    Map {
        buffer: u32,
    },
    Unmap {
        buffer: u32,
        bytes: Vec<u8>,
    },
    CommitBindings {
        slots: Vec<(u32, u32)>,
    },
    /// `bindings` snapshots the committed uniform buffers as the draw saw them.
    Draw {
        attribs: DrawAttribs,
        bindings: Vec<(u32, Vec<u8>)>,
    },
    Flush,
    Resize {
        width: u32,
        height: u32,
    },
    Present {
        sync_interval: u32,
        size: (u32, u32),
    },
}

#[derive(Debug, Clone)]
pub(crate) struct BufferRecord {
    pub access: BufferAccess,
    pub contents: Vec<u8>,
    pub mapped: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct PipelineRecord {
    pub bindings: Vec<u32>,
}

#[derive(Debug, Default)]
pub(crate) struct CaptureState {
    next_id: u32,
    pub buffers: HashMap<u32, BufferRecord>,
    pub pipelines: HashMap<u32, PipelineRecord>,
    pub commands: Vec<CaptureCommand>,
    pub swapchain_size: Option<(u32, u32)>,
}

impl CaptureState {
    pub fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared read access to everything a capture backend recorded.
///
/// Clones observe the same state; the backend objects hold the other handles.
#[derive(Debug, Clone, Default)]
pub struct CaptureRecorder {
    state: Rc<RefCell<CaptureState>>,
}

impl CaptureRecorder {
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut CaptureState) -> R) -> R {
        f(&mut self.state.borrow_mut())
    }

    pub(crate) fn record(&self, command: CaptureCommand) {
        log::trace!("capture: {command:?}");
        self.state.borrow_mut().commands.push(command);
    }

    /// All commands recorded so far.
    pub fn commands(&self) -> Vec<CaptureCommand> {
        self.state.borrow().commands.clone()
    }

    /// Commands grouped per presented frame. Commands after the last present
    /// are not included.
    pub fn frames(&self) -> Vec<Vec<CaptureCommand>> {
        let state = self.state.borrow();
        let mut frames = Vec::new();
        let mut current = Vec::new();
        for command in &state.commands {
            let is_present = matches!(command, CaptureCommand::Present { .. });
            current.push(command.clone());
            if is_present {
                frames.push(std::mem::take(&mut current));
            }
        }
        frames
    }

    pub fn present_count(&self) -> usize {
        self.state
            .borrow()
            .commands
            .iter()
            .filter(|c| matches!(c, CaptureCommand::Present { .. }))
            .count()
    }

    pub fn draws(&self) -> Vec<DrawAttribs> {
        self.state
            .borrow()
            .commands
            .iter()
            .filter_map(|c| match c {
                CaptureCommand::Draw { attribs, .. } => Some(*attribs),
                _ => None,
            })
            .collect()
    }

    /// Current contents of a buffer created by the capture device.
    pub fn buffer_contents(&self, id: u32) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&id).map(|b| b.contents.clone())
    }

    /// Size of the swapchain, once one exists.
    pub fn swapchain_size(&self) -> Option<(u32, u32)> {
        self.state.borrow().swapchain_size
    }
}
