//! WGSL validation and uniform reflection.
//!
//! Sources are parsed and validated with `naga` before any backend sees them,
//! so a bad shader fails the same way on every backend.

use crate::error::ResourceError;
use crate::gfx::{GpuShader, RenderDevice, ShaderDesc, ShaderStage, ShaderVariable};

/// Vertex stage of the built-in scene.
pub const SCENE_VS: &str = include_str!("shaders/scene_vs.wgsl");
/// Pixel stage of the built-in scene.
pub const SCENE_PS: &str = include_str!("shaders/scene_ps.wgsl");

/// A backend shader together with the uniforms its entry point reads.
#[derive(Debug, Clone)]
pub struct CompiledShader {
    pub shader: GpuShader,
    pub variables: Vec<ShaderVariable>,
}

fn naga_stage(stage: ShaderStage) -> naga::ShaderStage {
    match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Pixel => naga::ShaderStage::Fragment,
    }
}

/// Validates `desc` and lists the uniform buffers its entry point uses.
pub fn reflect(desc: &ShaderDesc<'_>) -> Result<Vec<ShaderVariable>, ResourceError> {
    let fail = |message: String| ResourceError::ShaderCompilation {
        name: desc.name.to_string(),
        message,
    };

    let module = naga::front::wgsl::parse_str(desc.source)
        .map_err(|e| fail(format!("WGSL parse error: {e}")))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    let info = validator
        .validate(&module)
        .map_err(|e| fail(format!("validation error: {e}")))?;

    let stage = naga_stage(desc.stage);
    let entry_index = module
        .entry_points
        .iter()
        .position(|ep| ep.name == desc.entry_point && ep.stage == stage)
        .ok_or_else(|| {
            fail(format!(
                "no {} entry point named `{}`",
                desc.stage, desc.entry_point
            ))
        })?;
    let usage = info.get_entry_point(entry_index);

    let mut variables = Vec::new();
    for (handle, var) in module.global_variables.iter() {
        if var.space != naga::AddressSpace::Uniform || usage[handle].is_empty() {
            continue;
        }
        let Some(binding) = &var.binding else {
            continue;
        };
        if binding.group != 0 {
            return Err(fail(format!(
                "uniform at group {} is not supported; use group 0",
                binding.group
            )));
        }
        let name = var
            .name
            .clone()
            .unwrap_or_else(|| format!("binding{}", binding.binding));
        variables.push(ShaderVariable {
            name,
            binding: binding.binding,
            stages: desc.stage.to_wgpu(),
        });
    }

    Ok(variables)
}

/// Validates `desc`, then creates it on `device`.
pub fn compile(
    device: &dyn RenderDevice,
    desc: &ShaderDesc<'_>,
) -> Result<CompiledShader, ResourceError> {
    let variables = reflect(desc)?;
    let shader = device.create_shader(desc)?;
    log::debug!(
        "compiled {} shader `{}` ({} uniform(s))",
        desc.stage,
        desc.name,
        variables.len()
    );
    Ok(CompiledShader { shader, variables })
}

/// Unions per-stage variable lists. The same binding slot must carry the same
/// name in every stage.
pub fn merge_variables(
    pipeline: &str,
    lists: &[&[ShaderVariable]],
) -> Result<Vec<ShaderVariable>, ResourceError> {
    let mut merged: Vec<ShaderVariable> = Vec::new();
    for var in lists.iter().flat_map(|l| l.iter()) {
        match merged.iter_mut().find(|m| m.binding == var.binding) {
            Some(existing) if existing.name == var.name => existing.stages |= var.stages,
            Some(existing) => {
                return Err(ResourceError::ShaderCompilation {
                    name: pipeline.to_string(),
                    message: format!(
                        "binding {} is `{}` in one stage and `{}` in another",
                        var.binding, existing.name, var.name
                    ),
                });
            }
            None => merged.push(var.clone()),
        }
    }
    merged.sort_by_key(|v| v.binding);
    Ok(merged)
}
