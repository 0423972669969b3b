use crate::gfx::GfxError;

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    requested: wgpu::TextureFormat,
) -> Option<wgpu::TextureFormat> {
    if caps.formats.is_empty() {
        return None;
    }

    let preferred = [
        requested,
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ];
    for f in preferred {
        if caps.formats.contains(&f) {
            return Some(f);
        }
    }

    Some(caps.formats[0])
}

pub(crate) fn choose_alpha_mode(caps: &wgpu::SurfaceCapabilities) -> wgpu::CompositeAlphaMode {
    [wgpu::CompositeAlphaMode::Opaque]
        .into_iter()
        .find(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Present mode for a sync interval: `0` takes the first non-blocking mode the
/// surface offers, anything else waits for vertical sync.
pub(crate) fn choose_present_mode(
    available: &[wgpu::PresentMode],
    sync_interval: u32,
) -> wgpu::PresentMode {
    if sync_interval > 0 {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
        .into_iter()
        .find(|m| available.contains(m))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

/// Translates an acquire failure. Lost and outdated surfaces are reconfigured
/// in place when they have a drawable size.
pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    err: wgpu::SurfaceError,
) -> GfxError {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if config.width > 0 && config.height > 0 {
                surface.configure(device, config);
            }
            GfxError::FrameSkipped(format!("surface reconfigured: {err}"))
        }
        wgpu::SurfaceError::OutOfMemory => GfxError::OutOfMemory,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => {
            GfxError::FrameSkipped(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_zero_prefers_immediate() {
        let modes = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox, wgpu::PresentMode::Immediate];
        assert_eq!(choose_present_mode(&modes, 0), wgpu::PresentMode::Immediate);
        assert_eq!(
            choose_present_mode(&[wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox], 0),
            wgpu::PresentMode::Mailbox
        );
        assert_eq!(choose_present_mode(&[wgpu::PresentMode::Fifo], 0), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn requested_format_wins_when_supported() {
        let caps = wgpu::SurfaceCapabilities {
            formats: vec![
                wgpu::TextureFormat::Rgba8Unorm,
                wgpu::TextureFormat::Bgra8UnormSrgb,
                wgpu::TextureFormat::Rgba8UnormSrgb,
            ],
            ..Default::default()
        };
        assert_eq!(
            choose_surface_format(&caps, wgpu::TextureFormat::Rgba8UnormSrgb),
            Some(wgpu::TextureFormat::Rgba8UnormSrgb)
        );
        assert_eq!(
            choose_surface_format(&caps, wgpu::TextureFormat::Rgba16Float),
            Some(wgpu::TextureFormat::Bgra8UnormSrgb)
        );
        assert_eq!(
            choose_surface_format(&wgpu::SurfaceCapabilities::default(), wgpu::TextureFormat::Rgba8Unorm),
            None
        );
    }

    #[test]
    fn any_positive_sync_is_fifo() {
        let modes = [wgpu::PresentMode::Immediate];
        assert_eq!(choose_present_mode(&modes, 1), wgpu::PresentMode::Fifo);
        assert_eq!(choose_present_mode(&modes, 4), wgpu::PresentMode::Fifo);
    }
}
