use anyhow::Result;
use pluscraft_engine::backend::DeviceKind;
use pluscraft_engine::logging::{LoggingConfig, init_logging};
use pluscraft_engine::{EngineConfig, EngineError, SceneVariant};

const BACKEND_VAR: &str = "PLUSCRAFT_BACKEND";
const VARIANT_VAR: &str = "PLUSCRAFT_VARIANT";

fn main() {
    init_logging(LoggingConfig::default());

    if let Err(err) = try_main() {
        log::error!("{err:#}");
        let code = err
            .downcast_ref::<EngineError>()
            .map_or(1, EngineError::exit_code);
        std::process::exit(code);
    }
}

fn try_main() -> Result<()> {
    let config = apply_overrides(
        EngineConfig::default(),
        std::env::var(VARIANT_VAR).ok(),
        std::env::var(BACKEND_VAR).ok(),
    );

    let summary = pluscraft_engine::run(&config)?;
    log::info!(
        "exiting after {} frames ({} skipped)",
        summary.frames_presented,
        summary.frames_skipped
    );
    Ok(())
}

/// Applies the variant override first so an explicit backend still wins over
/// the variant's default device kind. Unparsable values are ignored.
fn apply_overrides(
    mut config: EngineConfig,
    variant: Option<String>,
    backend: Option<String>,
) -> EngineConfig {
    if let Some(value) = variant {
        match value.parse::<SceneVariant>() {
            Ok(variant) => {
                config = config.with_variant(variant);
                config.device_kind = variant.default_device_kind();
            }
            Err(e) => log::warn!("{VARIANT_VAR}: {e}, keeping {}", config.scene.variant),
        }
    }

    if let Some(value) = backend {
        match value.parse::<DeviceKind>() {
            Ok(kind) => config.device_kind = kind,
            Err(e) => log::warn!("{BACKEND_VAR}: {e}, keeping {}", config.device_kind),
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_overrides_keep_defaults() {
        assert_eq!(apply_overrides(EngineConfig::default(), None, None), EngineConfig::default());
    }

    #[test]
    fn variant_brings_its_device_kind() {
        let config = apply_overrides(EngineConfig::default(), Some("triangle".into()), None);
        assert_eq!(config.scene.variant, SceneVariant::Triangle);
        assert_eq!(config.device_kind, DeviceKind::OpenGl);
    }

    #[test]
    fn explicit_backend_wins_over_variant_default() {
        let config = apply_overrides(
            EngineConfig::default(),
            Some("triangle".into()),
            Some("vulkan".into()),
        );
        assert_eq!(config.device_kind, DeviceKind::Vulkan);
        assert_eq!(config.scene.variant, SceneVariant::Triangle);
    }

    #[test]
    fn garbage_is_ignored() {
        let config = apply_overrides(
            EngineConfig::default(),
            Some("sphere".into()),
            Some("metal".into()),
        );
        assert_eq!(config, EngineConfig::default());
    }
}
