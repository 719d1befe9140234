// src/config/validate.rs

use std::time::Duration;

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{AutoreloadError, Result};

/// Upper bound for `[watch].poll_interval`.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = AutoreloadError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let poll_interval = validate_poll_interval(&raw)?;
        ensure_has_images(&raw)?;
        validate_patterns(&raw)?;
        validate_image_entries(&raw)?;
        Ok(ConfigFile::new_unchecked(
            poll_interval,
            raw.watch.first_scan,
            raw.images,
            raw.image,
        ))
    }
}

fn validate_poll_interval(cfg: &RawConfigFile) -> Result<Duration> {
    let interval = parse_duration(&cfg.watch.poll_interval).map_err(|e| {
        AutoreloadError::ConfigError(format!("[watch].poll_interval: {e}"))
    })?;

    if interval.is_zero() {
        return Err(AutoreloadError::ConfigError(
            "[watch].poll_interval must be greater than zero".to_string(),
        ));
    }

    if interval > MAX_POLL_INTERVAL {
        return Err(AutoreloadError::ConfigError(format!(
            "[watch].poll_interval must be at most {}h",
            MAX_POLL_INTERVAL.as_secs() / 3600
        )));
    }

    Ok(interval)
}

fn ensure_has_images(cfg: &RawConfigFile) -> Result<()> {
    if cfg.image.is_empty() && cfg.images.include.is_empty() {
        return Err(AutoreloadError::ConfigError(
            "config must track at least one image ([image.<id>] or [images].include)"
                .to_string(),
        ));
    }
    Ok(())
}

fn validate_patterns(cfg: &RawConfigFile) -> Result<()> {
    let all = cfg
        .images
        .include
        .iter()
        .map(|p| ("include", p))
        .chain(cfg.images.exclude.iter().map(|p| ("exclude", p)));

    for (field, pattern) in all {
        Glob::new(pattern).map_err(|e| {
            AutoreloadError::ConfigError(format!(
                "[images].{field} has invalid glob '{pattern}': {e}"
            ))
        })?;
    }
    Ok(())
}

fn validate_image_entries(cfg: &RawConfigFile) -> Result<()> {
    for (id, entry) in cfg.image.iter() {
        if id.trim().is_empty() {
            return Err(AutoreloadError::ConfigError(
                "image ids must not be empty".to_string(),
            ));
        }
        if entry.path.trim().is_empty() {
            return Err(AutoreloadError::ConfigError(format!(
                "image '{}' has an empty `path`",
                id
            )));
        }
    }
    Ok(())
}

/// Parse a duration string like `"500ms"`, `"1s"`, `"2m"` or `"1h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => scaled_secs(value, 60),
        "h" => scaled_secs(value, 60 * 60),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

fn scaled_secs(value: u64, factor: u64) -> std::result::Result<Duration, String> {
    value
        .checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: {value} x {factor}s"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_from_str;
    use crate::types::{FirstScanPolicy, ResourceKind};

    #[test]
    fn defaults_apply_when_watch_section_is_missing() {
        let cfg = load_from_str("[image.logo]\npath = \"logo.png\"\n").unwrap();

        assert_eq!(cfg.poll_interval(), Duration::from_secs(1));
        assert_eq!(cfg.first_scan(), FirstScanPolicy::ReloadAll);
        assert_eq!(cfg.images()["logo"].kind, ResourceKind::Image);
    }

    #[test]
    fn first_scan_and_kind_are_parsed() {
        let cfg = load_from_str(
            r#"
            [watch]
            first_scan = "seed"

            [image.result]
            path = "render.png"
            kind = "render_result"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.first_scan(), FirstScanPolicy::Seed);
        assert_eq!(cfg.images()["result"].kind, ResourceKind::RenderResult);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = load_from_str("[watch]\npoll_interval = \"0s\"\n[images]\ninclude = [\"*\"]\n")
            .unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn interval_without_unit_is_rejected() {
        let err = load_from_str("[watch]\npoll_interval = \"10\"\n[images]\ninclude = [\"*\"]\n")
            .unwrap_err();
        assert!(err.to_string().contains("poll_interval"));
    }

    #[test]
    fn empty_config_is_rejected() {
        let err = load_from_str("").unwrap_err();
        assert!(matches!(err, AutoreloadError::ConfigError(_)));
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let err = load_from_str("[images]\ninclude = [\"**/*.{png\"]\n").unwrap_err();
        assert!(err.to_string().contains("invalid glob"));
    }

    #[test]
    fn unknown_kind_fails_deserialization() {
        let err = load_from_str("[image.a]\npath = \"a.mov\"\nkind = \"movie\"\n").unwrap_err();
        assert!(matches!(err, AutoreloadError::TomlError(_)));
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration(" 1h "), Ok(Duration::from_secs(3600)));
        assert!(parse_duration("3d").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn parse_duration_reports_overflow() {
        let err = parse_duration("307445734561825861m").unwrap_err();
        assert!(err.contains("too large"));
        assert!(parse_duration("18446744073709551615h").is_err());
    }

    fn with_interval(interval: &str) -> Result<ConfigFile> {
        load_from_str(&format!(
            "[watch]\npoll_interval = \"{interval}\"\n[image.a]\npath = \"a.png\"\n"
        ))
    }

    #[test]
    fn oversized_interval_is_rejected() {
        let err = with_interval("18446744073709551615s").unwrap_err();
        assert!(matches!(err, AutoreloadError::ConfigError(ref m) if m.contains("at most 24h")));

        let cfg = with_interval("24h").unwrap();
        assert_eq!(cfg.poll_interval(), MAX_POLL_INTERVAL);
    }

    #[test]
    fn overflowing_interval_is_a_config_error() {
        let err = with_interval("307445734561825861m").unwrap_err();
        assert!(matches!(err, AutoreloadError::ConfigError(_)));
    }
}
