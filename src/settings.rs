//! Runtime settings and their persisted form.
//!
//! [`RuntimeSettings`] is the fully resolved configuration the effects run
//! with. [`SettingsPatch`] is what a settings UI submits and what gets
//! persisted: every field is optional, absence means "use the default" and an
//! explicit zero is a real value.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "_disabled": false,
//!   "colorMode": "rainbow",
//!   "trailMaxCount": 40,
//!   "trailStyle": "random",
//!   "cursor": "cyan.ani"
//! }
//! ```
//!
//! # Example
//!
//! ```
//! use star_effects::{RuntimeSettings, SettingsPatch};
//!
//! let patch = SettingsPatch::from_json(r#"{ "trailMaxCount": 0 }"#).unwrap();
//! let settings = RuntimeSettings::from_patch(&patch);
//! assert_eq!(settings.trail_max_count, 0);
//! assert_eq!(settings.cursor_star_count, 3);
//! ```

use log::warn;
use serde::{Deserialize, Serialize};

use crate::effects::color::{self, ColorScheme};
use crate::effects::{ColorMode, HaloConfig, ShapeStyle, TrailConfig};

/// Key the applied patch is persisted under.
pub const STORAGE_KEY: &str = "starEffectsSettings";

/// Cursor files shipped with the effects, selectable by name.
pub const CURSOR_ASSETS: [&str; 12] = [
    "apple.ani",
    "blue.ani",
    "cyan.ani",
    "green.ani",
    "pink.ani",
    "viole.ani",
    "yellow.ani",
    "cyan.cur",
    "green.cur",
    "red.cur",
    "white.cur",
    "yellow.cur",
];

const DEFAULT_COLOR: &str = "#c8b869";
const DEFAULT_GLOW_COLOR: &str = "#e8c01e";

// ============================================================================
// RuntimeSettings
// ============================================================================

/// Fully resolved effect settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "tsify", derive(tsify_next::Tsify))]
#[cfg_attr(feature = "tsify", tsify(into_wasm_abi, from_wasm_abi))]
pub struct RuntimeSettings {
    /// Turns every effect off.
    #[serde(rename = "_disabled")]
    pub disabled: bool,

    pub color_mode: ColorMode,

    /// Particle color in fixed mode (`#rrggbb`).
    pub color: String,

    /// Halo glow color in fixed mode (`#rrggbb`).
    pub glow_color: String,

    /// Hue step per trail point, and halo hue drift rate (0-360).
    pub rainbow_speed: f32,

    /// Rainbow saturation in percent.
    pub rainbow_saturation: f32,

    /// Rainbow lightness in percent.
    pub rainbow_lightness: f32,

    /// Trail capacity before culling.
    pub trail_max_count: u32,

    /// Number of halo particles.
    pub cursor_star_count: u32,

    /// Whether clicks spawn bursts.
    pub click_burst: bool,

    pub click_burst_count: u32,

    pub trail_style: ShapeStyle,

    pub cursor_style: ShapeStyle,

    pub burst_style: ShapeStyle,

    /// Trail particle scale in percent.
    pub trail_size: f32,

    /// Halo particle scale in percent.
    pub cursor_size: f32,

    /// Cursor file name, e.g. `cyan.ani`. Empty keeps the platform pointer.
    pub cursor: String,

    /// Trail particle lifetime (ms).
    pub trail_lifetime: f64,

    /// Burst particle lifetime (ms).
    pub burst_lifetime: f64,

    /// Radius of the halo pattern (px).
    pub cursor_spread: f32,

    pub halo_wander: bool,

    pub halo_reshuffle: bool,

    /// Fade-out time of culled trail particles (ms).
    pub fade_window: f64,

    /// Pointer rest time before the halo appears (ms).
    pub stop_delay: f64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            disabled: false,
            color_mode: ColorMode::Fixed,
            color: DEFAULT_COLOR.to_string(),
            glow_color: DEFAULT_GLOW_COLOR.to_string(),
            rainbow_speed: 3.0,
            rainbow_saturation: 100.0,
            rainbow_lightness: 65.0,
            trail_max_count: 20,
            cursor_star_count: 3,
            click_burst: false,
            click_burst_count: 12,
            trail_style: ShapeStyle::Star,
            cursor_style: ShapeStyle::Star,
            burst_style: ShapeStyle::Star,
            trail_size: 100.0,
            cursor_size: 100.0,
            cursor: String::new(),
            trail_lifetime: 1000.0,
            burst_lifetime: 1000.0,
            cursor_spread: 20.0,
            halo_wander: false,
            halo_reshuffle: true,
            fade_window: 200.0,
            stop_delay: 100.0,
        }
    }
}

impl RuntimeSettings {
    /// Defaults overlaid with `patch`, then clamped.
    pub fn from_patch(patch: &SettingsPatch) -> Self {
        Self::default().merged(patch).clamped()
    }

    /// Returns a copy with every field present in `patch` replaced.
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        let mut next = self.clone();
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = &patch.$field {
                    next.$field = value.clone();
                })*
            };
        }
        overlay!(
            disabled,
            color_mode,
            color,
            glow_color,
            rainbow_speed,
            rainbow_saturation,
            rainbow_lightness,
            trail_max_count,
            cursor_star_count,
            click_burst,
            click_burst_count,
            trail_style,
            cursor_style,
            burst_style,
            trail_size,
            cursor_size,
            cursor,
            trail_lifetime,
            burst_lifetime,
            cursor_spread,
            halo_wander,
            halo_reshuffle,
            fade_window,
            stop_delay,
        );
        next
    }

    /// Forces every field into its valid range. Unparseable colors fall back
    /// to their defaults.
    pub fn clamped(mut self) -> Self {
        self.rainbow_speed = self.rainbow_speed.clamp(0.0, 360.0);
        self.rainbow_saturation = self.rainbow_saturation.clamp(0.0, 100.0);
        self.rainbow_lightness = self.rainbow_lightness.clamp(0.0, 100.0);
        self.trail_max_count = self.trail_max_count.min(500);
        self.cursor_star_count = self.cursor_star_count.min(64);
        self.click_burst_count = self.click_burst_count.min(200);
        self.trail_size = self.trail_size.clamp(10.0, 400.0);
        self.cursor_size = self.cursor_size.clamp(10.0, 400.0);
        self.trail_lifetime = self.trail_lifetime.clamp(1.0, 60_000.0);
        self.burst_lifetime = self.burst_lifetime.clamp(1.0, 60_000.0);
        self.cursor_spread = self.cursor_spread.clamp(0.0, 500.0);
        self.fade_window = self.fade_window.clamp(1.0, 5000.0);
        self.stop_delay = self.stop_delay.clamp(0.0, 5000.0);
        if color::parse_hex(&self.color).is_none() {
            self.color = DEFAULT_COLOR.to_string();
        }
        if color::parse_hex(&self.glow_color).is_none() {
            self.glow_color = DEFAULT_GLOW_COLOR.to_string();
        }
        self.cursor = self.cursor.trim().to_string();
        self
    }

    /// Returns true if going from `self` to `next` needs a full rebuild
    /// rather than an in-place update.
    pub fn is_structural_change(&self, next: &RuntimeSettings) -> bool {
        self.disabled != next.disabled
            || self.click_burst != next.click_burst
            || self.cursor != next.cursor
    }

    /// URL of the selected cursor file under `base`, if one is selected.
    pub fn cursor_url(&self, base: &str) -> Option<String> {
        if self.cursor.is_empty() {
            None
        } else {
            Some(format!("{}cursor/{}", base, self.cursor))
        }
    }

    pub fn colors(&self) -> ColorScheme {
        let defaults = ColorScheme::default();
        ColorScheme {
            mode: self.color_mode,
            color: color::parse_hex(&self.color).unwrap_or(defaults.color),
            glow: color::parse_hex(&self.glow_color).unwrap_or(defaults.glow),
            speed: self.rainbow_speed,
            saturation: self.rainbow_saturation,
            lightness: self.rainbow_lightness,
        }
    }

    pub fn trail_config(&self) -> TrailConfig {
        TrailConfig {
            max_count: self.trail_max_count as usize,
            style: self.trail_style,
            burst_style: self.burst_style,
            lifetime: self.trail_lifetime,
            burst_lifetime: self.burst_lifetime,
            size_scale: self.trail_size / 100.0,
            fade_window: self.fade_window,
            colors: self.colors(),
            ..TrailConfig::default()
        }
    }

    pub fn halo_config(&self) -> HaloConfig {
        HaloConfig {
            count: self.cursor_star_count as usize,
            style: self.cursor_style,
            size_scale: self.cursor_size / 100.0,
            spread: self.cursor_spread,
            stop_delay: self.stop_delay,
            wander: self.halo_wander,
            reshuffle: self.halo_reshuffle,
            colors: self.colors(),
            ..HaloConfig::default()
        }
    }

    /// Serializes the settings to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ============================================================================
// SettingsPatch
// ============================================================================

/// A partial settings update. `None` fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "tsify", derive(tsify_next::Tsify))]
#[cfg_attr(feature = "tsify", tsify(into_wasm_abi, from_wasm_abi))]
pub struct SettingsPatch {
    #[serde(
        rename = "_disabled",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub disabled: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub color_mode: Option<ColorMode>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub color: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub glow_color: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::float32"
    )]
    pub rainbow_speed: Option<f32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::float32"
    )]
    pub rainbow_saturation: Option<f32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::float32"
    )]
    pub rainbow_lightness: Option<f32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::count"
    )]
    pub trail_max_count: Option<u32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::count"
    )]
    pub cursor_star_count: Option<u32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub click_burst: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::count"
    )]
    pub click_burst_count: Option<u32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub trail_style: Option<ShapeStyle>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub cursor_style: Option<ShapeStyle>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub burst_style: Option<ShapeStyle>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::float32"
    )]
    pub trail_size: Option<f32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::float32"
    )]
    pub cursor_size: Option<f32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub cursor: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::float64"
    )]
    pub trail_lifetime: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::float64"
    )]
    pub burst_lifetime: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::float32"
    )]
    pub cursor_spread: Option<f32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub halo_wander: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub halo_reshuffle: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::float64"
    )]
    pub fade_window: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::float64"
    )]
    pub stop_delay: Option<f64>,
}

impl SettingsPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Serializes the patch to a JSON string. Unset fields are omitted.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a patch from a JSON string.
    ///
    /// Unknown keys are ignored and a value of the wrong type leaves only its
    /// own field unset. Fails only if `json` is not a JSON object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads a persisted patch. Missing or corrupt data yields an empty
    /// patch.
    pub fn from_stored(stored: Option<&str>) -> Self {
        let Some(json) = stored else {
            return Self::default();
        };
        Self::from_json(json).unwrap_or_else(|e| {
            warn!("settings: ignoring corrupt stored settings: {}", e);
            Self::default()
        })
    }
}

// ============================================================================
// Lenient field parsing
// ============================================================================

/// Field deserializers for [`SettingsPatch`] that never fail: a value of the
/// wrong shape is logged and dropped so that the rest of the patch survives.
/// Numbers are accepted from JSON numbers or numeric strings and saturate
/// into the target type; range limits are applied later by
/// [`RuntimeSettings::clamped`].
mod lenient {
    use log::warn;
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn number(value: &Value) -> Option<f64> {
        let n = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        let n = n.filter(|n| n.is_finite());
        if n.is_none() {
            warn!("settings: ignoring non-numeric value {}", value);
        }
        n
    }

    fn raw<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
        Ok(Option::<Value>::deserialize(deserializer)?.filter(|v| !v.is_null()))
    }

    /// Non-negative integer, rounded and saturated into `u32`.
    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        Ok(raw(deserializer)?
            .as_ref()
            .and_then(number)
            .map(|n| n.round().clamp(0.0, u32::MAX as f64) as u32))
    }

    pub fn float32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f32>, D::Error> {
        Ok(raw(deserializer)?
            .as_ref()
            .and_then(number)
            .map(|n| n.clamp(f32::MIN as f64, f32::MAX as f64) as f32))
    }

    pub fn float64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(raw(deserializer)?.as_ref().and_then(number))
    }

    /// Any other field type; values that do not parse become `None`.
    pub fn value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(raw(deserializer)?.and_then(|v| {
            let shown = v.to_string();
            serde_json::from_value(v)
                .map_err(|e| warn!("settings: ignoring value {}: {}", shown, e))
                .ok()
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_serialize_with_expected_keys() {
        let json = RuntimeSettings::default().to_json().unwrap();
        assert!(json.contains("\"_disabled\":false"));
        assert!(json.contains("\"colorMode\":\"fixed\""));
        assert!(json.contains("\"color\":\"#c8b869\""));
        assert!(json.contains("\"glowColor\":\"#e8c01e\""));
        assert!(json.contains("\"trailMaxCount\":20"));
        assert!(json.contains("\"trailStyle\":\"star\""));
        assert!(json.contains("\"cursor\":\"\""));
    }

    #[test]
    fn explicit_zero_is_not_a_default() {
        let patch = SettingsPatch::from_json(
            r#"{ "trailMaxCount": 0, "cursorStarCount": 0, "rainbowSpeed": 0 }"#,
        )
        .unwrap();
        let settings = RuntimeSettings::from_patch(&patch);
        assert_eq!(settings.trail_max_count, 0);
        assert_eq!(settings.cursor_star_count, 0);
        assert_eq!(settings.rainbow_speed, 0.0);
        assert_eq!(settings.click_burst_count, 12);
    }

    #[test]
    fn merge_overlays_only_present_fields() {
        let patch = SettingsPatch {
            color_mode: Some(ColorMode::Rainbow),
            trail_style: Some(ShapeStyle::Random),
            cursor: Some("cyan.ani".into()),
            ..SettingsPatch::default()
        };
        let settings = RuntimeSettings::default().merged(&patch);
        assert_eq!(settings.color_mode, ColorMode::Rainbow);
        assert_eq!(settings.trail_style, ShapeStyle::Random);
        assert_eq!(settings.cursor, "cyan.ani");
        assert_eq!(settings.cursor_style, ShapeStyle::Star);
        assert_eq!(settings.color, "#c8b869");
    }

    #[test]
    fn clamps_out_of_range_values() {
        let patch = SettingsPatch {
            rainbow_saturation: Some(250.0),
            rainbow_lightness: Some(-5.0),
            rainbow_speed: Some(1000.0),
            trail_max_count: Some(100_000),
            cursor_star_count: Some(1000),
            click_burst_count: Some(999),
            trail_size: Some(1.0),
            cursor_size: Some(9000.0),
            trail_lifetime: Some(0.0),
            cursor_spread: Some(-3.0),
            fade_window: Some(0.0),
            stop_delay: Some(1e9),
            ..SettingsPatch::default()
        };
        let s = RuntimeSettings::from_patch(&patch);
        assert_eq!(s.rainbow_saturation, 100.0);
        assert_eq!(s.rainbow_lightness, 0.0);
        assert_eq!(s.rainbow_speed, 360.0);
        assert_eq!(s.trail_max_count, 500);
        assert_eq!(s.cursor_star_count, 64);
        assert_eq!(s.click_burst_count, 200);
        assert_eq!(s.trail_size, 10.0);
        assert_eq!(s.cursor_size, 400.0);
        assert_eq!(s.trail_lifetime, 1.0);
        assert_eq!(s.cursor_spread, 0.0);
        assert_eq!(s.fade_window, 1.0);
        assert_eq!(s.stop_delay, 5000.0);
    }

    #[test]
    fn bad_colors_fall_back() {
        let patch = SettingsPatch {
            color: Some("not a color".into()),
            glow_color: Some("#e8c01eff".into()),
            ..SettingsPatch::default()
        };
        let s = RuntimeSettings::from_patch(&patch);
        assert_eq!(s.color, "#c8b869");
        assert_eq!(s.glow_color, "#e8c01eff");
        assert_eq!(s.colors().glow, palette::Srgb::new(0xe8, 0xc0, 0x1e));
    }

    #[test]
    fn corrupt_or_missing_storage_is_empty() {
        assert!(SettingsPatch::from_stored(None).is_empty());
        assert!(SettingsPatch::from_stored(Some("{not json")).is_empty());
        assert!(SettingsPatch::from_stored(Some("[1, 2]")).is_empty());

        let patch = SettingsPatch::from_stored(Some(r#"{"clickBurst":true,"legacy":1}"#));
        assert_eq!(patch.click_burst, Some(true));
    }

    #[test]
    fn ill_typed_fields_are_dropped_not_the_patch() {
        let patch =
            SettingsPatch::from_json(r##"{"trailMaxCount":-5,"color":"#ff0000"}"##).unwrap();
        assert_eq!(patch.trail_max_count, Some(0));
        assert_eq!(patch.color.as_deref(), Some("#ff0000"));

        let patch = SettingsPatch::from_stored(Some(
            r#"{"trailMaxCount":20.5,"colorMode":"rainbow"}"#,
        ));
        assert_eq!(patch.trail_max_count, Some(21));
        assert_eq!(patch.color_mode, Some(ColorMode::Rainbow));

        let patch = SettingsPatch::from_json(
            r#"{"cursorStarCount":"20","trailSize":"150","stopDelay":"soon"}"#,
        )
        .unwrap();
        assert_eq!(patch.cursor_star_count, Some(20));
        assert_eq!(patch.trail_size, Some(150.0));
        assert_eq!(patch.stop_delay, None);

        let patch = SettingsPatch::from_json(
            r#"{"trailStyle":"hexagon","cursorStyle":"heart","clickBurst":"yes","cursor":null}"#,
        )
        .unwrap();
        assert_eq!(patch.trail_style, None);
        assert_eq!(patch.cursor_style, Some(ShapeStyle::Heart));
        assert_eq!(patch.click_burst, None);
        assert_eq!(patch.cursor, None);
    }

    #[test]
    fn oversized_counts_saturate_then_clamp() {
        let patch = SettingsPatch::from_json(r#"{"trailMaxCount":1e12}"#).unwrap();
        assert_eq!(patch.trail_max_count, Some(u32::MAX));
        assert_eq!(RuntimeSettings::from_patch(&patch).trail_max_count, 500);
    }

    #[test]
    fn patch_json_omits_unset_fields() {
        let patch = SettingsPatch {
            disabled: Some(true),
            trail_size: Some(150.0),
            ..SettingsPatch::default()
        };
        let json = patch.to_json().unwrap();
        assert_eq!(json, r#"{"_disabled":true,"trailSize":150.0}"#);
        assert_eq!(SettingsPatch::from_json(&json).unwrap(), patch);
        assert_eq!(SettingsPatch::new().to_json().unwrap(), "{}");
    }

    #[test]
    fn structural_changes() {
        let base = RuntimeSettings::default();
        let hot = RuntimeSettings {
            color: "#ffffff".into(),
            trail_max_count: 50,
            cursor_style: ShapeStyle::Heart,
            cursor_spread: 80.0,
            ..base.clone()
        };
        assert!(!base.is_structural_change(&hot));

        for next in [
            RuntimeSettings {
                disabled: true,
                ..base.clone()
            },
            RuntimeSettings {
                click_burst: true,
                ..base.clone()
            },
            RuntimeSettings {
                cursor: "red.cur".into(),
                ..base.clone()
            },
        ] {
            assert!(base.is_structural_change(&next));
        }
    }

    #[test]
    fn derived_component_configs() {
        let patch = SettingsPatch {
            trail_size: Some(200.0),
            cursor_size: Some(50.0),
            cursor_star_count: Some(5),
            burst_style: Some(ShapeStyle::Flame),
            halo_wander: Some(true),
            ..SettingsPatch::default()
        };
        let s = RuntimeSettings::from_patch(&patch);

        let trail = s.trail_config();
        assert_eq!(trail.max_count, 20);
        assert_eq!(trail.size_scale, 2.0);
        assert_eq!(trail.burst_style, ShapeStyle::Flame);
        assert_eq!(trail.lifetime, 1000.0);

        let halo = s.halo_config();
        assert_eq!(halo.count, 5);
        assert_eq!(halo.size_scale, 0.5);
        assert!(halo.wander);
        assert!(halo.reshuffle);
        assert_eq!(halo.spread, 20.0);
    }

    #[test]
    fn cursor_urls() {
        let mut s = RuntimeSettings::default();
        assert_eq!(s.cursor_url("/seffects/"), None);
        s.cursor = "cyan.ani".into();
        assert_eq!(
            s.cursor_url("/seffects/").as_deref(),
            Some("/seffects/cursor/cyan.ani")
        );
        assert!(CURSOR_ASSETS.contains(&"viole.ani"));
        assert_eq!(CURSOR_ASSETS.len(), 12);
    }
}
