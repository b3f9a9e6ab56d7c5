// Augmentation parameters: the named options the sliders/radio write into
// and the transform reads a snapshot of every running tick.

use std::fmt;
use std::str::FromStr;

/// How pixels uncovered by the geometric transform get filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    /// Repeat the closest edge pixel (aaaa|abcd|dddd).
    #[default]
    Nearest,
    /// Black outside the image (0000|abcd|0000).
    Constant,
    /// Mirror including the edge pixel (dcba|abcd|dcba).
    Reflect,
    /// Tile the image (abcd|abcd|abcd).
    Wrap,
}

impl FillMode {
    pub const ALL: [FillMode; 4] = [FillMode::Nearest, FillMode::Constant, FillMode::Reflect, FillMode::Wrap];

    pub fn label(self) -> &'static str {
        match self {
            FillMode::Nearest => "nearest",
            FillMode::Constant => "constant",
            FillMode::Reflect => "reflect",
            FillMode::Wrap => "wrap",
        }
    }
}

impl fmt::Display for FillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFillMode(pub String);

impl FromStr for FillMode {
    type Err = UnknownFillMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FillMode::ALL
            .into_iter()
            .find(|m| m.label() == s)
            .ok_or_else(|| UnknownFillMode(s.to_string()))
    }
}

/// The option keys a widget may write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamName {
    Rotate,
    WidthShift,
    HeightShift,
    Shear,
    Zoom,
    FillMode,
}

impl ParamName {
    pub const ALL: [ParamName; 6] = [
        ParamName::Rotate,
        ParamName::WidthShift,
        ParamName::HeightShift,
        ParamName::Shear,
        ParamName::Zoom,
        ParamName::FillMode,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ParamName::Rotate => "rotate",
            ParamName::WidthShift => "width_shift",
            ParamName::HeightShift => "height_shift",
            ParamName::Shear => "shear",
            ParamName::Zoom => "zoom",
            ParamName::FillMode => "fill_mode",
        }
    }

    pub fn lookup(key: &str) -> Option<ParamName> {
        ParamName::ALL.into_iter().find(|p| p.key() == key)
    }

    /// Allowed numeric range, `None` for the fill mode.
    pub fn range(self) -> Option<(f32, f32)> {
        match self {
            ParamName::Rotate | ParamName::Shear => Some((0.0, 180.0)),
            ParamName::WidthShift | ParamName::HeightShift | ParamName::Zoom => Some((0.0, 1.0)),
            ParamName::FillMode => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f32),
    /// A fill-mode label, stored only if it names a known mode.
    Label(String),
}

/// Point-in-time copy of every augmentation option.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AugmentParams {
    pub rotation: f32,     // degrees
    pub width_shift: f32,  // fraction of width
    pub height_shift: f32, // fraction of height
    pub shear: f32,        // degrees
    pub zoom: f32,         // fraction around 1.0
    pub fill_mode: FillMode,
}

impl AugmentParams {
    fn number_mut(&mut self, name: ParamName) -> Option<&mut f32> {
        match name {
            ParamName::Rotate => Some(&mut self.rotation),
            ParamName::WidthShift => Some(&mut self.width_shift),
            ParamName::HeightShift => Some(&mut self.height_shift),
            ParamName::Shear => Some(&mut self.shear),
            ParamName::Zoom => Some(&mut self.zoom),
            ParamName::FillMode => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ParameterStore {
    values: AugmentParams,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite one option. Bad names, bad kinds and unknown labels are
    /// logged and dropped; numbers outside the option's range are clamped.
    pub fn set(&mut self, name: &str, value: ParamValue) {
        let Some(param) = ParamName::lookup(name) else {
            tracing::warn!(name, "name not found, value discarded");
            return;
        };

        match (param, value) {
            (ParamName::FillMode, ParamValue::Label(label)) => match label.parse::<FillMode>() {
                Ok(mode) => self.values.fill_mode = mode,
                Err(UnknownFillMode(label)) => {
                    tracing::warn!(%label, "unknown fill mode, value discarded");
                }
            },
            (ParamName::FillMode, ParamValue::Number(v)) => {
                tracing::warn!(name, value = v, "fill_mode expects a label, value discarded");
            }
            (numeric, ParamValue::Label(label)) => {
                tracing::warn!(name = numeric.key(), %label, "option expects a number, value discarded");
            }
            (numeric, ParamValue::Number(v)) => {
                if !v.is_finite() {
                    tracing::warn!(name, value = v, "non-finite value discarded");
                    return;
                }
                let Some((lo, hi)) = numeric.range() else { return };
                let clamped = v.clamp(lo, hi);
                if clamped != v {
                    tracing::warn!(name, value = v, clamped, "value outside range, clamped");
                }
                if let Some(slot) = self.values.number_mut(numeric) {
                    *slot = clamped;
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        let v = &self.values;
        let value = match ParamName::lookup(name)? {
            ParamName::Rotate => ParamValue::Number(v.rotation),
            ParamName::WidthShift => ParamValue::Number(v.width_shift),
            ParamName::HeightShift => ParamValue::Number(v.height_shift),
            ParamName::Shear => ParamValue::Number(v.shear),
            ParamName::Zoom => ParamValue::Number(v.zoom),
            ParamName::FillMode => ParamValue::Label(v.fill_mode.label().to_string()),
        };
        Some(value)
    }

    pub fn snapshot(&self) -> AugmentParams {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_zero_and_nearest() {
        let store = ParameterStore::new();
        assert_eq!(store.snapshot(), AugmentParams::default());
        assert_eq!(store.get("fill_mode"), Some(ParamValue::Label("nearest".into())));
        assert_eq!(store.get("rotate"), Some(ParamValue::Number(0.0)));
    }

    #[test]
    fn unknown_name_is_ignored() {
        let mut store = ParameterStore::new();
        store.set("brightness", ParamValue::Number(0.3));
        store.set("interval", ParamValue::Number(0.3));
        assert_eq!(store.snapshot(), AugmentParams::default());
        assert_eq!(store.get("brightness"), None);
    }

    #[test]
    fn wrong_kind_is_ignored() {
        let mut store = ParameterStore::new();
        store.set("fill_mode", ParamValue::Number(1.0));
        store.set("zoom", ParamValue::Label("wrap".into()));
        store.set("fill_mode", ParamValue::Label("mirror".into()));
        store.set("rotate", ParamValue::Number(f32::NAN));
        assert_eq!(store.snapshot(), AugmentParams::default());
    }

    #[test]
    fn bounds_are_accepted_as_is() {
        let mut store = ParameterStore::new();
        store.set("rotate", ParamValue::Number(180.0));
        assert_eq!(store.get("rotate"), Some(ParamValue::Number(180.0)));
        store.set("rotate", ParamValue::Number(0.0));
        assert_eq!(store.get("rotate"), Some(ParamValue::Number(0.0)));
        store.set("zoom", ParamValue::Number(1.0));
        assert_eq!(store.snapshot().zoom, 1.0);
    }

    #[test]
    fn out_of_range_is_clamped() {
        let mut store = ParameterStore::new();
        store.set("shear", ParamValue::Number(270.0));
        store.set("width_shift", ParamValue::Number(-0.5));
        assert_eq!(store.snapshot().shear, 180.0);
        assert_eq!(store.snapshot().width_shift, 0.0);
    }

    #[test]
    fn every_fill_mode_label_round_trips() {
        let mut store = ParameterStore::new();
        for mode in FillMode::ALL {
            store.set("fill_mode", ParamValue::Label(mode.label().into()));
            assert_eq!(store.snapshot().fill_mode, mode);
        }
    }
}
