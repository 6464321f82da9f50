//! Typed partial updates.
//!
//! A patch names only the fields it changes. Scalar fields replace the current value, nested
//! bags (`effects`, `position`, `size`, `style`, `crop`) are merged one field deep. Fields whose
//! value is itself optional use `Option<Option<T>>`: `None` leaves the field alone and
//! `Some(None)` clears it. In JSON that is "key absent" versus `null`.

use serde::{Deserialize, Deserializer};

use crate::{
    foundation::core::LayerGroup,
    timeline::model::{
        Clip, ClipKind, CropRect, Effects, FitMode, Keyframe, Position, ShapeType, Size, Style,
    },
};

fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

macro_rules! merge_fields {
    ($patch:expr, $target:expr; $($field:ident),* $(,)?) => {
        $(
            if let Some(v) = &$patch.$field {
                $target.$field = v.clone();
            }
        )*
    };
}

/// Partial update of [`Effects`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct EffectsPatch {
    pub fade_in: Option<f64>,
    pub fade_out: Option<f64>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub transition: Option<Option<String>>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub transition_duration: Option<Option<f64>>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub transition_with: Option<Option<String>>,
    pub audio_fade_in: Option<f64>,
    pub audio_fade_out: Option<f64>,
    pub speed: Option<f64>,
    pub filter: Option<String>,
    pub brightness: Option<f64>,
    pub contrast: Option<f64>,
    pub saturation: Option<f64>,
    pub gamma: Option<f64>,
    pub hue: Option<f64>,
    pub blur: Option<f64>,
    pub opacity: Option<f64>,
    pub volume: Option<f64>,
    pub blend_mode: Option<String>,
    pub overlay_color: Option<String>,
    pub overlay_opacity: Option<f64>,
    pub overlay_blend: Option<String>,
}

impl EffectsPatch {
    /// Merge into `fx`.
    pub fn apply_to(&self, fx: &mut Effects) {
        merge_fields!(self, fx;
            fade_in, fade_out, transition, transition_duration, transition_with,
            audio_fade_in, audio_fade_out, speed, filter, brightness, contrast, saturation,
            gamma, hue, blur, opacity, volume, blend_mode, overlay_color, overlay_opacity,
            overlay_blend,
        );
    }
}

/// Partial update of [`Position`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct PositionPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl PositionPatch {
    /// Merge into `p`.
    pub fn apply_to(&self, p: &mut Position) {
        merge_fields!(self, p; x, y);
    }
}

/// Partial update of [`Size`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct SizePatch {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl SizePatch {
    /// Merge into `s`.
    pub fn apply_to(&self, s: &mut Size) {
        merge_fields!(self, s; width, height);
    }
}

/// Partial update of [`Style`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct StylePatch {
    pub color: Option<String>,
    pub outline: Option<bool>,
    pub opacity: Option<f64>,
    pub shape_type: Option<ShapeType>,
}

impl StylePatch {
    /// Merge into `s`.
    pub fn apply_to(&self, s: &mut Style) {
        merge_fields!(self, s; color, outline, opacity, shape_type);
    }
}

/// Partial update of [`CropRect`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct CropPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl CropPatch {
    /// Merge into `c`.
    pub fn apply_to(&self, c: &mut CropRect) {
        merge_fields!(self, c; x, y, width, height);
    }
}

/// Partial [`Clip`], used both as the input of an add and as an update.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClipPatch {
    /// Requested id; honoured by adds only.
    pub id: Option<String>,
    /// Media kind.
    #[serde(rename = "type")]
    pub kind: Option<ClipKind>,
    /// Display label.
    pub label: Option<String>,
    /// Timeline start in seconds.
    pub start_time: Option<f64>,
    /// Timeline length in seconds.
    pub duration: Option<f64>,
    /// Target layer.
    pub layer: Option<u32>,
    /// Target layer group.
    pub layer_group: Option<LayerGroup>,
    /// Media library id.
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub source_id: Option<Option<String>>,
    /// Media location.
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<Option<String>>,
    /// Thumbnail location.
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<Option<String>>,
    /// Source offset of the clip start.
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub trim_start: Option<Option<f64>>,
    /// Source offset of the clip end.
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub trim_end: Option<Option<f64>>,
    /// Source aspect ratio.
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<Option<String>>,
    /// Fit mode.
    pub fit_mode: Option<FitMode>,
    /// Crop window, merged into the current one (or the full frame).
    pub crop: Option<CropPatch>,
    /// Effect parameters, merged field by field.
    pub effects: Option<EffectsPatch>,
    /// Canvas position, merged field by field.
    pub position: Option<PositionPatch>,
    /// Canvas size, merged field by field.
    pub size: Option<SizePatch>,
    /// Rotation in degrees.
    pub rotation: Option<f64>,
    /// Aspect lock.
    pub lock_aspect_ratio: Option<bool>,
    /// Text body.
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub text: Option<Option<String>>,
    /// Styling, merged field by field.
    pub style: Option<StylePatch>,
    /// Replacement keyframe list.
    pub keyframes: Option<Vec<Keyframe>>,
}

impl ClipPatch {
    /// Patch that moves and/or resizes a clip.
    pub fn timing(start_time: f64, duration: f64) -> Self {
        Self {
            start_time: Some(start_time),
            duration: Some(duration),
            ..Self::default()
        }
    }

    /// Patch that moves a clip to `start_time`.
    pub fn start_at(start_time: f64) -> Self {
        Self {
            start_time: Some(start_time),
            ..Self::default()
        }
    }

    /// Return `base` with this patch merged in. The id is never changed.
    pub fn apply(&self, base: &Clip) -> Clip {
        let mut clip = base.clone();
        merge_fields!(self, clip;
            source_id, source_url, poster_url, trim_start, trim_end, aspect_ratio, text,
        );
        if let Some(kind) = self.kind {
            clip.kind = kind;
        }
        if let Some(label) = &self.label {
            clip.label = label.clone();
        }
        if let Some(v) = self.start_time {
            clip.start_time = v;
        }
        if let Some(v) = self.duration {
            clip.duration = v;
        }
        if let Some(v) = self.layer {
            clip.layer = v;
        }
        if let Some(g) = self.layer_group {
            clip.layer_group = Some(g);
        }
        if let Some(v) = self.fit_mode {
            clip.fit_mode = v;
        }
        if let Some(v) = self.rotation {
            clip.rotation = v;
        }
        if let Some(v) = self.lock_aspect_ratio {
            clip.lock_aspect_ratio = v;
        }
        if let Some(kfs) = &self.keyframes {
            clip.keyframes = kfs.clone();
        }
        if let Some(p) = &self.effects {
            p.apply_to(&mut clip.effects);
        }
        if let Some(p) = &self.crop {
            p.apply_to(clip.crop.get_or_insert(CropRect::FULL));
        }
        if let Some(p) = &self.position {
            p.apply_to(clip.position.get_or_insert_with(Position::default));
        }
        if let Some(p) = &self.size {
            p.apply_to(clip.size.get_or_insert_with(Size::default));
        }
        if let Some(p) = &self.style {
            p.apply_to(clip.style.get_or_insert_with(Style::default));
        }
        clip
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/patch.rs"]
mod tests;
