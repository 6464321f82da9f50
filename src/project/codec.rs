//! Versioned project documents.
//!
//! Persisted projects use the schema-v2 document shape: metadata, settings, scenes with the
//! active scene's tracks, and the timeline view state. The editor works on the flat shape
//! ([`FlatState`]). This module upgrades arbitrary input into a v2 [`ProjectDocument`] and maps
//! between the two shapes.
//!
//! Tracks and transitions stay raw JSON inside documents so that fields the engine does not
//! model survive a load/save cycle. Unknown keys at every level are kept in `extra` maps.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde_json::{Map, Value};

use crate::{
    foundation::error::{CliptrackError, CliptrackResult},
    timeline::model::{
        Clip, TimelineState, TimelineTransition, Track, TrackType, UNTITLED_PROJECT,
    },
};

/// Schema version written by this crate.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Id of the scene synthesized for documents without scenes.
pub const MAIN_SCENE_ID: &str = "scene_main";

/// Render output parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputSettings {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: f64,
    /// Encoder bitrate, e.g. `"8M"`.
    pub bitrate: String,
    /// Keys not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 30.0,
            bitrate: "8M".to_string(),
            extra: Map::new(),
        }
    }
}

/// Document metadata.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// Project name.
    pub name: String,
    /// Keys not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Canvas size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// Canvas background.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Background {
    /// Background kind, e.g. `"color"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific value, e.g. `"#000000"`.
    pub value: String,
}

/// Project-wide settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectSettings {
    /// Project frame rate.
    pub fps: f64,
    /// Canvas size.
    pub canvas: Canvas,
    /// Canvas background.
    pub background: Background,
    /// Keys not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            fps: 30.0,
            canvas: Canvas {
                width: 1080.0,
                height: 1920.0,
            },
            background: Background {
                kind: "color".to_string(),
                value: "#000000".to_string(),
            },
            extra: Map::new(),
        }
    }
}

/// One scene of the project.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether this is the main scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_main: Option<bool>,
    /// Timeline bookmarks.
    #[serde(default)]
    pub bookmarks: Vec<Value>,
    /// Tracks of this scene.
    #[serde(default)]
    pub tracks: Vec<Value>,
    /// Keys not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Scene {
    fn main(tracks: Vec<Value>) -> Self {
        Self {
            id: MAIN_SCENE_ID.to_string(),
            name: Some("Scene 1".to_string()),
            is_main: Some(true),
            bookmarks: Vec::new(),
            tracks,
            extra: Map::new(),
        }
    }
}

/// Persisted timeline viewport.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineViewState {
    /// Zoom factor.
    pub zoom_level: f64,
    /// Horizontal scroll offset in pixels.
    pub scroll_left: f64,
    /// Playhead in seconds.
    pub playhead_time: f64,
    /// Keys not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TimelineViewState {
    fn default() -> Self {
        Self {
            zoom_level: 1.0,
            scroll_left: 0.0,
            playhead_time: 0.0,
            extra: Map::new(),
        }
    }
}

/// A schema-v2 project document.
///
/// The flat fields (`projectName`, `tracks`, ...) mirror the active scene for readers that do
/// not understand scenes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    /// Schema version, always [`CURRENT_SCHEMA_VERSION`] after normalization.
    pub version: u32,
    /// Metadata.
    pub metadata: Metadata,
    /// Project settings.
    pub settings: ProjectSettings,
    /// Id of the scene being edited.
    pub current_scene_id: String,
    /// Scenes, never empty.
    pub scenes: Vec<Scene>,
    /// Viewport.
    pub timeline_view_state: TimelineViewState,
    /// Project name.
    pub project_name: String,
    /// Tracks of the active scene.
    pub tracks: Vec<Value>,
    /// Transition records.
    pub transitions: Vec<Value>,
    /// Selected clip.
    pub selected_clip_id: Option<String>,
    /// Playhead in seconds.
    pub playhead_time: f64,
    /// Zoom factor.
    pub timeline_zoom: f64,
    /// Output parameters.
    pub output_settings: OutputSettings,
    /// Keys not modelled here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectDocument {
    /// Empty single-scene document.
    pub fn new(project_name: &str) -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            metadata: Metadata {
                name: project_name.to_string(),
                extra: Map::new(),
            },
            settings: ProjectSettings::default(),
            current_scene_id: MAIN_SCENE_ID.to_string(),
            scenes: vec![Scene::main(Vec::new())],
            timeline_view_state: TimelineViewState::default(),
            project_name: project_name.to_string(),
            tracks: Vec::new(),
            transitions: Vec::new(),
            selected_clip_id: None,
            playhead_time: 0.0,
            timeline_zoom: 1.0,
            output_settings: OutputSettings::default(),
            extra: Map::new(),
        }
    }

    /// Read any JSON project document and upgrade it to schema v2.
    #[tracing::instrument(skip(r))]
    pub fn from_reader<R: Read>(r: R, fallback_name: &str) -> CliptrackResult<Self> {
        let raw: Value = serde_json::from_reader(r)
            .map_err(|e| CliptrackError::serde(format!("parse project JSON: {e}")))?;
        Ok(ensure_schema_v2(&raw, fallback_name))
    }

    /// Read a project document from disk and upgrade it to schema v2.
    pub fn from_path(path: impl AsRef<Path>, fallback_name: &str) -> CliptrackResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CliptrackError::serde(format!("open project '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f), fallback_name)
    }

    /// Write as pretty-printed JSON.
    pub fn to_writer_pretty<W: Write>(&self, w: W) -> CliptrackResult<()> {
        let mut w = BufWriter::new(w);
        serde_json::to_writer_pretty(&mut w, self)
            .map_err(|e| CliptrackError::serde(format!("write project JSON: {e}")))?;
        w.flush()
            .map_err(|e| CliptrackError::serde(format!("flush project JSON: {e}")))?;
        Ok(())
    }

    /// Serialize into a JSON value.
    pub fn to_value(&self) -> CliptrackResult<Value> {
        serde_json::to_value(self)
            .map_err(|e| CliptrackError::serde(format!("serialize project: {e}")))
    }

    /// Flat editing shape of this document.
    pub fn flat_state(&self) -> FlatState {
        FlatState {
            project_name: self.project_name.clone(),
            tracks: self.tracks.clone(),
            transitions: self.transitions.clone(),
            selected_clip_id: self.selected_clip_id.clone(),
            playhead_time: self.playhead_time,
            timeline_zoom: self.timeline_zoom,
            output_settings: self.output_settings.clone(),
        }
    }
}

/// The flat shape consumed by the editor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlatState {
    /// Project name.
    pub project_name: String,
    /// Raw tracks.
    pub tracks: Vec<Value>,
    /// Raw transition records.
    pub transitions: Vec<Value>,
    /// Selected clip.
    pub selected_clip_id: Option<String>,
    /// Playhead in seconds.
    pub playhead_time: f64,
    /// Zoom factor.
    pub timeline_zoom: f64,
    /// Output parameters.
    pub output_settings: OutputSettings,
}

impl Default for FlatState {
    fn default() -> Self {
        Self {
            project_name: UNTITLED_PROJECT.to_string(),
            tracks: Vec::new(),
            transitions: Vec::new(),
            selected_clip_id: None,
            playhead_time: 0.0,
            timeline_zoom: 1.0,
            output_settings: OutputSettings::default(),
        }
    }
}

// Persisted documents treat zero, empty strings and wrong types as "missing".

fn truthy_number(v: Option<&Value>) -> Option<f64> {
    let n = match v? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(true) => 1.0,
        _ => return None,
    };
    (n.is_finite() && n != 0.0).then_some(n)
}

fn truthy_string(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

fn as_object(v: Option<&Value>) -> Map<String, Value> {
    match v {
        Some(Value::Object(m)) => m.clone(),
        _ => Map::new(),
    }
}

fn as_array(v: Option<&Value>) -> Vec<Value> {
    match v {
        Some(Value::Array(a)) => a.clone(),
        _ => Vec::new(),
    }
}

fn without(mut map: Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    for k in keys {
        map.remove(*k);
    }
    map
}

fn normalize_scene(index: usize, mut raw: Map<String, Value>) -> Scene {
    let id = truthy_string(raw.get("id")).unwrap_or_else(|| format!("scene_{}", index + 1));
    let name = raw.get("name").and_then(Value::as_str).map(str::to_string);
    let is_main = raw.get("isMain").and_then(Value::as_bool);
    let bookmarks = as_array(raw.get("bookmarks"));
    let tracks = as_array(raw.get("tracks"));
    for k in ["id", "name", "isMain", "bookmarks", "tracks"] {
        raw.remove(k);
    }
    Scene {
        id,
        name,
        is_main,
        bookmarks,
        tracks,
        extra: raw,
    }
}

fn normalize_settings(raw: Map<String, Value>) -> ProjectSettings {
    let d = ProjectSettings::default();
    let canvas = as_object(raw.get("canvas"));
    let background = as_object(raw.get("background"));
    ProjectSettings {
        fps: truthy_number(raw.get("fps")).unwrap_or(d.fps),
        canvas: Canvas {
            width: truthy_number(canvas.get("width")).unwrap_or(d.canvas.width),
            height: truthy_number(canvas.get("height")).unwrap_or(d.canvas.height),
        },
        background: Background {
            kind: truthy_string(background.get("type")).unwrap_or(d.background.kind),
            value: truthy_string(background.get("value")).unwrap_or(d.background.value),
        },
        extra: without(raw, &["fps", "canvas", "background"]),
    }
}

/// Merge persisted output settings over the defaults.
pub fn merge_output_settings(raw: Option<&Value>) -> OutputSettings {
    let raw = as_object(raw);
    let d = OutputSettings::default();
    OutputSettings {
        width: raw
            .get("width")
            .and_then(Value::as_f64)
            .filter(|w| w.is_finite() && *w > 0.0)
            .map_or(d.width, |w| w.round() as u32),
        height: raw
            .get("height")
            .and_then(Value::as_f64)
            .filter(|h| h.is_finite() && *h > 0.0)
            .map_or(d.height, |h| h.round() as u32),
        fps: raw
            .get("fps")
            .and_then(Value::as_f64)
            .filter(|f| f.is_finite() && *f > 0.0)
            .unwrap_or(d.fps),
        bitrate: raw
            .get("bitrate")
            .and_then(Value::as_str)
            .map_or(d.bitrate, str::to_string),
        extra: without(raw, &["width", "height", "fps", "bitrate"]),
    }
}

const TOP_LEVEL_KEYS: &[&str] = &[
    "version",
    "metadata",
    "settings",
    "currentSceneId",
    "scenes",
    "timelineViewState",
    "projectName",
    "tracks",
    "transitions",
    "selectedClipId",
    "playheadTime",
    "timelineZoom",
    "outputSettings",
];

/// Upgrade any JSON value into a schema-v2 document.
///
/// Empty or non-object input yields the default single-scene document. Every other input keeps
/// what it has and gets typed defaults for the rest. The active scene's tracks are mirrored
/// into the flat `tracks` field.
#[tracing::instrument(skip(raw))]
pub fn ensure_schema_v2(raw: &Value, fallback_name: &str) -> ProjectDocument {
    let state = match raw {
        Value::Object(m) if !m.is_empty() => m,
        Value::Object(_) | Value::Null => return ProjectDocument::new(fallback_name),
        _ => {
            tracing::warn!("project document is not a JSON object; starting from defaults");
            return ProjectDocument::new(fallback_name);
        }
    };

    let version = state.get("version").and_then(Value::as_u64);
    if version.is_none_or(|v| v < u64::from(CURRENT_SCHEMA_VERSION)) {
        tracing::info!(from = ?version, to = CURRENT_SCHEMA_VERSION, "upgrading project document");
    }

    let scenes: Vec<Scene> = as_array(state.get("scenes"))
        .into_iter()
        .filter_map(|s| match s {
            Value::Object(m) => Some(m),
            _ => None,
        })
        .enumerate()
        .map(|(i, m)| normalize_scene(i, m))
        .collect();

    let current_scene_id = truthy_string(state.get("currentSceneId"))
        .or_else(|| scenes.first().map(|s| s.id.clone()))
        .unwrap_or_else(|| MAIN_SCENE_ID.to_string());
    let main_tracks = scenes
        .iter()
        .find(|s| s.id == current_scene_id)
        .or(scenes.first())
        .map_or_else(|| as_array(state.get("tracks")), |s| s.tracks.clone());
    let scenes = if scenes.is_empty() {
        vec![Scene::main(main_tracks.clone())]
    } else {
        scenes
    };

    let view = as_object(state.get("timelineViewState"));
    let project_name = truthy_string(state.get("projectName"));
    let metadata_raw = as_object(state.get("metadata"));
    let metadata = Metadata {
        name: truthy_string(metadata_raw.get("name"))
            .or_else(|| project_name.clone())
            .unwrap_or_else(|| fallback_name.to_string()),
        extra: without(metadata_raw, &["name"]),
    };

    let zoom_level = truthy_number(view.get("zoomLevel"))
        .or_else(|| truthy_number(state.get("timelineZoom")))
        .unwrap_or(1.0);
    let view_playhead = truthy_number(view.get("playheadTime"))
        .or_else(|| truthy_number(state.get("playheadTime")))
        .unwrap_or(0.0);
    let timeline_view_state = TimelineViewState {
        zoom_level,
        scroll_left: truthy_number(view.get("scrollLeft")).unwrap_or(0.0),
        playhead_time: view_playhead,
        extra: without(view.clone(), &["zoomLevel", "scrollLeft", "playheadTime"]),
    };

    let extra: Map<String, Value> = state
        .iter()
        .filter(|(k, _)| !TOP_LEVEL_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    ProjectDocument {
        version: CURRENT_SCHEMA_VERSION,
        metadata,
        settings: normalize_settings(as_object(state.get("settings"))),
        current_scene_id,
        scenes,
        timeline_view_state,
        project_name: project_name.unwrap_or_else(|| fallback_name.to_string()),
        tracks: main_tracks,
        transitions: as_array(state.get("transitions")),
        selected_clip_id: state
            .get("selectedClipId")
            .and_then(Value::as_str)
            .map(str::to_string),
        playhead_time: truthy_number(state.get("playheadTime"))
            .or_else(|| truthy_number(view.get("playheadTime")))
            .unwrap_or(0.0),
        timeline_zoom: truthy_number(state.get("timelineZoom"))
            .or_else(|| truthy_number(view.get("zoomLevel")))
            .unwrap_or(1.0),
        output_settings: merge_output_settings(state.get("outputSettings")),
        extra,
    }
}

/// Upgrade `raw` and project it to the flat editing shape.
pub fn extract_flat_state(raw: &Value, fallback_name: &str) -> FlatState {
    ensure_schema_v2(raw, fallback_name).flat_state()
}

/// Build a fresh v2 document around a flat state.
pub fn build_persisted(flat: &FlatState, name: &str, output: &OutputSettings) -> ProjectDocument {
    build_persisted_onto(&ProjectDocument::new(name), flat, name, output)
}

/// Write a flat state back into an existing document.
///
/// The flat tracks replace the active scene's tracks. Other scenes, settings and unknown keys
/// of `base` are kept.
#[tracing::instrument(skip(base, flat, output))]
pub fn build_persisted_onto(
    base: &ProjectDocument,
    flat: &FlatState,
    name: &str,
    output: &OutputSettings,
) -> ProjectDocument {
    let mut doc = base.clone();
    doc.version = CURRENT_SCHEMA_VERSION;
    doc.metadata.name = name.to_string();
    doc.project_name = name.to_string();
    doc.tracks = flat.tracks.clone();
    doc.transitions = flat.transitions.clone();

    if doc.scenes.is_empty() {
        doc.scenes.push(Scene::main(Vec::new()));
    }
    if !doc.scenes.iter().any(|s| s.id == doc.current_scene_id) {
        doc.current_scene_id = doc.scenes[0].id.clone();
    }
    for scene in &mut doc.scenes {
        if scene.id == doc.current_scene_id {
            scene.tracks = flat.tracks.clone();
        }
    }

    doc.selected_clip_id = flat
        .selected_clip_id
        .clone()
        .or_else(|| base.selected_clip_id.clone());
    doc.playhead_time = flat.playhead_time;
    doc.timeline_zoom = flat.timeline_zoom;
    doc.timeline_view_state.playhead_time = flat.playhead_time;
    doc.timeline_view_state.zoom_level = flat.timeline_zoom;
    doc.output_settings = output.clone();
    doc
}

fn parse_track(raw: &Value) -> Option<Track> {
    let obj = raw.as_object()?;
    let track_type: TrackType = match obj.get("type").cloned().map(serde_json::from_value::<TrackType>) {
        Some(Ok(t)) => t,
        _ => {
            tracing::warn!(track = ?obj.get("id"), "dropping track with unknown type");
            return None;
        }
    };
    let mut track = Track::new(track_type);
    if let Some(id) = truthy_string(obj.get("id")) {
        track.id = id;
    }
    if let Some(label) = obj.get("label").and_then(Value::as_str) {
        track.label = label.to_string();
    }
    for clip in as_array(obj.get("clips")) {
        match serde_json::from_value::<Clip>(clip) {
            Ok(c) => track.clips.push(c),
            Err(e) => tracing::warn!(track = %track.id, error = %e, "dropping malformed clip"),
        }
    }
    Some(track)
}

/// Typed snapshot of a flat state. Malformed tracks, clips and transitions are dropped.
pub fn flat_to_state(flat: &FlatState) -> TimelineState {
    let transitions = flat
        .transitions
        .iter()
        .filter_map(|t| match serde_json::from_value::<TimelineTransition>(t.clone()) {
            Ok(t) => Some(t),
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed transition");
                None
            }
        })
        .collect();
    let tracks: Vec<Track> = flat.tracks.iter().filter_map(parse_track).collect();
    TimelineState {
        project_name: flat.project_name.clone(),
        tracks: if tracks.is_empty() {
            crate::timeline::model::initial_tracks()
        } else {
            tracks
        },
        transitions,
        selected_clip_id: flat.selected_clip_id.clone(),
        playhead_time: flat.playhead_time,
        timeline_zoom: flat.timeline_zoom,
    }
}

/// Flat shape of a typed snapshot. Output settings are left at their defaults.
pub fn state_to_flat(state: &TimelineState) -> FlatState {
    FlatState {
        project_name: state.project_name.clone(),
        tracks: state
            .tracks
            .iter()
            .filter_map(|t| serde_json::to_value(t).ok())
            .collect(),
        transitions: state
            .transitions
            .iter()
            .filter_map(|t| serde_json::to_value(t).ok())
            .collect(),
        selected_clip_id: state.selected_clip_id.clone(),
        playhead_time: state.playhead_time,
        timeline_zoom: state.timeline_zoom,
        output_settings: OutputSettings::default(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/codec.rs"]
mod tests;
