//! Sidecar metadata documents.
//!
//! Every spritesheet gets a JSON sidecar describing its grid and the frames
//! in it. Material sets render to separate images but share one sidecar:
//! the sidecar path leaves the material out, so the second material to reach
//! a path is reported as skipped and the first document (which already lists
//! every material's image) stands.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::compositor::CompositorResult;
use crate::config::RenderJobConfig;
use crate::error::{Result, RigError};
use crate::job::{rotation_token, Axes, FrameSequencer};
use crate::types::FrameDescriptor;

/// One `materialData` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialData {
    pub name: String,
    pub file: String,
    pub role: String,
}

/// Timing and position of one animation run within a sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationRecord {
    pub frame_rate: u32,
    pub frame_skip: u32,
    pub name: String,
    pub num_frames: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<u32>,
    /// Cell index of the run's first frame.
    pub start_frame: usize,
}

/// Position of one still within a sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StillRecord {
    pub frame: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FrameRecords {
    #[serde(rename = "animations")]
    Animations(Vec<AnimationRecord>),
    #[serde(rename = "stills")]
    Stills(Vec<StillRecord>),
}

/// The sidecar JSON document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidecarDocument {
    pub base_object_name: String,
    pub sprite_width: u32,
    pub sprite_height: u32,
    pub padding_width: u32,
    pub padding_height: u32,
    pub num_columns: u32,
    pub num_rows: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_data: Option<Vec<MaterialData>>,
    #[serde(flatten)]
    pub frames: FrameRecords,
}

impl SidecarDocument {
    /// Exactly one of `imageFile` and `materialData` must be set.
    pub fn validate(&self) -> Result<()> {
        match (&self.image_file, &self.material_data) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            (Some(_), Some(_)) => Err(RigError::consistency(format!(
                "sidecar for '{}' has both imageFile and materialData",
                self.base_object_name
            ))),
            (None, None) => Err(RigError::consistency(format!(
                "sidecar for '{}' references no image",
                self.base_object_name
            ))),
        }
    }

    /// Image files this document points at, relative to the output directory.
    pub fn referenced_images(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self.image_file.iter().map(String::as_str).collect();
        if let Some(materials) = &self.material_data {
            files.extend(materials.iter().map(|m| m.file.as_str()));
        }
        files
    }
}

/// The combination a flushed unit was rendered for.
///
/// Fields that don't separate output files are ignored when naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitKey {
    pub material: Option<usize>,
    pub rotation: Option<u32>,
    pub animation: Option<usize>,
}

/// Output file naming for one job.
///
/// Images are `<base>[_<material>][_<animation>][_rot<NNN>].png`; sidecars
/// drop the material segment.
#[derive(Debug, Clone)]
pub struct OutputNames {
    output_dir: PathBuf,
    base: String,
    material_names: Option<Vec<String>>,
    animation_names: Vec<String>,
    separate_animations: bool,
    separate_rotations: bool,
}

impl OutputNames {
    /// Names for the units of `config`, given its resolved axes.
    pub fn new(config: &RenderJobConfig, axes: &Axes) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            base: config.base_object_name.clone(),
            material_names: axes
                .materials_enabled()
                .then(|| config.material_sets.iter().map(|m| m.name.clone()).collect()),
            animation_names: config.animation_sets.iter().map(|a| a.name.clone()).collect(),
            separate_animations: axes.separate_files_per_animation,
            separate_rotations: axes.separate_files_per_rotation,
        }
    }

    /// Directory every output is written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn stem(&self, material: Option<usize>, key: &UnitKey) -> String {
        let mut stem = self.base.clone();
        if let (Some(names), Some(i)) = (&self.material_names, material) {
            if let Some(name) = names.get(i) {
                stem.push('_');
                stem.push_str(name);
            }
        }
        if self.separate_animations {
            if let Some(name) = key.animation.and_then(|i| self.animation_names.get(i)) {
                stem.push('_');
                stem.push_str(name);
            }
        }
        if self.separate_rotations {
            if let Some(angle) = key.rotation {
                stem.push('_');
                stem.push_str(&rotation_token(angle));
            }
        }
        stem
    }

    /// Spritesheet file name for a unit, relative to the output directory.
    pub fn image_file_name(&self, key: &UnitKey) -> String {
        format!("{}.png", self.stem(key.material, key))
    }

    /// Full spritesheet path for a unit.
    pub fn image_path(&self, key: &UnitKey) -> PathBuf {
        self.output_dir.join(self.image_file_name(key))
    }

    /// Sidecar path for a unit; material sets share it.
    pub fn sidecar_path(&self, key: &UnitKey) -> PathBuf {
        self.output_dir.join(format!("{}.json", self.stem(None, key)))
    }
}

/// What happened to a unit's sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    Written(PathBuf),
    /// Another material set already wrote this path.
    Skipped(PathBuf),
}

impl EmitOutcome {
    /// The sidecar path, whether written or skipped.
    pub fn path(&self) -> &Path {
        match self {
            EmitOutcome::Written(path) | EmitOutcome::Skipped(path) => path,
        }
    }
}

/// Builds, writes and remembers the sidecars of one job.
#[derive(Debug, Default)]
pub struct SidecarEmitter {
    documents: BTreeMap<PathBuf, SidecarDocument>,
}

impl SidecarEmitter {
    /// An emitter with nothing written yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every sidecar written so far, by path.
    pub fn documents(&self) -> &BTreeMap<PathBuf, SidecarDocument> {
        &self.documents
    }

    /// Write the sidecar for a flushed unit, unless its path was already
    /// written by another material set.
    pub fn emit(
        &mut self,
        config: &RenderJobConfig,
        names: &OutputNames,
        sequencer: &FrameSequencer,
        key: &UnitKey,
        frames: &[FrameDescriptor],
        result: &CompositorResult,
    ) -> Result<EmitOutcome> {
        let path = names.sidecar_path(key);
        if self.documents.contains_key(&path) {
            tracing::debug!(path = %path.display(), "sidecar already written");
            return Ok(EmitOutcome::Skipped(path));
        }

        let document = build_document(config, names, sequencer, key, frames, result)?;
        document.validate()?;
        write_sidecar_json(&document, &path)?;

        self.documents.insert(path.clone(), document);
        Ok(EmitOutcome::Written(path))
    }
}

fn build_document(
    config: &RenderJobConfig,
    names: &OutputNames,
    sequencer: &FrameSequencer,
    key: &UnitKey,
    frames: &[FrameDescriptor],
    result: &CompositorResult,
) -> Result<SidecarDocument> {
    let (image_file, material_data) = if config.control_materials {
        let data = config
            .material_sets
            .iter()
            .enumerate()
            .map(|(i, set)| MaterialData {
                name: set.name.clone(),
                file: names.image_file_name(&UnitKey {
                    material: Some(i),
                    ..*key
                }),
                role: set.role.clone(),
            })
            .collect();
        (None, Some(data))
    } else {
        (Some(names.image_file_name(key)), None)
    };

    Ok(SidecarDocument {
        base_object_name: config.base_object_name.clone(),
        sprite_width: config.sprite_width,
        sprite_height: config.sprite_height,
        padding_width: result.padding.0,
        padding_height: result.padding.1,
        num_columns: result.num_columns,
        num_rows: result.num_rows,
        image_file,
        material_data,
        frames: frame_records(config, sequencer, frames, result)?,
    })
}

/// Records for a unit's frames, positioned by the compositor's input order.
fn frame_records(
    config: &RenderJobConfig,
    sequencer: &FrameSequencer,
    frames: &[FrameDescriptor],
    result: &CompositorResult,
) -> Result<FrameRecords> {
    let position = |frame: &FrameDescriptor| -> Result<usize> {
        frame
            .file_name()
            .and_then(|name| result.position_of(name))
            .ok_or_else(|| {
                RigError::consistency(format!(
                    "frame {} was rendered but not composited",
                    frame.file_path.display()
                ))
            })
    };

    let animated = frames.iter().any(|f| f.animation_set.is_some());
    if !animated {
        let mut stills = Vec::with_capacity(frames.len());
        for frame in frames {
            stills.push(StillRecord {
                frame: position(frame)?,
                rotation: frame.rotation_angle,
            });
        }
        return Ok(FrameRecords::Stills(stills));
    }

    // Consecutive frames with the same animation and rotation form one run
    let mut records = Vec::new();
    let mut start = 0;
    while start < frames.len() {
        let first = &frames[start];
        let run = frames[start..]
            .iter()
            .take_while(|f| {
                f.animation_set == first.animation_set && f.rotation_angle == first.rotation_angle
            })
            .count();

        let set = sequencer.animation(first.animation_set);
        records.push(AnimationRecord {
            frame_rate: config.frame_rate,
            frame_skip: set.map_or(0, |s| s.frame_skip),
            name: sequencer.animation_name(first.animation_set).to_string(),
            num_frames: run,
            rotation: first.rotation_angle,
            start_frame: position(first)?,
        });
        start += run;
    }

    Ok(FrameRecords::Animations(records))
}

/// Write a sidecar document as pretty-printed JSON.
pub fn write_sidecar_json(document: &SidecarDocument, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(document).map_err(|e| RigError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to serialize sidecar: {}", e),
    })?;
    fs::write(path, json)
        .map_err(|e| RigError::io(path, format!("Failed to write sidecar: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnimationSet, MaterialSet};
    use pretty_assertions::assert_eq;

    fn frame(
        dir: &Path,
        seq: &FrameSequencer,
        animation: Option<usize>,
        rotation: Option<u32>,
        index: i64,
    ) -> FrameDescriptor {
        FrameDescriptor {
            file_path: dir.join(seq.frame_file_name(animation, rotation, index)),
            frame_index: index,
            rotation_angle: rotation,
            animation_set: animation,
        }
    }

    fn result_for(frames: &[FrameDescriptor], output: PathBuf) -> CompositorResult {
        let mut ordered: Vec<PathBuf> = frames.iter().map(|f| f.file_path.clone()).collect();
        ordered.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        let grid = crate::compositor::GridLayout::for_frames(frames.len() as u32);
        CompositorResult {
            ordered_input_files: ordered,
            num_columns: grid.columns,
            num_rows: grid.rows,
            output_file_path: output,
            output_image_size: (0, 0),
            padding: (0, 0),
            succeeded: true,
            exit_code: 0,
            stderr: String::new(),
        }
    }

    fn animated_config(out: &Path) -> RenderJobConfig {
        RenderJobConfig {
            base_object_name: "knight".to_string(),
            output_dir: out.to_path_buf(),
            sprite_width: 32,
            sprite_height: 32,
            frame_rate: 12,
            control_animations: true,
            animation_sets: vec![
                AnimationSet::new("walk", 1.0, 3.0),
                AnimationSet::new("attack", 1.0, 2.0),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_output_names() {
        let mut config = animated_config(Path::new("out"));
        config.control_materials = true;
        config.material_sets = vec![MaterialSet::shared("steel", "s")];
        config.control_rotation = true;
        config.rotation_count = 4;
        config.separate_per_animation = true;
        config.separate_per_rotation = true;
        let axes = Axes::resolve(&config);
        let names = OutputNames::new(&config, &axes);

        let key = UnitKey {
            material: Some(0),
            rotation: Some(90),
            animation: Some(1),
        };
        assert_eq!(names.image_path(&key), PathBuf::from("out/knight_steel_attack_rot090.png"));
        assert_eq!(names.sidecar_path(&key), PathBuf::from("out/knight_attack_rot090.json"));
    }

    #[test]
    fn test_output_names_without_separation() {
        let config = animated_config(Path::new("out"));
        let axes = Axes::resolve(&config);
        let names = OutputNames::new(&config, &axes);
        let key = UnitKey {
            material: None,
            rotation: None,
            animation: Some(1),
        };
        assert_eq!(names.image_file_name(&key), "knight.png");
        assert_eq!(names.sidecar_path(&key), PathBuf::from("out/knight.json"));
    }

    #[test]
    fn test_animation_records_use_sorted_positions() {
        let out = tempfile::tempdir().unwrap();
        let config = animated_config(out.path());
        let axes = Axes::resolve(&config);
        let seq = FrameSequencer::new(&config, &axes);
        let names = OutputNames::new(&config, &axes);

        let scratch = Path::new("/scratch");
        let mut frames = Vec::new();
        for animation in [Some(0), Some(1)] {
            for index in seq.frames(animation) {
                frames.push(frame(scratch, &seq, animation, None, index));
            }
        }
        let key = UnitKey::default();
        let result = result_for(&frames, names.image_path(&key));

        let mut emitter = SidecarEmitter::new();
        let outcome = emitter
            .emit(&config, &names, &seq, &key, &frames, &result)
            .unwrap();
        assert_eq!(outcome, EmitOutcome::Written(out.path().join("knight.json")));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(outcome.path()).unwrap()).unwrap();
        assert_eq!(json["baseObjectName"], "knight");
        assert_eq!(json["imageFile"], "knight.png");
        assert!(json.get("materialData").is_none());
        assert!(json.get("stills").is_none());
        assert_eq!(json["numColumns"], 3);
        assert_eq!(json["numRows"], 2);

        // "attack_*" sorts before "walk_*", so walk starts at cell 2
        let animations = json["animations"].as_array().unwrap();
        assert_eq!(animations.len(), 2);
        assert_eq!(animations[0]["name"], "walk");
        assert_eq!(animations[0]["startFrame"], 2);
        assert_eq!(animations[0]["numFrames"], 3);
        assert_eq!(animations[0]["frameRate"], 12);
        assert_eq!(animations[0]["frameSkip"], 0);
        assert!(animations[0].get("rotation").is_none());
        assert_eq!(animations[1]["name"], "attack");
        assert_eq!(animations[1]["startFrame"], 0);
    }

    #[test]
    fn test_still_records_with_rotation() {
        let out = tempfile::tempdir().unwrap();
        let config = RenderJobConfig {
            output_dir: out.path().to_path_buf(),
            control_rotation: true,
            rotation_count: 4,
            ..Default::default()
        };
        let axes = Axes::resolve(&config);
        let seq = FrameSequencer::new(&config, &axes);
        let names = OutputNames::new(&config, &axes);

        let frames: Vec<FrameDescriptor> = axes
            .rotations
            .iter()
            .map(|&r| frame(Path::new("/scratch"), &seq, None, r, 0))
            .collect();
        let key = UnitKey::default();
        let result = result_for(&frames, names.image_path(&key));

        let mut emitter = SidecarEmitter::new();
        emitter.emit(&config, &names, &seq, &key, &frames, &result).unwrap();

        let document = emitter.documents().values().next().unwrap();
        assert_eq!(
            document.frames,
            FrameRecords::Stills(vec![
                StillRecord { frame: 0, rotation: Some(0) },
                StillRecord { frame: 1, rotation: Some(90) },
                StillRecord { frame: 2, rotation: Some(180) },
                StillRecord { frame: 3, rotation: Some(270) },
            ])
        );
    }

    #[test]
    fn test_shared_sidecar_path_is_skipped_for_second_material() {
        let out = tempfile::tempdir().unwrap();
        let mut config = animated_config(out.path());
        config.control_materials = true;
        config.material_sets = vec![
            MaterialSet::shared("steel", "steel"),
            MaterialSet::shared("gold", "gold"),
        ];
        let axes = Axes::resolve(&config);
        let seq = FrameSequencer::new(&config, &axes);
        let names = OutputNames::new(&config, &axes);

        let mut emitter = SidecarEmitter::new();
        let mut outcomes = Vec::new();
        for material in [Some(0), Some(1)] {
            let frames: Vec<FrameDescriptor> = seq
                .frames(Some(0))
                .into_iter()
                .map(|i| frame(Path::new("/scratch"), &seq, Some(0), None, i))
                .collect();
            let key = UnitKey {
                material,
                ..Default::default()
            };
            let result = result_for(&frames, names.image_path(&key));
            outcomes.push(emitter.emit(&config, &names, &seq, &key, &frames, &result).unwrap());
        }

        let path = out.path().join("knight.json");
        assert_eq!(
            outcomes,
            vec![EmitOutcome::Written(path.clone()), EmitOutcome::Skipped(path)]
        );
        assert_eq!(emitter.documents().len(), 1);

        let document = emitter.documents().values().next().unwrap();
        assert_eq!(document.image_file, None);
        assert_eq!(
            document.referenced_images(),
            vec!["knight_steel.png", "knight_gold.png"]
        );
    }

    #[test]
    fn test_frame_missing_from_compositor_output_is_inconsistent() {
        let out = tempfile::tempdir().unwrap();
        let config = animated_config(out.path());
        let axes = Axes::resolve(&config);
        let seq = FrameSequencer::new(&config, &axes);
        let names = OutputNames::new(&config, &axes);

        let frames = vec![frame(Path::new("/scratch"), &seq, Some(0), None, 1)];
        let mut result = result_for(&frames, names.image_path(&UnitKey::default()));
        result.ordered_input_files.clear();

        let err = SidecarEmitter::new()
            .emit(&config, &names, &seq, &UnitKey::default(), &frames, &result)
            .unwrap_err();
        assert!(matches!(err, RigError::InternalConsistency { .. }));
    }

    #[test]
    fn test_validate_rejects_both_image_shapes() {
        let document = SidecarDocument {
            base_object_name: "knight".to_string(),
            sprite_width: 1,
            sprite_height: 1,
            padding_width: 0,
            padding_height: 0,
            num_columns: 1,
            num_rows: 1,
            image_file: Some("knight.png".to_string()),
            material_data: Some(vec![]),
            frames: FrameRecords::Stills(vec![]),
        };
        assert!(matches!(
            document.validate(),
            Err(RigError::InternalConsistency { .. })
        ));
    }
}
